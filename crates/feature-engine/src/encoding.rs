//! Categorical Encoding Tables
//!
//! Fixed label encodings used when the model was trained. The integer
//! codes are part of the model contract and must never be renumbered.

use serde::{Deserialize, Serialize};

/// Department the employee works in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Hr = 0,
    Accounting = 1,
    Technical = 2,
    Support = 3,
    Sales = 4,
    Marketing = 5,
    It = 6,
    ProductMng = 7,
    RandD = 8,
    Management = 9,
}

impl Department {
    /// All departments, ordered by code
    pub const ALL: [Department; 10] = [
        Department::Hr,
        Department::Accounting,
        Department::Technical,
        Department::Support,
        Department::Sales,
        Department::Marketing,
        Department::It,
        Department::ProductMng,
        Department::RandD,
        Department::Management,
    ];

    /// Look up a department by its dataset label (case-sensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }

    /// Label as it appears in the training data
    pub fn label(&self) -> &'static str {
        match self {
            Department::Hr => "hr",
            Department::Accounting => "accounting",
            Department::Technical => "technical",
            Department::Support => "support",
            Department::Sales => "sales",
            Department::Marketing => "marketing",
            Department::It => "IT",
            Department::ProductMng => "product_mng",
            Department::RandD => "RandD",
            Department::Management => "management",
        }
    }

    /// Encoded value fed to the model
    pub fn code(&self) -> f64 {
        *self as u8 as f64
    }
}

/// Salary band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Salary {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Salary {
    /// All salary bands, ordered by code
    pub const ALL: [Salary; 3] = [Salary::Low, Salary::Medium, Salary::High];

    /// Look up a salary band by its dataset label (case-sensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Salary::Low => "low",
            Salary::Medium => "medium",
            Salary::High => "high",
        }
    }

    pub fn code(&self) -> f64 {
        *self as u8 as f64
    }
}
