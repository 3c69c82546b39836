//! Feature Vector Assembly

use crate::encoding::{Department, Salary};
use crate::error::PreprocessError;
use crate::record::{Payload, RawRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of features the scaler and classifier were fit on
pub const FEATURE_DIMENSION: usize = 14;

/// Project load at which the `sanity` feature peaks
pub const INVESTMENT_CENTER: f64 = 790.286752;

/// Model input columns. The discriminant is the column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    SatisfactionLevel,
    LastEvaluation,
    NumberProject,
    AverageMonthlyHours,
    TimeSpendCompany,
    WorkAccident,
    PromotionLast5Years,
    Department,
    Salary,
    Investment,
    Reward,
    Sanity,
    Experience,
    Efficiency,
}

impl Feature {
    /// Canonical column order
    pub const ALL: [Feature; FEATURE_DIMENSION] = [
        Feature::SatisfactionLevel,
        Feature::LastEvaluation,
        Feature::NumberProject,
        Feature::AverageMonthlyHours,
        Feature::TimeSpendCompany,
        Feature::WorkAccident,
        Feature::PromotionLast5Years,
        Feature::Department,
        Feature::Salary,
        Feature::Investment,
        Feature::Reward,
        Feature::Sanity,
        Feature::Experience,
        Feature::Efficiency,
    ];

    /// Column name used in requests and artifacts
    pub fn name(&self) -> &'static str {
        match self {
            Feature::SatisfactionLevel => "satisfaction_level",
            Feature::LastEvaluation => "last_evaluation",
            Feature::NumberProject => "number_project",
            Feature::AverageMonthlyHours => "average_monthly_hours",
            Feature::TimeSpendCompany => "time_spend_company",
            Feature::WorkAccident => "work_accident",
            Feature::PromotionLast5Years => "promotion_last_5years",
            Feature::Department => "department",
            Feature::Salary => "salary",
            Feature::Investment => "investment",
            Feature::Reward => "reward",
            Feature::Sanity => "sanity",
            Feature::Experience => "experience",
            Feature::Efficiency => "efficiency",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Engineered from other columns rather than supplied
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Feature::Investment
                | Feature::Reward
                | Feature::Sanity
                | Feature::Experience
                | Feature::Efficiency
        )
    }
}

/// Unscaled model input for one employee, in canonical column order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_DIMENSION]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.0
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Encode, derive and assemble the features of one record
    pub fn from_record(record: &RawRecord) -> Result<Self, PreprocessError> {
        let department = record.category(Feature::Department.name(), Department::from_label)?;
        let salary = record.category(Feature::Salary.name(), Salary::from_label)?;

        let satisfaction_level = record.required_number(Feature::SatisfactionLevel.name())?;
        let last_evaluation = record.number(Feature::LastEvaluation.name())?.unwrap_or(0.0);
        let number_project = record.required_number(Feature::NumberProject.name())?;
        let average_monthly_hours = record.required_number(Feature::AverageMonthlyHours.name())?;
        let time_spend_company = record.required_number(Feature::TimeSpendCompany.name())?;
        let work_accident = record.required_number(Feature::WorkAccident.name())?;
        let promotion_last_5years = record.required_number(Feature::PromotionLast5Years.name())?;

        // Supplied derived values must still be numbers, then get recomputed
        for feature in Feature::ALL.iter().filter(|f| f.is_derived()) {
            if record.number(feature.name())?.is_some() {
                debug!("Ignoring supplied {}, value is always computed", feature.name());
            }
        }

        let investment = number_project * average_monthly_hours;
        let reward = promotion_last_5years + salary.code();
        let deviation = investment - INVESTMENT_CENTER;
        let sanity = (1.0 + satisfaction_level)
            / ((1.0 + work_accident) * (1.0 + deviation * deviation));
        let experience = number_project * time_spend_company;
        if average_monthly_hours == 0.0 {
            return Err(PreprocessError::DivisionByZero {
                feature: Feature::Efficiency.name(),
            });
        }
        let efficiency = number_project / average_monthly_hours;

        let vector = Self([
            satisfaction_level,
            last_evaluation,
            number_project,
            average_monthly_hours,
            time_spend_company,
            work_accident,
            promotion_last_5years,
            department.code(),
            salary.code(),
            investment,
            reward,
            sanity,
            experience,
            efficiency,
        ]);
        vector.ensure_finite()?;
        Ok(vector)
    }

    fn ensure_finite(&self) -> Result<(), PreprocessError> {
        match Feature::ALL
            .iter()
            .zip(self.0.iter())
            .find(|(_, value)| !value.is_finite())
        {
            Some((feature, value)) => Err(PreprocessError::NonFinite {
                feature: feature.name(),
                value: *value,
            }),
            None => Ok(()),
        }
    }
}

/// Turn one record or a batch of records into model-ready feature vectors.
///
/// The output mirrors the input shape. A batch fails as a whole on the
/// first record that cannot be transformed.
pub fn preprocess(input: &Payload<RawRecord>) -> Result<Payload<FeatureVector>, PreprocessError> {
    let features = match input {
        Payload::Single(record) => Payload::Single(FeatureVector::from_record(record)?),
        Payload::Batch(records) => Payload::Batch(
            records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    FeatureVector::from_record(record).map_err(|e| PreprocessError::RecordFailed {
                        index,
                        source: Box::new(e),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    debug!("Preprocessed {} record(s)", features.len());
    Ok(features)
}
