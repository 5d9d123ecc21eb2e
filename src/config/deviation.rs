//! Deviation check configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::scoring::DeviationPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct DeviationConfig {
    /// Share of the score range a submission may differ from its peers
    /// before it is reported.
    #[serde(default = "default_threshold_percent")]
    pub threshold_percent: f64,

    #[serde(default = "default_max_score")]
    pub max_score: u32,
}

impl DeviationConfig {
    pub fn policy(&self) -> DeviationPolicy {
        DeviationPolicy {
            threshold_percent: self.threshold_percent,
            max_score: self.max_score,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=100.0).contains(&self.threshold_percent) {
            return Err(ValidationError::InvalidDeviationThreshold);
        }
        if self.max_score == 0 {
            return Err(ValidationError::InvalidMaxScore);
        }
        Ok(())
    }
}

impl Default for DeviationConfig {
    fn default() -> Self {
        Self {
            threshold_percent: default_threshold_percent(),
            max_score: default_max_score(),
        }
    }
}

fn default_threshold_percent() -> f64 {
    15.0
}

fn default_max_score() -> u32 {
    5
}
