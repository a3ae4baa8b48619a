use super::traits::{invalid, ConfigSection};
use crate::error::AcmeError;
use serde::{Deserialize, Serialize};

/// Calibration years and the validation span that follows them.
/// Without years the whole forcing record is used for calibration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    /// Years after `end_year` kept for validation
    pub validation_time_span: u32,
}

impl ConfigSection for PeriodConfig {
    fn section_name() -> &'static str {
        "period"
    }

    fn validate(&self) -> Result<(), AcmeError> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(invalid(Self::section_name(), "Start year must not be after end year"));
            }
        }
        Ok(())
    }
}
