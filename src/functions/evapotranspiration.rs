use crate::error::AcmeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Evapotranspiration scheme the simulation engine should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EtMethod {
    PenmanMonteith,
    PriestleyTaylor,
    Hargreave,
    Turc,
}

impl EtMethod {
    pub fn all() -> Vec<Self> {
        vec![Self::PenmanMonteith, Self::PriestleyTaylor, Self::Hargreave, Self::Turc]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PenmanMonteith => "penman_monteith",
            Self::PriestleyTaylor => "priestley_taylor",
            Self::Hargreave => "hargreave",
            Self::Turc => "turc",
        }
    }

    /// Forcing series the method reads besides precipitation
    pub fn required_series(&self) -> &'static [&'static str] {
        match self {
            Self::PenmanMonteith | Self::PriestleyTaylor => &["t_mean", "t_min", "t_max"],
            Self::Hargreave => &["t_min", "t_max"],
            Self::Turc => &["t_mean"],
        }
    }
}

impl fmt::Display for EtMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EtMethod {
    type Err = AcmeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let wanted = wanted.trim_end_matches("et");

        Self::all()
            .into_iter()
            .find(|m| m.name().replace('_', "") == wanted || (wanted == "hargreaves" && *m == Self::Hargreave))
            .ok_or_else(|| AcmeError::UnknownIdentifier {
                kind: "evapotranspiration method",
                name: s.to_string(),
            })
    }
}
