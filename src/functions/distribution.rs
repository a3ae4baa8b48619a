use crate::error::{AcmeError, Result};
use rand::Rng;
use rand_distr::{ChiSquared, Distribution, Exp, Gamma, LogNormal, Normal, Triangular, Weibull};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prior used to draw calibration parameters between their bounds.
///
/// Shaped distributions are drawn on the unit interval, clipped to it and
/// scaled into `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterDistribution {
    Uniform,
    Normal,
    LogNormal,
    Exponential,
    Gamma,
    Weibull,
    Triangular,
    ChiSquare,
}

impl ParameterDistribution {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Uniform,
            Self::Normal,
            Self::LogNormal,
            Self::Exponential,
            Self::Gamma,
            Self::Weibull,
            Self::Triangular,
            Self::ChiSquare,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Normal => "normal",
            Self::LogNormal => "lognormal",
            Self::Exponential => "exponential",
            Self::Gamma => "gamma",
            Self::Weibull => "weibull",
            Self::Triangular => "triangular",
            Self::ChiSquare => "chisquare",
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, low: f64, high: f64, rng: &mut R) -> Result<f64> {
        if !(low <= high) {
            return Err(AcmeError::Configuration(format!(
                "Invalid parameter bounds [{}, {}]",
                low, high
            )));
        }
        if low == high {
            return Ok(low);
        }
        let range = high - low;

        let value = match self {
            Self::Uniform => rng.gen_range(low..=high),
            Self::Normal => {
                let normal = Normal::new(low + range / 2.0, range / 6.0).map_err(invalid)?;
                normal.sample(rng).clamp(low, high)
            }
            Self::Triangular => {
                let triangular = Triangular::new(low, high, low + range / 2.0).map_err(invalid)?;
                triangular.sample(rng)
            }
            Self::LogNormal => low + range * unit(LogNormal::new(0.5f64.ln(), 0.5).map_err(invalid)?.sample(rng)),
            Self::Exponential => low + range * unit(Exp::new(3.0).map_err(invalid)?.sample(rng)),
            Self::Gamma => low + range * unit(Gamma::new(2.0, 0.15).map_err(invalid)?.sample(rng)),
            Self::Weibull => low + range * unit(Weibull::new(0.5, 2.0).map_err(invalid)?.sample(rng)),
            Self::ChiSquare => low + range * unit(ChiSquared::new(3.0).map_err(invalid)?.sample(rng) / 10.0),
        };

        Ok(value)
    }
}

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn invalid<E: fmt::Display>(e: E) -> AcmeError {
    AcmeError::Configuration(format!("Invalid distribution parameters: {}", e))
}

impl fmt::Display for ParameterDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterDistribution {
    type Err = AcmeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "");
        let wanted = match wanted.as_str() {
            "exp" => "exponential".to_string(),
            "chisquared" => "chisquare".to_string(),
            _ => wanted,
        };
        Self::all()
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| AcmeError::UnknownIdentifier {
                kind: "distribution",
                name: s.to_string(),
            })
    }
}
