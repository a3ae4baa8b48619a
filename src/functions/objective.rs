use crate::error::{AcmeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Goodness of fit between observed and simulated discharge.
///
/// All scores are oriented so that higher is better: error measures (RMSE,
/// MAE, percent bias) are returned negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveFunction {
    NashSutcliffe,
    LogNashSutcliffe,
    KlingGupta,
    Correlation,
    RSquared,
    Rmse,
    Mae,
    PercentBias,
}

const LOG_OFFSET: f64 = 1e-6;

impl ObjectiveFunction {
    pub fn all() -> Vec<Self> {
        vec![
            Self::NashSutcliffe,
            Self::LogNashSutcliffe,
            Self::KlingGupta,
            Self::Correlation,
            Self::RSquared,
            Self::Rmse,
            Self::Mae,
            Self::PercentBias,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NashSutcliffe => "nashsutcliffe",
            Self::LogNashSutcliffe => "lognashsutcliffe",
            Self::KlingGupta => "kge",
            Self::Correlation => "correlationcoefficient",
            Self::RSquared => "rsquared",
            Self::Rmse => "rmse",
            Self::Mae => "mae",
            Self::PercentBias => "pbias",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::NashSutcliffe => &["nse", "nash_sutcliffe"],
            Self::LogNashSutcliffe => &["lognse", "log_nse", "log_nash_sutcliffe"],
            Self::KlingGupta => &["kling_gupta", "klinggupta"],
            Self::Correlation => &["pearson", "correlation", "r"],
            Self::RSquared => &["r2", "r_squared"],
            Self::Rmse => &[],
            Self::Mae => &[],
            Self::PercentBias => &["percent_bias", "bias"],
        }
    }

    /// Score `simulated` against `observed`
    pub fn evaluate(&self, observed: &[f64], simulated: &[f64]) -> Result<f64> {
        if observed.len() != simulated.len() {
            return Err(AcmeError::Evaluation(format!(
                "Observed ({}) and simulated ({}) lengths differ",
                observed.len(),
                simulated.len()
            )));
        }
        if observed.is_empty() {
            return Err(AcmeError::Evaluation("Empty time series".to_string()));
        }

        let score = match self {
            Self::NashSutcliffe => nash_sutcliffe(observed, simulated),
            Self::LogNashSutcliffe => {
                let log_obs: Vec<f64> = observed.iter().map(|v| (v + LOG_OFFSET).ln()).collect();
                let log_sim: Vec<f64> = simulated.iter().map(|v| (v + LOG_OFFSET).ln()).collect();
                nash_sutcliffe(&log_obs, &log_sim)
            }
            Self::KlingGupta => kling_gupta(observed, simulated),
            Self::Correlation => pearson(observed, simulated),
            Self::RSquared => pearson(observed, simulated).powi(2),
            Self::Rmse => {
                let mse = squared_errors(observed, simulated) / observed.len() as f64;
                -mse.sqrt()
            }
            Self::Mae => {
                let total: f64 = observed.iter().zip(simulated).map(|(o, s)| (s - o).abs()).sum();
                -total / observed.len() as f64
            }
            Self::PercentBias => {
                let diff: f64 = observed.iter().zip(simulated).map(|(o, s)| s - o).sum();
                let total: f64 = observed.iter().sum();
                -(100.0 * diff / total).abs()
            }
        };

        Ok(score)
    }
}

impl fmt::Display for ObjectiveFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectiveFunction {
    type Err = AcmeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|f| f.name() == wanted || f.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| AcmeError::UnknownIdentifier {
                kind: "objective function",
                name: s.to_string(),
            })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn squared_errors(observed: &[f64], simulated: &[f64]) -> f64 {
    observed.iter().zip(simulated).map(|(o, s)| (o - s).powi(2)).sum()
}

fn nash_sutcliffe(observed: &[f64], simulated: &[f64]) -> f64 {
    let m = mean(observed);
    let variance: f64 = observed.iter().map(|o| (o - m).powi(2)).sum();
    1.0 - squared_errors(observed, simulated) / variance
}

fn pearson(observed: &[f64], simulated: &[f64]) -> f64 {
    let mo = mean(observed);
    let ms = mean(simulated);
    let cov: f64 = observed.iter().zip(simulated).map(|(o, s)| (o - mo) * (s - ms)).sum();
    let so: f64 = observed.iter().map(|o| (o - mo).powi(2)).sum::<f64>().sqrt();
    let ss: f64 = simulated.iter().map(|s| (s - ms).powi(2)).sum::<f64>().sqrt();
    cov / (so * ss)
}

fn kling_gupta(observed: &[f64], simulated: &[f64]) -> f64 {
    let r = pearson(observed, simulated);
    let alpha = std_dev(simulated) / std_dev(observed);
    let beta = mean(simulated) / mean(observed);
    1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBSERVED: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

    #[test]
    fn test_perfect_fit() {
        for function in ObjectiveFunction::all() {
            let score = function.evaluate(&OBSERVED, &OBSERVED).unwrap();
            let expected = match function {
                ObjectiveFunction::Rmse | ObjectiveFunction::Mae | ObjectiveFunction::PercentBias => 0.0,
                _ => 1.0,
            };
            assert!((score - expected).abs() < 1e-9, "{}: {}", function, score);
        }
    }

    #[test]
    fn test_nash_sutcliffe_of_mean_is_zero() {
        let simulated = [3.0; 5];
        let score = ObjectiveFunction::NashSutcliffe.evaluate(&OBSERVED, &simulated).unwrap();
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn test_error_measures_are_negated() {
        let simulated = [2.0, 3.0, 4.0, 5.0, 6.0];
        let rmse = ObjectiveFunction::Rmse.evaluate(&OBSERVED, &simulated).unwrap();
        let mae = ObjectiveFunction::Mae.evaluate(&OBSERVED, &simulated).unwrap();
        assert!((rmse + 1.0).abs() < 1e-12);
        assert!((mae + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ObjectiveFunction::Rmse.evaluate(&OBSERVED, &[1.0]).is_err());
        assert!(ObjectiveFunction::Rmse.evaluate(&[], &[]).is_err());
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!("NSE".parse::<ObjectiveFunction>().unwrap(), ObjectiveFunction::NashSutcliffe);
        assert_eq!("kge".parse::<ObjectiveFunction>().unwrap(), ObjectiveFunction::KlingGupta);
        assert!(matches!(
            "likelihood".parse::<ObjectiveFunction>(),
            Err(AcmeError::UnknownIdentifier { kind: "objective function", .. })
        ));
    }
}
