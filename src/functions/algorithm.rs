use crate::error::AcmeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calibration algorithms a `Calibrator` can be asked to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    MonteCarlo,
    LatinHypercube,
    MaximumLikelihood,
    Mcmc,
    SceUa,
    SimulatedAnnealing,
    DemCz,
    Rope,
    Abc,
    FscAbc,
    Dream,
    Dds,
}

impl Algorithm {
    pub fn all() -> Vec<Self> {
        vec![
            Self::MonteCarlo,
            Self::LatinHypercube,
            Self::MaximumLikelihood,
            Self::Mcmc,
            Self::SceUa,
            Self::SimulatedAnnealing,
            Self::DemCz,
            Self::Rope,
            Self::Abc,
            Self::FscAbc,
            Self::Dream,
            Self::Dds,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MonteCarlo => "mc",
            Self::LatinHypercube => "lhs",
            Self::MaximumLikelihood => "mle",
            Self::Mcmc => "mcmc",
            Self::SceUa => "sceua",
            Self::SimulatedAnnealing => "sa",
            Self::DemCz => "demcz",
            Self::Rope => "rope",
            Self::Abc => "abc",
            Self::FscAbc => "fscabc",
            Self::Dream => "dream",
            Self::Dds => "dds",
        }
    }

    /// Whether the algorithm stops early once its convergence criterion is met
    pub fn uses_convergence_limit(&self) -> bool {
        matches!(self, Self::Dream | Self::SceUa | Self::DemCz)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = AcmeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], "");
        let wanted = match wanted.as_str() {
            "montecarlo" => "mc",
            "latinhypercube" => "lhs",
            other => other,
        };
        Self::all()
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| AcmeError::UnknownIdentifier {
                kind: "algorithm",
                name: s.to_string(),
            })
    }
}
