use crate::error::AcmeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marker contained in every connection name that ends at the outlet.
pub const OUTLET_MARKER: &str = "out";

/// Which part of the catalogue a gene belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneFamily {
    Storage,
    Connection,
    Parameter,
}

/// One token of the lumped model catalogue.
///
/// `first_layer` is always part of the model and therefore has no gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gene {
    // Storages
    Snow,
    Canopy,
    SecondLayer,
    ThirdLayer,
    River,

    // Connections
    TrFirstOut,
    TrFirstRiver,
    TrFirstSecond,
    TrSecondThird,
    TrSecondRiverOrOut,
    TrThirdRiverOrOut,
    RiverOut,

    // Parameters
    Meltrate,
    SnowMeltTemp,
    Lai,
    CanopyClosure,
    BetaFirstOut,
    BetaFirstRiver,
    BetaFirstSecond,
    V0FirstOut,
    V0FirstRiver,
    V0FirstSecond,
    BetaSecondRiver,
    BetaSecondThird,
    BetaThirdRiver,
    BetaRiverOut,
}

impl Gene {
    pub const STORAGES: [Gene; 5] = [
        Gene::Snow,
        Gene::Canopy,
        Gene::SecondLayer,
        Gene::ThirdLayer,
        Gene::River,
    ];

    pub const CONNECTIONS: [Gene; 7] = [
        Gene::TrFirstOut,
        Gene::TrFirstRiver,
        Gene::TrFirstSecond,
        Gene::TrSecondThird,
        Gene::TrSecondRiverOrOut,
        Gene::TrThirdRiverOrOut,
        Gene::RiverOut,
    ];

    pub const PARAMETERS: [Gene; 14] = [
        Gene::Meltrate,
        Gene::SnowMeltTemp,
        Gene::Lai,
        Gene::CanopyClosure,
        Gene::BetaFirstOut,
        Gene::BetaFirstRiver,
        Gene::BetaFirstSecond,
        Gene::V0FirstOut,
        Gene::V0FirstRiver,
        Gene::V0FirstSecond,
        Gene::BetaSecondRiver,
        Gene::BetaSecondThird,
        Gene::BetaThirdRiver,
        Gene::BetaRiverOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snow => "snow",
            Self::Canopy => "canopy",
            Self::SecondLayer => "second_layer",
            Self::ThirdLayer => "third_layer",
            Self::River => "river",
            Self::TrFirstOut => "tr_first_out",
            Self::TrFirstRiver => "tr_first_river",
            Self::TrFirstSecond => "tr_first_second",
            Self::TrSecondThird => "tr_second_third",
            Self::TrSecondRiverOrOut => "tr_second_river_or_out",
            Self::TrThirdRiverOrOut => "tr_third_river_or_out",
            Self::RiverOut => "river_out",
            Self::Meltrate => "meltrate",
            Self::SnowMeltTemp => "snow_melt_temp",
            Self::Lai => "lai",
            Self::CanopyClosure => "canopy_closure",
            Self::BetaFirstOut => "beta_first_out",
            Self::BetaFirstRiver => "beta_first_river",
            Self::BetaFirstSecond => "beta_first_second",
            Self::V0FirstOut => "v0_first_out",
            Self::V0FirstRiver => "v0_first_river",
            Self::V0FirstSecond => "v0_first_second",
            Self::BetaSecondRiver => "beta_second_river",
            Self::BetaSecondThird => "beta_second_third",
            Self::BetaThirdRiver => "beta_third_river",
            Self::BetaRiverOut => "beta_river_out",
        }
    }

    pub fn family(&self) -> GeneFamily {
        if Self::STORAGES.contains(self) {
            GeneFamily::Storage
        } else if Self::CONNECTIONS.contains(self) {
            GeneFamily::Connection
        } else {
            GeneFamily::Parameter
        }
    }

    /// Structural gene a parameter belongs to. `None` for storages and connections.
    pub fn owner(&self) -> Option<Gene> {
        let owner = match self {
            Self::Meltrate | Self::SnowMeltTemp => Self::Snow,
            Self::Lai | Self::CanopyClosure => Self::Canopy,
            Self::BetaFirstOut | Self::V0FirstOut => Self::TrFirstOut,
            Self::BetaFirstRiver | Self::V0FirstRiver => Self::TrFirstRiver,
            Self::BetaFirstSecond | Self::V0FirstSecond => Self::TrFirstSecond,
            Self::BetaSecondThird => Self::TrSecondThird,
            Self::BetaSecondRiver => Self::TrSecondRiverOrOut,
            Self::BetaThirdRiver => Self::TrThirdRiverOrOut,
            Self::BetaRiverOut => Self::RiverOut,
            _ => return None,
        };
        Some(owner)
    }

    /// Connections that drain this storage. Empty for storages that drain
    /// implicitly into the first layer (snow, canopy) and for non-storages.
    pub fn outgoing(&self) -> &'static [Gene] {
        match self {
            Self::SecondLayer => &[Self::TrSecondThird, Self::TrSecondRiverOrOut],
            Self::ThirdLayer => &[Self::TrThirdRiverOrOut],
            Self::River => &[Self::RiverOut],
            _ => &[],
        }
    }

    /// Storage a connection feeds. `None` for routes that may end at the outlet
    /// and for genes that are not connections.
    pub fn target(&self) -> Option<Gene> {
        match self {
            Self::TrFirstSecond => Some(Self::SecondLayer),
            Self::TrFirstRiver => Some(Self::River),
            Self::TrSecondThird => Some(Self::ThirdLayer),
            _ => None,
        }
    }

    /// Route added by the validator when this storage has no outgoing connection
    pub fn default_route(&self) -> Option<Gene> {
        match self {
            Self::SecondLayer => Some(Self::TrSecondRiverOrOut),
            Self::ThirdLayer => Some(Self::TrThirdRiverOrOut),
            Self::River => Some(Self::RiverOut),
            _ => None,
        }
    }

    pub fn reaches_outlet(&self) -> bool {
        self.family() == GeneFamily::Connection && self.as_str().contains(OUTLET_MARKER)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gene {
    type Err = AcmeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeneUniverse::lumped()
            .all()
            .iter()
            .copied()
            .find(|gene| gene.as_str() == s)
            .ok_or_else(|| AcmeError::UnknownGene(s.to_string()))
    }
}

/// The legal alphabet for genotypes, partitioned into families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneUniverse {
    genes: Vec<Gene>,
}

impl GeneUniverse {
    /// Full catalogue of the lumped catchment model
    pub fn lumped() -> Self {
        let genes = Gene::STORAGES
            .iter()
            .chain(Gene::CONNECTIONS.iter())
            .chain(Gene::PARAMETERS.iter())
            .copied()
            .collect();
        Self { genes }
    }

    pub fn all(&self) -> &[Gene] {
        &self.genes
    }

    pub fn storages(&self) -> impl Iterator<Item = Gene> + '_ {
        self.of_family(GeneFamily::Storage)
    }

    pub fn connections(&self) -> impl Iterator<Item = Gene> + '_ {
        self.of_family(GeneFamily::Connection)
    }

    pub fn parameters(&self) -> impl Iterator<Item = Gene> + '_ {
        self.of_family(GeneFamily::Parameter)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn contains(&self, gene: Gene) -> bool {
        self.genes.contains(&gene)
    }

    fn of_family(&self, family: GeneFamily) -> impl Iterator<Item = Gene> + '_ {
        self.genes.iter().copied().filter(move |g| g.family() == family)
    }
}

impl Default for GeneUniverse {
    fn default() -> Self {
        Self::lumped()
    }
}
