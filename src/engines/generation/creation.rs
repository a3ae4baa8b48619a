use super::genes::Gene;
use super::genome::Genotype;
use rand::Rng;

/// Builds fresh genotypes from independent Bernoulli trials.
///
/// Decisions are taken in dependency order (storages before the connections
/// and parameters that need them), so every storage that is created also gets
/// an outgoing route. Outlet connectivity is left to `StructuralValidator`.
#[derive(Debug, Clone)]
pub struct Creator {
    threshold: f64,
    max_connection_attempts: usize,
}

impl Creator {
    pub const DEFAULT_THRESHOLD: f64 = 1.0 / 3.0;
    pub const DEFAULT_CONNECTION_ATTEMPTS: usize = 100;

    pub fn new(threshold: f64, max_connection_attempts: usize) -> Self {
        Self {
            threshold,
            max_connection_attempts,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn create<R: Rng + ?Sized>(&self, rng: &mut R) -> Genotype {
        let mut genes = Genotype::new();

        if self.roll(rng) {
            genes.insert(Gene::Snow);
            self.maybe(&mut genes, Gene::Meltrate, rng);
            self.maybe(&mut genes, Gene::SnowMeltTemp, rng);
        }

        if self.roll(rng) {
            genes.insert(Gene::Canopy);
            self.maybe(&mut genes, Gene::CanopyClosure, rng);
            self.maybe(&mut genes, Gene::Lai, rng);
        }

        if self.roll(rng) {
            genes.insert(Gene::SecondLayer);
            self.maybe(&mut genes, Gene::ThirdLayer, rng);
        }

        self.maybe(&mut genes, Gene::River, rng);

        // First layer routes
        if self.maybe(&mut genes, Gene::TrFirstSecond, rng) {
            self.maybe(&mut genes, Gene::BetaFirstSecond, rng);
            self.maybe(&mut genes, Gene::V0FirstSecond, rng);
        }
        if self.maybe(&mut genes, Gene::TrFirstRiver, rng) {
            self.maybe(&mut genes, Gene::BetaFirstRiver, rng);
            self.maybe(&mut genes, Gene::V0FirstRiver, rng);
        }
        if self.maybe(&mut genes, Gene::TrFirstOut, rng) {
            self.maybe(&mut genes, Gene::BetaFirstOut, rng);
            self.maybe(&mut genes, Gene::V0FirstOut, rng);
        }

        if genes.contains(Gene::SecondLayer) {
            self.connect_second_layer(&mut genes, rng);
        }

        // A third layer without a route would be a dead end
        if genes.contains(Gene::ThirdLayer) {
            genes.insert(Gene::TrThirdRiverOrOut);
            self.maybe(&mut genes, Gene::BetaThirdRiver, rng);
        }

        if genes.contains(Gene::River) {
            genes.insert(Gene::RiverOut);
            self.maybe(&mut genes, Gene::BetaRiverOut, rng);
        }

        genes
    }

    fn connect_second_layer<R: Rng + ?Sized>(&self, genes: &mut Genotype, rng: &mut R) {
        for _ in 0..self.max_connection_attempts {
            if self.maybe(genes, Gene::TrSecondThird, rng) {
                self.maybe(genes, Gene::BetaSecondThird, rng);
            }
            if self.maybe(genes, Gene::TrSecondRiverOrOut, rng) {
                self.maybe(genes, Gene::BetaSecondRiver, rng);
            }
            if genes.contains(Gene::TrSecondThird) || genes.contains(Gene::TrSecondRiverOrOut) {
                return;
            }
        }

        log::warn!(
            "No second layer route after {} attempts, forcing {}",
            self.max_connection_attempts,
            Gene::TrSecondRiverOrOut
        );
        genes.insert(Gene::TrSecondRiverOrOut);
    }

    fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.threshold
    }

    /// Roll once and insert `gene` on success
    fn maybe<R: Rng + ?Sized>(&self, genes: &mut Genotype, gene: Gene, rng: &mut R) -> bool {
        if self.roll(rng) {
            genes.insert(gene);
            true
        } else {
            false
        }
    }
}

impl Default for Creator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD, Self::DEFAULT_CONNECTION_ATTEMPTS)
    }
}
