use super::genes::Gene;
use super::genome::Genotype;

/// Repairs genotypes so that every storage drains and the model reaches the outlet.
///
/// Repair only ever adds genes, so applying it twice is the same as applying it once.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    /// True if no storage is a dead end and some connection reaches the outlet
    pub fn is_connected(&self, genotype: &Genotype) -> bool {
        self.dead_ends(genotype).is_empty() && Self::reaches_outlet(genotype)
    }

    /// Return a repaired copy of `genotype`
    pub fn repair(&self, genotype: &Genotype) -> Genotype {
        let mut repaired = genotype.clone();
        self.repair_in_place(&mut repaired);
        repaired
    }

    /// Add the missing routes to `genotype`. Returns the genes that were added.
    pub fn repair_in_place(&self, genotype: &mut Genotype) -> Vec<Gene> {
        let mut added = Vec::new();

        for storage in self.dead_ends(genotype) {
            if let Some(route) = storage.default_route() {
                if genotype.insert(route) {
                    added.push(route);
                }
            }
        }

        if !Self::reaches_outlet(genotype) && genotype.insert(Gene::TrFirstOut) {
            added.push(Gene::TrFirstOut);
        }

        if !added.is_empty() {
            log::debug!("Repaired genotype [{}], added {:?}", genotype, added);
        }
        added
    }

    /// Storages present without an outgoing connection that leads somewhere.
    /// A connection into a storage that is absent does not drain anything.
    pub fn dead_ends(&self, genotype: &Genotype) -> Vec<Gene> {
        genotype
            .storages()
            .filter(|storage| {
                let outgoing = storage.outgoing();
                !outgoing.is_empty()
                    && !outgoing.iter().any(|c| {
                        genotype.contains(*c) && c.target().map_or(true, |t| genotype.contains(t))
                    })
            })
            .collect()
    }

    fn reaches_outlet(genotype: &Genotype) -> bool {
        genotype.connections().any(|c| c.reaches_outlet())
    }
}
