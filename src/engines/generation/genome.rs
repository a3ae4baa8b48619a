use super::genes::{Gene, GeneFamily};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Genotype representation for structural search
///
/// A genotype is the set of genes that describes one lumped catchment model:
/// which storages exist, how they are connected and which parameters are
/// calibrated. Insertion order is kept so that logs and reports show genes in
/// the order they were created, but identity is the gene *set*:
///
/// - Two genotypes with the same genes in a different order compare equal
///   and hash the same.
/// - Duplicates are never stored.
///
/// Structural validity is not enforced here; see `StructuralValidator`.
///
/// # Example
///
/// ```
/// use acme::engines::generation::{Gene, Genotype};
///
/// let a = Genotype::from_genes([Gene::Snow, Gene::River]);
/// let b = Genotype::from_genes([Gene::River, Gene::Snow]);
/// assert_eq!(a, b);
/// assert_eq!(a.key(), b.key());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Gene>", into = "Vec<Gene>")]
pub struct Genotype {
    genes: Vec<Gene>,
}

/// Order-independent identity of a genotype, used as the fitness cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenotypeKey(Vec<Gene>);

impl Genotype {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any gene sequence, keeping the first occurrence of duplicates
    pub fn from_genes<I: IntoIterator<Item = Gene>>(genes: I) -> Self {
        let mut genotype = Self::new();
        for gene in genes {
            genotype.insert(gene);
        }
        genotype
    }

    /// Append a gene. Returns false if it was already present.
    pub fn insert(&mut self, gene: Gene) -> bool {
        if self.contains(gene) {
            return false;
        }
        self.genes.push(gene);
        true
    }

    pub fn remove(&mut self, gene: Gene) -> bool {
        match self.genes.iter().position(|g| *g == gene) {
            Some(index) => {
                self.genes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn pop(&mut self) -> Option<Gene> {
        self.genes.pop()
    }

    /// Replace the gene at `index`. If `gene` already sits elsewhere the slot
    /// is dropped instead, so the genotype stays a set. Returns false when
    /// `index` is out of range.
    pub(crate) fn replace_at(&mut self, index: usize, gene: Gene) -> bool {
        let Some(current) = self.genes.get(index).copied() else {
            return false;
        };
        if current != gene {
            if self.contains(gene) {
                self.genes.remove(index);
            } else {
                self.genes[index] = gene;
            }
        }
        true
    }

    pub fn contains(&self, gene: Gene) -> bool {
        self.genes.contains(&gene)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn iter(&self) -> impl Iterator<Item = Gene> + '_ {
        self.genes.iter().copied()
    }

    pub(crate) fn genes_mut(&mut self) -> &mut Vec<Gene> {
        &mut self.genes
    }

    pub fn key(&self) -> GenotypeKey {
        let mut genes = self.genes.clone();
        genes.sort();
        GenotypeKey(genes)
    }

    pub fn storages(&self) -> impl Iterator<Item = Gene> + '_ {
        self.iter().filter(|g| g.family() == GeneFamily::Storage)
    }

    pub fn connections(&self) -> impl Iterator<Item = Gene> + '_ {
        self.iter().filter(|g| g.family() == GeneFamily::Connection)
    }

    /// Parameters whose owning storage or connection is absent. The
    /// simulation ignores them.
    pub fn inert_parameters(&self) -> Vec<Gene> {
        self.iter()
            .filter(|g| matches!(g.owner(), Some(owner) if !self.contains(owner)))
            .collect()
    }
}

impl PartialEq for Genotype {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|g| other.contains(g))
    }
}

impl Eq for Genotype {}

impl Hash for Genotype {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<Vec<Gene>> for Genotype {
    fn from(genes: Vec<Gene>) -> Self {
        Self::from_genes(genes)
    }
}

impl From<Genotype> for Vec<Gene> {
    fn from(genotype: Genotype) -> Self {
        genotype.genes
    }
}

impl FromIterator<Gene> for Genotype {
    fn from_iter<I: IntoIterator<Item = Gene>>(iter: I) -> Self {
        Self::from_genes(iter)
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.genes.iter().map(|g| g.as_str()).collect();
        f.write_str(&names.join(" "))
    }
}

impl GenotypeKey {
    pub fn genes(&self) -> &[Gene] {
        &self.0
    }
}

impl fmt::Display for GenotypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|g| g.as_str()).collect();
        f.write_str(&names.join(" "))
    }
}
