use super::genes::{Gene, GeneUniverse};
use super::genome::Genotype;
use rand::seq::SliceRandom;
use rand::Rng;

/// The three structural edits a mutation can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Delete,
    Swap,
}

impl MutationKind {
    pub const ALL: [MutationKind; 3] = [MutationKind::Add, MutationKind::Delete, MutationKind::Swap];
}

/// Mutation: pick a kind uniformly, then apply it 1..=max_changes times.
///
/// The input genotype is never modified; a mutated copy is returned.
#[derive(Debug, Clone)]
pub struct Mutator {
    max_changes: usize,
}

impl Mutator {
    pub const DEFAULT_MAX_CHANGES: usize = 3;

    pub fn new(max_changes: usize) -> Self {
        Self {
            max_changes: max_changes.max(1),
        }
    }

    pub fn mutate<R: Rng + ?Sized>(
        &self,
        parent: &Genotype,
        universe: &GeneUniverse,
        rng: &mut R,
    ) -> Genotype {
        let kind = *MutationKind::ALL
            .choose(rng)
            .unwrap_or(&MutationKind::Swap);
        self.mutate_with(kind, parent, universe, rng)
    }

    pub fn mutate_with<R: Rng + ?Sized>(
        &self,
        kind: MutationKind,
        parent: &Genotype,
        universe: &GeneUniverse,
        rng: &mut R,
    ) -> Genotype {
        let mut child = parent.clone();
        let changes = rng.gen_range(1..=self.max_changes);

        for _ in 0..changes {
            let done = match kind {
                MutationKind::Add => add_gene(&mut child, universe, rng),
                MutationKind::Delete => delete_gene(&mut child, universe, rng),
                MutationKind::Swap => swap_gene(&mut child, universe, rng),
            };
            if done {
                break;
            }
        }

        child
    }
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_CHANGES)
    }
}

// Each edit returns true when it had to fall back and the repetition loop must stop.

fn add_gene<R: Rng + ?Sized>(genes: &mut Genotype, universe: &GeneUniverse, rng: &mut R) -> bool {
    let absent: Vec<Gene> = universe
        .all()
        .iter()
        .copied()
        .filter(|g| !genes.contains(*g))
        .collect();

    match absent.choose(rng) {
        Some(gene) => {
            genes.insert(*gene);
            false
        }
        None => {
            // Nothing left to add
            genes.genes_mut().shuffle(rng);
            genes.pop();
            true
        }
    }
}

fn delete_gene<R: Rng + ?Sized>(genes: &mut Genotype, universe: &GeneUniverse, rng: &mut R) -> bool {
    if genes.is_empty() {
        if let Some(gene) = universe.all().choose(rng) {
            genes.insert(*gene);
        }
        return true;
    }
    genes.genes_mut().shuffle(rng);
    genes.pop();
    false
}

fn swap_gene<R: Rng + ?Sized>(genes: &mut Genotype, universe: &GeneUniverse, rng: &mut R) -> bool {
    if genes.is_empty() {
        if let Some(gene) = universe.all().choose(rng) {
            genes.insert(*gene);
        }
        return true;
    }

    let index = rng.gen_range(0..genes.len());
    let sampled: Vec<Gene> = universe.all().choose_multiple(rng, 2).copied().collect();
    let (new_gene, alternate) = match sampled.as_slice() {
        [first, second] => (*first, *second),
        [only] => (*only, *only),
        _ => return true,
    };

    let current = genes.genes()[index];
    let replacement = if new_gene == current { alternate } else { new_gene };
    genes.replace_at(index, replacement);
    false
}

/// Single point crossover with independent split points in each parent.
///
/// The child is `first[..i] ++ second[j..]` with duplicates removed.
pub fn crossover<R: Rng + ?Sized>(first: &Genotype, second: &Genotype, rng: &mut R) -> Genotype {
    let split_first = rng.gen_range(0..=first.len());
    let split_second = rng.gen_range(0..=second.len());

    first.genes()[..split_first]
        .iter()
        .chain(second.genes()[split_second..].iter())
        .copied()
        .collect()
}
