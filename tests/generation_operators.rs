use acme::engines::generation::{
    crossover, Creator, Gene, GeneUniverse, Genotype, MutationKind, Mutator, StructuralValidator,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn test_crossover_children_come_from_parents() {
    let first = Genotype::from_genes([Gene::Snow, Gene::Meltrate, Gene::River, Gene::RiverOut]);
    let second = Genotype::from_genes([Gene::River, Gene::Canopy, Gene::Lai, Gene::TrFirstOut]);
    let parents: HashSet<Gene> = first.iter().chain(second.iter()).collect();

    for seed in 0..200 {
        let mut rng = StdRng::seed_from_u64(seed);
        let child = crossover(&first, &second, &mut rng);

        let unique: HashSet<Gene> = child.iter().collect();
        assert_eq!(unique.len(), child.len(), "duplicate gene in {}", child);
        assert!(unique.is_subset(&parents), "foreign gene in {}", child);
    }
}

#[test]
fn test_crossover_with_empty_parents() {
    let mut rng = StdRng::seed_from_u64(1);
    let child = crossover(&Genotype::new(), &Genotype::new(), &mut rng);
    assert!(child.is_empty());
}

#[test]
fn test_add_on_full_universe_removes_one_gene() {
    let universe = GeneUniverse::lumped();
    let full = Genotype::from_genes(universe.all().iter().copied());
    let mutator = Mutator::default();

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let child = mutator.mutate_with(MutationKind::Add, &full, &universe, &mut rng);
        assert_eq!(child.len(), universe.len() - 1);
    }
    assert_eq!(full.len(), universe.len());
}

#[test]
fn test_delete_on_empty_adds_one_gene() {
    let universe = GeneUniverse::lumped();
    let mutator = Mutator::default();
    let mut rng = StdRng::seed_from_u64(9);

    let child = mutator.mutate_with(MutationKind::Delete, &Genotype::new(), &universe, &mut rng);
    assert_eq!(child.len(), 1);
    assert!(universe.contains(child.genes()[0]));
}

#[test]
fn test_swap_replaces_the_single_gene() {
    let universe = GeneUniverse::lumped();
    let mutator = Mutator::new(1);
    let parent = Genotype::from_genes([Gene::Snow]);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let child = mutator.mutate_with(MutationKind::Swap, &parent, &universe, &mut rng);
        assert_eq!(child.len(), 1);
        assert_ne!(child.genes()[0], Gene::Snow);
    }
}

#[test]
fn test_create_with_every_roll_succeeding() {
    let creator = Creator::new(1.0, 10);
    let mut rng = StdRng::seed_from_u64(0);
    let genotype = creator.create(&mut rng);

    let expected = vec![
        Gene::Snow,
        Gene::Meltrate,
        Gene::SnowMeltTemp,
        Gene::Canopy,
        Gene::CanopyClosure,
        Gene::Lai,
        Gene::SecondLayer,
        Gene::ThirdLayer,
        Gene::River,
        Gene::TrFirstSecond,
        Gene::BetaFirstSecond,
        Gene::V0FirstSecond,
        Gene::TrFirstRiver,
        Gene::BetaFirstRiver,
        Gene::V0FirstRiver,
        Gene::TrFirstOut,
        Gene::BetaFirstOut,
        Gene::V0FirstOut,
        Gene::TrSecondThird,
        Gene::BetaSecondThird,
        Gene::TrSecondRiverOrOut,
        Gene::BetaSecondRiver,
        Gene::TrThirdRiverOrOut,
        Gene::BetaThirdRiver,
        Gene::RiverOut,
        Gene::BetaRiverOut,
    ];
    assert_eq!(genotype.genes(), expected.as_slice());
    assert_eq!(genotype.len(), GeneUniverse::lumped().len());
    assert!(StructuralValidator::new().is_connected(&genotype));
}

#[test]
fn test_create_with_every_roll_failing_is_repaired() {
    let creator = Creator::new(0.0, 10);
    let mut rng = StdRng::seed_from_u64(0);
    let genotype = creator.create(&mut rng);
    assert!(genotype.is_empty());

    let repaired = StructuralValidator::new().repair(&genotype);
    assert_eq!(repaired.genes(), &[Gene::TrFirstOut]);
}

#[test]
fn test_validator_connects_canopy_model() {
    let genotype = Genotype::from_genes([Gene::Canopy, Gene::Lai]);
    let validator = StructuralValidator::new();
    assert!(!validator.is_connected(&genotype));

    let repaired = validator.repair(&genotype);
    assert!(repaired.contains(Gene::TrFirstOut));
    assert!(repaired.contains(Gene::Canopy));
    assert!(repaired.contains(Gene::Lai));
}

#[test]
fn test_repaired_offspring_always_reach_the_outlet() {
    let universe = GeneUniverse::lumped();
    let creator = Creator::default();
    let mutator = Mutator::default();
    let validator = StructuralValidator::new();
    let mut rng = StdRng::seed_from_u64(42);

    let mut pool: Vec<Genotype> = (0..10)
        .map(|_| validator.repair(&creator.create(&mut rng)))
        .collect();

    for round in 0..300 {
        let parent = &pool[round % pool.len()];
        let donor = &pool[(round * 7 + 3) % pool.len()];
        let mutated = validator.repair(&mutator.mutate(parent, &universe, &mut rng));
        let crossed = validator.repair(&crossover(parent, donor, &mut rng));

        for child in [&mutated, &crossed] {
            assert!(validator.is_connected(child), "disconnected: {}", child);
            assert!(validator.dead_ends(child).is_empty(), "dead end in {}", child);
        }
        let slot = round % pool.len();
        pool[slot] = if round % 2 == 0 { mutated } else { crossed };
    }
}

#[test]
fn test_gene_names_parse_back() {
    for gene in GeneUniverse::lumped().all() {
        let parsed: Gene = gene.as_str().parse().unwrap();
        assert_eq!(parsed, *gene);
    }
    assert!("tr_first_third".parse::<Gene>().is_err());
}
