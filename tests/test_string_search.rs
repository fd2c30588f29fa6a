use genepool::{
    EvolutionCoordinator, EvolutionSettings, Gene, Individual, Problem, RandomNumberGenerator,
};
use rand::Rng;

/// Searches for a target string: genes are character codes in `[32, 122]` and
/// fitness is the root of the summed squared character distances, so an exact
/// match scores 0.0.
struct StringSearch {
    target: Vec<Gene>,
}

impl StringSearch {
    fn new(text: &str) -> Self {
        Self {
            target: text.chars().map(|c| c as Gene).collect(),
        }
    }

    fn decode(genes: &[Gene]) -> String {
        genes
            .iter()
            .map(|&g| char::from_u32(g as u32).unwrap_or('?'))
            .collect()
    }
}

impl Problem for StringSearch {
    fn gene_min(&self) -> Gene {
        32
    }

    fn gene_max(&self) -> Gene {
        122
    }

    fn seed(&self, rng: &mut RandomNumberGenerator) -> Vec<Gene> {
        (0..self.target.len())
            .map(|_| rng.rng.gen_range(32..=122))
            .collect()
    }

    fn fitness(&self, genes: &[Gene]) -> f64 {
        let err: f64 = genes
            .iter()
            .zip(&self.target)
            .map(|(&gene, &expected)| {
                let diff = (gene - expected) as f64;
                diff * diff
            })
            .sum();
        err.sqrt()
    }

    fn notify(&self, generation: usize, best: &Individual, speed_overall: f64, speed_current: f64) {
        tracing::debug!(
            generation,
            fitness = best.fitness,
            text = %Self::decode(&best.genes),
            speed_overall,
            speed_current,
            "progress"
        );
    }
}

#[test]
fn test_finds_exact_two_letter_solution() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let settings = EvolutionSettings::builder()
        .gene_length(2)
        .population_size(50)
        .max_generations(200)
        .solution_fitness(0.0)
        .workers(4)
        .build()
        .unwrap();

    let mut coordinator = EvolutionCoordinator::new(StringSearch::new("AB"), settings).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(2024);

    let outcome = coordinator.run(&mut rng).unwrap();

    assert_eq!(outcome.best.fitness, 0.0);
    assert_eq!(outcome.best.genes, vec![65, 66]);
    assert_eq!(StringSearch::decode(&outcome.best.genes), "AB");
    // Exact match stops the run before the generation limit.
    assert!(outcome.generations < 200);
}

#[test]
fn test_longer_target_improves_and_respects_caps() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let target = "Hello, genetic world";
    let settings = EvolutionSettings::builder()
        .gene_length(target.chars().count())
        .population_size(200)
        .max_generations(15)
        .workers(4)
        .build()
        .unwrap();

    let mut coordinator = EvolutionCoordinator::new(StringSearch::new(target), settings).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(7);

    let outcome = coordinator.run(&mut rng).unwrap();

    // No early stop configured: the run uses all generations.
    assert_eq!(outcome.generations, 15);

    // Population is capped and ranked ascending (minimization).
    assert_eq!(outcome.population.len(), 200);
    let fitnesses: Vec<f64> = outcome
        .population
        .individuals()
        .iter()
        .map(|individual| individual.fitness)
        .collect();
    assert!(fitnesses.windows(2).all(|pair| pair[0] <= pair[1]));

    // Every genome respects the gene length and value bounds.
    for individual in outcome.population.individuals() {
        assert_eq!(individual.genes.len(), target.chars().count());
        assert!(individual.genes.iter().all(|&g| (32..=122).contains(&g)));
    }

    // A purely random best over this alphabet sits around 150; even a short
    // run pushes well below that.
    assert!(outcome.best.fitness < 120.0);
}

#[test]
fn test_missing_gene_length_is_a_configuration_error() {
    let result = EvolutionSettings::builder().population_size(50).build();
    match result {
        Err(genepool::GeneticError::Configuration(msg)) => {
            assert!(msg.contains("Gene length"));
        }
        _ => panic!("Expected Configuration error"),
    }
}
