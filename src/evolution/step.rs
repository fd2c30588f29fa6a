//! # Generation Step
//!
//! The single-worker unit of work: grow the snapshot population to the target
//! size and run the configured number of reproduction rounds. Every worker
//! executes one `GenerationStep` per generation, starting from the same input
//! snapshot and producing an independent batch; the coordinator merges and
//! re-ranks the batches afterwards.

use crate::error::Result;
use crate::population::{Individual, Population};
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;
use crate::selector::GeneSelector;
use crate::tuning::TuningSet;

/// The whole-value state handed to each worker for one generation: never a
/// reference into the coordinator's live state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolveSnapshot {
    pub population: Population,
    pub tuning: TuningSet,
    pub gene_weights: Vec<f64>,
    pub population_size: usize,
}

/// Runs one generation's worth of reproduction inside a worker.
pub struct GenerationStep;

impl GenerationStep {
    /// Grows the snapshot population to `population_size` with fresh seeds,
    /// then performs `new_kids` reproduction rounds. Returns the grown
    /// population including the offspring batch.
    ///
    /// Each round draws two independent booleans from the crossover and
    /// mutation knobs:
    /// - crossover: two distinct parents from the ranked front produce two
    ///   children, each additionally mutated if the mutation draw hit;
    /// - mutation only: one parent's genes are cloned and mutated;
    /// - neither: a freshly seeded random individual is added.
    ///
    /// # Errors
    ///
    /// Propagates `GeneticError::FitnessCalculation` if the problem scores a
    /// genome as non-finite, and selector construction errors for a malformed
    /// weight vector.
    pub fn run<P: Problem>(
        problem: &P,
        snapshot: &EvolveSnapshot,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Population> {
        let selector = GeneSelector::new(&snapshot.gene_weights)?;
        let mut population = snapshot.population.clone();

        // Reproduction must never sample from an undersized population.
        while population.len() < snapshot.population_size {
            let genes = problem.seed(rng);
            population.push(Individual::scored(genes, problem)?);
        }

        let rounds = snapshot.tuning.new_kids.value() as usize;
        for _ in 0..rounds {
            // Recomputed every round: the population keeps growing, and only
            // its front (the part that was ranked by the previous generation)
            // is eligible for parenthood.
            let pick_depth = ((population.len() as f64 * snapshot.tuning.pick_depth.value())
                as usize)
                .clamp(2, population.len());

            let do_cross = rng.chance(snapshot.tuning.crossover.value());
            let do_mutate = rng.chance(snapshot.tuning.mutate.value());

            if do_cross {
                let parents = pick_distinct(2, problem, &population, pick_depth, rng);
                let (mother, father) = (parents[0], parents[1]);
                let (mut son, mut daughter) = problem.crossover(
                    &population.individuals()[mother].genes,
                    &population.individuals()[father].genes,
                    &selector,
                    rng,
                );
                if do_mutate {
                    problem.mutate(&mut son, &selector, &snapshot.tuning, rng);
                    problem.mutate(&mut daughter, &selector, &snapshot.tuning, rng);
                }
                population.push(Individual::scored(son, problem)?);
                population.push(Individual::scored(daughter, problem)?);
            } else if do_mutate {
                let parent = problem.pick(&population, pick_depth, rng);
                let mut genes = population.individuals()[parent].genes.clone();
                problem.mutate(&mut genes, &selector, &snapshot.tuning, rng);
                population.push(Individual::scored(genes, problem)?);
            } else {
                population.push(Individual::scored(problem.seed(rng), problem)?);
            }
        }

        Ok(population)
    }
}

/// Selects `n` distinct individual indices from the ranked front.
///
/// Distinctness is by index, not gene content: two individuals with identical
/// genomes still count as different parents. Resamples until `n` different
/// indices have been drawn, which requires `pick_depth >= n`.
fn pick_distinct<P: Problem>(
    n: usize,
    problem: &P,
    population: &Population,
    pick_depth: usize,
    rng: &mut RandomNumberGenerator,
) -> Vec<usize> {
    debug_assert!(pick_depth >= n);

    let mut selected = Vec::with_capacity(n);
    while selected.len() < n {
        let index = problem.pick(population, pick_depth, rng);
        if !selected.contains(&index) {
            selected.push(index);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Gene;

    /// Minimizes the sum of gene values; seeds mid-range genomes.
    struct SumProblem;

    impl Problem for SumProblem {
        fn gene_min(&self) -> Gene {
            0
        }

        fn gene_max(&self) -> Gene {
            100
        }

        fn seed(&self, rng: &mut RandomNumberGenerator) -> Vec<Gene> {
            rng.fetch_uniform(0.0, 101.0, 8)
                .into_iter()
                .map(|value| value as Gene)
                .collect()
        }

        fn fitness(&self, genes: &[Gene]) -> f64 {
            genes.iter().map(|&g| g as f64).sum()
        }
    }

    fn snapshot(population: Population, population_size: usize) -> EvolveSnapshot {
        EvolveSnapshot {
            population,
            tuning: TuningSet::default(),
            gene_weights: vec![1.0; 8],
            population_size,
        }
    }

    #[test]
    fn test_step_grows_an_empty_population() {
        let mut rng = RandomNumberGenerator::from_seed(51);
        let snapshot = snapshot(Population::new(), 40);

        let result = GenerationStep::run(&SumProblem, &snapshot, &mut rng).unwrap();

        let rounds = snapshot.tuning.new_kids.value() as usize;
        // At least the target size plus one child per round, at most two.
        assert!(result.len() >= 40 + rounds);
        assert!(result.len() <= 40 + 2 * rounds);
    }

    #[test]
    fn test_step_keeps_gene_bounds_and_length() {
        let mut rng = RandomNumberGenerator::from_seed(53);
        let snapshot = snapshot(Population::new(), 30);

        let result = GenerationStep::run(&SumProblem, &snapshot, &mut rng).unwrap();
        for individual in result.individuals() {
            assert_eq!(individual.genes.len(), 8);
            assert!(individual.genes.iter().all(|&g| (0..=100).contains(&g)));
            assert!(individual.fitness.is_finite());
        }
    }

    #[test]
    fn test_step_is_deterministic_for_a_fixed_seed() {
        let snapshot = snapshot(Population::new(), 25);

        let mut rng1 = RandomNumberGenerator::from_seed(99);
        let mut rng2 = RandomNumberGenerator::from_seed(99);
        let first = GenerationStep::run(&SumProblem, &snapshot, &mut rng1).unwrap();
        let second = GenerationStep::run(&SumProblem, &snapshot, &mut rng2).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.individuals().iter().zip(second.individuals()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_step_propagates_fitness_errors() {
        struct NanProblem;

        impl Problem for NanProblem {
            fn gene_min(&self) -> Gene {
                0
            }

            fn gene_max(&self) -> Gene {
                10
            }

            fn seed(&self, _rng: &mut RandomNumberGenerator) -> Vec<Gene> {
                vec![0; 4]
            }

            fn fitness(&self, _genes: &[Gene]) -> f64 {
                f64::NAN
            }
        }

        let mut rng = RandomNumberGenerator::from_seed(57);
        let snapshot = EvolveSnapshot {
            population: Population::new(),
            tuning: TuningSet::default(),
            gene_weights: vec![1.0; 4],
            population_size: 10,
        };

        assert!(GenerationStep::run(&NanProblem, &snapshot, &mut rng).is_err());
    }

    #[test]
    fn test_pick_distinct_returns_different_indices() {
        let mut rng = RandomNumberGenerator::from_seed(61);
        let mut population = Population::new();
        for i in 0..10 {
            population.push(Individual {
                genes: vec![i; 8],
                fitness: i as f64,
            });
        }

        for _ in 0..500 {
            let picked = pick_distinct(2, &SumProblem, &population, 5, &mut rng);
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0], picked[1]);
            assert!(picked.iter().all(|&index| index < 5));
        }
    }
}
