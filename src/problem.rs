//! # Problem Trait
//!
//! The `Problem` trait is the pluggable contract between the engine and a
//! domain: it supplies the gene bounds, a way to seed random genomes and the
//! fitness function, and may override the variation operators. One conforming
//! implementation is chosen at run configuration time and shared by every
//! worker as compiled code; nothing is transferred at runtime.
//!
//! `seed` and `fitness` are required. `mutate`, `crossover`, `pick` and
//! `notify` have default implementations that cover most integer-vector
//! domains.
//!
//! ## Example
//!
//! ```rust
//! use genepool::population::Gene;
//! use genepool::problem::Problem;
//! use genepool::rng::RandomNumberGenerator;
//!
//! /// Counts how far each gene is from 1; a perfect genome scores 0.
//! struct AllOnes {
//!     length: usize,
//! }
//!
//! impl Problem for AllOnes {
//!     fn gene_min(&self) -> Gene {
//!         0
//!     }
//!
//!     fn gene_max(&self) -> Gene {
//!         1
//!     }
//!
//!     fn seed(&self, rng: &mut RandomNumberGenerator) -> Vec<Gene> {
//!         rng.fetch_uniform(0.0, 2.0, self.length)
//!             .into_iter()
//!             .map(|value| value as Gene)
//!             .collect()
//!     }
//!
//!     fn fitness(&self, genes: &[Gene]) -> f64 {
//!         genes.iter().filter(|&&gene| gene == 0).count() as f64
//!     }
//! }
//! ```

use crate::population::{Gene, Individual, Population};
use crate::rng::RandomNumberGenerator;
use crate::selector::GeneSelector;
use crate::tuning::TuningSet;

/// The pluggable problem definition supplied once at run start.
///
/// Implementations must be `Send + Sync`: the coordinator hands the same
/// problem instance to every worker thread.
pub trait Problem: Send + Sync {
    /// Inclusive lower bound for every gene value.
    fn gene_min(&self) -> Gene;

    /// Inclusive upper bound for every gene value.
    fn gene_max(&self) -> Gene;

    /// The width of the gene value range.
    fn spectrum(&self) -> f64 {
        (self.gene_max() - self.gene_min()) as f64
    }

    /// Produces one new random genome of the configured gene length, with all
    /// values inside `[gene_min, gene_max]`.
    fn seed(&self, rng: &mut RandomNumberGenerator) -> Vec<Gene>;

    /// Scores a genome. Lower is better unless the run settings say to
    /// maximize. Must return a finite value.
    fn fitness(&self, genes: &[Gene]) -> f64;

    /// Mutates a genome in place.
    ///
    /// The default shifts a knob-controlled number of genes. Target positions
    /// are drawn through the shared selector, so mutation concentrates on the
    /// positions the weight vector currently favors. Every shifted gene is
    /// clamped back into `[gene_min, gene_max]`.
    fn mutate(
        &self,
        genes: &mut [Gene],
        selector: &GeneSelector,
        tuning: &TuningSet,
        rng: &mut RandomNumberGenerator,
    ) {
        let length = genes.len() as f64;
        // At least one gene is touched per call. The proportional formula
        // alone rounds to zero flips for genomes shorter than the flip knob,
        // which would leave short genomes without any mutation pressure.
        let flips = ((rng.uniform() * length / tuning.gene_flips.value()) as usize).max(1);
        let max_shift = self.spectrum() / tuning.gene_shift.value();

        for _ in 0..flips {
            let position = selector.pick_index(rng);
            let delta = (rng.uniform() * max_shift - max_shift / 2.0).floor() as Gene;
            genes[position] =
                (genes[position] + delta).clamp(self.gene_min(), self.gene_max());
        }
    }

    /// 2-point crossover producing two children of the parents' length.
    ///
    /// Cut points are drawn through the shared selector and rejected until
    /// `1 <= a < b <= length - 1`. Genomes shorter than three genes have no
    /// interior cut point pair, so the children are clones of the parents and
    /// mutation carries the variation.
    fn crossover(
        &self,
        mother: &[Gene],
        father: &[Gene],
        selector: &GeneSelector,
        rng: &mut RandomNumberGenerator,
    ) -> (Vec<Gene>, Vec<Gene>) {
        let length = mother.len();
        if length < 3 {
            return (mother.to_vec(), father.to_vec());
        }

        let (a, b) = loop {
            let a = selector.pick_index(rng);
            let b = selector.pick_index(rng);
            if a >= 1 && a < length - 1 && a < b {
                break (a, b);
            }
        };

        let mut son = Vec::with_capacity(length);
        son.extend_from_slice(&mother[..a]);
        son.extend_from_slice(&father[a..b]);
        son.extend_from_slice(&mother[b..]);

        let mut daughter = Vec::with_capacity(length);
        daughter.extend_from_slice(&father[..a]);
        daughter.extend_from_slice(&mother[a..b]);
        daughter.extend_from_slice(&father[b..]);

        (son, daughter)
    }

    /// Picks one individual's index from the ranked front of the population.
    ///
    /// `max_sorted_index` bounds how deep into the ranked population the draw
    /// may reach. The default distribution is front-loaded: index 0 (the best
    /// individual) is strictly the most likely pick and the probability falls
    /// off toward `max_sorted_index - 1`.
    fn pick(
        &self,
        _population: &Population,
        max_sorted_index: usize,
        rng: &mut RandomNumberGenerator,
    ) -> usize {
        debug_assert!(max_sorted_index > 0);
        let index = ((1.0 - rng.uniform().sqrt()) * max_sorted_index as f64) as usize;
        index.min(max_sorted_index.saturating_sub(1))
    }

    /// Progress callback invoked once per generation after ranking. The engine
    /// ignores its effect entirely.
    fn notify(&self, generation: usize, best: &Individual, speed_overall: f64, speed_current: f64) {
        tracing::info!(
            generation,
            best_fitness = best.fitness,
            speed_overall,
            speed_current,
            "generation complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ByteProblem;

    impl Problem for ByteProblem {
        fn gene_min(&self) -> Gene {
            0
        }

        fn gene_max(&self) -> Gene {
            100
        }

        fn seed(&self, _rng: &mut RandomNumberGenerator) -> Vec<Gene> {
            vec![50; 16]
        }

        fn fitness(&self, genes: &[Gene]) -> f64 {
            genes.iter().map(|&g| g as f64).sum()
        }
    }

    fn uniform_selector(length: usize) -> GeneSelector {
        GeneSelector::new(&vec![1.0; length]).unwrap()
    }

    #[test]
    fn test_mutation_stays_in_bounds() {
        let problem = ByteProblem;
        let selector = uniform_selector(16);
        let tuning = TuningSet::default();
        let mut rng = RandomNumberGenerator::from_seed(21);

        // Start at the edges so clamping is actually exercised.
        let mut genes: Vec<Gene> = (0..16).map(|i| if i % 2 == 0 { 0 } else { 100 }).collect();
        for _ in 0..500 {
            problem.mutate(&mut genes, &selector, &tuning, &mut rng);
            assert!(genes.iter().all(|&g| (0..=100).contains(&g)));
        }
    }

    #[test]
    fn test_mutation_touches_short_genomes() {
        let problem = ByteProblem;
        let selector = uniform_selector(2);
        let tuning = TuningSet::default();
        let mut rng = RandomNumberGenerator::from_seed(5);

        let mut changed = false;
        for _ in 0..200 {
            let mut genes = vec![50, 50];
            problem.mutate(&mut genes, &selector, &tuning, &mut rng);
            if genes != vec![50, 50] {
                changed = true;
                break;
            }
        }
        assert!(changed, "mutation never altered a two-gene genome");
    }

    #[test]
    fn test_crossover_repartitions_parents() {
        let problem = ByteProblem;
        let selector = uniform_selector(16);
        let mut rng = RandomNumberGenerator::from_seed(8);

        let mother: Vec<Gene> = (0..16).collect();
        let father: Vec<Gene> = (100..116).collect();

        for _ in 0..100 {
            let (son, daughter) = problem.crossover(&mother, &father, &selector, &mut rng);
            assert_eq!(son.len(), mother.len());
            assert_eq!(daughter.len(), mother.len());

            // At every position the pair of children carries exactly the pair
            // of parent genes, swapped inside the cut window.
            for i in 0..mother.len() {
                let mut child_pair = [son[i], daughter[i]];
                let mut parent_pair = [mother[i], father[i]];
                child_pair.sort_unstable();
                parent_pair.sort_unstable();
                assert_eq!(child_pair, parent_pair);
            }

            // Cut points are interior, so the ends always come from the
            // same-side parent.
            assert_eq!(son[0], mother[0]);
            assert_eq!(daughter[0], father[0]);
            assert_eq!(son[15], mother[15]);
            assert_eq!(daughter[15], father[15]);

            // The swapped window is one contiguous block.
            let swaps: Vec<bool> = son.iter().zip(&mother).map(|(s, m)| s != m).collect();
            let blocks = swaps.windows(2).filter(|w| w[0] != w[1]).count();
            assert_eq!(blocks, 2, "expected a single contiguous swapped window");
        }
    }

    #[test]
    fn test_crossover_clones_short_genomes() {
        let problem = ByteProblem;
        let selector = uniform_selector(2);
        let mut rng = RandomNumberGenerator::from_seed(13);

        let (son, daughter) = problem.crossover(&[1, 2], &[7, 8], &selector, &mut rng);
        assert_eq!(son, vec![1, 2]);
        assert_eq!(daughter, vec![7, 8]);
    }

    #[test]
    fn test_pick_stays_below_max_sorted_index() {
        let problem = ByteProblem;
        let population = Population::new();
        let mut rng = RandomNumberGenerator::from_seed(17);

        for max in [1usize, 2, 5, 50] {
            for _ in 0..1000 {
                assert!(problem.pick(&population, max, &mut rng) < max);
            }
        }
    }

    #[test]
    fn test_pick_is_front_loaded() {
        let problem = ByteProblem;
        let population = Population::new();
        let mut rng = RandomNumberGenerator::from_seed(29);

        let max = 10;
        let mut counts = [0usize; 10];
        for _ in 0..100_000 {
            counts[problem.pick(&population, max, &mut rng)] += 1;
        }

        // The exact per-index probabilities are (2(max-k)-1)/max^2, strictly
        // decreasing in k. With a fixed seed the coarse shape is stable.
        assert!(counts[0] > counts[3]);
        assert!(counts[3] > counts[6]);
        assert!(counts[6] > counts[9]);
        assert!(counts[0] > 3 * counts[9]);
    }
}
