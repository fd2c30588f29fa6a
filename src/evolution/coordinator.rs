//! # EvolutionCoordinator
//!
//! Owns the canonical population and tuning state and drives the per-
//! generation cycle: broadcast a snapshot to every worker, wait for all the
//! batches at the barrier, merge, rank, trim, then feed the result into the
//! adaptive tuning controller before starting the next generation.
//!
//! Workers are threads in a fixed-size rayon pool sized to hardware
//! parallelism (floor four). They never share mutable state during a
//! generation: each receives a whole-value [`EvolveSnapshot`] and returns an
//! independent batch. Worker completion order is irrelevant because the merge
//! always re-establishes the global fitness order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::error::{GeneticError, Result};
use crate::evolution::options::EvolutionSettings;
use crate::evolution::step::{EvolveSnapshot, GenerationStep};
use crate::population::{Individual, Population};
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;
use crate::tuning::{fade, gene_sensitivity, TuningSet};

/// The result of a finished run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// The best-ranked individual of the final generation.
    pub best: Individual,
    /// How many generations actually ran (early stop included).
    pub generations: usize,
    /// The final ranked, trimmed population.
    pub population: Population,
}

/// Manages the evolution run for one problem definition.
pub struct EvolutionCoordinator<P: Problem> {
    problem: P,
    settings: EvolutionSettings,
    tuning: TuningSet,
    gene_weights: Vec<f64>,
    pool: rayon::ThreadPool,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl<P: Problem> EvolutionCoordinator<P> {
    /// Creates a coordinator with the default tuning knob set.
    pub fn new(problem: P, settings: EvolutionSettings) -> Result<Self> {
        Self::with_tuning(problem, settings, TuningSet::default())
    }

    /// Creates a coordinator with a caller-supplied tuning knob set.
    ///
    /// Builds the fixed worker pool up front; the gene weight vector starts
    /// uniform, one weight per gene position.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` for inverted gene bounds or a
    /// worker pool that cannot be built.
    pub fn with_tuning(
        problem: P,
        settings: EvolutionSettings,
        tuning: TuningSet,
    ) -> Result<Self> {
        if problem.gene_min() >= problem.gene_max() {
            return Err(GeneticError::Configuration(format!(
                "Gene bounds must satisfy min < max, got [{}, {}]",
                problem.gene_min(),
                problem.gene_max()
            )));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.get_workers())
            .thread_name(|index| format!("genepool-worker-{index}"))
            .build()
            .map_err(|e| {
                GeneticError::Configuration(format!("Failed to build worker pool: {e}"))
            })?;

        let gene_weights = vec![1.0; settings.get_gene_length()];

        Ok(Self {
            problem,
            settings,
            tuning,
            gene_weights,
            pool,
            stop_flag: None,
        })
    }

    /// Installs a flag that cancels the run between generations. A generation
    /// is an atomic unit of work: the flag is only checked once per loop
    /// iteration, never mid-generation.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn settings(&self) -> &EvolutionSettings {
        &self.settings
    }

    pub fn tuning(&self) -> &TuningSet {
        &self.tuning
    }

    /// The current per-gene-position selection weights.
    pub fn gene_weights(&self) -> &[f64] {
        &self.gene_weights
    }

    /// Runs the evolution until the solution fitness is matched exactly, the
    /// generation limit is reached, or the stop flag is raised.
    ///
    /// # Errors
    ///
    /// - `GeneticError::WorkerDispatch` if any worker fails to produce its
    ///   batch; the barrier cannot be satisfied, so the run aborts rather
    ///   than proceeding with partial results.
    /// - `GeneticError::EmptyPopulation` if the run ends without ever
    ///   producing a generation (e.g. cancelled before the first one).
    pub fn run(&mut self, rng: &mut RandomNumberGenerator) -> Result<EvolutionOutcome> {
        let run_started = Instant::now();
        let mut population = Population::new();
        let mut first_fitness: Option<f64> = None;
        let mut last_fitness: Option<f64> = None;
        let mut prev_speed = 0.0;
        let mut generations = 0;

        for generation in 0..self.settings.get_max_generations() {
            if let Some(flag) = &self.stop_flag {
                if flag.load(Ordering::Relaxed) {
                    tracing::info!(generation, "run cancelled");
                    break;
                }
            }

            let generation_started = Instant::now();

            // Whole-value snapshot: the workers never see the coordinator's
            // live state.
            let snapshot = EvolveSnapshot {
                population: std::mem::take(&mut population),
                tuning: self.tuning.clone(),
                gene_weights: self.gene_weights.clone(),
                population_size: self.settings.get_population_size(),
            };
            let seeds: Vec<u64> = (0..self.settings.get_workers())
                .map(|_| rng.next_seed())
                .collect();

            let problem = &self.problem;
            let snapshot = &snapshot;
            // Collecting into Result is the generation barrier: every worker
            // must reply before the merge, and any failure aborts the run.
            let batches = self
                .pool
                .install(|| {
                    seeds
                        .into_par_iter()
                        .map(|seed| {
                            let mut worker_rng = RandomNumberGenerator::from_seed(seed);
                            GenerationStep::run(problem, snapshot, &mut worker_rng)
                        })
                        .collect::<Result<Vec<Population>>>()
                })
                .map_err(|e| {
                    GeneticError::WorkerDispatch(format!(
                        "Worker failed in generation {generation}: {e}"
                    ))
                })?;

            let mut merged = Population::with_capacity(
                batches.iter().map(|batch| batch.len()).sum(),
            );
            for batch in batches {
                merged.extend(batch.into_individuals());
            }
            let produced = merged.len();
            merged.rank(self.settings.get_maximize());
            merged.truncate(self.settings.get_population_size());
            population = merged;
            generations = generation + 1;

            let best = population.best().ok_or(GeneticError::EmptyPopulation)?.clone();
            tracing::debug!(
                generation,
                produced,
                kept = population.len(),
                best_fitness = best.fitness,
                "generation merged"
            );

            if let Some(target) = self.settings.get_solution_fitness() {
                if best.fitness == target {
                    tracing::info!(
                        generation,
                        fitness = best.fitness,
                        "solution fitness reached, stopping early"
                    );
                    break;
                }
            }

            let generation_elapsed = generation_started.elapsed().as_secs_f64();
            let total_elapsed = run_started.elapsed().as_secs_f64();

            let mut speed_overall = -1.0;
            let mut speed_current = 0.0;
            if let Some(first) = first_fitness {
                speed_overall = (best.fitness - first).abs() / total_elapsed;
            }
            if let Some(last) = last_fitness {
                if last != best.fitness {
                    speed_current = (best.fitness - last).abs() / generation_elapsed;
                    // Judging a knob needs both a current speed and an overall
                    // pace to compare it against.
                    if speed_overall > 0.0 {
                        self.tuning
                            .adjust(speed_current - prev_speed, speed_overall, rng);
                    }
                    prev_speed = speed_current;
                }
            }

            self.problem
                .notify(generation, &best, speed_overall, speed_current);

            if first_fitness.is_none() {
                first_fitness = Some(best.fitness);
            }
            last_fitness = Some(best.fitness);

            let drift = gene_sensitivity(&population);
            fade(&mut self.gene_weights, self.tuning.fading.value(), &drift);
        }

        let best = population
            .best()
            .cloned()
            .ok_or(GeneticError::EmptyPopulation)?;
        Ok(EvolutionOutcome {
            best,
            generations,
            population,
        })
    }
}
