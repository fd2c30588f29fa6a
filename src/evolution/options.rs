//! # EvolutionSettings
//!
//! The `EvolutionSettings` struct represents the immutable per-run
//! configuration of the engine: gene length, population cap, generation limit,
//! optional early-stop fitness, optimization direction and worker pool size.
//! The mutable counterpart, the tunable knob set, lives in
//! [`crate::tuning::TuningSet`].
//!
//! ## Example
//!
//! ```rust
//! use genepool::evolution::EvolutionSettings;
//!
//! let settings = EvolutionSettings::builder()
//!     .gene_length(64)
//!     .population_size(500)
//!     .max_generations(200)
//!     .solution_fitness(0.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(settings.get_gene_length(), 64);
//! assert!(!settings.get_maximize());
//! ```

use crate::error::{GeneticError, Result};

/// Lower bound for the worker pool size when hardware parallelism is lower or
/// cannot be determined.
const MIN_WORKERS: usize = 4;

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().max(MIN_WORKERS))
        .unwrap_or(MIN_WORKERS)
}

/// Immutable configuration for one evolution run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionSettings {
    gene_length: usize,
    population_size: usize,
    max_generations: usize,
    solution_fitness: Option<f64>,
    maximize: bool,
    workers: usize,
}

impl EvolutionSettings {
    /// Returns a builder for creating an `EvolutionSettings` instance.
    ///
    /// `gene_length` is the only required field; everything else has a
    /// default.
    pub fn builder() -> EvolutionSettingsBuilder {
        EvolutionSettingsBuilder::default()
    }

    pub fn get_gene_length(&self) -> usize {
        self.gene_length
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_max_generations(&self) -> usize {
        self.max_generations
    }

    /// The target fitness that stops the run early on an exact match, if any.
    pub fn get_solution_fitness(&self) -> Option<f64> {
        self.solution_fitness
    }

    pub fn get_maximize(&self) -> bool {
        self.maximize
    }

    pub fn get_workers(&self) -> usize {
        self.workers
    }
}

/// Builder for `EvolutionSettings`.
///
/// Provides a fluent interface for constructing settings with validation at
/// `build` time.
#[derive(Debug, Clone, Default)]
pub struct EvolutionSettingsBuilder {
    gene_length: Option<usize>,
    population_size: Option<usize>,
    max_generations: Option<usize>,
    solution_fitness: Option<f64>,
    maximize: Option<bool>,
    workers: Option<usize>,
}

impl EvolutionSettingsBuilder {
    /// Sets the number of genes per individual. Required.
    pub fn gene_length(mut self, value: usize) -> Self {
        self.gene_length = Some(value);
        self
    }

    /// Sets the population cap enforced after every generation.
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    /// Sets the maximum number of generations before the run stops.
    pub fn max_generations(mut self, value: usize) -> Self {
        self.max_generations = Some(value);
        self
    }

    /// Sets the fitness value that terminates the run early on exact match.
    pub fn solution_fitness(mut self, value: f64) -> Self {
        self.solution_fitness = Some(value);
        self
    }

    /// Sets the optimization direction. Defaults to minimization.
    pub fn maximize(mut self, value: bool) -> Self {
        self.maximize = Some(value);
        self
    }

    /// Sets the worker pool size. Defaults to hardware parallelism with a
    /// floor of four.
    pub fn workers(mut self, value: usize) -> Self {
        self.workers = Some(value);
        self
    }

    /// Builds the `EvolutionSettings` instance.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` if `gene_length` was never set,
    /// or if any of the sizes is too small to run a generation.
    pub fn build(self) -> Result<EvolutionSettings> {
        let gene_length = self.gene_length.ok_or_else(|| {
            GeneticError::Configuration("Gene length must be specified".to_string())
        })?;
        if gene_length == 0 {
            return Err(GeneticError::Configuration(
                "Gene length cannot be zero".to_string(),
            ));
        }

        let population_size = self.population_size.unwrap_or(1000);
        // Crossover selects two distinct parents, so one individual is not a
        // workable population.
        if population_size < 2 {
            return Err(GeneticError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }

        let max_generations = self.max_generations.unwrap_or(1000);
        if max_generations == 0 {
            return Err(GeneticError::Configuration(
                "Maximum generations cannot be zero".to_string(),
            ));
        }

        let workers = self.workers.unwrap_or_else(default_worker_count);
        if workers == 0 {
            return Err(GeneticError::Configuration(
                "Worker count cannot be zero".to_string(),
            ));
        }

        Ok(EvolutionSettings {
            gene_length,
            population_size,
            max_generations,
            solution_fitness: self.solution_fitness,
            maximize: self.maximize.unwrap_or(false),
            workers,
        })
    }
}
