//! # Population Store
//!
//! Holds the individuals of one generation. An [`Individual`] pairs a gene
//! sequence with the fitness computed for it at construction time; fitness is
//! never cached across mutation, a mutated genome is always re-scored.
//!
//! The [`Population`] is bounded above by the configured population size after
//! each generation's trim, but may exceed it transiently while the batches
//! returned by the workers are being merged. Duplicate gene sequences are
//! allowed.

use crate::error::{GeneticError, Result};
use crate::problem::Problem;

/// A single gene. Every problem constrains its genes to an inclusive
/// `[gene_min, gene_max]` range.
pub type Gene = i32;

/// One member of the population: a gene sequence and its fitness.
///
/// Immutable once scored. All individuals in a run carry the same number of
/// genes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    pub genes: Vec<Gene>,
    pub fitness: f64,
}

impl Individual {
    /// Scores a genome against the problem's fitness function and wraps it.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::FitnessCalculation` if the problem produces a
    /// non-finite fitness value.
    pub fn scored<P: Problem + ?Sized>(genes: Vec<Gene>, problem: &P) -> Result<Self> {
        let fitness = problem.fitness(&genes);
        if !fitness.is_finite() {
            return Err(GeneticError::FitnessCalculation(format!(
                "Non-finite fitness score encountered: {}",
                fitness
            )));
        }
        Ok(Self { genes, fitness })
    }
}

/// The bag of individuals for one generation.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn new() -> Self {
        Self {
            individuals: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn push(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    pub fn extend<I: IntoIterator<Item = Individual>>(&mut self, individuals: I) {
        self.individuals.extend(individuals);
    }

    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    /// Sorts the population by fitness: ascending for minimization, descending
    /// for maximization. NaN fitness ranks last in both directions, although
    /// `Individual::scored` never admits one.
    pub fn rank(&mut self, maximize: bool) {
        self.individuals
            .sort_by(|a, b| fitness_ordering(a.fitness, b.fitness, maximize));
    }

    /// Enforces the population cap after a merge.
    pub fn truncate(&mut self, size: usize) {
        self.individuals.truncate(size);
    }

    /// The best-ranked individual. Only meaningful after [`Population::rank`].
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }
}

fn fitness_ordering(a: f64, b: f64, maximize: bool) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            if maximize {
                b.partial_cmp(&a).unwrap_or(Ordering::Equal)
            } else {
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        }
    }
}
