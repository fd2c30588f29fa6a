//! # Adaptive Tuning
//!
//! Two coupled feedback loops tune the engine while it runs:
//!
//! - [`TuningSet::adjust`] hill-climbs the scalar knobs (mutation rate,
//!   crossover rate, brood size, ...) one at a time, judged by the observed
//!   fitness-improvement speed of the last generation.
//! - [`gene_sensitivity`] plus [`fade`] reshape the per-gene-position weight
//!   vector that the [`crate::selector::GeneSelector`] samples from, so the
//!   variation operators increasingly target the positions that empirically
//!   move fitness.
//!
//! The hill-climb is stochastic with momentum decay and reversal on failure.
//! It is expected to oscillate and settle rather than converge; a knob whose
//! step has decayed to near zero simply stalls until a random retry picks it
//! up again, which is not an error condition.

use crate::population::Population;
use crate::rng::RandomNumberGenerator;

/// A bounded scalar knob with hill-climbing state.
///
/// Invariant: `min <= value <= max` after every step. Clamping is idempotent.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tunable {
    value: f64,
    min: f64,
    max: f64,
    /// Signed step: magnitude is the momentum, sign the current direction.
    direction: f64,
    on_trial: bool,
}

impl Tunable {
    /// Creates a knob at `initial` (clamped into `[min, max]`) with an initial
    /// step of a tenth of the range.
    pub fn new(initial: f64, min: f64, max: f64) -> Self {
        Self {
            value: initial.clamp(min, max),
            min,
            max,
            direction: (max - min) / 10.0,
            on_trial: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_on_trial(&self) -> bool {
        self.on_trial
    }

    fn clamp(&mut self) {
        self.value = self.value.clamp(self.min, self.max);
    }

    /// Takes one trial step in the current direction and decays the momentum.
    fn advance(&mut self) {
        self.value += self.direction;
        self.clamp();
        self.direction *= 0.9;
    }

    /// Steps back by the (already decayed) negated step and leaves the
    /// direction flipped for the next trial.
    fn revert(&mut self) {
        self.direction = -self.direction;
        self.value += self.direction;
        self.clamp();
    }
}

/// The full set of tunable knobs for a run, with the engine's default
/// initial values and bounds.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TuningSet {
    /// Divisor for the mutation shift magnitude: larger means smaller shifts.
    pub gene_shift: Tunable,
    /// Divisor for the number of genes touched per mutation: larger means
    /// fewer flips.
    pub gene_flips: Tunable,
    /// Reproduction rounds per worker per generation.
    pub new_kids: Tunable,
    /// Probability that a reproduction round mutates.
    pub mutate: Tunable,
    /// Probability that a reproduction round crosses over.
    pub crossover: Tunable,
    /// Fraction of the ranked population parents may be drawn from.
    pub pick_depth: Tunable,
    /// Exponential smoothing rate for the gene weight vector.
    pub fading: Tunable,
}

impl Default for TuningSet {
    fn default() -> Self {
        Self {
            gene_shift: Tunable::new(10.0, 2.0, 20.0),
            gene_flips: Tunable::new(10.0, 2.0, 20.0),
            new_kids: Tunable::new(250.0, 10.0, 1000.0),
            mutate: Tunable::new(0.3, 0.1, 1.0),
            crossover: Tunable::new(0.9, 0.1, 1.0),
            pick_depth: Tunable::new(0.9, 0.1, 1.0),
            fading: Tunable::new(0.5, 0.01, 0.9),
        }
    }
}

impl TuningSet {
    const KNOB_COUNT: usize = 7;

    fn knobs_mut(&mut self) -> [(&'static str, &mut Tunable); Self::KNOB_COUNT] {
        [
            ("gene_shift", &mut self.gene_shift),
            ("gene_flips", &mut self.gene_flips),
            ("new_kids", &mut self.new_kids),
            ("mutate", &mut self.mutate),
            ("crossover", &mut self.crossover),
            ("pick_depth", &mut self.pick_depth),
            ("fading", &mut self.fading),
        ]
    }

    /// Runs one hill-climbing round over the knob set.
    ///
    /// At most one knob is on trial at a time. If its last step raised the
    /// current improvement speed by more than a tenth of the overall pace, the
    /// new value is kept and the same knob steps again in the same direction.
    /// Otherwise the step is undone, its direction flipped, and a uniformly
    /// random knob goes on trial instead.
    pub fn adjust(&mut self, speed_diff: f64, speed_overall: f64, rng: &mut RandomNumberGenerator) {
        let mut suggested = None;
        for (index, (_, knob)) in self.knobs_mut().into_iter().enumerate() {
            if knob.on_trial {
                if speed_diff > speed_overall / 10.0 {
                    suggested = Some(index);
                } else {
                    knob.revert();
                }
                knob.on_trial = false;
            }
        }

        let next = suggested.unwrap_or_else(|| {
            let draw = (rng.uniform() * Self::KNOB_COUNT as f64) as usize;
            draw.min(Self::KNOB_COUNT - 1)
        });

        let mut knobs = self.knobs_mut();
        let (name, knob) = &mut knobs[next];
        knob.on_trial = true;
        knob.advance();
        let retried = suggested.is_some();
        let name = *name;

        tracing::debug!(
            knob = name,
            retried,
            gene_shift = self.gene_shift.value,
            gene_flips = self.gene_flips.value,
            new_kids = self.new_kids.value,
            mutate = self.mutate.value,
            crossover = self.crossover.value,
            pick_depth = self.pick_depth.value,
            fading = self.fading.value,
            "tuning state"
        );
    }

    /// The knob currently on trial, if any.
    pub fn on_trial(&self) -> Option<&'static str> {
        [
            ("gene_shift", &self.gene_shift),
            ("gene_flips", &self.gene_flips),
            ("new_kids", &self.new_kids),
            ("mutate", &self.mutate),
            ("crossover", &self.crossover),
            ("pick_depth", &self.pick_depth),
            ("fading", &self.fading),
        ]
        .into_iter()
        .find(|(_, knob)| knob.on_trial)
        .map(|(name, _)| name)
    }
}

/// Estimates how strongly each gene position correlates with fitness movement.
///
/// The population must be ranked. For every adjacent pair of individuals the
/// absolute fitness difference is multiplied by the absolute gene-value
/// difference at each position and accumulated. Starting from ones keeps every
/// weight strictly positive even when the population has collapsed to
/// identical genomes.
pub fn gene_sensitivity(population: &Population) -> Vec<f64> {
    let Some(first) = population.get(0) else {
        return Vec::new();
    };

    let mut deviation = vec![1.0; first.genes.len()];
    for pair in population.individuals().windows(2) {
        let fitness_diff = (pair[1].fitness - pair[0].fitness).abs();
        for (position, weight) in deviation.iter_mut().enumerate() {
            let gene_diff = (pair[1].genes[position] - pair[0].genes[position]).abs();
            *weight += fitness_diff * gene_diff as f64;
        }
    }
    deviation
}

/// Moves `base` toward `drift` by the given fade rate:
/// `base[i] = base[i] * (1 - fade_rate) + drift[i] * fade_rate`.
pub fn fade(base: &mut [f64], fade_rate: f64, drift: &[f64]) {
    for (current, new_estimate) in base.iter_mut().zip(drift) {
        *current = *current * (1.0 - fade_rate) + new_estimate * fade_rate;
    }
}
