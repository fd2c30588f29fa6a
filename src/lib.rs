pub mod error;
pub mod evolution;
pub mod population;
pub mod problem;
pub mod rng;
pub mod selector;
pub mod tuning;

// Re-export commonly used types for convenience
pub use error::{GeneticError, Result, ResultExt};
pub use evolution::{EvolutionCoordinator, EvolutionOutcome, EvolutionSettings};
pub use population::{Gene, Individual, Population};
pub use problem::Problem;
pub use rng::RandomNumberGenerator;
pub use selector::GeneSelector;
pub use tuning::{Tunable, TuningSet};
