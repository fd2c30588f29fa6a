pub mod coordinator;
pub mod options;
pub mod step;

pub use coordinator::{EvolutionCoordinator, EvolutionOutcome};
pub use options::{EvolutionSettings, EvolutionSettingsBuilder};
pub use step::{EvolveSnapshot, GenerationStep};
