pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::{AutopilotStrategy, parse_strategies};
pub use reports::aggregate_runs;
pub use seeds::{expand_iterations, resolve_seed_inputs};
pub use simulation::{RunRecord, SimulationConfig, SimulationSession};
