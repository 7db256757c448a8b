//! Starsalvage Expedition Engine
//!
//! Platform-agnostic core logic for Starsalvage: map generation, fuel-budgeted
//! path planning, segment hit-testing, salvage resolution and the run phase
//! machine. Presentation layers drive an [`Expedition`] through its command
//! methods and render [`ExpeditionSnapshot`]s.

mod constants;

pub mod config;
pub mod encounter;
pub mod expedition;
pub mod failures;
pub mod geometry;
pub mod items;
pub mod map;
pub mod narrative;
pub mod numbers;
pub mod result;
pub mod rng;
pub mod stats;

// Re-export commonly used types
pub use config::{
    ConfigError, ExpeditionConfig, HullBreachRule, LoadoutConfig, MapConfig, RulesConfig,
    StartConfig, TravelConfig,
};
pub use encounter::{SalvageOption, SalvageState, resolve_encounter};
pub use expedition::{
    BlockReason, CommandError, Expedition, ExpeditionSnapshot, ExtendOutcome, LaunchReport,
    LogEntry, PlaybackDriver, Phase, Resolution, RouteDecision, RunState, SetupError,
    StepOutcome,
};
pub use failures::{FailureKind, FailurePopup, draw_failure};
pub use geometry::{Point, distance_to_segment};
pub use items::{Item, ItemCatalog, ItemEffect, ItemPerk, ItemSlot, LoadoutError, Rarity, ShipLoadout};
pub use map::{MapFragment, MapNode, NodeType, generate_fragment};
pub use narrative::{CatalogNarrator, NodeNarrative, Narrator};
pub use result::{RunLedger, RunOutcome, RunSummary};
pub use rng::RngBundle;
pub use stats::RunStats;
