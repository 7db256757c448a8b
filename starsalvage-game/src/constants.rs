//! Centralized balance and tuning constants for Starsalvage expedition logic.
//!
//! These values are the defaults behind [`crate::config::ExpeditionConfig`].
//! Keeping them together means balance changes go through code review
//! rather than drifting across modules.

// Map generation -----------------------------------------------------------
pub(crate) const NODE_COUNT: usize = 8;
pub(crate) const FIELD_MIN: f64 = 0.0;
pub(crate) const FIELD_MAX: f64 = 100.0;
pub(crate) const FIELD_CENTER: f64 = 50.0;
pub(crate) const RING_RADIUS_MIN: f64 = 28.0;
pub(crate) const RING_RADIUS_MAX: f64 = 38.0;
pub(crate) const NODE_JITTER: f64 = 3.0;
pub(crate) const DANGER_MIN: u8 = 1;
pub(crate) const DANGER_MAX: u8 = 3;

// Travel -------------------------------------------------------------------
pub(crate) const HIT_RADIUS: f64 = 6.0;
pub(crate) const FUEL_PER_UNIT: f64 = 0.08;
pub(crate) const MIN_POINT_SPACING: f64 = 0.5;
pub(crate) const STEP_INTERVAL_MS: u64 = 260;
pub(crate) const MIN_LAUNCH_POINTS: usize = 2;

// Starting stats -----------------------------------------------------------
pub(crate) const START_HULL: i32 = 3;
pub(crate) const START_FUEL: f64 = 8.0;
pub(crate) const START_SCRAP: u32 = 0;

// Encounter tuning ---------------------------------------------------------
pub(crate) const MAX_SALVAGE_OPTIONS: usize = 3;
pub(crate) const SUCCESS_CHANCE_CAP: f64 = 0.95;
pub(crate) const ANOMALY_BONUS_PER_VISIT: f64 = 0.05;
pub(crate) const SALVAGE_SCRAP_BONUS: u32 = 1;
pub(crate) const CODEBREAKER_SCRAP_COST: u32 = 1;
pub(crate) const RISK_RECYCLER_SCRAP: u32 = 1;

// Default loadout ----------------------------------------------------------
pub(crate) const DEFAULT_CORE: &str = "core_scout";
pub(crate) const DEFAULT_ENGINE: &str = "engine_basic";
pub(crate) const DEFAULT_HULL: &str = "hull_standard";
pub(crate) const DEFAULT_SCANNER: &str = "scanner_basic";
pub(crate) const DEFAULT_UTILITY1: &str = "util_risk_recyclers";
pub(crate) const DEFAULT_UTILITY2: &str = "util_signal_bender";

// Run log messages ---------------------------------------------------------
pub(crate) const LOG_OUT_OF_FUEL: &str = "Out of fuel - erase the path to try again.";
pub(crate) const LOG_PATH_TOO_SHORT: &str = "Draw a path from Base before launching.";
pub(crate) const LOG_LAUNCH_BASE: &str = "Launch from Base.";
pub(crate) const LOG_LAUNCH_WAYPOINT: &str = "Launch from waypoint.";
pub(crate) const LOG_RESUME: &str = "Resume course from current position.";
pub(crate) const LOG_PATH_SECURED: &str = "Path ends at Base. Salvage secured.";
pub(crate) const LOG_PATH_LOST: &str = "Path ends away from Base. Salvage lost.";
pub(crate) const LOG_EXIT_REACHED: &str = "Exit gate reached. You route back to Base.";
pub(crate) const LOG_BASE_DOCKED: &str = "Docked at Base. Salvage secured.";
pub(crate) const LOG_SIGNAL_BENDER: &str = "Signal Bender spoofs this Pirate node to neutral.";
pub(crate) const LOG_PIRATE_PAYOFF: &str =
    "You pay off the pirates with Scrap instead of taking damage.";
pub(crate) const LOG_SITE_IGNORED: &str = "You leave the site untouched.";
pub(crate) const LOG_RISK_RECYCLERS: &str = "Risk Recyclers: +1 Scrap from Wreck damage.";
pub(crate) const LOG_REDRAW: &str = "You hold position and begin plotting a new path.";
pub(crate) const LOG_HULL_BREACH: &str = "Hull breached. The expedition is lost with its salvage.";
