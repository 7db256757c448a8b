//! Expedition tuning: map shape, travel costs, starting stats and rule toggles.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    DANGER_MAX, DANGER_MIN, DEFAULT_CORE, DEFAULT_ENGINE, DEFAULT_HULL, DEFAULT_SCANNER,
    DEFAULT_UTILITY1, DEFAULT_UTILITY2, FIELD_CENTER, FIELD_MAX, FIELD_MIN, FUEL_PER_UNIT,
    HIT_RADIUS, MIN_POINT_SPACING, NODE_COUNT, NODE_JITTER, RING_RADIUS_MAX, RING_RADIUS_MIN,
    START_FUEL, START_HULL, START_SCRAP, STEP_INTERVAL_MS,
};
use crate::stats::RunStats;

/// Top-level configuration for one expedition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExpeditionConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub travel: TravelConfig,
    #[serde(default)]
    pub start: StartConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

impl ExpeditionConfig {
    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and any validation error
    /// for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map.validate()?;
        self.travel.validate()?;
        self.start.validate()?;
        Ok(())
    }
}

/// Procedural map layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "MapConfig::default_node_count")]
    pub node_count: usize,
    #[serde(default = "MapConfig::default_radius_min")]
    pub radius_min: f64,
    #[serde(default = "MapConfig::default_radius_max")]
    pub radius_max: f64,
    #[serde(default = "MapConfig::default_jitter")]
    pub jitter: f64,
    #[serde(default = "MapConfig::default_field_min")]
    pub field_min: f64,
    #[serde(default = "MapConfig::default_field_max")]
    pub field_max: f64,
    #[serde(default = "MapConfig::default_center")]
    pub center: f64,
    #[serde(default = "MapConfig::default_danger_min")]
    pub danger_min: u8,
    #[serde(default = "MapConfig::default_danger_max")]
    pub danger_max: u8,
}

impl MapConfig {
    const MIN_NODES: usize = 2;

    const fn default_node_count() -> usize {
        NODE_COUNT
    }
    const fn default_radius_min() -> f64 {
        RING_RADIUS_MIN
    }
    const fn default_radius_max() -> f64 {
        RING_RADIUS_MAX
    }
    const fn default_jitter() -> f64 {
        NODE_JITTER
    }
    const fn default_field_min() -> f64 {
        FIELD_MIN
    }
    const fn default_field_max() -> f64 {
        FIELD_MAX
    }
    const fn default_center() -> f64 {
        FIELD_CENTER
    }
    const fn default_danger_min() -> u8 {
        DANGER_MIN
    }
    const fn default_danger_max() -> u8 {
        DANGER_MAX
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count < Self::MIN_NODES {
            return Err(ConfigError::TooFewNodes {
                min: Self::MIN_NODES,
                value: self.node_count,
            });
        }
        ensure_non_negative("map.radius_min", self.radius_min)?;
        if self.radius_min > self.radius_max {
            return Err(ConfigError::InvertedBand {
                field: "map.radius",
                min: self.radius_min,
                max: self.radius_max,
            });
        }
        ensure_non_negative("map.jitter", self.jitter)?;
        if self.field_min >= self.field_max {
            return Err(ConfigError::InvertedBand {
                field: "map.field",
                min: self.field_min,
                max: self.field_max,
            });
        }
        if !(self.field_min..=self.field_max).contains(&self.center) {
            return Err(ConfigError::RangeViolation {
                field: "map.center",
                min: self.field_min,
                max: self.field_max,
                value: self.center,
            });
        }
        if self.danger_min == 0 || self.danger_min > self.danger_max {
            return Err(ConfigError::InvertedBand {
                field: "map.danger",
                min: f64::from(self.danger_min),
                max: f64::from(self.danger_max),
            });
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            node_count: Self::default_node_count(),
            radius_min: Self::default_radius_min(),
            radius_max: Self::default_radius_max(),
            jitter: Self::default_jitter(),
            field_min: Self::default_field_min(),
            field_max: Self::default_field_max(),
            center: Self::default_center(),
            danger_min: Self::default_danger_min(),
            danger_max: Self::default_danger_max(),
        }
    }
}

/// Path cost and traversal tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelConfig {
    #[serde(default = "TravelConfig::default_fuel_per_unit")]
    pub fuel_per_unit: f64,
    #[serde(default = "TravelConfig::default_hit_radius")]
    pub hit_radius: f64,
    #[serde(default = "TravelConfig::default_min_point_spacing")]
    pub min_point_spacing: f64,
    #[serde(default = "TravelConfig::default_step_interval_ms")]
    pub step_interval_ms: u64,
}

impl TravelConfig {
    const fn default_fuel_per_unit() -> f64 {
        FUEL_PER_UNIT
    }
    const fn default_hit_radius() -> f64 {
        HIT_RADIUS
    }
    const fn default_min_point_spacing() -> f64 {
        MIN_POINT_SPACING
    }
    const fn default_step_interval_ms() -> u64 {
        STEP_INTERVAL_MS
    }

    /// Playback cadence as a duration.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("travel.fuel_per_unit", self.fuel_per_unit)?;
        ensure_non_negative("travel.hit_radius", self.hit_radius)?;
        ensure_non_negative("travel.min_point_spacing", self.min_point_spacing)?;
        if self.step_interval_ms == 0 {
            return Err(ConfigError::MinViolation {
                field: "travel.step_interval_ms",
                min: 1.0,
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            fuel_per_unit: Self::default_fuel_per_unit(),
            hit_radius: Self::default_hit_radius(),
            min_point_spacing: Self::default_min_point_spacing(),
            step_interval_ms: Self::default_step_interval_ms(),
        }
    }
}

/// Starting stats and loadout for a fresh map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartConfig {
    #[serde(default = "StartConfig::default_hull")]
    pub hull: i32,
    #[serde(default = "StartConfig::default_fuel")]
    pub fuel: f64,
    #[serde(default = "StartConfig::default_scrap")]
    pub scrap: u32,
    #[serde(default)]
    pub loadout: LoadoutConfig,
}

impl StartConfig {
    const fn default_hull() -> i32 {
        START_HULL
    }
    const fn default_fuel() -> f64 {
        START_FUEL
    }
    const fn default_scrap() -> u32 {
        START_SCRAP
    }

    /// Stats before any equipped item deltas are applied.
    #[must_use]
    pub const fn initial_stats(&self) -> RunStats {
        RunStats {
            hull: self.hull,
            max_hull: self.hull,
            fuel: self.fuel,
            max_fuel: self.fuel,
            scrap: self.scrap,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hull < 1 {
            return Err(ConfigError::MinViolation {
                field: "start.hull",
                min: 1.0,
                value: f64::from(self.hull),
            });
        }
        ensure_non_negative("start.fuel", self.fuel)
    }
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            hull: Self::default_hull(),
            fuel: Self::default_fuel(),
            scrap: Self::default_scrap(),
            loadout: LoadoutConfig::default(),
        }
    }
}

/// Item ids equipped at the start of every map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadoutConfig {
    pub core: String,
    pub engine: String,
    pub hull: String,
    pub scanner: String,
    pub utility1: String,
    pub utility2: String,
}

impl LoadoutConfig {
    /// Ids in slot order.
    #[must_use]
    pub fn ids(&self) -> [&str; 6] {
        [
            &self.core,
            &self.engine,
            &self.hull,
            &self.scanner,
            &self.utility1,
            &self.utility2,
        ]
    }
}

impl Default for LoadoutConfig {
    fn default() -> Self {
        Self {
            core: DEFAULT_CORE.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            hull: DEFAULT_HULL.to_string(),
            scanner: DEFAULT_SCANNER.to_string(),
            utility1: DEFAULT_UTILITY1.to_string(),
            utility2: DEFAULT_UTILITY2.to_string(),
        }
    }
}

/// What happens when a failure leaves the hull at or below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HullBreachRule {
    /// Hull may go negative with no further consequence.
    #[default]
    Ignore,
    /// The run ends immediately and carried scrap is forfeited.
    EndRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    #[serde(default)]
    pub hull_breach: HullBreachRule,
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < 0.0 {
        return Err(ConfigError::MinViolation {
            field,
            min: 0.0,
            value,
        });
    }
    Ok(())
}

/// Errors raised when expedition configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("map needs at least {min} nodes (got {value})")]
    TooFewNodes { min: usize, value: usize },
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} band invalid (min {min:.2} > max {max:.2})")]
    InvertedBand {
        field: &'static str,
        min: f64,
        max: f64,
    },
}
