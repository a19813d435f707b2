//! Error types for engine construction and replay I/O.
//!
//! Nothing that happens inside a tick is an error: invalid decisions,
//! placement shortfalls and degenerate overlaps are absorbed and reported
//! through [`TickEvent`](crate::events::TickEvent)s and logs. The types here
//! only cover building an engine and persisting recordings.

use thiserror::Error;

use crate::entity::WeaponKind;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Map dimensions must both be at least 1.
    #[error("invalid map size {width}x{height}")]
    InvalidMapSize {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },

    /// A distance or radius was negative or not finite.
    #[error("{name} must be a non-negative finite number, got {value}")]
    NegativeValue {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Maximum health must be positive.
    #[error("max_health must be positive, got {0}")]
    InvalidMaxHealth(i32),

    /// A probability outside `[0, 1]`.
    #[error("spawn probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    /// A weapon with no bullets per shot.
    #[error("weapon {0} has an empty spread")]
    EmptySpread(WeaponKind),

    /// A weapon with non-positive speed or negative damage/splash.
    #[error("weapon {0} has invalid speed, damage or splash radius")]
    InvalidWeapon(WeaponKind),

    /// An edge margin that leaves no room on the map.
    #[error("{name} of {margin} does not fit a {width}x{height} map")]
    MarginTooLarge {
        /// Field name.
        name: &'static str,
        /// Configured margin.
        margin: f32,
        /// Map width.
        width: f32,
        /// Map height.
        height: f32,
    },

    /// A `[min, max]` range that is empty or non-positive.
    #[error("{name} range [{min}, {max}] is invalid")]
    InvalidRange {
        /// Field name.
        name: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
}

/// Errors raised while constructing a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A match needs at least one agent.
    #[error("roster is empty")]
    EmptyRoster,

    /// Agent names identify bullet owners in snapshots and must be unique.
    #[error("duplicate agent name `{0}`")]
    DuplicateAgentName(String),

    /// Every agent in a prebuilt world needs exactly one strategy.
    #[error("world has {agents} agents but {strategies} strategies were supplied")]
    StrategyCountMismatch {
        /// Agents in the world.
        agents: usize,
        /// Strategies supplied.
        strategies: usize,
    },
}

/// Errors raised while saving or loading a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading or writing the replay file failed.
    #[error("replay i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The replay could not be encoded or decoded.
    #[error("replay json is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
