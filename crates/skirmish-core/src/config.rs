//! Simulation configuration with documented defaults.
//!
//! A single [`SimConfig`] carries every tunable the engine reads: map size,
//! perception radius, movement steps, the weapon table, supply spawning and
//! the radii used for collision, separation and pickup. The defaults reproduce
//! the classic arena rules; any subset may be overridden from JSON because
//! every struct here is `#[serde(default)]`.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SimConfig;
//! use skirmish_core::entity::WeaponKind;
//!
//! let config: SimConfig = serde_json::from_str(r#"{ "map_width": 200.0 }"#).unwrap();
//! assert_eq!(config.map_width, 200.0);
//! assert_eq!(config.map_height, 100.0);
//! assert_eq!(config.weapons.spec(WeaponKind::Sniper).damage, 25);
//! config.validate().unwrap();
//! ```

use std::f32::consts::PI;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::WeaponKind;
use crate::error::ConfigError;

// =============================================================================
// Weapons
// =============================================================================

/// Firing characteristics of one weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    /// Angle offsets (radians) of each bullet relative to the shooter's facing.
    /// One entry per bullet.
    pub spread: Vec<f32>,
    /// Damage dealt by each bullet on a direct hit, or at the centre of a splash.
    pub damage: i32,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Ticks before the shooter may fire again.
    pub cooldown: u32,
    /// Splash radius; 0 for weapons without area damage.
    pub splash_radius: f32,
}

impl WeaponSpec {
    fn single(damage: i32, speed: f32, cooldown: u32) -> Self {
        Self {
            spread: vec![0.0],
            damage,
            speed,
            cooldown,
            splash_radius: 0.0,
        }
    }
}

/// The full weapon table, one [`WeaponSpec`] per [`WeaponKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    /// Default sidearm; never consumes ammo.
    pub normal: WeaponSpec,
    /// Three-pellet spread.
    pub shotgun: WeaponSpec,
    /// Fast, heavy single shot.
    pub sniper: WeaponSpec,
    /// Slow projectile with splash damage.
    pub rocket: WeaponSpec,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            normal: WeaponSpec::single(10, 5.0, 20),
            shotgun: WeaponSpec {
                spread: vec![-0.2, 0.0, 0.2],
                damage: 8,
                speed: 4.5,
                cooldown: 25,
                splash_radius: 0.0,
            },
            sniper: WeaponSpec::single(25, 8.0, 35),
            rocket: WeaponSpec {
                splash_radius: 8.0,
                ..WeaponSpec::single(20, 3.5, 40)
            },
        }
    }
}

impl WeaponTable {
    /// Returns the spec for a weapon kind.
    #[must_use]
    pub fn spec(&self, kind: WeaponKind) -> &WeaponSpec {
        match kind {
            WeaponKind::Normal => &self.normal,
            WeaponKind::Shotgun => &self.shotgun,
            WeaponKind::Sniper => &self.sniper,
            WeaponKind::Rocket => &self.rocket,
        }
    }
}

// =============================================================================
// Supplies
// =============================================================================

/// Supply spawning and pickup parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    /// Probability of a spawn attempt succeeding on any given tick.
    pub spawn_chance: f64,
    /// Maximum number of supplies on the map at once.
    pub max_supplies: usize,
    /// Minimum distance of a spawned supply from the map edge. Non-negative,
    /// and at most half the smaller map dimension.
    pub spawn_margin: f32,
    /// Position samples tried before the spawn is skipped for this tick.
    pub spawn_attempts: u32,
    /// Health restored by a health pack (capped at max health).
    pub heal_amount: i32,
    /// Shotgun rounds granted by an ammo pack.
    pub shotgun_ammo: u32,
    /// Sniper rounds granted by an ammo pack.
    pub sniper_ammo: u32,
    /// Rockets granted by an ammo pack.
    pub rocket_ammo: u32,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            spawn_chance: 0.02,
            max_supplies: 8,
            spawn_margin: 10.0,
            spawn_attempts: 20,
            heal_amount: 25,
            shotgun_ammo: 5,
            sniper_ammo: 3,
            rocket_ammo: 2,
        }
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Initial agent and obstacle placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Minimum distance of a spawn point from the map edge. Non-negative, and
    /// at most half the smaller map dimension.
    pub edge_margin: f32,
    /// Spawn points must be strictly farther than this from each other.
    /// Non-negative; unreachable values only cause placement fallbacks.
    pub min_agent_separation: f32,
    /// Samples tried per agent before falling back to the last sample.
    pub max_attempts_per_agent: u32,
    /// Number of obstacles requested.
    pub obstacle_count: usize,
    /// Obstacle width range `[min, max]`.
    pub obstacle_width: [f32; 2],
    /// Obstacle height range `[min, max]`.
    pub obstacle_height: [f32; 2],
    /// Gap kept between obstacles and between obstacles and the map edge.
    /// Non-negative, and at most half the smaller map dimension.
    pub obstacle_margin: f32,
    /// Minimum distance from any agent to any obstacle. Non-negative.
    pub obstacle_agent_clearance: f32,
    /// Attempt budget per requested obstacle.
    pub obstacle_attempts_per_obstacle: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            edge_margin: 20.0,
            min_agent_separation: 15.0,
            max_attempts_per_agent: 1000,
            obstacle_count: 4,
            obstacle_width: [6.0, 12.0],
            obstacle_height: [4.0, 8.0],
            obstacle_margin: 6.0,
            obstacle_agent_clearance: 12.0,
            obstacle_attempts_per_obstacle: 50,
        }
    }
}

// =============================================================================
// SimConfig
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Map width; positions stay within `[0, map_width)`.
    pub map_width: f32,
    /// Map height; positions stay within `[0, map_height)`.
    pub map_height: f32,
    /// Perception radius, identical for every agent.
    pub view_radius: f32,
    /// Extra distance beyond `view_radius` at which obstacles are still reported.
    pub obstacle_view_slack: f32,
    /// Distance covered by one move action.
    pub move_step: f32,
    /// Radians turned by one turn action.
    pub turn_step: f32,
    /// Agent radius used to inflate obstacles for movement tests.
    pub agent_radius: f32,
    /// Agents closer than this are pushed apart after every tick.
    pub separation_distance: f32,
    /// A bullet strictly closer than this to an agent hits it.
    pub hit_radius: f32,
    /// An agent strictly closer than this to a supply picks it up.
    pub pickup_radius: f32,
    /// Starting and maximum health.
    pub max_health: i32,
    /// Soft wall-clock budget for one decision, in milliseconds.
    pub decision_budget_ms: u64,
    /// Weapon table.
    pub weapons: WeaponTable,
    /// Supply spawning and pickup.
    pub supply: SupplyConfig,
    /// Initial placement.
    pub placement: PlacementConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_width: 100.0,
            map_height: 100.0,
            view_radius: 30.0,
            obstacle_view_slack: 2.0,
            move_step: 2.0,
            turn_step: PI / 6.0,
            agent_radius: 2.0,
            separation_distance: 5.0,
            hit_radius: 3.0,
            pickup_radius: 4.0,
            max_health: 100,
            decision_budget_ms: 1000,
            weapons: WeaponTable::default(),
            supply: SupplyConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

impl SimConfig {
    /// Returns the decision budget as a `Duration`.
    #[must_use]
    pub fn decision_budget(&self) -> Duration {
        Duration::from_millis(self.decision_budget_ms)
    }

    /// Checks the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.map_width >= 1.0 && self.map_height >= 1.0) {
            return Err(ConfigError::InvalidMapSize {
                width: self.map_width,
                height: self.map_height,
            });
        }

        for (name, value) in [
            ("view_radius", self.view_radius),
            ("obstacle_view_slack", self.obstacle_view_slack),
            ("move_step", self.move_step),
            ("agent_radius", self.agent_radius),
            ("separation_distance", self.separation_distance),
            ("hit_radius", self.hit_radius),
            ("pickup_radius", self.pickup_radius),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::NegativeValue { name, value });
            }
        }

        if self.max_health <= 0 {
            return Err(ConfigError::InvalidMaxHealth(self.max_health));
        }

        if !(0.0..=1.0).contains(&self.supply.spawn_chance) {
            return Err(ConfigError::InvalidProbability(self.supply.spawn_chance));
        }

        for kind in WeaponKind::ALL {
            let spec = self.weapons.spec(kind);
            if spec.spread.is_empty() {
                return Err(ConfigError::EmptySpread(kind));
            }
            if !(spec.speed > 0.0) || spec.damage < 0 || spec.splash_radius < 0.0 {
                return Err(ConfigError::InvalidWeapon(kind));
            }
        }

        let p = &self.placement;
        for (name, value) in [
            ("placement.edge_margin", p.edge_margin),
            ("placement.min_agent_separation", p.min_agent_separation),
            ("placement.obstacle_margin", p.obstacle_margin),
            ("placement.obstacle_agent_clearance", p.obstacle_agent_clearance),
            ("supply.spawn_margin", self.supply.spawn_margin),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::NegativeValue { name, value });
            }
        }

        let span = self.map_width.min(self.map_height);
        for (name, margin) in [
            ("placement.edge_margin", p.edge_margin),
            ("placement.obstacle_margin", p.obstacle_margin),
            ("supply.spawn_margin", self.supply.spawn_margin),
        ] {
            if 2.0 * margin > span {
                return Err(ConfigError::MarginTooLarge {
                    name,
                    margin,
                    width: self.map_width,
                    height: self.map_height,
                });
            }
        }

        for (name, range) in [
            ("obstacle_width", p.obstacle_width),
            ("obstacle_height", p.obstacle_height),
        ] {
            if !(range[0] > 0.0 && range[0] <= range[1]) {
                return Err(ConfigError::InvalidRange {
                    name,
                    min: range[0],
                    max: range[1],
                });
            }
        }

        Ok(())
    }
}
