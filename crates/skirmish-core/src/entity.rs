//! Entity types for the arena simulation.
//!
//! This module provides the data the world is made of:
//! - [`AgentId`] / [`TeamId`]: identity newtypes
//! - [`WeaponKind`] and [`Ammo`]: the weapon inventory
//! - [`Agent`]: a combatant controlled by a strategy
//! - [`Bullet`]: an in-flight projectile
//! - [`Obstacle`]: an impenetrable static rectangle
//! - [`Supply`] / [`SupplyKind`]: pickups lying on the map
//!
//! # Invariants
//!
//! `Agent` keeps its health and facing behind methods so that health always
//! stays within `[0, max]` and the facing direction is always a unit vector.
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{Agent, AgentId, WeaponKind};
//! use glam::Vec2;
//!
//! let mut agent = Agent::new(AgentId::new(0), "alpha", None, 100);
//! agent.apply_damage(130);
//! assert_eq!(agent.health(), 0);
//! assert!(!agent.is_alive());
//! assert_eq!(agent.weapon, WeaponKind::Normal);
//! assert!((agent.direction().length() - 1.0).abs() < 1e-6);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for an agent within a match.
///
/// Bullets refer to their shooter by `AgentId`, never by ownership, so an
/// agent may die while its bullets are still in flight.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new `AgentId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// Team identifier. Agents on the same team never hurt each other with direct
/// hits and do not see each other as enemies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns true if both agents carry the same team.
///
/// Agents without a team are nobody's teammate.
#[must_use]
pub fn same_team(a: Option<TeamId>, b: Option<TeamId>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

// =============================================================================
// Weapons
// =============================================================================

/// The weapon an agent is holding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    /// Default sidearm with unlimited ammo.
    #[default]
    Normal,
    /// Three-pellet spread.
    Shotgun,
    /// Fast, heavy single shot.
    Sniper,
    /// Slow projectile with splash damage.
    Rocket,
}

impl WeaponKind {
    /// Every weapon kind, in table order.
    pub const ALL: [WeaponKind; 4] = [Self::Normal, Self::Shotgun, Self::Sniper, Self::Rocket];

    /// Lowercase name used in snapshots and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Shotgun => "shotgun",
            Self::Sniper => "sniper",
            Self::Rocket => "rocket",
        }
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ammunition counters for the weapons that consume ammo.
///
/// The normal weapon has no counter; [`Ammo::get`] returns `None` for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ammo {
    /// Shotgun shells.
    pub shotgun: u32,
    /// Sniper rounds.
    pub sniper: u32,
    /// Rockets.
    pub rocket: u32,
}

impl Ammo {
    /// Returns the counter for `kind`, or `None` for the unlimited normal weapon.
    #[must_use]
    pub fn get(&self, kind: WeaponKind) -> Option<u32> {
        match kind {
            WeaponKind::Normal => None,
            WeaponKind::Shotgun => Some(self.shotgun),
            WeaponKind::Sniper => Some(self.sniper),
            WeaponKind::Rocket => Some(self.rocket),
        }
    }

    fn slot_mut(&mut self, kind: WeaponKind) -> Option<&mut u32> {
        match kind {
            WeaponKind::Normal => None,
            WeaponKind::Shotgun => Some(&mut self.shotgun),
            WeaponKind::Sniper => Some(&mut self.sniper),
            WeaponKind::Rocket => Some(&mut self.rocket),
        }
    }

    /// Adds rounds to the counter for `kind`. Adding to `Normal` is a no-op.
    pub fn add(&mut self, kind: WeaponKind, amount: u32) {
        if let Some(slot) = self.slot_mut(kind) {
            *slot = slot.saturating_add(amount);
        }
    }

    /// Consumes one round of `kind` if available.
    ///
    /// Returns `true` for `Normal` without touching any counter, `false` when
    /// the counter is already zero.
    pub fn try_consume(&mut self, kind: WeaponKind) -> bool {
        match self.slot_mut(kind) {
            None => true,
            Some(0) => false,
            Some(slot) => {
                *slot -= 1;
                true
            }
        }
    }
}

// =============================================================================
// Agent
// =============================================================================

/// A combatant in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name; unique within a match.
    pub name: String,
    /// Optional team; preserved across [`Agent::reset`].
    pub team: Option<TeamId>,
    /// Current position.
    pub position: Vec2,
    /// Ticks until the agent may fire again.
    pub cooldown: u32,
    /// Held weapon.
    pub weapon: WeaponKind,
    /// Ammunition counters.
    pub ammo: Ammo,
    /// Kills credited to this agent.
    pub kills: u32,
    /// Times this agent was killed.
    pub deaths: u32,
    health: i32,
    max_health: i32,
    heading: f32,
}

impl Agent {
    /// Creates an agent at the origin facing +x with full health.
    #[must_use]
    pub fn new(id: AgentId, name: impl Into<String>, team: Option<TeamId>, max_health: i32) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            position: Vec2::ZERO,
            cooldown: 0,
            weapon: WeaponKind::Normal,
            ammo: Ammo::default(),
            kills: 0,
            deaths: 0,
            health: max_health,
            max_health,
            heading: 0.0,
        }
    }

    /// Reinitializes everything that changes during a match.
    ///
    /// Kills and deaths are per-match tallies and are cleared along with
    /// health, position, facing, cooldown, weapon and ammo. Team assignment,
    /// name and identity are kept.
    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.heading = 0.0;
        self.cooldown = 0;
        self.weapon = WeaponKind::Normal;
        self.ammo = Ammo::default();
        self.kills = 0;
        self.deaths = 0;
        self.health = self.max_health;
    }

    /// Current health in `[0, max_health]`.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Sets health, clamped into `[0, max_health]`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    /// Returns true while health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtracts `amount` (negative amounts are ignored), clamping at zero.
    ///
    /// Returns `true` if this damage took the agent from alive to dead.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.health = (self.health - amount.max(0)).max(0);
        was_alive && !self.is_alive()
    }

    /// Restores `amount` health, capped at `max_health`.
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).min(self.max_health);
    }

    /// Facing angle in radians. Not normalized; only differences matter.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Sets the facing angle.
    pub fn set_heading(&mut self, heading: f32) {
        self.heading = heading;
    }

    /// Rotates the facing by `delta` radians.
    pub fn turn(&mut self, delta: f32) {
        self.heading += delta;
    }

    /// Unit facing vector derived from the heading.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Distance to a point.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Ammo left for the held weapon, `None` for the normal weapon.
    #[must_use]
    pub fn held_ammo(&self) -> Option<u32> {
        self.ammo.get(self.weapon)
    }
}

// =============================================================================
// Bullet
// =============================================================================

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Current position.
    pub position: Vec2,
    /// Unit travel direction.
    pub direction: Vec2,
    /// Distance per tick.
    pub speed: f32,
    /// Shooter.
    pub owner: AgentId,
    /// Direct-hit damage, or centre damage for splash.
    pub damage: i32,
    /// Weapon that produced the bullet.
    pub kind: WeaponKind,
    /// Splash radius, 0 for none.
    pub splash_radius: f32,
    /// Cleared when the bullet leaves the map or hits something.
    pub active: bool,
}

impl Bullet {
    /// Moves the bullet one tick and deactivates it if it left the map.
    pub fn advance(&mut self, map_width: f32, map_height: f32) {
        self.position += self.direction * self.speed;
        if !crate::geometry::in_map(self.position, map_width, map_height) {
            self.active = false;
        }
    }

    /// Returns true for bullets that detonate with area damage.
    #[must_use]
    pub fn is_explosive(&self) -> bool {
        self.kind == WeaponKind::Rocket && self.splash_radius > 0.0
    }
}

// =============================================================================
// Obstacle
// =============================================================================

/// A static wall. Created at match start and never modified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Footprint.
    pub rect: Rect,
}

impl Obstacle {
    /// Creates an obstacle from its footprint.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Returns true if a body of `radius` centred at `point` would touch the wall.
    #[must_use]
    pub fn blocks(&self, point: Vec2, radius: f32) -> bool {
        self.rect.inflated(radius).contains(point)
    }
}

// =============================================================================
// Supplies
// =============================================================================

/// What a supply grants when picked up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyKind {
    /// Restores health.
    Health,
    /// Shotgun shells.
    AmmoShotgun,
    /// Sniper rounds.
    AmmoSniper,
    /// Rockets.
    AmmoRocket,
    /// Switches the held weapon to the shotgun.
    WeaponShotgun,
    /// Switches the held weapon to the sniper rifle.
    WeaponSniper,
    /// Switches the held weapon to the rocket launcher.
    WeaponRocket,
}

impl SupplyKind {
    /// Spawn table; a kind is drawn uniformly from these entries, so health
    /// packs are twice as common as any single ammo or weapon kind.
    pub const SPAWN_TABLE: [SupplyKind; 8] = [
        Self::Health,
        Self::Health,
        Self::AmmoShotgun,
        Self::AmmoSniper,
        Self::AmmoRocket,
        Self::WeaponShotgun,
        Self::WeaponSniper,
        Self::WeaponRocket,
    ];

    /// Snake-case name used in snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::AmmoShotgun => "ammo_shotgun",
            Self::AmmoSniper => "ammo_sniper",
            Self::AmmoRocket => "ammo_rocket",
            Self::WeaponShotgun => "weapon_shotgun",
            Self::WeaponSniper => "weapon_sniper",
            Self::WeaponRocket => "weapon_rocket",
        }
    }
}

impl fmt::Display for SupplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pickup lying on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    /// Where it lies.
    pub position: Vec2,
    /// What it grants.
    pub kind: SupplyKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod agent_tests {
        use super::*;

        fn agent() -> Agent {
            Agent::new(AgentId::new(1), "a", Some(TeamId(2)), 100)
        }

        #[test]
        fn damage_clamps_at_zero_and_reports_kill_once() {
            let mut a = agent();
            assert!(!a.apply_damage(60));
            assert!(a.apply_damage(60));
            assert_eq!(a.health(), 0);
            assert!(!a.apply_damage(10));
            assert_eq!(a.health(), 0);
        }

        #[test]
        fn healing_caps_at_max() {
            let mut a = agent();
            a.set_health(90);
            a.heal(25);
            assert_eq!(a.health(), 100);
        }

        #[test]
        fn turning_keeps_unit_direction() {
            let mut a = agent();
            for _ in 0..37 {
                a.turn(std::f32::consts::PI / 6.0);
                assert!((a.direction().length() - 1.0).abs() < 1e-5);
            }
        }

        #[test]
        fn reset_preserves_team() {
            let mut a = agent();
            a.kills = 3;
            a.deaths = 1;
            a.weapon = WeaponKind::Rocket;
            a.ammo.add(WeaponKind::Rocket, 2);
            a.apply_damage(50);
            a.position = Vec2::new(10.0, 10.0);

            a.reset();

            assert_eq!(a.team, Some(TeamId(2)));
            assert_eq!(a.health(), 100);
            assert_eq!(a.kills, 0);
            assert_eq!(a.deaths, 0);
            assert_eq!(a.weapon, WeaponKind::Normal);
            assert_eq!(a.ammo, Ammo::default());
            assert_eq!(a.position, Vec2::ZERO);
        }
    }

    mod ammo_tests {
        use super::*;

        #[test]
        fn normal_is_unlimited() {
            let mut ammo = Ammo::default();
            assert_eq!(ammo.get(WeaponKind::Normal), None);
            assert!(ammo.try_consume(WeaponKind::Normal));
        }

        #[test]
        fn consume_never_goes_negative() {
            let mut ammo = Ammo::default();
            ammo.add(WeaponKind::Sniper, 1);
            assert!(ammo.try_consume(WeaponKind::Sniper));
            assert!(!ammo.try_consume(WeaponKind::Sniper));
            assert_eq!(ammo.get(WeaponKind::Sniper), Some(0));
        }
    }

    #[test]
    fn teamless_agents_are_not_teammates() {
        assert!(!same_team(None, None));
        assert!(!same_team(Some(TeamId(1)), None));
        assert!(same_team(Some(TeamId(1)), Some(TeamId(1))));
    }

    #[test]
    fn bullet_leaving_map_deactivates() {
        let mut b = Bullet {
            position: Vec2::new(98.0, 50.0),
            direction: Vec2::X,
            speed: 5.0,
            owner: AgentId::new(0),
            damage: 10,
            kind: WeaponKind::Normal,
            splash_radius: 0.0,
            active: true,
        };
        b.advance(100.0, 100.0);
        assert!(!b.active);
    }

    #[test]
    fn supply_kinds_serialize_snake_case() {
        let json = serde_json::to_string(&SupplyKind::AmmoRocket).unwrap();
        assert_eq!(json, "\"ammo_rocket\"");
        let json = serde_json::to_string(&WeaponKind::Shotgun).unwrap();
        assert_eq!(json, "\"shotgun\"");
    }
}
