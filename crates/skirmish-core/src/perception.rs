//! Per-agent perception.
//!
//! [`PerceptionBuilder`] projects the [`WorldState`] into the [`Observation`]
//! a strategy sees on its turn. The observation is a plain owned value: a
//! strategy cannot reach back into the world through it.
//!
//! # Visibility rules
//!
//! - Enemies: living agents other than the observer and not on its team,
//!   within `view_radius`.
//! - Bullets: every bullet not fired by the observer, within `view_radius`.
//! - Obstacles: distance from the observer to the nearest point of the
//!   rectangle, within `view_radius + obstacle_view_slack`.
//! - Supplies: within `view_radius`.
//!
//! The radius is the same for every agent, so no observation can carry
//! information from farther away than any other agent could see.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::entity::{same_team, Agent, AgentId, SupplyKind, TeamId, WeaponKind};
use crate::geometry::Rect;
use crate::world::WorldState;

// =============================================================================
// Observation
// =============================================================================

/// Another agent as seen by the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    /// Enemy id.
    pub id: AgentId,
    /// Enemy name.
    pub name: String,
    /// Enemy position.
    pub position: Vec2,
    /// Enemy health.
    pub health: i32,
    /// Enemy facing.
    pub direction: Vec2,
    /// Distance from the observer.
    pub distance: f32,
    /// Enemy team.
    pub team: Option<TeamId>,
}

/// A bullet as seen by the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    /// Bullet position.
    pub position: Vec2,
    /// Travel direction.
    pub direction: Vec2,
    /// Distance from the observer.
    pub distance: f32,
}

/// An obstacle as seen by the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    /// Footprint.
    pub rect: Rect,
    /// Point of the footprint nearest the observer.
    pub nearest_point: Vec2,
    /// Distance to `nearest_point`.
    pub distance: f32,
}

/// A supply as seen by the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyView {
    /// Supply position.
    pub position: Vec2,
    /// Supply kind.
    pub kind: SupplyKind,
    /// Distance from the observer.
    pub distance: f32,
}

/// Everything one agent knows on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Tick being decided.
    pub turn: u64,
    /// Own health.
    pub health: i32,
    /// Own position.
    pub position: Vec2,
    /// Own unit facing.
    pub direction: Vec2,
    /// Own team.
    pub team: Option<TeamId>,
    /// Held weapon.
    pub weapon: WeaponKind,
    /// Ammo for the held weapon; `None` for the unlimited normal weapon.
    pub ammo: Option<u32>,
    /// Ticks until the agent may fire.
    pub cooldown: u32,
    /// Map width and height.
    pub map_size: Vec2,
    /// Visible enemies, in roster order.
    pub enemies: Vec<EnemyView>,
    /// Visible foreign bullets, in firing order.
    pub bullets: Vec<BulletView>,
    /// Visible obstacles.
    pub obstacles: Vec<ObstacleView>,
    /// Visible supplies.
    pub supplies: Vec<SupplyView>,
}

impl Observation {
    /// Distance from the observer to `point`.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Absolute angle (radians) from the observer to `point`.
    #[must_use]
    pub fn angle_to(&self, point: Vec2) -> f32 {
        let delta = point - self.position;
        delta.y.atan2(delta.x)
    }

    /// Returns true if the facing is within `tolerance` radians of `point`,
    /// accounting for wraparound.
    #[must_use]
    pub fn is_aiming_at(&self, point: Vec2, tolerance: f32) -> bool {
        let current = self.direction.y.atan2(self.direction.x);
        let diff = (self.angle_to(point) - current).rem_euclid(std::f32::consts::TAU);
        diff.min(std::f32::consts::TAU - diff) < tolerance
    }

    /// Closest visible enemy, first in roster order on ties.
    #[must_use]
    pub fn nearest_enemy(&self) -> Option<&EnemyView> {
        self.enemies
            .iter()
            .fold(None, |best: Option<&EnemyView>, e| match best {
                Some(b) if b.distance <= e.distance => Some(b),
                _ => Some(e),
            })
    }
}

// =============================================================================
// PerceptionBuilder
// =============================================================================

/// Builds observations with a fixed view radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionBuilder {
    view_radius: f32,
    obstacle_slack: f32,
}

impl PerceptionBuilder {
    /// Creates a builder with explicit radii.
    #[must_use]
    pub const fn new(view_radius: f32, obstacle_slack: f32) -> Self {
        Self {
            view_radius,
            obstacle_slack,
        }
    }

    /// Creates a builder from the configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.view_radius, config.obstacle_view_slack)
    }

    /// The view radius.
    #[must_use]
    pub const fn view_radius(&self) -> f32 {
        self.view_radius
    }

    /// Builds the observation for `me`.
    #[must_use]
    pub fn observe(&self, world: &WorldState, me: &Agent) -> Observation {
        let radius = self.view_radius;

        let enemies = world
            .agents()
            .iter()
            .filter(|o| o.id != me.id && o.is_alive() && !same_team(me.team, o.team))
            .filter_map(|o| {
                let distance = me.distance_to(o.position);
                (distance <= radius).then(|| EnemyView {
                    id: o.id,
                    name: o.name.clone(),
                    position: o.position,
                    health: o.health(),
                    direction: o.direction(),
                    distance,
                    team: o.team,
                })
            })
            .collect();

        let bullets = world
            .bullets
            .iter()
            .filter(|b| b.owner != me.id)
            .filter_map(|b| {
                let distance = me.distance_to(b.position);
                (distance <= radius).then_some(BulletView {
                    position: b.position,
                    direction: b.direction,
                    distance,
                })
            })
            .collect();

        let obstacles = world
            .obstacles()
            .iter()
            .filter_map(|o| {
                let nearest_point = o.rect.nearest_point(me.position);
                let distance = me.distance_to(nearest_point);
                (distance <= radius + self.obstacle_slack).then_some(ObstacleView {
                    rect: o.rect,
                    nearest_point,
                    distance,
                })
            })
            .collect();

        let supplies = world
            .supplies
            .iter()
            .filter_map(|s| {
                let distance = me.distance_to(s.position);
                (distance <= radius).then_some(SupplyView {
                    position: s.position,
                    kind: s.kind,
                    distance,
                })
            })
            .collect();

        Observation {
            turn: world.turn(),
            health: me.health(),
            position: me.position,
            direction: me.direction(),
            team: me.team,
            weapon: me.weapon,
            ammo: me.held_ammo(),
            cooldown: me.cooldown,
            map_size: world.size(),
            enemies,
            bullets,
            obstacles,
            supplies,
        }
    }
}
