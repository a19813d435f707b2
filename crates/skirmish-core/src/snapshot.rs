//! Read-only per-tick projection of the world.
//!
//! A [`TickSnapshot`] is what renderers, recorders and rankers consume. It is
//! captured from [`WorldState`] after the tick completes and copies plain
//! values only, so later ticks never alter an earlier snapshot.
//!
//! # Example
//!
//! ```
//! use skirmish_core::snapshot::TickSnapshot;
//! use skirmish_core::world::WorldState;
//!
//! let mut world = WorldState::new(100.0, 100.0);
//! world.spawn_agent("solo", None, 100);
//!
//! let snap = TickSnapshot::capture(&world);
//! assert_eq!(snap.alive_count, 1);
//! assert_eq!(snap.winner.as_deref(), Some("solo"));
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{AgentId, SupplyKind, TeamId, WeaponKind};
use crate::geometry::Rect;
use crate::win::WinEvaluator;
use crate::world::WorldState;

/// Agent projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Agent name.
    pub name: String,
    /// Health.
    pub health: i32,
    /// Position.
    pub position: Vec2,
    /// Unit facing.
    pub direction: Vec2,
    /// Kills so far.
    pub kills: u32,
    /// Deaths so far.
    pub deaths: u32,
    /// Team.
    pub team_id: Option<TeamId>,
    /// Held weapon.
    pub weapon: WeaponKind,
    /// Ammo per ammo-consuming weapon.
    pub ammo: BTreeMap<WeaponKind, u32>,
}

/// Bullet projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    /// Position.
    pub position: Vec2,
    /// Unit direction.
    pub direction: Vec2,
    /// Shooter name.
    pub owner: String,
    /// Weapon kind.
    pub kind: WeaponKind,
}

/// Obstacle projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    /// Footprint.
    pub rect: Rect,
}

/// Supply projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplySnapshot {
    /// Position.
    pub position: Vec2,
    /// Kind.
    #[serde(rename = "type")]
    pub kind: SupplyKind,
}

/// Everything observable about the world after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// Tick number.
    pub turn: u64,
    /// Living agents.
    pub alive_count: usize,
    /// Last survivor, if exactly one agent is alive.
    pub winner: Option<String>,
    /// Team shared by every survivor, if any.
    pub winning_team: Option<TeamId>,
    /// Agents in roster order, dead ones included.
    pub agents: Vec<AgentSnapshot>,
    /// Bullets in firing order.
    pub bullets: Vec<BulletSnapshot>,
    /// Obstacles.
    pub obstacles: Vec<ObstacleSnapshot>,
    /// Supplies in spawn order.
    pub supplies: Vec<SupplySnapshot>,
}

impl TickSnapshot {
    /// Projects the world. Winners are elimination-only; score judging is
    /// left to the caller.
    #[must_use]
    pub fn capture(world: &WorldState) -> Self {
        let name_of = |id: AgentId| {
            world
                .agent(id)
                .map_or_else(String::new, |a| a.name.clone())
        };

        Self {
            turn: world.turn(),
            alive_count: world.alive_count(),
            winner: WinEvaluator::winner(world, false).map(name_of),
            winning_team: WinEvaluator::winning_team(world),
            agents: world
                .agents()
                .iter()
                .map(|a| AgentSnapshot {
                    name: a.name.clone(),
                    health: a.health(),
                    position: a.position,
                    direction: a.direction(),
                    kills: a.kills,
                    deaths: a.deaths,
                    team_id: a.team,
                    weapon: a.weapon,
                    ammo: WeaponKind::ALL
                        .into_iter()
                        .filter_map(|k| a.ammo.get(k).map(|n| (k, n)))
                        .collect(),
                })
                .collect(),
            bullets: world
                .bullets
                .iter()
                .map(|b| BulletSnapshot {
                    position: b.position,
                    direction: b.direction,
                    owner: name_of(b.owner),
                    kind: b.kind,
                })
                .collect(),
            obstacles: world
                .obstacles()
                .iter()
                .map(|o| ObstacleSnapshot { rect: o.rect })
                .collect(),
            supplies: world
                .supplies
                .iter()
                .map(|s| SupplySnapshot {
                    position: s.position,
                    kind: s.kind,
                })
                .collect(),
        }
    }

    /// Looks up an agent projection by name.
    #[must_use]
    pub fn agent(&self, name: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Bullet, Supply};

    fn sample_world() -> WorldState {
        let mut world = WorldState::new(100.0, 100.0);
        let a = world.spawn_agent("a", Some(TeamId(1)), 100);
        world.spawn_agent("b", Some(TeamId(2)), 100);
        {
            let agent = world.agent_mut(a).unwrap();
            agent.position = Vec2::new(10.0, 20.0);
            agent.ammo.add(WeaponKind::Rocket, 2);
            agent.weapon = WeaponKind::Rocket;
        }
        world.add_obstacle(Rect::new(40.0, 40.0, 8.0, 6.0));
        world.supplies.push(Supply {
            position: Vec2::new(30.0, 30.0),
            kind: SupplyKind::WeaponSniper,
        });
        world.bullets.push(Bullet {
            position: Vec2::new(12.0, 20.0),
            direction: Vec2::X,
            speed: 3.5,
            owner: AgentId::new(0),
            damage: 20,
            kind: WeaponKind::Rocket,
            splash_radius: 8.0,
            active: true,
        });
        world
    }

    #[test]
    fn projects_every_entity() {
        let snap = TickSnapshot::capture(&sample_world());

        assert_eq!(snap.alive_count, 2);
        assert_eq!(snap.winner, None);
        assert_eq!(snap.winning_team, None);

        let a = snap.agent("a").unwrap();
        assert_eq!(a.position, Vec2::new(10.0, 20.0));
        assert_eq!(a.ammo.get(&WeaponKind::Rocket), Some(&2));
        assert!(!a.ammo.contains_key(&WeaponKind::Normal));
        assert_eq!(snap.bullets[0].owner, "a");
        assert_eq!(snap.obstacles[0].rect, Rect::new(40.0, 40.0, 8.0, 6.0));
        assert_eq!(snap.supplies[0].kind, SupplyKind::WeaponSniper);
    }

    #[test]
    fn snapshot_is_detached_from_world() {
        let mut world = sample_world();
        let snap = TickSnapshot::capture(&world);
        world.agents_mut()[0].position = Vec2::new(90.0, 90.0);
        world.agents_mut()[1].set_health(0);

        assert_eq!(snap.agent("a").unwrap().position, Vec2::new(10.0, 20.0));
        assert_eq!(snap.agent("b").unwrap().health, 100);
    }

    #[test]
    fn reports_last_survivor_and_team() {
        let mut world = sample_world();
        world.agents_mut()[1].set_health(0);
        let snap = TickSnapshot::capture(&world);

        assert_eq!(snap.winner.as_deref(), Some("a"));
        assert_eq!(snap.winning_team, Some(TeamId(1)));
    }

    #[test]
    fn json_uses_wire_names() {
        let snap = TickSnapshot::capture(&sample_world());
        let json = serde_json::to_value(&snap).unwrap();

        assert_eq!(json["supplies"][0]["type"], "weapon_sniper");
        assert_eq!(json["agents"][0]["weapon"], "rocket");
        assert_eq!(json["agents"][0]["ammo"]["rocket"], 2);
        assert_eq!(json["agents"][0]["team_id"], 1);
    }
}
