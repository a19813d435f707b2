//! World state and initial placement.
//!
//! [`WorldState`] is the single source of truth for a match: map dimensions,
//! agents, bullets, obstacles, supplies and the turn counter. Only the tick
//! driver mutates it, always in the same order.
//!
//! # Placement
//!
//! Agents and obstacles are placed by bounded rejection sampling:
//!
//! - Each agent samples uniform points inside an edge margin and takes the
//!   first one strictly farther than `min_agent_separation` from every agent
//!   placed before it. If the attempt budget runs out, the last sample is used
//!   and the outcome is reported as [`PlacementOutcome::Fallback`].
//! - Obstacles sample rectangles and reject those overlapping an existing
//!   obstacle (with margin) or too close to any agent. Whatever fits within the
//!   attempt budget is kept, so fewer obstacles than requested is normal.
//!
//! All randomness comes from the generator passed in, which keeps placement
//! reproducible for a fixed seed.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SimConfig;
//! use skirmish_core::world::{AgentSpec, WorldState};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = SimConfig::default();
//! let roster = vec![AgentSpec::new("alpha"), AgentSpec::new("beta")];
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//!
//! let (world, report) = WorldState::generate(&config, &roster, &mut rng);
//! assert_eq!(world.agents().len(), 2);
//! assert!(report.obstacles_placed <= config.placement.obstacle_count);
//! ```

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{PlacementConfig, SimConfig};
use crate::entity::{Agent, AgentId, Bullet, Obstacle, Supply, TeamId};
use crate::geometry::{clamp_to_map, Rect};

// =============================================================================
// Roster & placement reports
// =============================================================================

/// Name and team of an agent to be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique display name.
    pub name: String,
    /// Optional team.
    pub team: Option<TeamId>,
}

impl AgentSpec {
    /// A teamless agent.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: None,
        }
    }

    /// An agent on `team`.
    #[must_use]
    pub fn on_team(name: impl Into<String>, team: TeamId) -> Self {
        Self {
            name: name.into(),
            team: Some(team),
        }
    }
}

/// How an agent's spawn point was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    /// A point satisfying the separation rule was found.
    Placed,
    /// The budget ran out; the last sample was used and may crowd another agent.
    Fallback {
        /// Samples drawn before giving up.
        attempts: u32,
    },
}

/// Summary of initial placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    /// Outcome per agent, in roster order.
    pub agents: Vec<(AgentId, PlacementOutcome)>,
    /// Obstacles requested by the configuration.
    pub obstacles_requested: usize,
    /// Obstacles that actually fit.
    pub obstacles_placed: usize,
}

impl PlacementReport {
    /// Returns true if any agent had to fall back to an unchecked position.
    #[must_use]
    pub fn has_fallbacks(&self) -> bool {
        self.agents
            .iter()
            .any(|(_, outcome)| matches!(outcome, PlacementOutcome::Fallback { .. }))
    }
}

/// Uniform sample in `[lo, hi]`, collapsing to `lo` when the range is empty.
pub(crate) fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

/// Uniform point at least `margin` from every edge, clamped onto the map.
pub(crate) fn sample_point<R: Rng + ?Sized>(rng: &mut R, margin: f32, width: f32, height: f32) -> Vec2 {
    let x = sample(rng, margin, width - margin);
    let y = sample(rng, margin, height - margin);
    clamp_to_map(Vec2::new(x, y), width, height)
}

// =============================================================================
// WorldState
// =============================================================================

/// All mutable simulation data for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    width: f32,
    height: f32,
    /// Agents in roster order; dead agents stay in the list.
    agents: Vec<Agent>,
    /// Bullets in firing order.
    pub bullets: Vec<Bullet>,
    /// Static walls.
    obstacles: Vec<Obstacle>,
    /// Pickups in spawn order.
    pub supplies: Vec<Supply>,
    turn: u64,
}

impl WorldState {
    /// Creates an empty world of the given size at turn 0.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            agents: Vec::new(),
            bullets: Vec::new(),
            obstacles: Vec::new(),
            supplies: Vec::new(),
            turn: 0,
        }
    }

    /// Builds a world for `roster` and places agents and obstacles.
    pub fn generate<R: Rng + ?Sized>(
        config: &SimConfig,
        roster: &[AgentSpec],
        rng: &mut R,
    ) -> (Self, PlacementReport) {
        let mut world = Self::new(config.map_width, config.map_height);
        for spec in roster {
            world.spawn_agent(spec.name.clone(), spec.team, config.max_health);
        }

        let agents = world.place_agents(&config.placement, rng);
        let obstacles_placed = world.place_obstacles(&config.placement, rng);

        let report = PlacementReport {
            agents,
            obstacles_requested: config.placement.obstacle_count,
            obstacles_placed,
        };
        (world, report)
    }

    /// Adds an agent at the origin and returns its id.
    pub fn spawn_agent(
        &mut self,
        name: impl Into<String>,
        team: Option<TeamId>,
        max_health: i32,
    ) -> AgentId {
        // Roster sizes are tiny; u32 cannot overflow in practice.
        #[allow(clippy::cast_possible_truncation)]
        let id = AgentId::new(self.agents.len() as u32);
        self.agents.push(Agent::new(id, name, team, max_health));
        id
    }

    /// Adds a wall.
    pub fn add_obstacle(&mut self, rect: Rect) {
        self.obstacles.push(Obstacle::new(rect));
    }

    /// Places every agent by rejection sampling and gives it a random facing.
    pub fn place_agents<R: Rng + ?Sized>(
        &mut self,
        placement: &PlacementConfig,
        rng: &mut R,
    ) -> Vec<(AgentId, PlacementOutcome)> {
        let margin = placement.edge_margin;
        let (width, height) = (self.width, self.height);
        let mut placed: Vec<Vec2> = Vec::with_capacity(self.agents.len());
        let mut outcomes = Vec::with_capacity(self.agents.len());

        for agent in &mut self.agents {
            let mut candidate = clamp_to_map(Vec2::new(margin, margin), width, height);
            let mut outcome = PlacementOutcome::Fallback {
                attempts: placement.max_attempts_per_agent,
            };

            for _ in 0..placement.max_attempts_per_agent {
                candidate = sample_point(rng, margin, width, height);
                if placed
                    .iter()
                    .all(|p| p.distance(candidate) > placement.min_agent_separation)
                {
                    outcome = PlacementOutcome::Placed;
                    break;
                }
            }

            if let PlacementOutcome::Fallback { attempts } = outcome {
                warn!(
                    agent = %agent.name,
                    attempts,
                    x = candidate.x,
                    y = candidate.y,
                    "Placement exhausted, using last sampled position"
                );
            }

            agent.position = candidate;
            agent.set_heading(rng.gen_range(0.0..TAU));
            placed.push(candidate);
            outcomes.push((agent.id, outcome));
        }

        outcomes
    }

    /// Places up to `obstacle_count` walls and returns how many fit.
    pub fn place_obstacles<R: Rng + ?Sized>(
        &mut self,
        placement: &PlacementConfig,
        rng: &mut R,
    ) -> usize {
        let wanted = placement.obstacle_count;
        let budget = wanted.saturating_mul(placement.obstacle_attempts_per_obstacle as usize);
        let margin = placement.obstacle_margin;
        let mut placed: Vec<Rect> = Vec::with_capacity(wanted);
        let mut attempts = 0;

        while placed.len() < wanted && attempts < budget {
            attempts += 1;

            let [min_w, max_w] = placement.obstacle_width;
            let [min_h, max_h] = placement.obstacle_height;
            let w = sample(rng, min_w, max_w);
            let h = sample(rng, min_h, max_h);
            let x = sample(rng, margin, self.width - margin - w);
            let y = sample(rng, margin, self.height - margin - h);
            let rect = Rect::new(x, y, w, h);

            if placed.iter().any(|p| rect.overlaps_with_margin(p, margin)) {
                continue;
            }
            if self
                .agents
                .iter()
                .any(|a| rect.distance_to(a.position) < placement.obstacle_agent_clearance)
            {
                continue;
            }
            placed.push(rect);
        }

        if placed.len() < wanted {
            warn!(
                requested = wanted,
                placed = placed.len(),
                attempts,
                "Obstacle placement exhausted its budget"
            );
        }

        let count = placed.len();
        self.obstacles.extend(placed.into_iter().map(Obstacle::new));
        count
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Map width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Map height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Map size as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Completed ticks.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    pub(crate) fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// All agents in roster order, dead ones included.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable access to the agent list. The list itself cannot grow or shrink.
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Static walls.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Looks up an agent by id.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.as_u32() as usize).filter(|a| a.id == id)
    }

    /// Looks up an agent by id, mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents
            .get_mut(id.as_u32() as usize)
            .filter(|a| a.id == id)
    }

    /// Looks up an agent by name.
    #[must_use]
    pub fn agent_by_name(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Living agents in roster order.
    pub fn alive_agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter().filter(|a| a.is_alive())
    }

    /// Number of living agents.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_agents().count()
    }

    /// Returns true if a body of `radius` at `point` would touch any wall.
    #[must_use]
    pub fn blocked(&self, point: Vec2, radius: f32) -> bool {
        self.obstacles.iter().any(|o| o.blocks(point, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(n: usize) -> Vec<AgentSpec> {
        (0..n).map(|i| AgentSpec::new(format!("agent-{i}"))).collect()
    }

    mod placement_tests {
        use super::*;

        #[test]
        fn agents_are_separated_and_inside_margin() {
            let config = SimConfig::default();
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            let (world, report) = WorldState::generate(&config, &roster(4), &mut rng);

            assert!(!report.has_fallbacks());
            for (i, a) in world.agents().iter().enumerate() {
                assert!(a.position.x >= 20.0 && a.position.x <= 80.0);
                assert!(a.position.y >= 20.0 && a.position.y <= 80.0);
                for b in &world.agents()[i + 1..] {
                    assert!(a.position.distance(b.position) > 15.0);
                }
            }
        }

        #[test]
        fn crowded_map_reports_fallback() {
            let mut config = SimConfig::default();
            config.map_width = 45.0;
            config.map_height = 45.0;
            config.placement.max_attempts_per_agent = 10;
            let mut rng = ChaCha8Rng::seed_from_u64(3);

            let (world, report) = WorldState::generate(&config, &roster(6), &mut rng);

            assert_eq!(world.agents().len(), 6);
            assert!(report.has_fallbacks());
        }

        #[test]
        fn unvalidated_margins_still_place_on_the_map() {
            for (size, margin) in [(15.0, 20.0), (100.0, -30.0), (100.0, 0.0)] {
                let mut config = SimConfig::default();
                config.map_width = size;
                config.map_height = size;
                config.placement.edge_margin = margin;
                let mut rng = ChaCha8Rng::seed_from_u64(8);

                let (world, _) = WorldState::generate(&config, &roster(5), &mut rng);

                for a in world.agents() {
                    assert!(
                        crate::geometry::in_map(a.position, size, size),
                        "{} at {:?} with margin {margin} on a {size} map",
                        a.name,
                        a.position
                    );
                }
            }
        }

        #[test]
        fn obstacles_keep_clear_of_agents_and_each_other() {
            let config = SimConfig::default();
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            let (world, report) = WorldState::generate(&config, &roster(2), &mut rng);

            assert_eq!(report.obstacles_placed, world.obstacles().len());
            assert!(report.obstacles_placed <= 4);
            for (i, o) in world.obstacles().iter().enumerate() {
                for a in world.agents() {
                    assert!(o.rect.distance_to(a.position) >= 12.0);
                }
                for p in &world.obstacles()[i + 1..] {
                    assert!(!o.rect.overlaps_with_margin(&p.rect, 6.0));
                }
            }
        }

        #[test]
        fn impossible_obstacle_request_yields_fewer() {
            let mut config = SimConfig::default();
            config.placement.obstacle_count = 200;
            let mut rng = ChaCha8Rng::seed_from_u64(5);
            let (_, report) = WorldState::generate(&config, &roster(2), &mut rng);

            assert_eq!(report.obstacles_requested, 200);
            assert!(report.obstacles_placed < 200);
        }

        #[test]
        fn same_seed_same_layout() {
            let config = SimConfig::default();
            let (a, _) =
                WorldState::generate(&config, &roster(3), &mut ChaCha8Rng::seed_from_u64(42));
            let (b, _) =
                WorldState::generate(&config, &roster(3), &mut ChaCha8Rng::seed_from_u64(42));
            assert_eq!(a, b);
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn agent_lookup_by_id_and_name() {
            let mut world = WorldState::new(100.0, 100.0);
            let a = world.spawn_agent("a", None, 100);
            let b = world.spawn_agent("b", Some(TeamId(1)), 100);

            assert_eq!(world.agent(a).unwrap().name, "a");
            assert_eq!(world.agent_by_name("b").unwrap().id, b);
            assert!(world.agent(AgentId::new(9)).is_none());
        }

        #[test]
        fn blocked_uses_inflated_rect() {
            let mut world = WorldState::new(100.0, 100.0);
            world.add_obstacle(Rect::new(40.0, 40.0, 10.0, 10.0));

            assert!(world.blocked(Vec2::new(38.5, 45.0), 2.0));
            assert!(!world.blocked(Vec2::new(37.5, 45.0), 2.0));
        }
    }
}
