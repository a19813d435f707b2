//! Movement, turning and agent separation.
//!
//! Moves are clamped to `[0, width-1] x [0, height-1]` and then tested
//! against every obstacle inflated by the agent radius. A blocked move tries
//! to slide along one axis (x first, then y) before giving up, so agents can
//! graze along walls instead of sticking to them.
//!
//! Separation pushes apart every living pair closer than the separation
//! distance, half the overlap each. A push that would land in an obstacle is
//! skipped for that agent only.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::config::SimConfig;
use crate::entity::AgentId;
use crate::events::TickEvent;
use crate::geometry::clamp_to_map;
use crate::strategy::Action;
use crate::world::WorldState;

use super::Resolver;

/// Below this distance two agents are treated as coincident.
const DEGENERATE_DISTANCE: f32 = 1e-5;

/// Applies movement actions and separates crowded agents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementResolver {
    move_step: f32,
    turn_step: f32,
    agent_radius: f32,
    separation_distance: f32,
}

impl MovementResolver {
    /// Creates a resolver from the configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            move_step: config.move_step,
            turn_step: config.turn_step,
            agent_radius: config.agent_radius,
            separation_distance: config.separation_distance,
        }
    }

    /// Applies a move or turn action to one agent.
    ///
    /// `Shoot` and `Idle` are ignored here. Returns true if the agent's
    /// position or facing changed.
    pub fn apply(&self, world: &mut WorldState, id: AgentId, action: Action) -> bool {
        let delta = match action {
            Action::MoveUp => Vec2::new(0.0, -self.move_step),
            Action::MoveDown => Vec2::new(0.0, self.move_step),
            Action::MoveLeft => Vec2::new(-self.move_step, 0.0),
            Action::MoveRight => Vec2::new(self.move_step, 0.0),
            Action::TurnLeft => return Self::rotate(world, id, -self.turn_step),
            Action::TurnRight => return Self::rotate(world, id, self.turn_step),
            Action::Shoot | Action::Idle => return false,
        };

        let Some(from) = world.agent(id).map(|a| a.position) else {
            return false;
        };
        let Some(to) = self.resolve_move(world, from, from + delta) else {
            return false;
        };
        match world.agent_mut(id) {
            Some(agent) => {
                agent.position = to;
                to != from
            }
            None => false,
        }
    }

    fn rotate(world: &mut WorldState, id: AgentId, delta: f32) -> bool {
        world.agent_mut(id).map_or(false, |agent| {
            agent.turn(delta);
            true
        })
    }

    /// Where an agent at `from` ends up when trying to reach `target`.
    ///
    /// Returns `None` if the move and both slides are blocked.
    #[must_use]
    pub fn resolve_move(&self, world: &WorldState, from: Vec2, target: Vec2) -> Option<Vec2> {
        let target = clamp_to_map(target, world.width(), world.height());
        [
            target,
            Vec2::new(target.x, from.y),
            Vec2::new(from.x, target.y),
        ]
        .into_iter()
        .find(|p| !world.blocked(*p, self.agent_radius))
    }

    /// Pushes apart every pair of living agents closer than the separation
    /// distance.
    pub fn separate(
        &self,
        world: &mut WorldState,
        rng: &mut dyn RngCore,
        events: &mut Vec<TickEvent>,
    ) {
        let min_dist = self.separation_distance;
        let count = world.agents().len();

        for i in 0..count {
            for j in (i + 1)..count {
                let (a, b) = (&world.agents()[i], &world.agents()[j]);
                if !a.is_alive() || !b.is_alive() {
                    continue;
                }

                let mut delta = b.position - a.position;
                let mut dist = delta.length();
                if dist < DEGENERATE_DISTANCE {
                    let angle = rng.gen_range(0.0..TAU);
                    delta = Vec2::from_angle(angle);
                    dist = 1.0;
                    debug!(first = %a.id, second = %b.id, angle, "Coincident agents nudged apart");
                    events.push(TickEvent::DegenerateOverlap {
                        first: a.id,
                        second: b.id,
                    });
                }
                if dist >= min_dist {
                    continue;
                }

                let push = delta / dist * ((min_dist - dist) / 2.0);
                let (w, h) = (world.width(), world.height());
                let a_to = clamp_to_map(a.position - push, w, h);
                let b_to = clamp_to_map(b.position + push, w, h);
                let a_ok = !world.blocked(a_to, self.agent_radius);
                let b_ok = !world.blocked(b_to, self.agent_radius);

                let agents = world.agents_mut();
                if a_ok {
                    agents[i].position = a_to;
                }
                if b_ok {
                    agents[j].position = b_to;
                }
            }
        }
    }
}

impl Resolver for MovementResolver {
    fn name(&self) -> &'static str {
        "separation"
    }

    fn resolve(&self, world: &mut WorldState, rng: &mut dyn RngCore, events: &mut Vec<TickEvent>) {
        self.separate(world, rng, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn resolver() -> MovementResolver {
        MovementResolver::from_config(&SimConfig::default())
    }

    fn world_with_agent(at: Vec2) -> (WorldState, AgentId) {
        let mut world = WorldState::new(100.0, 100.0);
        let id = world.spawn_agent("a", None, 100);
        world.agent_mut(id).unwrap().position = at;
        (world, id)
    }

    mod move_tests {
        use super::*;

        #[test]
        fn move_up_decreases_y() {
            let (mut world, id) = world_with_agent(Vec2::new(50.0, 50.0));
            assert!(resolver().apply(&mut world, id, Action::MoveUp));
            assert_eq!(world.agent(id).unwrap().position, Vec2::new(50.0, 48.0));

            resolver().apply(&mut world, id, Action::MoveRight);
            assert_eq!(world.agent(id).unwrap().position, Vec2::new(52.0, 48.0));
        }

        #[test]
        fn clamps_to_last_cell() {
            let (mut world, id) = world_with_agent(Vec2::new(98.5, 0.5));
            resolver().apply(&mut world, id, Action::MoveRight);
            resolver().apply(&mut world, id, Action::MoveUp);
            assert_eq!(world.agent(id).unwrap().position, Vec2::new(99.0, 0.0));
        }

        #[test]
        fn blocked_move_stays_put() {
            let (mut world, id) = world_with_agent(Vec2::new(37.0, 45.0));
            world.add_obstacle(Rect::new(40.0, 40.0, 10.0, 10.0));

            assert!(!resolver().apply(&mut world, id, Action::MoveRight));
            assert_eq!(world.agent(id).unwrap().position, Vec2::new(37.0, 45.0));
        }

        #[test]
        fn slide_keeps_free_axis() {
            let world = {
                let mut w = WorldState::new(100.0, 100.0);
                w.add_obstacle(Rect::new(40.0, 40.0, 10.0, 10.0));
                w
            };
            // Target and x-only slide are inside the inflated wall.
            let from = Vec2::new(36.0, 39.0);
            let to = resolver().resolve_move(&world, from, Vec2::new(40.0, 41.0));
            assert_eq!(to, Some(Vec2::new(36.0, 41.0)));
        }
    }

    mod turn_tests {
        use super::*;

        #[test]
        fn turn_left_subtracts_step() {
            let (mut world, id) = world_with_agent(Vec2::new(50.0, 50.0));
            resolver().apply(&mut world, id, Action::TurnLeft);
            let dir = world.agent(id).unwrap().direction();
            let expected = Vec2::from_angle(-std::f32::consts::PI / 6.0);
            assert!(dir.abs_diff_eq(expected, 1e-6));
        }

        #[test]
        fn shoot_and_idle_do_not_move() {
            let (mut world, id) = world_with_agent(Vec2::new(50.0, 50.0));
            assert!(!resolver().apply(&mut world, id, Action::Shoot));
            assert!(!resolver().apply(&mut world, id, Action::Idle));
            assert_eq!(world.agent(id).unwrap().position, Vec2::new(50.0, 50.0));
        }
    }

    mod separation_tests {
        use super::*;

        fn pair(a: Vec2, b: Vec2) -> WorldState {
            let mut world = WorldState::new(100.0, 100.0);
            for (name, p) in [("a", a), ("b", b)] {
                let id = world.spawn_agent(name, None, 100);
                world.agent_mut(id).unwrap().position = p;
            }
            world
        }

        #[test]
        fn pushes_to_min_distance() {
            let mut world = pair(Vec2::new(50.0, 50.0), Vec2::new(52.0, 50.0));
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            let mut events = Vec::new();
            resolver().separate(&mut world, &mut rng, &mut events);

            let [a, b] = [&world.agents()[0], &world.agents()[1]];
            assert!((a.position.distance(b.position) - 5.0).abs() < 1e-4);
            assert!((a.position.x - 48.5).abs() < 1e-4);
            assert!(events.is_empty());
        }

        #[test]
        fn coincident_agents_get_random_nudge() {
            let mut world = pair(Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0));
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let mut events = Vec::new();
            resolver().separate(&mut world, &mut rng, &mut events);

            let [a, b] = [&world.agents()[0], &world.agents()[1]];
            assert!((a.position.distance(b.position) - 4.0).abs() < 1e-3);
            assert_eq!(events.len(), 1);
        }

        #[test]
        fn dead_agents_are_ignored() {
            let mut world = pair(Vec2::new(50.0, 50.0), Vec2::new(51.0, 50.0));
            world.agents_mut()[1].set_health(0);
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            resolver().separate(&mut world, &mut rng, &mut Vec::new());
            assert_eq!(world.agents()[0].position, Vec2::new(50.0, 50.0));
        }

        #[test]
        fn push_into_wall_is_skipped() {
            let mut world = pair(Vec2::new(37.5, 45.0), Vec2::new(35.0, 45.0));
            world.add_obstacle(Rect::new(40.0, 40.0, 10.0, 10.0));
            // `a` would be pushed right, into the inflated wall.
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            resolver().separate(&mut world, &mut rng, &mut Vec::new());

            assert_eq!(world.agents()[0].position, Vec2::new(37.5, 45.0));
            assert!(world.agents()[1].position.x < 35.0);
        }
    }

    proptest! {
        #[test]
        fn moves_stay_in_bounds_and_out_of_walls(
            x in 0.0f32..99.0,
            y in 0.0f32..99.0,
            actions in prop::collection::vec(0usize..8, 1..60),
        ) {
            let mut world = WorldState::new(100.0, 100.0);
            world.add_obstacle(Rect::new(40.0, 40.0, 10.0, 10.0));
            let start = Vec2::new(x, y);
            prop_assume!(!world.blocked(start, 2.0));
            let id = world.spawn_agent("a", None, 100);
            world.agent_mut(id).unwrap().position = start;

            let mover = resolver();
            for a in actions {
                mover.apply(&mut world, id, Action::ALL[a]);
                let p = world.agent(id).unwrap().position;
                prop_assert!(p.x >= 0.0 && p.x < 100.0 && p.y >= 0.0 && p.y < 100.0);
                prop_assert!(!world.blocked(p, 2.0));
            }
        }
    }
}
