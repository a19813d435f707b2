//! Test setup utilities and scripted strategies.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::perception::Observation;
use crate::simulation::Simulation;
use crate::strategy::{Action, DecisionError, Strategy};
use crate::world::WorldState;

// =============================================================================
// Configuration
// =============================================================================

/// Default rules with supply spawning switched off.
pub fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.supply.spawn_chance = 0.0;
    config
}

// =============================================================================
// Worlds
// =============================================================================

/// An obstacle-free 100x100 world with agents `a0, a1, ...` at `positions`,
/// all facing +x.
pub fn open_world(positions: &[Vec2]) -> WorldState {
    let mut world = WorldState::new(100.0, 100.0);
    for (i, p) in positions.iter().enumerate() {
        let id = world.spawn_agent(format!("a{i}"), None, 100);
        if let Some(agent) = world.agent_mut(id) {
            agent.position = *p;
        }
    }
    world
}

/// Wraps a prebuilt world in a seeded simulation.
pub fn simulation(config: SimConfig, world: WorldState, strategies: Vec<Box<dyn Strategy>>) -> Simulation {
    Simulation::from_world(config, world, strategies, ChaCha8Rng::seed_from_u64(0))
        .expect("test world is valid")
}

// =============================================================================
// Strategies
// =============================================================================

/// Boxes a strategy.
pub fn boxed(strategy: impl Strategy + 'static) -> Box<dyn Strategy> {
    Box::new(strategy)
}

/// Always returns `action`.
pub fn always(action: Action) -> Box<dyn Strategy> {
    boxed(move |_: &Observation| -> Result<Action, DecisionError> { Ok(action) })
}

/// Plays `script` in order, then idles.
pub fn scripted(script: Vec<Action>) -> Box<dyn Strategy> {
    let mut steps = script.into_iter();
    boxed(move |_: &Observation| -> Result<Action, DecisionError> {
        Ok(steps.next().unwrap_or(Action::Idle))
    })
}

/// Aims at the nearest visible enemy and shoots when aligned; wanders up
/// otherwise.
pub fn gunner() -> Box<dyn Strategy> {
    boxed(|obs: &Observation| -> Result<Action, DecisionError> {
        let Some(enemy) = obs.nearest_enemy() else {
            return Ok(Action::MoveUp);
        };
        if obs.is_aiming_at(enemy.position, 0.3) {
            return Ok(Action::Shoot);
        }
        let current = obs.direction.y.atan2(obs.direction.x);
        let diff = (obs.angle_to(enemy.position) - current).rem_euclid(std::f32::consts::TAU);
        Ok(if diff < std::f32::consts::PI {
            Action::TurnRight
        } else {
            Action::TurnLeft
        })
    })
}

/// Records every observation it receives and idles.
pub fn recorder() -> (Box<dyn Strategy>, Rc<RefCell<Vec<Observation>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let strategy = boxed(move |obs: &Observation| -> Result<Action, DecisionError> {
        sink.borrow_mut().push(obs.clone());
        Ok(Action::Idle)
    });
    (strategy, log)
}
