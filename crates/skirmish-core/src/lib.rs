//! # Skirmish Core
//!
//! Deterministic, tick-based 2D arena combat simulation.
//!
//! Agents move, turn and shoot on a bounded rectangular map with static
//! obstacles and randomly spawning supplies. Each agent is driven by a
//! [`Strategy`] that only ever sees its own [`Observation`]. The engine
//! resolves movement, bullet flight, collisions, splash damage, pickups and
//! agent separation in a fixed order, and emits a read-only
//! [`TickSnapshot`] after every tick.
//!
//! ## Architecture
//!
//! - **World**: [`WorldState`] holds agents, bullets, obstacles and supplies
//! - **Perception**: [`PerceptionBuilder`] projects the world per agent
//! - **Strategies**: pure `Observation -> Action` policies behind a guarded call
//! - **Resolvers**: movement, combat and supply systems mutate the world
//! - **Driver**: [`Simulation`] runs one tick per [`Simulation::step`]
//! - **Policy**: [`MatchRunner`] stops matches and judges them
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::{Action, Combatant, DecisionError, MatchRunner, Observation, SimConfig};
//!
//! fn gunner(obs: &Observation) -> Result<Action, DecisionError> {
//!     match obs.nearest_enemy() {
//!         Some(e) if obs.is_aiming_at(e.position, 0.2) => Ok(Action::Shoot),
//!         Some(_) => Ok(Action::TurnRight),
//!         None => Ok(Action::MoveUp),
//!     }
//! }
//!
//! let roster = vec![Combatant::new("red", gunner), Combatant::new("blue", gunner)];
//! let runner = MatchRunner { max_turns: 200, ..MatchRunner::default() };
//! let result = runner.run_seeded(&SimConfig::default(), roster, 7).unwrap();
//! assert!(result.turns <= 200);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod geometry;
pub mod perception;
pub mod replay;
pub mod resolver;
pub mod runner;
pub mod simulation;
pub mod snapshot;
pub mod strategy;
pub mod win;
pub mod world;

#[cfg(test)]
mod tests;

pub use config::SimConfig;
pub use entity::{Agent, AgentId, SupplyKind, TeamId, WeaponKind};
pub use error::{ConfigError, ReplayError, SimError};
pub use events::TickEvent;
pub use perception::{Observation, PerceptionBuilder};
pub use replay::Recording;
pub use runner::{MatchResult, MatchRunner, Verdict};
pub use simulation::{Combatant, Simulation};
pub use snapshot::TickSnapshot;
pub use strategy::{Action, Decision, DecisionError, Strategy};
pub use win::WinEvaluator;
pub use world::{AgentSpec, PlacementOutcome, WorldState};
