//! Resolvers: the systems that mutate the world after decisions are made.
//!
//! Each resolver owns one concern and reads its tunables from
//! [`SimConfig`](crate::config::SimConfig) once, at construction:
//!
//! - [`MovementResolver`]: move/turn actions, obstacle sliding and
//!   agent-agent separation
//! - [`CombatResolver`]: firing, bullet flight, collisions and splash damage
//! - [`SupplySystem`]: supply spawning and pickups
//!
//! # Phases
//!
//! Actions are applied per agent during the decision loop. Everything after
//! that runs as a [`Resolver`] phase over the whole world, in a fixed order:
//!
//! 1. [`CombatResolver`]: advance and prune bullets, then resolve collisions
//! 2. [`SupplySystem`]: pickups
//! 3. [`MovementResolver`]: separation
//!
//! # Invariants
//!
//! - Resolvers iterate agents, bullets and supplies in list order only.
//! - All randomness is drawn from the generator handed to [`Resolver::resolve`].

mod combat;
mod movement;
mod supply;

pub use combat::{splash_damage, CombatResolver};
pub use movement::MovementResolver;
pub use supply::SupplySystem;

use rand::RngCore;

use crate::events::TickEvent;
use crate::world::WorldState;

/// A whole-world phase of the tick.
///
/// # Example
///
/// ```
/// use skirmish_core::events::TickEvent;
/// use skirmish_core::resolver::Resolver;
/// use skirmish_core::world::WorldState;
/// use rand::RngCore;
///
/// struct Nothing;
///
/// impl Resolver for Nothing {
///     fn name(&self) -> &'static str {
///         "nothing"
///     }
///
///     fn resolve(&self, _: &mut WorldState, _: &mut dyn RngCore, _: &mut Vec<TickEvent>) {}
/// }
/// ```
pub trait Resolver {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Runs the phase once.
    ///
    /// Must be deterministic given the world, the generator state and the
    /// order of the world's lists.
    fn resolve(&self, world: &mut WorldState, rng: &mut dyn RngCore, events: &mut Vec<TickEvent>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[&dyn Resolver]) {}
    }
}
