//! Per-tick event log.
//!
//! Resolvers push a [`TickEvent`] for every noteworthy thing they do. The
//! simulation clears the log at the start of each tick, so
//! [`Simulation::events`](crate::simulation::Simulation::events) always
//! describes the most recent tick only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{AgentId, SupplyKind, WeaponKind};
use crate::strategy::IdleReason;

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TickEvent {
    /// An agent fired its weapon.
    Fired {
        /// Shooter.
        agent: AgentId,
        /// Weapon the bullets came from; `Normal` on a zero-ammo fallback.
        weapon: WeaponKind,
        /// Bullets spawned.
        bullets: usize,
    },
    /// A bullet struck an agent directly.
    Hit {
        /// Shooter.
        shooter: AgentId,
        /// Victim.
        target: AgentId,
        /// Damage dealt.
        damage: i32,
    },
    /// A rocket detonated.
    Splash {
        /// Shooter.
        shooter: AgentId,
        /// Detonation point.
        center: Vec2,
        /// Agents that took non-zero damage.
        victims: Vec<(AgentId, i32)>,
    },
    /// An agent died.
    Kill {
        /// Agent credited with the kill.
        killer: AgentId,
        /// Agent that died.
        victim: AgentId,
    },
    /// A supply appeared.
    SupplySpawned {
        /// What it grants.
        kind: SupplyKind,
        /// Where it lies.
        position: Vec2,
    },
    /// An agent picked up a supply.
    SupplyPicked {
        /// Collector.
        agent: AgentId,
        /// What it granted.
        kind: SupplyKind,
    },
    /// A decision failed and the agent idled.
    DecisionFault {
        /// Agent whose strategy failed.
        agent: AgentId,
        /// Why.
        reason: IdleReason,
    },
    /// A decision exceeded the soft time budget. Its action was still applied.
    DecisionOverBudget {
        /// Agent whose strategy was slow.
        agent: AgentId,
        /// Time spent deciding, in milliseconds.
        elapsed_ms: u64,
    },
    /// Two agents sat on the same point and were pushed apart along a random axis.
    DegenerateOverlap {
        /// First agent of the pair.
        first: AgentId,
        /// Second agent of the pair.
        second: AgentId,
    },
}
