//! The tick driver.
//!
//! [`Simulation`] owns the world, one strategy per agent, the random source
//! and the resolvers. Each call to [`Simulation::step`] advances the world by
//! exactly one tick in a fixed order:
//!
//! 1. Advance the turn counter and clear the event log
//! 2. Decrement every cooldown
//! 3. Roll for a supply spawn
//! 4. For each living agent in roster order: observe, decide (guarded and
//!    timed), apply the action
//! 5. Advance and prune bullets, then resolve collisions and splash
//! 6. Resolve pickups
//! 7. Separate crowded agents
//! 8. Capture the [`TickSnapshot`]
//!
//! No condition inside a tick is fatal. Failed decisions idle, slow ones are
//! flagged, and the tick always completes.
//!
//! # Determinism
//!
//! Every random draw comes from the simulation's own generator, so two
//! simulations built from the same configuration, roster and seed produce
//! identical snapshots as long as their strategies are deterministic.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SimConfig;
//! use skirmish_core::perception::Observation;
//! use skirmish_core::simulation::{Combatant, Simulation};
//! use skirmish_core::strategy::{Action, DecisionError};
//!
//! fn spin(_: &Observation) -> Result<Action, DecisionError> {
//!     Ok(Action::TurnLeft)
//! }
//!
//! let roster = vec![Combatant::new("a", spin), Combatant::new("b", spin)];
//! let mut sim = Simulation::new(SimConfig::default(), roster, 42).unwrap();
//!
//! let snap = sim.step();
//! assert_eq!(snap.turn, 1);
//! assert_eq!(snap.alive_count, 2);
//! ```

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{trace, warn};

use crate::config::SimConfig;
use crate::entity::{AgentId, TeamId};
use crate::error::SimError;
use crate::events::TickEvent;
use crate::perception::PerceptionBuilder;
use crate::resolver::{CombatResolver, MovementResolver, Resolver, SupplySystem};
use crate::snapshot::TickSnapshot;
use crate::strategy::{self, Action, Decision, Strategy};
use crate::win::WinEvaluator;
use crate::world::{AgentSpec, PlacementReport, WorldState};

// =============================================================================
// Combatant
// =============================================================================

/// An agent entry: who it is and how it decides.
pub struct Combatant {
    /// Name and team.
    pub spec: AgentSpec,
    /// Decision policy.
    pub strategy: Box<dyn Strategy>,
}

impl Combatant {
    /// A teamless combatant.
    pub fn new(name: impl Into<String>, strategy: impl Strategy + 'static) -> Self {
        Self {
            spec: AgentSpec::new(name),
            strategy: Box::new(strategy),
        }
    }

    /// A combatant on `team`.
    pub fn on_team(name: impl Into<String>, team: TeamId, strategy: impl Strategy + 'static) -> Self {
        Self {
            spec: AgentSpec::on_team(name, team),
            strategy: Box::new(strategy),
        }
    }
}

impl std::fmt::Debug for Combatant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combatant")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// A running match.
pub struct Simulation<R: Rng = ChaCha8Rng> {
    config: SimConfig,
    world: WorldState,
    strategies: Vec<Box<dyn Strategy>>,
    rng: R,
    perception: PerceptionBuilder,
    movement: MovementResolver,
    combat: CombatResolver,
    supply: SupplySystem,
    events: Vec<TickEvent>,
    placement: PlacementReport,
}

impl<R: Rng> std::fmt::Debug for Simulation<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("turn", &self.world.turn())
            .field("agents", &self.world.agents().len())
            .field("alive", &self.world.alive_count())
            .finish_non_exhaustive()
    }
}

impl Simulation<ChaCha8Rng> {
    /// Builds a match with a seeded ChaCha generator.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] for an invalid configuration, an empty roster or
    /// duplicate agent names.
    pub fn new(config: SimConfig, roster: Vec<Combatant>, seed: u64) -> Result<Self, SimError> {
        Self::with_rng(config, roster, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Builds a match with any generator; placement draws from it first.
    ///
    /// # Errors
    ///
    /// Same as [`Simulation::new`].
    pub fn with_rng(config: SimConfig, roster: Vec<Combatant>, mut rng: R) -> Result<Self, SimError> {
        config.validate()?;
        validate_roster(roster.iter().map(|c| c.spec.name.as_str()))?;

        let (specs, strategies): (Vec<AgentSpec>, Vec<Box<dyn Strategy>>) =
            roster.into_iter().map(|c| (c.spec, c.strategy)).unzip();
        let (world, placement) = WorldState::generate(&config, &specs, &mut rng);

        Ok(Self::assemble(config, world, strategies, rng, placement))
    }

    /// Wraps a prebuilt world. Strategies pair with agents by roster index.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] for an invalid configuration, an empty world,
    /// duplicate names or a strategy count that does not match the agents.
    pub fn from_world(
        config: SimConfig,
        world: WorldState,
        strategies: Vec<Box<dyn Strategy>>,
        rng: R,
    ) -> Result<Self, SimError> {
        config.validate()?;
        validate_roster(world.agents().iter().map(|a| a.name.as_str()))?;
        if strategies.len() != world.agents().len() {
            return Err(SimError::StrategyCountMismatch {
                agents: world.agents().len(),
                strategies: strategies.len(),
            });
        }
        Ok(Self::assemble(config, world, strategies, rng, PlacementReport::default()))
    }

    fn assemble(
        config: SimConfig,
        world: WorldState,
        strategies: Vec<Box<dyn Strategy>>,
        rng: R,
        placement: PlacementReport,
    ) -> Self {
        Self {
            perception: PerceptionBuilder::from_config(&config),
            movement: MovementResolver::from_config(&config),
            combat: CombatResolver::from_config(&config),
            supply: SupplySystem::from_config(&config),
            config,
            world,
            strategies,
            rng,
            events: Vec::new(),
            placement,
        }
    }

    /// Advances the match by one tick and returns its snapshot.
    pub fn step(&mut self) -> TickSnapshot {
        self.events.clear();
        self.world.advance_turn();
        let turn = self.world.turn();
        trace!(turn, alive = self.world.alive_count(), "Tick start");

        for agent in self.world.agents_mut() {
            agent.cooldown = agent.cooldown.saturating_sub(1);
        }

        self.supply
            .maybe_spawn(&mut self.world, &mut self.rng, &mut self.events);

        self.run_decisions(turn);

        let phases: [&dyn Resolver; 3] = [&self.combat, &self.supply, &self.movement];
        for phase in phases {
            trace!(turn, phase = phase.name(), "Resolving");
            phase.resolve(&mut self.world, &mut self.rng, &mut self.events);
        }

        TickSnapshot::capture(&self.world)
    }

    fn run_decisions(&mut self, turn: u64) {
        let budget = self.config.decision_budget();

        for index in 0..self.world.agents().len() {
            let agent = &self.world.agents()[index];
            if !agent.is_alive() {
                continue;
            }
            let id = agent.id;
            let obs = self.perception.observe(&self.world, agent);
            let report = strategy::invoke(self.strategies[index].as_mut(), &obs, budget);

            if report.over_budget {
                let elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX);
                warn!(agent = %id, turn, elapsed_ms, "Decision exceeded time budget");
                self.events.push(TickEvent::DecisionOverBudget {
                    agent: id,
                    elapsed_ms,
                });
            }

            let action = match report.decision {
                Decision::Act(action) => action,
                Decision::Idle(reason) => {
                    warn!(agent = %id, turn, %reason, "Decision failed, idling");
                    self.events.push(TickEvent::DecisionFault { agent: id, reason });
                    Action::Idle
                }
            };

            match action {
                Action::Shoot => {
                    self.combat.fire(&mut self.world, id, &mut self.events);
                }
                Action::Idle => {}
                movement => {
                    self.movement.apply(&mut self.world, id, movement);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Snapshot of the current state without advancing.
    #[must_use]
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot::capture(&self.world)
    }

    /// Events of the most recent tick.
    #[must_use]
    pub fn events(&self) -> &[TickEvent] {
        &self.events
    }

    /// The winning agent; see [`WinEvaluator::winner`].
    #[must_use]
    pub fn winner(&self, score_judge: bool) -> Option<AgentId> {
        WinEvaluator::winner(&self.world, score_judge)
    }

    /// The team all survivors share, if any.
    #[must_use]
    pub fn winning_team(&self) -> Option<TeamId> {
        WinEvaluator::winning_team(&self.world)
    }

    /// Returns true once elimination has decided the match.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.world.alive_count() <= 1 || self.winning_team().is_some()
    }

    /// Completed ticks.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.world.turn()
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable access to the world, for scenario setup.
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// How initial placement went.
    #[must_use]
    pub fn placement_report(&self) -> &PlacementReport {
        &self.placement
    }
}

fn validate_roster<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), SimError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SimError::DuplicateAgentName(name.to_owned()));
        }
    }
    if seen.is_empty() {
        return Err(SimError::EmptyRoster);
    }
    Ok(())
}
