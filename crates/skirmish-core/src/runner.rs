//! Match policy layered over the tick driver.
//!
//! The simulation itself never ends a match; it only reports who is alive.
//! [`MatchRunner`] decides when to stop stepping:
//!
//! - elimination: one survivor, nobody left, or every survivor on one team;
//! - the turn budget is spent;
//! - no agent has died for `stall_timeout` of wall time while several live;
//! - `slow_ticks.consecutive` ticks in a row each took longer than
//!   `slow_ticks.threshold`.
//!
//! Once stopped, an undecided match is score-judged (see [`WinEvaluator`]).
//!
//! Independent matches can run in parallel with [`MatchRunner::run_batch`].
//! Each match stays single-threaded, so parallel results equal sequential
//! ones seed for seed.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SimConfig;
//! use skirmish_core::perception::Observation;
//! use skirmish_core::runner::{MatchRunner, Verdict};
//! use skirmish_core::simulation::Combatant;
//! use skirmish_core::strategy::{Action, DecisionError};
//!
//! fn idle(_: &Observation) -> Result<Action, DecisionError> {
//!     Ok(Action::Idle)
//! }
//!
//! let runner = MatchRunner { max_turns: 10, ..MatchRunner::default() };
//! let result = runner
//!     .run_seeded(&SimConfig::default(), vec![Combatant::new("a", idle), Combatant::new("b", idle)], 5)
//!     .unwrap();
//!
//! assert_eq!(result.turns, 10);
//! assert_eq!(result.verdict, Verdict::Draw);
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::entity::TeamId;
use crate::error::SimError;
use crate::replay::Recording;
use crate::simulation::{Combatant, Simulation};
use crate::snapshot::TickSnapshot;
use crate::win::WinEvaluator;

// =============================================================================
// Results
// =============================================================================

/// How a match was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Exactly one agent survived.
    Elimination,
    /// Several agents survived, all on one team.
    TeamElimination,
    /// Survivors from several sides remained; the best score won.
    ScoreJudged,
    /// No winner.
    Draw,
}

/// Why the runner stopped stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Elimination decided the match.
    Decided,
    /// The turn budget ran out.
    TurnLimit,
    /// No agent died for too long.
    Stalled,
    /// Too many slow ticks in a row.
    SlowTicks,
}

/// Outcome of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Winning agent's name.
    pub winner: Option<String>,
    /// Winning team.
    pub winning_team: Option<TeamId>,
    /// Ticks played.
    pub turns: u64,
    /// How the match was decided.
    pub verdict: Verdict,
    /// Why the runner stopped.
    pub stop: StopReason,
    /// State after the last tick.
    pub final_snapshot: TickSnapshot,
    /// Recorded frames, when recording was enabled.
    pub recording: Option<Recording>,
}

// =============================================================================
// MatchRunner
// =============================================================================

/// Consecutive slow-tick limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowTickLimit {
    /// A tick longer than this counts as slow.
    pub threshold: Duration,
    /// Slow ticks in a row that end the match.
    pub consecutive: u32,
}

impl Default for SlowTickLimit {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(2),
            consecutive: 10,
        }
    }
}

/// Runs matches to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRunner {
    /// Tick budget.
    pub max_turns: u64,
    /// Wall time without a death, with several alive, that ends the match.
    pub stall_timeout: Option<Duration>,
    /// Slow-tick limit.
    pub slow_ticks: Option<SlowTickLimit>,
    /// Record every n-th tick; `None` disables recording.
    pub frame_interval: Option<u64>,
}

impl Default for MatchRunner {
    fn default() -> Self {
        Self {
            max_turns: 2000,
            stall_timeout: Some(Duration::from_secs(60)),
            slow_ticks: Some(SlowTickLimit::default()),
            frame_interval: None,
        }
    }
}

impl MatchRunner {
    /// Steps `sim` until the match stops, then judges it.
    pub fn run<R: Rng>(&self, sim: &mut Simulation<R>, seed: Option<u64>) -> MatchResult {
        let interval = self.frame_interval.map(|n| n.max(1));
        let mut recording = interval.map(|_| Recording::new(seed, sim.config().clone()));

        let mut last = sim.snapshot();
        let mut last_alive = last.alive_count;
        let mut last_progress = Instant::now();
        let mut slow_streak = 0u32;

        let stop = loop {
            if sim.is_decided() {
                break StopReason::Decided;
            }
            if sim.turn() >= self.max_turns {
                break StopReason::TurnLimit;
            }

            let started = Instant::now();
            last = sim.step();
            let elapsed = started.elapsed();

            if let (Some(rec), Some(n)) = (recording.as_mut(), interval) {
                if last.turn % n == 0 {
                    rec.push(last.clone());
                }
            }

            if last.alive_count != last_alive {
                last_alive = last.alive_count;
                last_progress = Instant::now();
                slow_streak = 0;
            }

            if let Some(limit) = self.slow_ticks {
                if elapsed > limit.threshold {
                    slow_streak += 1;
                    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                    warn!(turn = last.turn, elapsed_ms, "Slow tick");
                } else {
                    slow_streak = 0;
                }
                if slow_streak >= limit.consecutive {
                    warn!(turn = last.turn, slow_streak, "Too many slow ticks, ending match");
                    break StopReason::SlowTicks;
                }
            }

            if let Some(timeout) = self.stall_timeout {
                if last.alive_count > 1 && last_progress.elapsed() > timeout {
                    warn!(
                        turn = last.turn,
                        alive = last.alive_count,
                        "No eliminations within stall timeout, ending match"
                    );
                    break StopReason::Stalled;
                }
            }
        };

        if let Some(rec) = recording.as_mut() {
            if rec.last().map(|f| f.turn) != Some(last.turn) {
                rec.push(last.clone());
            }
        }

        let world = sim.world();
        let name_of = |id| world.agent(id).map(|a| a.name.clone());
        let winner = WinEvaluator::winner(world, true).and_then(name_of);
        let winning_team =
            WinEvaluator::winning_team(world).or_else(|| WinEvaluator::judge_teams(world));

        let verdict = if WinEvaluator::winner(world, false).is_some() {
            Verdict::Elimination
        } else if WinEvaluator::winning_team(world).is_some() {
            Verdict::TeamElimination
        } else if winner.is_some() || winning_team.is_some() {
            Verdict::ScoreJudged
        } else {
            Verdict::Draw
        };

        info!(
            turns = sim.turn(),
            ?verdict,
            ?stop,
            winner = winner.as_deref().unwrap_or("-"),
            "Match finished"
        );

        MatchResult {
            winner,
            winning_team,
            turns: sim.turn(),
            verdict,
            stop,
            final_snapshot: last,
            recording,
        }
    }

    /// Builds a seeded match from `roster` and runs it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] if the match cannot be built.
    pub fn run_seeded(
        &self,
        config: &SimConfig,
        roster: Vec<Combatant>,
        seed: u64,
    ) -> Result<MatchResult, SimError> {
        let mut sim = Simulation::new(config.clone(), roster, seed)?;
        Ok(self.run(&mut sim, Some(seed)))
    }

    /// Runs one match per seed in parallel. `roster` builds fresh
    /// combatants for each seed. Results keep the order of `seeds`.
    pub fn run_batch<F>(
        &self,
        config: &SimConfig,
        seeds: &[u64],
        roster: F,
    ) -> Vec<Result<MatchResult, SimError>>
    where
        F: Fn(u64) -> Vec<Combatant> + Sync,
    {
        seeds
            .par_iter()
            .map(|&seed| self.run_seeded(config, roster(seed), seed))
            .collect()
    }
}
