//! Win conditions.
//!
//! Matches are decided by elimination while they run. Score judging only
//! applies once a caller gives up on elimination (turn budget, stall):
//!
//! - individual: highest `(kills, health)` among the living, strictly ahead
//!   of the runner-up;
//! - team: highest `(alive members, total kills, total health)` among teams
//!   with living members, strictly ahead of the runner-up.
//!
//! A tie at the top is no winner, never an arbitrary pick.

use std::collections::BTreeMap;

use crate::entity::{AgentId, TeamId};
use crate::world::WorldState;

/// Evaluates winners from the current world state.
///
/// # Example
///
/// ```
/// use skirmish_core::win::WinEvaluator;
/// use skirmish_core::world::WorldState;
///
/// let mut world = WorldState::new(100.0, 100.0);
/// let a = world.spawn_agent("a", None, 100);
/// let b = world.spawn_agent("b", None, 100);
/// assert_eq!(WinEvaluator::winner(&world, false), None);
///
/// world.agent_mut(b).unwrap().set_health(0);
/// assert_eq!(WinEvaluator::winner(&world, false), Some(a));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WinEvaluator;

impl WinEvaluator {
    /// The winning agent, if any.
    ///
    /// Exactly one living agent always wins. With two or more alive, a winner
    /// exists only when `score_judge` is set and one agent's
    /// `(kills, health)` is strictly greatest.
    #[must_use]
    pub fn winner(world: &WorldState, score_judge: bool) -> Option<AgentId> {
        let mut alive = world.alive_agents();
        let first = alive.next()?;
        if world.alive_count() == 1 {
            return Some(first.id);
        }
        if !score_judge {
            return None;
        }
        unique_max(world.alive_agents().map(|a| (a.id, (a.kills, a.health()))))
    }

    /// The team every living agent belongs to, if they all share one.
    ///
    /// `None` when nobody is alive or any survivor is teamless: a teamless
    /// survivor is still an opponent, so the match is not over.
    #[must_use]
    pub fn winning_team(world: &WorldState) -> Option<TeamId> {
        let mut teams = world.alive_agents().map(|a| a.team);
        let first = teams.next()??;
        teams.all(|t| t == Some(first)).then_some(first)
    }

    /// Score-judges the teams that still have living members.
    #[must_use]
    pub fn judge_teams(world: &WorldState) -> Option<TeamId> {
        let mut scores: BTreeMap<TeamId, (usize, u32, i32)> = BTreeMap::new();
        for agent in world.alive_agents() {
            let Some(team) = agent.team else { continue };
            let entry = scores.entry(team).or_default();
            entry.0 += 1;
            entry.1 += agent.kills;
            entry.2 += agent.health();
        }
        unique_max(scores)
    }
}

/// Key of the strictly greatest score, `None` on an empty set or a tie.
fn unique_max<K, S: Ord + Copy>(scores: impl IntoIterator<Item = (K, S)>) -> Option<K> {
    let mut best: Option<(K, S)> = None;
    let mut tied = false;
    for (key, score) in scores {
        let leads = match &best {
            None => true,
            Some((_, top)) => {
                tied |= score == *top;
                score > *top
            }
        };
        if leads {
            best = Some((key, score));
            tied = false;
        }
    }
    if tied {
        None
    } else {
        best.map(|(key, _)| key)
    }
}
