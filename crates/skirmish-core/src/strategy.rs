//! Decision policies and the call boundary that contains them.
//!
//! A [`Strategy`] maps an [`Observation`] to an [`Action`]. It sees nothing
//! but the observation, so any two strategies are interchangeable.
//!
//! The engine never calls a strategy directly. It goes through
//! [`invoke`], which turns every way a decision can go wrong into a
//! [`Decision::Idle`] with an [`IdleReason`]:
//!
//! - the strategy returned a [`DecisionError`], including an unparseable
//!   action label;
//! - the strategy panicked.
//!
//! The call is also timed. Exceeding the soft budget is only flagged on the
//! returned [`DecisionReport`]; the action still stands.
//!
//! # Example
//!
//! ```
//! use skirmish_core::strategy::{Action, DecisionError};
//! use skirmish_core::perception::Observation;
//!
//! // Any closure of the right shape is a strategy.
//! let mut turret = |obs: &Observation| -> Result<Action, DecisionError> {
//!     if obs.cooldown == 0 { Ok(Action::Shoot) } else { Ok(Action::TurnLeft) }
//! };
//! # let _ = &mut turret;
//!
//! let parsed: Action = "move_up".parse().unwrap();
//! assert_eq!(parsed, Action::MoveUp);
//! assert!("jump".parse::<Action>().is_err());
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::perception::Observation;

// =============================================================================
// Action
// =============================================================================

/// The closed set of things an agent can do in one tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Step towards smaller y.
    MoveUp,
    /// Step towards larger y.
    MoveDown,
    /// Step towards smaller x.
    MoveLeft,
    /// Step towards larger x.
    MoveRight,
    /// Rotate the facing counter-clockwise by the turn step.
    TurnLeft,
    /// Rotate the facing clockwise by the turn step.
    TurnRight,
    /// Fire the held weapon if the cooldown allows.
    Shoot,
    /// Do nothing.
    Idle,
}

impl Action {
    /// Every action.
    pub const ALL: [Action; 8] = [
        Self::MoveUp,
        Self::MoveDown,
        Self::MoveLeft,
        Self::MoveRight,
        Self::TurnLeft,
        Self::TurnRight,
        Self::Shoot,
        Self::Idle,
    ];

    /// Wire label of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::TurnLeft => "turn_left",
            Self::TurnRight => "turn_right",
            Self::Shoot => "shoot",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label that names no [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action `{0}`")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseActionError(s.to_owned()))
    }
}

// =============================================================================
// Strategy
// =============================================================================

/// Failure reported by a strategy instead of an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    /// The strategy produced a label outside the action set.
    #[error(transparent)]
    InvalidAction(#[from] ParseActionError),

    /// The strategy could not decide.
    #[error("decision failed: {0}")]
    Failed(String),
}

/// A decision policy for one agent.
pub trait Strategy {
    /// Chooses the action for this tick.
    ///
    /// # Errors
    ///
    /// Any error is absorbed by the engine and the agent idles this tick.
    fn decide(&mut self, obs: &Observation) -> Result<Action, DecisionError>;
}

impl<F> Strategy for F
where
    F: FnMut(&Observation) -> Result<Action, DecisionError>,
{
    fn decide(&mut self, obs: &Observation) -> Result<Action, DecisionError> {
        self(obs)
    }
}

// =============================================================================
// Guarded invocation
// =============================================================================

/// Why a decision resolved to idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdleReason {
    /// The strategy returned a label outside the action set.
    InvalidAction(String),
    /// The strategy returned an error.
    Failed(String),
    /// The strategy panicked.
    Panicked(String),
}

impl fmt::Display for IdleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAction(label) => write!(f, "invalid action `{label}`"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// Outcome of one decision at the call boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// A valid action to apply.
    Act(Action),
    /// The decision failed; the agent idles.
    Idle(IdleReason),
}

impl Decision {
    /// The action the engine applies.
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Act(action) => *action,
            Self::Idle(_) => Action::Idle,
        }
    }
}

/// A decision plus how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionReport {
    /// What the strategy decided.
    pub decision: Decision,
    /// Wall-clock time spent inside the strategy.
    pub elapsed: Duration,
    /// True if `elapsed` exceeded the soft budget.
    pub over_budget: bool,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Calls `strategy` and contains every failure mode.
///
/// Never panics and never blocks beyond the strategy's own running time.
pub fn invoke(strategy: &mut dyn Strategy, obs: &Observation, budget: Duration) -> DecisionReport {
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.decide(obs)));
    let elapsed = start.elapsed();

    let decision = match outcome {
        Ok(Ok(action)) => Decision::Act(action),
        Ok(Err(DecisionError::InvalidAction(ParseActionError(label)))) => {
            Decision::Idle(IdleReason::InvalidAction(label))
        }
        Ok(Err(DecisionError::Failed(msg))) => Decision::Idle(IdleReason::Failed(msg)),
        Err(payload) => Decision::Idle(IdleReason::Panicked(panic_message(payload.as_ref()))),
    };

    DecisionReport {
        decision,
        elapsed,
        over_budget: elapsed > budget,
    }
}
