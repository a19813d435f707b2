//! Built-in demo strategies.
//!
//! Every bot is a plain function of its [`Observation`], so a seeded match
//! plays out the same way on every run.

use std::f32::consts::{PI, TAU};
use std::fmt;

use clap::ValueEnum;
use glam::Vec2;
use skirmish_core::perception::Observation;
use skirmish_core::{Action, DecisionError, SupplyKind};

/// Aim tolerance in radians before a bot pulls the trigger.
const AIM_TOLERANCE: f32 = 0.25;

/// Distance a hunter tries to keep from its target.
const HUNTER_RANGE: f32 = 12.0;

/// Ticks a wanderer keeps one heading before picking the next.
const WANDER_LEG: u64 = 25;

/// Selectable demo bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Bot {
    /// Stands still, turns towards the nearest enemy and fires.
    Turret,
    /// Closes in on the nearest enemy, fires when aligned.
    Hunter,
    /// Roams the map collecting supplies, fires opportunistically.
    Wanderer,
}

impl Bot {
    /// Decision function for this bot.
    pub fn strategy(self) -> fn(&Observation) -> Result<Action, DecisionError> {
        match self {
            Self::Turret => turret,
            Self::Hunter => hunter,
            Self::Wanderer => wanderer,
        }
    }
}

impl fmt::Display for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Turret => "turret",
            Self::Hunter => "hunter",
            Self::Wanderer => "wanderer",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Steering
// =============================================================================

/// Turn that brings `direction` closer to pointing from `from` at `target`.
/// Turning right increases the facing angle.
fn turn_toward(from: Vec2, direction: Vec2, target: Vec2) -> Action {
    let delta = target - from;
    let wanted = delta.y.atan2(delta.x);
    let current = direction.y.atan2(direction.x);
    if (wanted - current).rem_euclid(TAU) < PI {
        Action::TurnRight
    } else {
        Action::TurnLeft
    }
}

/// Move along the dominant axis from `from` to `target`.
fn step_toward(from: Vec2, target: Vec2) -> Action {
    let delta = target - from;
    if delta.x.abs() >= delta.y.abs() {
        if delta.x >= 0.0 {
            Action::MoveRight
        } else {
            Action::MoveLeft
        }
    } else if delta.y >= 0.0 {
        Action::MoveDown
    } else {
        Action::MoveUp
    }
}

fn aim_or_fire(obs: &Observation, target: Vec2) -> Action {
    if obs.is_aiming_at(target, AIM_TOLERANCE) {
        Action::Shoot
    } else {
        turn_toward(obs.position, obs.direction, target)
    }
}

// =============================================================================
// Bots
// =============================================================================

/// Holds position and fires at whatever comes into view.
pub fn turret(obs: &Observation) -> Result<Action, DecisionError> {
    Ok(match obs.nearest_enemy() {
        Some(enemy) => aim_or_fire(obs, enemy.position),
        None => Action::TurnRight,
    })
}

/// Hunts the nearest enemy. Without one in sight, heads for health first,
/// then any supply, then the map center.
pub fn hunter(obs: &Observation) -> Result<Action, DecisionError> {
    if let Some(enemy) = obs.nearest_enemy() {
        if obs.cooldown == 0 || enemy.distance <= HUNTER_RANGE {
            return Ok(aim_or_fire(obs, enemy.position));
        }
        return Ok(step_toward(obs.position, enemy.position));
    }

    let wanted = obs
        .supplies
        .iter()
        .find(|s| s.kind == SupplyKind::Health)
        .or_else(|| obs.supplies.first());
    let target = wanted.map_or(obs.map_size / 2.0, |s| s.position);
    Ok(step_toward(obs.position, target))
}

/// Walks legs of a fixed square route and detours for supplies.
pub fn wanderer(obs: &Observation) -> Result<Action, DecisionError> {
    if let Some(enemy) = obs.nearest_enemy() {
        if obs.cooldown == 0 && obs.is_aiming_at(enemy.position, AIM_TOLERANCE) {
            return Ok(Action::Shoot);
        }
    }
    if let Some(supply) = obs.supplies.first() {
        return Ok(step_toward(obs.position, supply.position));
    }

    Ok(match (obs.turn / WANDER_LEG) % 4 {
        0 => Action::MoveRight,
        1 => Action::MoveDown,
        2 => Action::MoveLeft,
        _ => Action::MoveUp,
    })
}
