//! Determinism verification tests.
//!
//! Two simulations built from the same configuration, roster and seed must
//! emit identical snapshots tick for tick, supplies and nudges included.

use crate::config::SimConfig;
use crate::replay::Recording;
use crate::runner::MatchRunner;
use crate::simulation::{Combatant, Simulation};
use crate::snapshot::TickSnapshot;

use super::helpers::gunner;

fn roster() -> Vec<Combatant> {
    ["north", "east", "south", "west"]
        .into_iter()
        .map(|name| Combatant {
            spec: crate::world::AgentSpec::new(name),
            strategy: gunner(),
        })
        .collect()
}

fn busy_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.supply.spawn_chance = 0.5;
    config
}

fn run(seed: u64, ticks: usize) -> Vec<TickSnapshot> {
    let mut sim = Simulation::new(busy_config(), roster(), seed).unwrap();
    (0..ticks).map(|_| sim.step()).collect()
}

#[test]
fn same_seed_same_snapshots() {
    let a = run(42, 300);
    let b = run(42, 300);
    assert_eq!(a, b);
}

#[test]
fn different_seeds_diverge() {
    let a = run(1, 50);
    let b = run(2, 50);
    assert_ne!(a, b);
}

#[test]
fn recorded_frames_match_a_fresh_run() {
    let runner = MatchRunner {
        max_turns: 250,
        frame_interval: Some(1),
        stall_timeout: None,
        slow_ticks: None,
    };
    let result = runner.run_seeded(&busy_config(), roster(), 11).unwrap();
    let recording = result.recording.unwrap();

    let json = recording.to_json().unwrap();
    let replayed = Recording::from_json(&json).unwrap();

    let fresh = run(11, recording.len());
    assert_eq!(replayed.frames, fresh);
    assert_eq!(replayed.config, busy_config());
}

#[test]
fn parallel_batch_is_reproducible() {
    let runner = MatchRunner {
        max_turns: 200,
        stall_timeout: None,
        slow_ticks: None,
        frame_interval: None,
    };
    let seeds: Vec<u64> = (0..6).collect();
    let first = runner.run_batch(&busy_config(), &seeds, |_| roster());
    let second = runner.run_batch(&busy_config(), &seeds, |_| roster());

    for (a, b) in first.into_iter().zip(second) {
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.final_snapshot, b.final_snapshot);
        assert_eq!(a.winner, b.winner);
    }
}
