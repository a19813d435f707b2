use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_core::{Action, Combatant, DecisionError, MatchRunner, Observation, SimConfig, Simulation};

fn turret(obs: &Observation) -> Result<Action, DecisionError> {
    match obs.nearest_enemy() {
        Some(e) if obs.is_aiming_at(e.position, 0.2) => Ok(Action::Shoot),
        Some(_) => Ok(Action::TurnRight),
        None => Ok(Action::MoveRight),
    }
}

fn roster(size: usize) -> Vec<Combatant> {
    (0..size).map(|i| Combatant::new(format!("bot{i}"), turret)).collect()
}

fn busy_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.supply.spawn_chance = 0.5;
    config
}

fn bench_step(c: &mut Criterion) {
    let mut sim = Simulation::new(busy_config(), roster(4), 7).unwrap();

    c.bench_function("step_4_agents", |b| b.iter(|| black_box(sim.step())));
}

fn bench_step_crowded(c: &mut Criterion) {
    // 16 agents still fit the default placement margins
    let mut sim = Simulation::new(busy_config(), roster(16), 7).unwrap();

    c.bench_function("step_16_agents", |b| b.iter(|| black_box(sim.step())));
}

fn bench_full_match(c: &mut Criterion) {
    let runner = MatchRunner {
        max_turns: 500,
        stall_timeout: None,
        slow_ticks: None,
        frame_interval: None,
    };
    let config = busy_config();

    c.bench_function("match_500_turns", |b| {
        b.iter(|| runner.run_seeded(&config, roster(4), black_box(3)))
    });
}

criterion_group!(benches, bench_step, bench_step_crowded, bench_full_match);
criterion_main!(benches);
