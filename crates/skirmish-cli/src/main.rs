//! Headless match runner for the skirmish arena.
//!
//! Runs one or more seeded matches between built-in demo bots, prints a
//! summary and optionally writes JSON replays.
//!
//! ```text
//! skirmish --agents 6 --teams 2 --matches 20 --seed 100
//! skirmish --config arena.json --replay match.json
//! ```

mod bots;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::runner::MatchRunner;
use skirmish_core::{Combatant, MatchResult, SimConfig, TeamId};
use tracing::info;

use crate::bots::Bot;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Seed of the first match; match `i` uses `seed + i`.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of matches to run in parallel.
    #[arg(short, long, default_value_t = 1)]
    matches: u64,

    /// Agents per match.
    #[arg(short, long, default_value_t = 4)]
    agents: usize,

    /// Split agents round-robin into this many teams.
    #[arg(short, long)]
    teams: Option<u32>,

    /// Bots assigned to agents in turn.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [Bot::Turret, Bot::Hunter, Bot::Wanderer])]
    bots: Vec<Bot>,

    /// Tick budget per match.
    #[arg(long, default_value_t = 2000)]
    max_turns: u64,

    /// JSON file overriding engine defaults; missing fields keep defaults.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a replay here; with several matches the seed is appended.
    #[arg(short, long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Record every n-th tick into the replay.
    #[arg(long, default_value_t = 1)]
    frame_interval: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level);

    let config = load_config(args.config.as_deref())?;
    config.validate().context("invalid engine configuration")?;
    anyhow::ensure!(args.agents >= 1, "at least one agent is required");
    anyhow::ensure!(!args.bots.is_empty(), "at least one bot kind is required");
    if let Some(teams) = args.teams {
        anyhow::ensure!(teams >= 1, "team count must be positive");
    }

    let runner = MatchRunner {
        max_turns: args.max_turns,
        frame_interval: args.replay.as_ref().map(|_| args.frame_interval),
        ..MatchRunner::default()
    };
    let seeds: Vec<u64> = (0..args.matches).map(|i| args.seed.wrapping_add(i)).collect();

    info!(
        matches = seeds.len(),
        agents = args.agents,
        teams = ?args.teams,
        max_turns = args.max_turns,
        "Starting matches"
    );

    let results = runner.run_batch(&config, &seeds, |_| roster(&args));

    let mut wins: BTreeMap<String, u64> = BTreeMap::new();
    let mut draws = 0_u64;
    for (seed, result) in seeds.iter().zip(results) {
        let result = result.with_context(|| format!("match with seed {seed} failed to start"))?;
        print_result(*seed, &result);

        match winner_label(&result) {
            Some(label) => *wins.entry(label).or_default() += 1,
            None => draws += 1,
        }

        if let (Some(path), Some(recording)) = (&args.replay, &result.recording) {
            let path = replay_path(path, *seed, seeds.len() > 1);
            recording
                .save(&path)
                .with_context(|| format!("failed to write replay {}", path.display()))?;
            info!(path = %path.display(), frames = recording.len(), "Replay written");
        }
    }

    println!();
    println!("{:<20} {:>6}", "winner", "wins");
    for (name, count) in &wins {
        println!("{name:<20} {count:>6}");
    }
    println!("{:<20} {:>6}", "(draw)", draws);

    Ok(())
}

fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn roster(args: &CliArgs) -> Vec<Combatant> {
    (0..args.agents)
        .map(|i| {
            let bot = args.bots[i % args.bots.len()];
            let name = format!("{bot}-{i}");
            match team_of(i, args.teams) {
                Some(team) => Combatant::on_team(name, team, bot.strategy()),
                None => Combatant::new(name, bot.strategy()),
            }
        })
        .collect()
}

/// Round-robin team assignment; teams are numbered from 1.
fn team_of(index: usize, teams: Option<u32>) -> Option<TeamId> {
    let teams = teams?;
    let slot = u32::try_from(index).ok()? % teams;
    Some(TeamId(slot + 1))
}

fn replay_path(base: &Path, seed: u64, per_seed: bool) -> PathBuf {
    if !per_seed {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("replay");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("json");
    base.with_file_name(format!("{stem}-{seed}.{ext}"))
}

/// Team matches credit the team; free-for-all matches credit the agent.
fn winner_label(result: &MatchResult) -> Option<String> {
    match (result.winning_team, &result.winner) {
        (Some(team), _) => Some(format!("team {team}")),
        (None, Some(name)) => Some(name.clone()),
        (None, None) => None,
    }
}

fn print_result(seed: u64, result: &MatchResult) {
    let winner = winner_label(result).unwrap_or_else(|| "-".to_string());
    println!(
        "seed {seed:>6}  turns {:>5}  {:<16} {:?} ({:?})",
        result.turns, winner, result.verdict, result.stop
    );
    for agent in &result.final_snapshot.agents {
        println!(
            "    {:<16} hp {:>4}  kills {:>2}  deaths {:>2}  {}",
            agent.name, agent.health, agent.kills, agent.deaths, agent.weapon
        );
    }
}
