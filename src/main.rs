// src/main.rs
//
// Thin harness around the tummytime library.
// All of the real logic lives in the lib crate (learner, policy, sinks).

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use tummytime::rl::policy::Rollout;
use tummytime::{
    Action, ConsoleSink, DecayProfile, EpsilonSchedule, JsonlSink, Learner, LearnerConfig, NoopSink,
    Policy, QTable, RewardConfig, State, StepObserver, TrainingParams, TransitionTable,
};

/// Command-line arguments for the tummytime binary.
#[derive(Parser, Debug)]
#[command(name = "tummytime", about = "Q-learning from back to tummy")]
struct Cli {
    /// Number of training episodes.
    #[arg(long, default_value_t = 100)]
    episodes: u64,

    /// Learning rate alpha in [0, 1].
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Discount factor gamma in [0, 1].
    #[arg(long, default_value_t = 0.99)]
    discount_factor: f64,

    /// RNG seed. Overrides TUMMYTIME_SEED.
    #[arg(long)]
    seed: Option<u64>,

    /// Epsilon decay profile: "fast" (0.8) or "slow" (0.995).
    #[arg(long, value_parser = parse_decay_profile)]
    decay_profile: Option<DecayProfile>,

    /// Std of Gaussian reward noise (0 = deterministic).
    #[arg(long)]
    noise_std: Option<f64>,

    /// Disable exploration entirely (epsilon = 0).
    #[arg(long)]
    greedy: bool,

    /// Print one line per step to stderr.
    #[arg(long)]
    trace: bool,

    /// Optional JSONL path for step / episode telemetry.
    #[arg(long)]
    log_jsonl: Option<String>,
}

fn parse_decay_profile(s: &str) -> Result<DecayProfile, String> {
    DecayProfile::parse(s).ok_or_else(|| format!("unknown decay profile `{s}` (fast | slow)"))
}

/// Final artifacts printed to stdout.
#[derive(Serialize)]
struct Report<'a> {
    episodes: u64,
    q_table: &'a QTable,
    policy: Policy,
    /// Greedy action for all five states, terminal included.
    display_policy: BTreeMap<State, Action>,
    optimal: bool,
    rollout: Rollout,
}

/// Build the learner config from defaults, then env, then CLI flags.
fn build_config(cli: &Cli) -> LearnerConfig {
    let mut cfg = LearnerConfig::from_env_or_default();

    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    if let Some(profile) = cli.decay_profile {
        cfg.epsilon = EpsilonSchedule::from_profile(profile);
    }
    if let Some(noise_std) = cli.noise_std {
        cfg.reward = RewardConfig {
            noise_std,
            ..cfg.reward
        };
    }
    if cli.greedy {
        cfg.epsilon = EpsilonSchedule::greedy();
    }

    cfg
}

/// Build the observer chain as trait objects so sinks can be chosen at
/// runtime.
fn build_observers(cli: &Cli) -> Vec<Box<dyn StepObserver>> {
    let mut observers: Vec<Box<dyn StepObserver>> = Vec::new();

    if cli.trace {
        observers.push(Box::new(ConsoleSink::stderr()));
    }

    let jsonl = match cli.log_jsonl.as_deref() {
        Some(path) => JsonlSink::enable(path),
        None => JsonlSink::from_env(),
    };
    if jsonl.is_enabled() {
        observers.push(Box::new(jsonl));
    }

    if observers.is_empty() {
        observers.push(Box::new(NoopSink));
    }
    observers
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = build_config(&cli);
    let params = TrainingParams::new(cli.episodes, cli.learning_rate, cli.discount_factor);

    let mut learner = Learner::seeded(cfg).context("invalid learner configuration")?;
    let mut observers = build_observers(&cli);

    let summary = learner
        .train(&params, &mut observers)
        .context("training failed")?;
    // Drop flushes the JSONL writer before we report.
    drop(observers);

    let q_table = learner.snapshot();
    let policy = summary.final_policy;
    let report = Report {
        episodes: learner.episodes_completed(),
        q_table: &q_table,
        policy,
        display_policy: Policy::display_map(&q_table),
        optimal: policy.is_optimal(),
        rollout: policy.rollout(&TransitionTable::canonical(), 16),
    };
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");

    let last_steps = summary.episodes.last().map(|e| e.steps).unwrap_or(0);
    eprintln!(
        "[tummytime] episodes={} reached_tummy={} total_steps={} explored={} last_episode_steps={} optimal={}",
        summary.episodes.len(),
        summary.reached_terminal_count(),
        summary.total_steps(),
        summary.explored_steps(),
        last_steps,
        report.optimal,
    );

    Ok(())
}
