// tests/learner_determinism_tests.rs
//
// Reproducibility of training runs.
//
// These tests verify:
// 1. Same seed + same hyperparameters => bit-identical Q-tables.
// 2. The same holds with reward noise enabled (noise comes from the same RNG).
// 3. Different seeds diverge once exploration is on.
// 4. Injecting an RNG directly is equivalent to seeding through the config.
// 5. Observers cannot influence the run.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tummytime::{
    Learner, LearnerConfig, NoopSink, QTable, RecordingSink, RewardConfig, TrainingParams,
};

fn train_with(cfg: LearnerConfig, params: &TrainingParams) -> QTable {
    let mut learner = Learner::seeded(cfg).unwrap();
    learner.train(params, &mut NoopSink).unwrap();
    learner.snapshot()
}

#[test]
fn same_seed_same_q_table() {
    let params = TrainingParams::new(60, 0.1, 0.9);
    let cfg = LearnerConfig::default().with_seed(1234);

    let a = train_with(cfg.clone(), &params);
    let b = train_with(cfg, &params);

    assert_eq!(a, b);
    // Byte-for-byte through the JSON snapshot as well.
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn same_seed_same_q_table_with_reward_noise() {
    let params = TrainingParams::new(60, 0.2, 0.95);
    let cfg = LearnerConfig::default()
        .with_seed(99)
        .with_reward(RewardConfig::noisy());

    let a = train_with(cfg.clone(), &params);
    let b = train_with(cfg, &params);
    assert_eq!(a, b);
}

#[test]
fn different_seeds_diverge() {
    let params = TrainingParams::new(30, 0.1, 0.9);
    let a = train_with(LearnerConfig::default().with_seed(1), &params);
    let b = train_with(LearnerConfig::default().with_seed(2), &params);
    assert_ne!(a, b);
}

#[test]
fn injected_rng_matches_config_seed() {
    let params = TrainingParams::new(40, 0.1, 0.9);
    let cfg = LearnerConfig::default().with_seed(77);

    let mut injected = Learner::with_rng(cfg.clone(), ChaCha8Rng::seed_from_u64(77)).unwrap();
    injected.train(&params, &mut NoopSink).unwrap();

    assert_eq!(injected.snapshot(), train_with(cfg, &params));
}

#[test]
fn observer_does_not_change_the_run() {
    let params = TrainingParams::new(40, 0.1, 0.9);
    let cfg = LearnerConfig::default().with_seed(5);

    let mut observed = Learner::seeded(cfg.clone()).unwrap();
    let mut rec = RecordingSink::default();
    let summary = observed.train(&params, &mut rec).unwrap();

    assert_eq!(observed.snapshot(), train_with(cfg, &params));
    assert_eq!(rec.steps.len() as u64, summary.total_steps());
    assert_eq!(rec.episodes, summary.episodes);
    assert_eq!(rec.snapshots.last(), Some(&observed.snapshot()));
}

#[test]
fn step_events_replay_identically() {
    let params = TrainingParams::new(15, 0.1, 0.9);
    let cfg = LearnerConfig::default().with_seed(2024);

    let mut rec_a = RecordingSink::default();
    let mut rec_b = RecordingSink::default();
    Learner::seeded(cfg.clone())
        .unwrap()
        .train(&params, &mut rec_a)
        .unwrap();
    Learner::seeded(cfg).unwrap().train(&params, &mut rec_b).unwrap();

    assert_eq!(rec_a.steps, rec_b.steps);
}
