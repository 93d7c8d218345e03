// tests/telemetry_tests.rs
//
// JSONL telemetry sink against a real filesystem.
//
// These tests verify:
// 1. One line per step plus one per episode, each a tagged JSON object.
// 2. Episode-end records carry the Q-table snapshot.
// 3. Missing parent directories are created; the file is appended to.
// 4. An unwritable path disables the sink without failing training.
// 5. Same seed => byte-identical telemetry files.
// 6. Logged records read back into StepEvent / EpisodeSummary.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tempfile::tempdir;

use tummytime::{
    EpisodeSummary, JsonlSink, Learner, LearnerConfig, State, StepEvent, TrainingParams,
    TrainingSummary,
};

fn run_to(path: &Path, cfg: LearnerConfig, episodes: u64) -> (TrainingSummary, Learner) {
    let mut learner = Learner::seeded(cfg).unwrap();
    let mut sink = JsonlSink::enable(path);
    let summary = learner
        .train(&TrainingParams::new(episodes, 0.1, 0.9), &mut sink)
        .unwrap();
    drop(sink);
    (summary, learner)
}

fn read_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn writes_one_record_per_step_and_episode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("run.jsonl");

    let (summary, learner) = run_to(&path, LearnerConfig::default().with_seed(3), 5);
    let records = read_lines(&path);

    let steps: Vec<&Value> = records.iter().filter(|r| r["record"] == "step").collect();
    let ends: Vec<&Value> = records
        .iter()
        .filter(|r| r["record"] == "episode_end")
        .collect();

    assert_eq!(steps.len() as u64, summary.total_steps());
    assert_eq!(ends.len(), 5);
    assert_eq!(records.len(), steps.len() + ends.len());

    // First record is the first step of episode 0, starting at back.
    assert_eq!(records[0]["record"], "step");
    assert_eq!(records[0]["episode"], 0);
    assert_eq!(records[0]["step"], 0);
    assert_eq!(records[0]["state"], "back");

    // Last record is the final episode end, with the final table.
    let last = records.last().unwrap();
    assert_eq!(last["record"], "episode_end");
    assert_eq!(last["episode"], 4);
    assert_eq!(last["termination_reason"], "Terminal");
    for (state, action, value) in learner.q_table().entries() {
        let logged = last["q_table"][state.as_str()][action.as_str()]
            .as_f64()
            .unwrap();
        assert!((logged - value).abs() < 1e-12, "{state}/{action}");
    }
}

#[test]
fn appends_across_runs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.jsonl");

    run_to(&path, LearnerConfig::greedy(), 2);
    let once = read_lines(&path).len();
    run_to(&path, LearnerConfig::greedy(), 2);
    assert_eq!(read_lines(&path).len(), once * 2);
}

#[test]
fn episodes_only_skips_step_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("episodes.jsonl");

    let mut learner = Learner::seeded(LearnerConfig::greedy()).unwrap();
    let mut sink = JsonlSink::enable(&path).episodes_only();
    learner
        .train(&TrainingParams::new(4, 0.1, 0.9), &mut sink)
        .unwrap();
    assert_eq!(sink.records_written(), 4);
    drop(sink);

    let records = read_lines(&path);
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r["record"] == "episode_end"));
}

#[test]
fn unwritable_path_disables_sink_but_training_succeeds() {
    let dir = tempdir().unwrap();
    // A regular file where a directory is expected.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();
    let path = blocker.join("run.jsonl");

    let mut learner = Learner::seeded(LearnerConfig::greedy()).unwrap();
    let mut sink = JsonlSink::enable(&path);
    let summary = learner
        .train(&TrainingParams::new(3, 0.1, 0.9), &mut sink)
        .unwrap();

    assert_eq!(summary.episodes.len(), 3);
    assert!(!sink.is_enabled());
    assert_eq!(sink.records_written(), 0);
    assert!(!path.exists());
}

#[test]
fn same_seed_writes_identical_files() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.jsonl");
    let b = dir.path().join("b.jsonl");

    run_to(&a, LearnerConfig::default().with_seed(11), 10);
    run_to(&b, LearnerConfig::default().with_seed(11), 10);

    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn logged_records_read_back_as_events() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("replay.jsonl");

    let mut learner = Learner::seeded(LearnerConfig::default().with_seed(17)).unwrap();
    let mut sink = JsonlSink::enable(&path);
    let summary = learner
        .train(&TrainingParams::new(6, 0.1, 0.9), &mut sink)
        .unwrap();
    drop(sink);

    let text = fs::read_to_string(&path).unwrap();
    let mut steps: Vec<StepEvent> = Vec::new();
    let mut episodes: Vec<EpisodeSummary> = Vec::new();
    for line in text.lines() {
        let value: Value = serde_json::from_str(line).unwrap();
        match value["record"].as_str() {
            Some("step") => steps.push(serde_json::from_value(value).unwrap()),
            Some("episode_end") => episodes.push(serde_json::from_value(value).unwrap()),
            other => panic!("unexpected record tag {other:?}"),
        }
    }

    assert_eq!(steps.len() as u64, summary.total_steps());
    assert_eq!(episodes.len(), summary.episodes.len());
    for (logged, run) in episodes.iter().zip(&summary.episodes) {
        assert_eq!(logged.episode, run.episode);
        assert_eq!(logged.steps, run.steps);
        assert_eq!(logged.explored_steps, run.explored_steps);
        assert_eq!(logged.termination_reason, run.termination_reason);
        assert!((logged.total_reward - run.total_reward).abs() < 1e-12);
    }
    // Per-episode step indices restart at zero and the chain starts at back.
    for e in steps.iter().filter(|e| e.step == 0) {
        assert_eq!(e.state, State::Back);
    }
    assert!(steps.last().unwrap().terminal);
}
