// src/logging.rs
//
// Training observers.
// - StepObserver:  read-only hook called after every step / episode
// - NoopSink:      discards everything
// - ConsoleSink:   human-readable step trace
// - RecordingSink: keeps events in memory (tests, embedding UIs)
//
// The JSONL sink lives in rl::telemetry.

use std::io::{self, Write};

use crate::rl::learner::{EpisodeSummary, StepEvent};
use crate::rl::q_table::QTable;

/// Observer of training progress.
///
/// Observers only ever receive shared references, so they cannot alter
/// the Q-table, the update order, or the RNG stream.
pub trait StepObserver {
    fn on_step(&mut self, event: &StepEvent);

    fn on_episode_end(&mut self, _summary: &EpisodeSummary, _q_table: &QTable) {}
}

impl<T: StepObserver + ?Sized> StepObserver for &mut T {
    fn on_step(&mut self, event: &StepEvent) {
        (**self).on_step(event);
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary, q_table: &QTable) {
        (**self).on_episode_end(summary, q_table);
    }
}

impl<T: StepObserver + ?Sized> StepObserver for Box<T> {
    fn on_step(&mut self, event: &StepEvent) {
        (**self).on_step(event);
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary, q_table: &QTable) {
        (**self).on_episode_end(summary, q_table);
    }
}

/// Fan-out: every observer sees every event, in order.
impl<T: StepObserver> StepObserver for Vec<T> {
    fn on_step(&mut self, event: &StepEvent) {
        for o in self.iter_mut() {
            o.on_step(event);
        }
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary, q_table: &QTable) {
        for o in self.iter_mut() {
            o.on_episode_end(summary, q_table);
        }
    }
}

/// Observer that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl StepObserver for NoopSink {
    fn on_step(&mut self, _event: &StepEvent) {
        // intentionally no-op
    }
}

/// One line per step:
///
/// `STATE: back            -- ACTION: lift_head      * -- NEXT STATE: lifted_head`
///
/// `*` marks a randomly explored action. I/O errors are ignored so a closed
/// pipe never interrupts training.
pub struct ConsoleSink<W: Write = io::Stderr> {
    writer: W,
    steps: bool,
}

impl ConsoleSink<io::Stderr> {
    /// Trace every step to stderr.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            steps: true,
        }
    }

    /// Only print episode summaries.
    pub fn episodes_only(mut self) -> Self {
        self.steps = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StepObserver for ConsoleSink<W> {
    fn on_step(&mut self, event: &StepEvent) {
        if !self.steps {
            return;
        }
        let mark = if event.explored { "*" } else { "" };
        let _ = writeln!(
            self.writer,
            "STATE: {:15} -- ACTION: {:15}{:1} -- NEXT STATE: {}",
            event.state, event.action, mark, event.next_state
        );
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary, _q_table: &QTable) {
        let _ = writeln!(
            self.writer,
            "episode={} steps={} explored={} epsilon={:.4} total_reward={:.3} end={:?}",
            summary.episode + 1,
            summary.steps,
            summary.explored_steps,
            summary.epsilon,
            summary.total_reward,
            summary.termination_reason
        );
        let _ = self.writer.flush();
    }
}

/// In-memory observer.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub steps: Vec<StepEvent>,
    pub episodes: Vec<EpisodeSummary>,
    /// Q-table snapshot taken at the end of each episode.
    pub snapshots: Vec<QTable>,
}

impl RecordingSink {
    pub fn clear(&mut self) {
        self.steps.clear();
        self.episodes.clear();
        self.snapshots.clear();
    }
}

impl StepObserver for RecordingSink {
    fn on_step(&mut self, event: &StepEvent) {
        self.steps.push(event.clone());
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary, q_table: &QTable) {
        self.episodes.push(summary.clone());
        self.snapshots.push(*q_table);
    }
}
