//! Tummytime core library.
//!
//! A tabular Q-learning agent that learns the four-move sequence rolling a
//! simulated infant from `back` to `tummy`. The binary (`src/main.rs`) is a
//! thin training harness around these components; rendering and interactive
//! front ends consume the library through [`logging::StepObserver`] and the
//! read-only Q-table accessors.

pub mod config;
pub mod logging;
pub mod rl;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use config::{
    ConfigError, ContinuationMode, DecayProfile, LearnerConfig, RewardConfig, TrainingParams,
};

pub use logging::{ConsoleSink, NoopSink, RecordingSink, StepObserver};

pub use rl::{
    EpisodeSummary, EpsilonSchedule, JsonlSink, Learner, Policy, PolicyError, QTable, StepEvent,
    TerminationReason, TrainingSummary, TransitionTable,
};

pub use types::{Action, State, NUM_ACTIONS, NUM_STATES};
