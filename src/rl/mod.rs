// src/rl/mod.rs
//
// Tabular Q-learning core.
//
// Key components:
// - TransitionTable: explicit (state, action) -> (next, terminal) lookup
// - RewardFunction: progress-shaped reward with optional bounded noise
// - EpsilonSchedule: per-episode exploration probability
// - QTable: fixed 5x4 action-value array
// - Learner: epsilon-greedy episode loop and Bellman updates
// - Policy: greedy extraction over the non-terminal states
// - JsonlSink: line-delimited JSON telemetry
//
// Everything here is single-threaded and strictly ordered; the only mutable
// state is the Learner's Q-table and RNG.

pub mod epsilon;
pub mod learner;
pub mod policy;
pub mod q_table;
pub mod reward;
pub mod telemetry;
pub mod transition;

pub use epsilon::EpsilonSchedule;
pub use learner::{
    ActionChoice, EpisodeSummary, Learner, StepEvent, TerminationReason, TrainingSummary,
};
pub use policy::{Policy, PolicyError, Rollout, NON_TERMINAL_STATES, OPTIMAL_POLICY};
pub use q_table::{QTable, QUpdate};
pub use reward::RewardFunction;
pub use telemetry::JsonlSink;
pub use transition::{step, Transition, TransitionTable, PRODUCTIVE_MOVES};
