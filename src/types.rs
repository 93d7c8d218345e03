// src/types.rs
//
// Core domain vocabulary: the five postures and four movements.
//
// Both enums are dense (discriminants 0..N) so they can index fixed-size
// arrays directly. Labels are the stable snake_case names used in
// telemetry and JSON snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of postural states.
pub const NUM_STATES: usize = 5;

/// Number of movements available to the agent.
pub const NUM_ACTIONS: usize = 4;

/// Posture of the infant, ordered along the rolling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Back = 0,
    LiftedHead = 1,
    ReachedArm = 2,
    BentLeg = 3,
    Tummy = 4,
}

impl State {
    /// All states in canonical enumeration order.
    pub const ALL: [State; NUM_STATES] = [
        State::Back,
        State::LiftedHead,
        State::ReachedArm,
        State::BentLeg,
        State::Tummy,
    ];

    /// Every episode starts here.
    pub const START: State = State::Back;

    /// Dense index in `0..NUM_STATES`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Ordinal position along the intended path (0..=4).
    ///
    /// Only the reward function reads this.
    #[inline]
    pub const fn progress_rank(self) -> i32 {
        self as i32
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, State::Tummy)
    }

    /// Stable snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Back => "back",
            State::LiftedHead => "lifted_head",
            State::ReachedArm => "reached_arm",
            State::BentLeg => "bent_leg",
            State::Tummy => "tummy",
        }
    }

    /// Parse a state label (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<State> {
        let s = s.trim().to_ascii_lowercase();
        State::ALL.into_iter().find(|state| state.as_str() == s)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Movement the agent can attempt from any posture.
///
/// Whether a movement does anything is decided by the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    LiftHead = 0,
    ReachArm = 1,
    BendLeg = 2,
    KickLeg = 3,
}

impl Action {
    /// All actions in canonical enumeration order. Greedy ties resolve to
    /// the earliest entry.
    pub const ALL: [Action; NUM_ACTIONS] = [
        Action::LiftHead,
        Action::ReachArm,
        Action::BendLeg,
        Action::KickLeg,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Action::index`].
    pub fn from_index(index: usize) -> Option<Action> {
        Action::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::LiftHead => "lift_head",
            Action::ReachArm => "reach_arm",
            Action::BendLeg => "bend_leg",
            Action::KickLeg => "kick_leg",
        }
    }

    pub fn parse(s: &str) -> Option<Action> {
        let s = s.trim().to_ascii_lowercase();
        Action::ALL.into_iter().find(|action| action.as_str() == s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
