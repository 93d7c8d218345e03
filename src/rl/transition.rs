// src/rl/transition.rs
//
// Explicit (state, action) -> (next_state, terminal) table.
//
// Exactly four moves change the posture, each legal from one state with
// one action. Every other pair is a self-loop. A terminal state stays
// terminal whatever action is applied to it.

use serde::Serialize;

use crate::types::{Action, State, NUM_ACTIONS, NUM_STATES};

/// The canonical rolling chain: (from, action, to).
pub const PRODUCTIVE_MOVES: [(State, Action, State); 4] = [
    (State::Back, Action::LiftHead, State::LiftedHead),
    (State::LiftedHead, Action::ReachArm, State::ReachedArm),
    (State::ReachedArm, Action::BendLeg, State::BentLeg),
    (State::BentLeg, Action::KickLeg, State::Tummy),
];

/// Outcome of applying an action in a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub next_state: State,
    /// True when the episode ends on `next_state`.
    pub terminal: bool,
}

/// Lookup table over every (state, action) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    table: [[Transition; NUM_ACTIONS]; NUM_STATES],
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Shared canonical table, built at compile time.
pub const CANONICAL: TransitionTable = TransitionTable::canonical();

impl TransitionTable {
    /// Build the table: self-loops everywhere, then the productive chain.
    pub const fn canonical() -> Self {
        let mut table = [[Transition {
            next_state: State::Back,
            terminal: false,
        }; NUM_ACTIONS]; NUM_STATES];

        let mut s = 0;
        while s < NUM_STATES {
            let state = State::ALL[s];
            let mut a = 0;
            while a < NUM_ACTIONS {
                table[s][a] = Transition {
                    next_state: state,
                    terminal: state.is_terminal(),
                };
                a += 1;
            }
            s += 1;
        }

        let mut i = 0;
        while i < PRODUCTIVE_MOVES.len() {
            let (from, action, to) = PRODUCTIVE_MOVES[i];
            table[from.index()][action.index()] = Transition {
                next_state: to,
                terminal: to.is_terminal(),
            };
            i += 1;
        }

        Self { table }
    }

    #[inline]
    pub fn step(&self, state: State, action: Action) -> Transition {
        self.table[state.index()][action.index()]
    }

    /// True if the action moves the agent to a different state.
    pub fn is_productive(&self, state: State, action: Action) -> bool {
        self.step(state, action).next_state != state
    }

    /// All state-changing moves, in table order.
    pub fn productive_moves(&self) -> impl Iterator<Item = (State, Action, State)> + '_ {
        State::ALL.into_iter().flat_map(move |s| {
            Action::ALL.into_iter().filter_map(move |a| {
                let t = self.step(s, a);
                (t.next_state != s).then_some((s, a, t.next_state))
            })
        })
    }
}

/// Apply the canonical table.
#[inline]
pub fn step(state: State, action: Action) -> Transition {
    CANONICAL.step(state, action)
}
