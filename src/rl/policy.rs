// src/rl/policy.rs
//
// Greedy policy extraction from a learned Q-table.
//
// A Policy covers the four non-terminal states only. Asking it about the
// terminal state is an error rather than a silent default. A five-state
// map (terminal included) is available for display via `display_map`.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::types::{Action, State, NUM_STATES};

use super::q_table::QTable;
use super::transition::TransitionTable;

/// States that carry a policy decision.
pub const NON_TERMINAL_STATES: [State; NUM_STATES - 1] = [
    State::Back,
    State::LiftedHead,
    State::ReachedArm,
    State::BentLeg,
];

/// The canonical rolling sequence.
pub const OPTIMAL_POLICY: [(State, Action); NUM_STATES - 1] = [
    (State::Back, Action::LiftHead),
    (State::LiftedHead, Action::ReachArm),
    (State::ReachedArm, Action::BendLeg),
    (State::BentLeg, Action::KickLeg),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("no policy defined for terminal state `{0}`")]
    NoPolicyDefined(State),
}

/// Deterministic state -> action mapping over the non-terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    actions: [Action; NUM_STATES - 1],
}

impl Policy {
    /// Greedy action per non-terminal state; ties go to the earliest action.
    pub fn from_q_table(q_table: &QTable) -> Self {
        Self {
            actions: NON_TERMINAL_STATES.map(|s| q_table.greedy_action(s)),
        }
    }

    pub fn optimal() -> Self {
        Self {
            actions: OPTIMAL_POLICY.map(|(_, a)| a),
        }
    }

    pub fn action_for(&self, state: State) -> Result<Action, PolicyError> {
        NON_TERMINAL_STATES
            .iter()
            .position(|&s| s == state)
            .map(|i| self.actions[i])
            .ok_or(PolicyError::NoPolicyDefined(state))
    }

    pub fn iter(&self) -> impl Iterator<Item = (State, Action)> + '_ {
        NON_TERMINAL_STATES.into_iter().zip(self.actions)
    }

    pub fn is_optimal(&self) -> bool {
        *self == Self::optimal()
    }

    /// Five-state map including the terminal state's greedy (no-op) action.
    /// Display only.
    pub fn display_map(q_table: &QTable) -> BTreeMap<State, Action> {
        State::ALL
            .into_iter()
            .map(|s| (s, q_table.greedy_action(s)))
            .collect()
    }

    /// Follow the policy from `back` through `transitions` for at most
    /// `max_steps` steps.
    pub fn rollout(&self, transitions: &TransitionTable, max_steps: usize) -> Rollout {
        let mut path = vec![State::START];
        let mut state = State::START;
        for _ in 0..max_steps {
            let Ok(action) = self.action_for(state) else {
                break;
            };
            let t = transitions.step(state, action);
            path.push(t.next_state);
            state = t.next_state;
            if t.terminal {
                return Rollout {
                    path,
                    reached_terminal: true,
                };
            }
        }
        Rollout {
            path,
            reached_terminal: state.is_terminal(),
        }
    }
}

/// States visited by a greedy rollout, starting with `back`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Rollout {
    pub path: Vec<State>,
    pub reached_terminal: bool,
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.actions.len()))?;
        for (state, action) in self.iter() {
            map.serialize_entry(state.as_str(), action.as_str())?;
        }
        map.end()
    }
}
