// src/rl/q_table.rs
//
// Fixed-size action-value table indexed by dense State/Action enums.
//
// The table always holds exactly one entry per (state, action) pair.
// Entries are only ever overwritten, never added or removed.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{Action, State, NUM_ACTIONS, NUM_STATES};

/// Record of a single Q-learning update, for telemetry and tests.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct QUpdate {
    pub state: State,
    pub action: Action,
    /// Value before the update.
    pub previous: f64,
    /// reward + gamma * max_a' Q(next, a').
    pub target: f64,
    /// Value after the update.
    pub updated: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QTable {
    values: [[f64; NUM_ACTIONS]; NUM_STATES],
}

impl QTable {
    /// All-zero table.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, state: State, action: Action) -> f64 {
        self.values[state.index()][action.index()]
    }

    /// Action values for one state, in `Action::ALL` order.
    #[inline]
    pub fn row(&self, state: State) -> &[f64; NUM_ACTIONS] {
        &self.values[state.index()]
    }

    /// Highest action value in a state.
    pub fn max_value(&self, state: State) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Highest-valued action; ties go to the earliest action in
    /// `Action::ALL`.
    pub fn greedy_action(&self, state: State) -> Action {
        let row = self.row(state);
        let mut best = 0;
        for i in 1..NUM_ACTIONS {
            if row[i] > row[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// Q-learning update:
    ///
    /// Q(s,a) <- (1 - alpha) * Q(s,a) + alpha * (r + gamma * max_a' Q(s',a'))
    ///
    /// which is the same as Q + alpha * (target - Q). With alpha in [0, 1]
    /// the new value is a convex combination of the old value and target.
    pub fn update(
        &mut self,
        state: State,
        action: Action,
        reward: f64,
        next_state: State,
        learning_rate: f64,
        discount_factor: f64,
    ) -> QUpdate {
        let previous = self.get(state, action);
        let target = reward + discount_factor * self.max_value(next_state);
        let updated = previous * (1.0 - learning_rate) + learning_rate * target;
        self.values[state.index()][action.index()] = updated;
        QUpdate {
            state,
            action,
            previous,
            target,
            updated,
        }
    }

    /// Zero every entry.
    pub fn reset(&mut self) {
        self.values = [[0.0; NUM_ACTIONS]; NUM_STATES];
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().flatten().all(|&v| v == 0.0)
    }

    /// Every (state, action, value) triple in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (State, Action, f64)> + '_ {
        State::ALL
            .into_iter()
            .flat_map(move |s| Action::ALL.into_iter().map(move |a| (s, a, self.get(s, a))))
    }

    /// Number of entries (always NUM_STATES * NUM_ACTIONS).
    pub fn len(&self) -> usize {
        NUM_STATES * NUM_ACTIONS
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, state: State, action: Action, value: f64) {
        self.values[state.index()][action.index()] = value;
    }
}

/// Serializes as `{"back": {"lift_head": 0.1, ...}, ...}` in canonical
/// order, which is what display collaborators expect.
impl Serialize for QTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_STATES))?;
        for state in State::ALL {
            map.serialize_entry(state.as_str(), &RowView(self.row(state)))?;
        }
        map.end()
    }
}

struct RowView<'a>(&'a [f64; NUM_ACTIONS]);

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_ACTIONS))?;
        for action in Action::ALL {
            map.serialize_entry(action.as_str(), &self.0[action.index()])?;
        }
        map.end()
    }
}
