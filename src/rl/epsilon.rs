// src/rl/epsilon.rs
//
// Exploration schedule for the epsilon-greedy policy.
//
// epsilon(e) = max(epsilon_min, epsilon_decay ^ e), e zero-based.
// A constant variant exists so callers can force pure exploitation.

use serde::Serialize;

use crate::config::{ConfigError, DecayProfile};

/// Episode-indexed exploration probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpsilonSchedule {
    /// Exponential decay floored at `epsilon_min`.
    Decaying { epsilon_min: f64, epsilon_decay: f64 },
    /// Same epsilon for every episode.
    Constant { epsilon: f64 },
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        Self::from_profile(DecayProfile::default())
    }
}

impl EpsilonSchedule {
    pub fn decaying(epsilon_min: f64, epsilon_decay: f64) -> Self {
        EpsilonSchedule::Decaying {
            epsilon_min,
            epsilon_decay,
        }
    }

    pub fn constant(epsilon: f64) -> Self {
        EpsilonSchedule::Constant { epsilon }
    }

    /// Pure exploitation: never explore.
    pub fn greedy() -> Self {
        Self::constant(0.0)
    }

    pub fn from_profile(profile: DecayProfile) -> Self {
        Self::decaying(profile.epsilon_min(), profile.epsilon_decay())
    }

    /// Exploration probability for a zero-based episode index.
    pub fn epsilon(&self, episode_index: u64) -> f64 {
        match *self {
            EpsilonSchedule::Decaying {
                epsilon_min,
                epsilon_decay,
            } => {
                let decayed = if episode_index == 0 {
                    1.0
                } else {
                    epsilon_decay.powf(episode_index as f64)
                };
                decayed.max(epsilon_min)
            }
            EpsilonSchedule::Constant { epsilon } => epsilon,
        }
    }

    /// Lower bound reached once decay has run its course.
    pub fn floor(&self) -> f64 {
        match *self {
            EpsilonSchedule::Decaying { epsilon_min, .. } => epsilon_min,
            EpsilonSchedule::Constant { epsilon } => epsilon,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            EpsilonSchedule::Decaying {
                epsilon_min,
                epsilon_decay,
            } => {
                if !(0.0..=1.0).contains(&epsilon_min) {
                    return Err(ConfigError::InvalidEpsilon {
                        field: "epsilon_min",
                        value: epsilon_min,
                    });
                }
                if !(epsilon_decay > 0.0 && epsilon_decay <= 1.0) {
                    return Err(ConfigError::InvalidEpsilon {
                        field: "epsilon_decay",
                        value: epsilon_decay,
                    });
                }
                Ok(())
            }
            EpsilonSchedule::Constant { epsilon } => {
                if !(0.0..=1.0).contains(&epsilon) {
                    return Err(ConfigError::InvalidEpsilon {
                        field: "epsilon",
                        value: epsilon,
                    });
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one_and_floors_at_min() {
        let schedule = EpsilonSchedule::decaying(0.01, 0.8);
        assert_eq!(schedule.epsilon(0), 1.0);
        assert!((schedule.epsilon(1) - 0.8).abs() < 1e-12);
        assert!((schedule.epsilon(2) - 0.64).abs() < 1e-12);
        // 0.8^21 ~= 0.0092 < 0.01
        assert_eq!(schedule.epsilon(21), 0.01);
        assert_eq!(schedule.epsilon(u64::MAX), 0.01);
    }

    #[test]
    fn non_increasing_for_both_profiles() {
        for profile in [DecayProfile::Fast, DecayProfile::Slow] {
            let schedule = EpsilonSchedule::from_profile(profile);
            let mut prev = schedule.epsilon(0);
            for e in 1..2_000 {
                let eps = schedule.epsilon(e);
                assert!(eps <= prev, "{profile:?}: epsilon rose at episode {e}");
                assert!(eps >= profile.epsilon_min());
                prev = eps;
            }
        }
    }

    #[test]
    fn decay_of_one_never_decays() {
        let schedule = EpsilonSchedule::decaying(0.01, 1.0);
        assert_eq!(schedule.epsilon(0), 1.0);
        assert_eq!(schedule.epsilon(500), 1.0);
    }

    #[test]
    fn greedy_is_zero_from_the_first_episode() {
        let schedule = EpsilonSchedule::greedy();
        assert_eq!(schedule.epsilon(0), 0.0);
        assert_eq!(schedule.epsilon(10), 0.0);
        assert_eq!(schedule.floor(), 0.0);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(EpsilonSchedule::decaying(0.01, 0.995).validate().is_ok());
        assert!(EpsilonSchedule::decaying(-0.1, 0.9).validate().is_err());
        assert!(EpsilonSchedule::decaying(0.01, 0.0).validate().is_err());
        assert!(EpsilonSchedule::decaying(0.01, 1.2).validate().is_err());
        assert!(EpsilonSchedule::decaying(0.01, f64::NAN).validate().is_err());
        assert!(EpsilonSchedule::constant(1.5).validate().is_err());
    }
}
