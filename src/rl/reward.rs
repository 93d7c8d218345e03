// src/rl/reward.rs
//
// Progress-shaped reward.
//
// r(s, s') = progress_scale * (rank(s') - rank(s))   if rank increases
//          = stall_penalty                             otherwise
//
// plus optional zero-mean Gaussian noise clipped to +/- 3 sigma. Noise is
// only drawn when enabled, so noise-free runs consume no randomness here.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::{ConfigError, RewardConfig};
use crate::types::State;

/// Noise is clipped to this many standard deviations.
const NOISE_CLIP_SIGMAS: f64 = 3.0;

#[derive(Debug, Clone)]
pub struct RewardFunction {
    config: RewardConfig,
    noise: Option<Normal<f64>>,
}

impl Default for RewardFunction {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl RewardFunction {
    pub fn new(config: RewardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let noise = if config.noise_std > 0.0 {
            let normal = Normal::new(0.0, config.noise_std)
                .map_err(|_| ConfigError::InvalidRewardNoise(config.noise_std))?;
            Some(normal)
        } else {
            None
        };
        Ok(Self { config, noise })
    }

    /// Default shaping, no noise.
    pub fn deterministic() -> Self {
        Self {
            config: RewardConfig::default(),
            noise: None,
        }
    }

    /// Default shaping with Gaussian noise of the given std.
    pub fn noisy(noise_std: f64) -> Result<Self, ConfigError> {
        Self::new(RewardConfig {
            noise_std,
            ..RewardConfig::default()
        })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn is_noisy(&self) -> bool {
        self.noise.is_some()
    }

    /// Largest absolute noise term this function can add.
    pub fn noise_bound(&self) -> f64 {
        NOISE_CLIP_SIGMAS * self.config.noise_std
    }

    /// Noise-free reward for moving from `current` to `next`.
    pub fn expected_reward(&self, current: State, next: State) -> f64 {
        let progress = next.progress_rank() - current.progress_rank();
        if progress > 0 {
            self.config.progress_scale * f64::from(progress)
        } else {
            self.config.stall_penalty
        }
    }

    /// Reward for one step, drawing noise from `rng` when enabled.
    pub fn reward<R: Rng + ?Sized>(&self, current: State, next: State, rng: &mut R) -> f64 {
        let base = self.expected_reward(current, next);
        match &self.noise {
            Some(normal) => {
                let bound = self.noise_bound();
                base + normal.sample(rng).clamp(-bound, bound)
            }
            None => base,
        }
    }
}
