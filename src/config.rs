// src/config.rs
//
// Central configuration for the tummytime learner.
//
// Two layers:
// - TrainingParams: per-call hyperparameters (episodes, alpha, gamma),
//   supplied by the caller at each `train` invocation.
// - LearnerConfig: everything fixed for the lifetime of a learner
//   (exploration schedule, reward shaping, step guard, seed, and what a
//   repeated `train` call does to existing state).
//
// Validation never clamps: out-of-range values are rejected with a
// ConfigError so the update rule stays well-defined.

use thiserror::Error;

use crate::rl::epsilon::EpsilonSchedule;

/// Configuration errors. These are the only failure mode of the core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("learning rate must lie in [0, 1], got {0}")]
    InvalidLearningRate(f64),
    #[error("discount factor must lie in [0, 1], got {0}")]
    InvalidDiscountFactor(f64),
    #[error("episode count must be positive, got {0}")]
    InvalidEpisodeCount(u64),
    #[error("invalid exploration parameter {field} = {value}")]
    InvalidEpsilon { field: &'static str, value: f64 },
    #[error("reward noise std must be finite and non-negative, got {0}")]
    InvalidRewardNoise(f64),
    #[error("invalid reward shaping {field} = {value}")]
    InvalidRewardShaping { field: &'static str, value: f64 },
    #[error("max steps per episode must be positive")]
    InvalidMaxSteps,
}

/// Hyperparameters for a single training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub num_episodes: u64,
    /// Step size alpha in [0, 1].
    pub learning_rate: f64,
    /// Weight gamma in [0, 1] on the best next-state estimate.
    pub discount_factor: f64,
}

impl Default for TrainingParams {
    /// Defaults of the command-line harness.
    fn default() -> Self {
        Self {
            num_episodes: 100,
            learning_rate: 0.1,
            discount_factor: 0.99,
        }
    }
}

impl TrainingParams {
    pub fn new(num_episodes: u64, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            num_episodes,
            learning_rate,
            discount_factor,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_episodes == 0 {
            return Err(ConfigError::InvalidEpisodeCount(self.num_episodes));
        }
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(ConfigError::InvalidDiscountFactor(self.discount_factor));
        }
        Ok(())
    }
}

/// Exploration decay preset.
///
/// Both presets floor at epsilon_min = 0.01; they differ in how fast
/// exploration fades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecayProfile {
    /// epsilon_decay = 0.8: mostly greedy after ~20 episodes.
    #[default]
    Fast,
    /// epsilon_decay = 0.995: exploration lingers for hundreds of episodes.
    Slow,
}

impl DecayProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecayProfile::Fast => "fast",
            DecayProfile::Slow => "slow",
        }
    }

    /// Parse a profile name (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<DecayProfile> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "f" | "short" => Some(DecayProfile::Fast),
            "slow" | "s" | "long" => Some(DecayProfile::Slow),
            _ => None,
        }
    }

    pub fn epsilon_min(&self) -> f64 {
        0.01
    }

    pub fn epsilon_decay(&self) -> f64 {
        match self {
            DecayProfile::Fast => 0.8,
            DecayProfile::Slow => 0.995,
        }
    }
}

/// Reward shaping constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardConfig {
    /// Multiplier on positive rank progress.
    pub progress_scale: f64,
    /// Reward for any step that does not increase rank.
    pub stall_penalty: f64,
    /// Std of zero-mean Gaussian noise added to every reward. 0 disables it.
    pub noise_std: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            progress_scale: 1.0,
            stall_penalty: -0.1,
            noise_std: 0.0,
        }
    }
}

impl RewardConfig {
    /// Default shaping with sigma = 0.1 noise.
    pub fn noisy() -> Self {
        Self {
            noise_std: 0.1,
            ..Self::default()
        }
    }

    /// Progress must pay a positive finite amount and the stall penalty
    /// must be finite, otherwise Q-values stop being finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.progress_scale.is_finite() && self.progress_scale > 0.0) {
            return Err(ConfigError::InvalidRewardShaping {
                field: "progress_scale",
                value: self.progress_scale,
            });
        }
        if !self.stall_penalty.is_finite() {
            return Err(ConfigError::InvalidRewardShaping {
                field: "stall_penalty",
                value: self.stall_penalty,
            });
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(ConfigError::InvalidRewardNoise(self.noise_std));
        }
        Ok(())
    }
}

/// What a `train` call does with state left by earlier calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuationMode {
    /// Keep the Q-table and keep counting episodes, so exploration keeps
    /// decaying across calls.
    #[default]
    Continue,
    /// Zero the Q-table and restart the episode counter on every call.
    Reset,
}

/// Lifetime configuration of a learner.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnerConfig {
    pub epsilon: EpsilonSchedule,
    pub reward: RewardConfig,
    /// Guard against runaway episodes. Reaching it ends the episode early.
    pub max_steps_per_episode: u64,
    /// Seed for the learner's RNG (exploration and reward noise).
    pub seed: u64,
    pub continuation: ContinuationMode,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            epsilon: EpsilonSchedule::default(),
            reward: RewardConfig::default(),
            max_steps_per_episode: 10_000,
            seed: 0,
            continuation: ContinuationMode::default(),
        }
    }
}

impl LearnerConfig {
    /// Default config with exploration disabled and deterministic rewards.
    pub fn greedy() -> Self {
        Self {
            epsilon: EpsilonSchedule::greedy(),
            ..Self::default()
        }
    }

    pub fn for_profile(profile: DecayProfile) -> Self {
        Self {
            epsilon: EpsilonSchedule::from_profile(profile),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_epsilon(mut self, epsilon: EpsilonSchedule) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps_per_episode = max_steps;
        self
    }

    pub fn with_continuation(mut self, mode: ContinuationMode) -> Self {
        self.continuation = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.epsilon.validate()?;
        self.reward.validate()?;
        if self.max_steps_per_episode == 0 {
            return Err(ConfigError::InvalidMaxSteps);
        }
        Ok(())
    }

    /// Build a config from defaults, then apply environment overrides.
    ///
    ///   - TUMMYTIME_SEED              (u64)
    ///   - TUMMYTIME_DECAY_PROFILE     ("fast" | "slow")
    ///   - TUMMYTIME_EPSILON_MIN       (f64)
    ///   - TUMMYTIME_EPSILON_DECAY     (f64)
    ///   - TUMMYTIME_REWARD_NOISE_STD  (f64)
    ///   - TUMMYTIME_MAX_STEPS         (u64)
    ///
    /// Any variable that fails to parse is ignored with a warning.
    /// Range checks are left to `validate`.
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env_or_default` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = LearnerConfig::default();

        if let Some(raw) = lookup("TUMMYTIME_DECAY_PROFILE") {
            match DecayProfile::parse(&raw) {
                Some(p) => {
                    cfg.epsilon = EpsilonSchedule::from_profile(p);
                    eprintln!("[config] TUMMYTIME_DECAY_PROFILE = {} (overrode default)", p.as_str());
                }
                None => {
                    eprintln!(
                        "[config] WARN: invalid TUMMYTIME_DECAY_PROFILE={:?}; ignoring",
                        raw
                    );
                }
            }
        }

        // Individual epsilon knobs refine whatever schedule the profile chose.
        let (mut eps_min, mut eps_decay) = match cfg.epsilon {
            EpsilonSchedule::Decaying {
                epsilon_min,
                epsilon_decay,
            } => (epsilon_min, epsilon_decay),
            EpsilonSchedule::Constant { epsilon } => (epsilon, 1.0),
        };
        if let Some(v) = parse_override::<f64, _>(&lookup, "TUMMYTIME_EPSILON_MIN", eps_min) {
            eps_min = v;
        }
        if let Some(v) = parse_override::<f64, _>(&lookup, "TUMMYTIME_EPSILON_DECAY", eps_decay) {
            eps_decay = v;
        }
        cfg.epsilon = EpsilonSchedule::decaying(eps_min, eps_decay);

        if let Some(v) =
            parse_override::<f64, _>(&lookup, "TUMMYTIME_REWARD_NOISE_STD", cfg.reward.noise_std)
        {
            cfg.reward.noise_std = v;
        }
        if let Some(v) = parse_override::<u64, _>(&lookup, "TUMMYTIME_SEED", cfg.seed) {
            cfg.seed = v;
        }
        if let Some(v) =
            parse_override::<u64, _>(&lookup, "TUMMYTIME_MAX_STEPS", cfg.max_steps_per_episode)
        {
            cfg.max_steps_per_episode = v;
        }

        cfg
    }
}

fn parse_override<T, F>(lookup: &F, key: &str, current: T) -> Option<T>
where
    T: std::str::FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => {
            eprintln!("[config] {key} = {v} (overrode default)");
            Some(v)
        }
        Err(_) => {
            eprintln!(
                "[config] WARN: could not parse {key} = {:?}; using default {}",
                raw, current
            );
            None
        }
    }
}
