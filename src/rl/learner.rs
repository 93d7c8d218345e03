// src/rl/learner.rs
//
// Tabular Q-learning agent.
//
// One episode:
//   state = back
//   loop:
//     pick action epsilon-greedily over the Q-table
//     (next, terminal) = transition table lookup
//     r = reward(state, next)
//     Q(state, action) <- Bellman update
//     notify observer (read-only)
//     stop when terminal or the step guard trips
//
// Episodes run strictly in order against one Q-table. All randomness
// (exploration and reward noise) comes from the injected RNG, so a fixed
// seed reproduces a run bit-for-bit.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ContinuationMode, LearnerConfig, TrainingParams};
use crate::logging::StepObserver;
use crate::types::{Action, State, NUM_ACTIONS};

use super::policy::Policy;
use super::q_table::QTable;
use super::reward::RewardFunction;
use super::transition::TransitionTable;

/// Why an episode stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Reached the terminal state.
    Terminal,
    /// Hit `max_steps_per_episode` first.
    MaxSteps,
}

/// Outcome of one epsilon-greedy draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionChoice {
    pub action: Action,
    /// True if the action was drawn at random.
    pub explored: bool,
    /// The uniform [0, 1) sample compared against epsilon.
    pub sample: f64,
}

/// Emitted after every step, once the Q-table has been updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Zero-based episode index (counts across `train` calls in
    /// `Continue` mode).
    pub episode: u64,
    /// Zero-based step index within the episode.
    pub step: u64,
    pub state: State,
    pub action: Action,
    pub next_state: State,
    pub reward: f64,
    pub explored: bool,
    pub epsilon: f64,
    /// Q(state, action) after the update.
    pub q_value: f64,
    pub terminal: bool,
}

/// Summary of a completed episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u64,
    pub steps: u64,
    pub total_reward: f64,
    /// Steps whose action was drawn at random.
    pub explored_steps: u64,
    pub epsilon: f64,
    pub termination_reason: TerminationReason,
}

/// Result of a `train` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub episodes: Vec<EpisodeSummary>,
    /// Greedy policy extracted after the last episode.
    pub final_policy: Policy,
}

impl TrainingSummary {
    pub fn reached_terminal_count(&self) -> usize {
        self.episodes
            .iter()
            .filter(|e| e.termination_reason == TerminationReason::Terminal)
            .count()
    }

    pub fn total_steps(&self) -> u64 {
        self.episodes.iter().map(|e| e.steps).sum()
    }

    pub fn explored_steps(&self) -> u64 {
        self.episodes.iter().map(|e| e.explored_steps).sum()
    }
}

/// Q-learning agent owning the only mutable state: the Q-table.
#[derive(Debug, Clone)]
pub struct Learner<R: Rng = ChaCha8Rng> {
    config: LearnerConfig,
    transitions: TransitionTable,
    reward_fn: RewardFunction,
    q_table: QTable,
    rng: R,
    episodes_completed: u64,
}

impl Learner<ChaCha8Rng> {
    /// Learner driven by a `ChaCha8Rng` seeded from `config.seed`.
    pub fn seeded(config: LearnerConfig) -> Result<Self, ConfigError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Learner<R> {
    /// Learner driven by a caller-supplied RNG. `config.seed` is unused.
    pub fn with_rng(config: LearnerConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let reward_fn = RewardFunction::new(config.reward)?;
        Ok(Self {
            config,
            transitions: TransitionTable::canonical(),
            reward_fn,
            q_table: QTable::new(),
            rng,
            episodes_completed: 0,
        })
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Read-only view of the current table.
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Copy of the current table.
    pub fn snapshot(&self) -> QTable {
        self.q_table
    }

    /// Episodes run so far; also the index of the next episode.
    pub fn episodes_completed(&self) -> u64 {
        self.episodes_completed
    }

    /// Zero every Q-table entry. The episode counter is left alone.
    pub fn reset_q_table(&mut self) {
        self.q_table.reset();
    }

    /// Greedy policy over the non-terminal states.
    pub fn best_policy(&self) -> Policy {
        Policy::from_q_table(&self.q_table)
    }

    /// Run `params.num_episodes` episodes in order.
    ///
    /// In `Reset` mode the table and episode counter are cleared first.
    pub fn train<O>(
        &mut self,
        params: &TrainingParams,
        observer: &mut O,
    ) -> Result<TrainingSummary, ConfigError>
    where
        O: StepObserver + ?Sized,
    {
        params.validate()?;

        if self.config.continuation == ContinuationMode::Reset {
            self.q_table.reset();
            self.episodes_completed = 0;
        }

        let mut episodes = Vec::new();
        for _ in 0..params.num_episodes {
            let summary =
                self.run_episode_unchecked(params.learning_rate, params.discount_factor, observer);
            episodes.push(summary);
        }

        Ok(TrainingSummary {
            episodes,
            final_policy: self.best_policy(),
        })
    }

    /// Run a single episode as the next in sequence.
    pub fn run_episode<O>(
        &mut self,
        learning_rate: f64,
        discount_factor: f64,
        observer: &mut O,
    ) -> Result<EpisodeSummary, ConfigError>
    where
        O: StepObserver + ?Sized,
    {
        TrainingParams::new(1, learning_rate, discount_factor).validate()?;
        Ok(self.run_episode_unchecked(learning_rate, discount_factor, observer))
    }

    /// Epsilon-greedy action selection.
    ///
    /// Always draws one uniform sample; draws a second (the random action)
    /// only when exploring.
    pub fn choose_action(&mut self, state: State, epsilon: f64) -> ActionChoice {
        let sample: f64 = self.rng.gen();
        if sample < epsilon {
            let action = Action::ALL[self.rng.gen_range(0..NUM_ACTIONS)];
            ActionChoice {
                action,
                explored: true,
                sample,
            }
        } else {
            ActionChoice {
                action: self.q_table.greedy_action(state),
                explored: false,
                sample,
            }
        }
    }

    fn run_episode_unchecked<O>(
        &mut self,
        learning_rate: f64,
        discount_factor: f64,
        observer: &mut O,
    ) -> EpisodeSummary
    where
        O: StepObserver + ?Sized,
    {
        let episode = self.episodes_completed;
        let epsilon = self.config.epsilon.epsilon(episode);

        let mut state = State::START;
        let mut steps: u64 = 0;
        let mut total_reward = 0.0;
        let mut explored_steps: u64 = 0;
        let mut termination_reason = TerminationReason::MaxSteps;

        while steps < self.config.max_steps_per_episode {
            let choice = self.choose_action(state, epsilon);
            let transition = self.transitions.step(state, choice.action);
            let reward = self
                .reward_fn
                .reward(state, transition.next_state, &mut self.rng);

            let update = self.q_table.update(
                state,
                choice.action,
                reward,
                transition.next_state,
                learning_rate,
                discount_factor,
            );

            observer.on_step(&StepEvent {
                episode,
                step: steps,
                state,
                action: choice.action,
                next_state: transition.next_state,
                reward,
                explored: choice.explored,
                epsilon,
                q_value: update.updated,
                terminal: transition.terminal,
            });

            steps += 1;
            total_reward += reward;
            if choice.explored {
                explored_steps += 1;
            }
            state = transition.next_state;

            if transition.terminal {
                termination_reason = TerminationReason::Terminal;
                break;
            }
        }

        self.episodes_completed += 1;

        let summary = EpisodeSummary {
            episode,
            steps,
            total_reward,
            explored_steps,
            epsilon,
            termination_reason,
        };
        observer.on_episode_end(&summary, &self.q_table);
        summary
    }
}
