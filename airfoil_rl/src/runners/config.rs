//! Configuration for PPO training.
//!
//! `TrainConfig` is a plain serde-serializable struct with builder methods,
//! validated once before the train loop starts.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation error.
///
/// Returned when configuration parameters are invalid or inconsistent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A count parameter (horizon, epochs, etc.) must be positive.
    #[error("{field} must be > 0, got {value}")]
    InvalidCount { field: &'static str, value: usize },

    /// A parameter is outside its valid range.
    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The minibatch size would yield zero minibatches per epoch.
    #[error("mini_batch_size ({batch_size}) must be in [1, horizon = {horizon}]")]
    DegenerateMinibatch { batch_size: usize, horizon: usize },
}

/// Configuration for the PPO train loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Outer iterations (collect -> estimate -> optimize -> log)
    pub n_iterations: usize,
    /// Steps collected per iteration per environment
    pub horizon: usize,
    /// Number of environment instances batched in the buffer
    pub env_count: usize,
    /// Passes over the buffer per iteration
    pub epochs: usize,
    /// Timesteps per minibatch
    pub mini_batch_size: usize,
    /// PPO clipping ratio ε
    pub clip_ratio: f32,
    /// Discount factor
    pub gamma: f32,
    /// GAE λ parameter
    pub gae_lambda: f32,
    /// Entropy bonus coefficient (subtracted from the actor loss)
    pub entropy_coef: f32,
    /// Actor learning rate
    pub actor_lr: f64,
    /// Critic learning rate
    pub critic_lr: f64,
    /// Normalize advantages over the whole buffer before optimizing
    pub normalize_advantages: bool,
    /// Maximum gradient norm (None = no clipping)
    pub max_grad_norm: Option<f32>,
    /// Decay of the running reward moving average
    pub running_reward_decay: f32,
    /// Seed for minibatch shuffling
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_iterations: 100,
            horizon: 10,
            env_count: 1,
            epochs: 10,
            mini_batch_size: 5,
            clip_ratio: 0.2,
            gamma: 1.0,
            gae_lambda: 0.95,
            entropy_coef: 0.03,
            actor_lr: 3e-4,
            critic_lr: 1e-3,
            normalize_advantages: false,
            max_grad_norm: None,
            running_reward_decay: 0.99,
            seed: 0,
        }
    }
}

impl TrainConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minibatches produced per epoch. Remainder timesteps are dropped.
    pub fn minibatches_per_epoch(&self) -> usize {
        if self.mini_batch_size == 0 {
            return 0;
        }
        self.horizon / self.mini_batch_size
    }

    /// Environment steps collected per iteration across all environments.
    pub fn steps_per_iteration(&self) -> usize {
        self.horizon * self.env_count
    }

    /// Validate all configuration parameters.
    ///
    /// # Validation Rules
    /// - Count parameters must be > 0
    /// - gamma and gae_lambda must be in [0.0, 1.0]
    /// - clip_ratio must be in (0.0, 1.0]
    /// - 1 <= mini_batch_size <= horizon
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("n_iterations", self.n_iterations),
            ("horizon", self.horizon),
            ("env_count", self.env_count),
            ("epochs", self.epochs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidCount { field, value });
            }
        }

        if self.mini_batch_size == 0 || self.mini_batch_size > self.horizon {
            return Err(ConfigError::DegenerateMinibatch {
                batch_size: self.mini_batch_size,
                horizon: self.horizon,
            });
        }

        check_range("gamma", self.gamma as f64, 0.0, 1.0)?;
        check_range("gae_lambda", self.gae_lambda as f64, 0.0, 1.0)?;
        check_range("running_reward_decay", self.running_reward_decay as f64, 0.0, 1.0)?;
        if self.clip_ratio <= 0.0 || self.clip_ratio > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "clip_ratio",
                value: self.clip_ratio as f64,
                min: 0.0,
                max: 1.0,
            });
        }
        check_range("entropy_coef", self.entropy_coef as f64, 0.0, f64::INFINITY)?;
        check_positive("actor_lr", self.actor_lr)?;
        check_positive("critic_lr", self.critic_lr)?;
        if let Some(norm) = self.max_grad_norm {
            check_positive("max_grad_norm", norm as f64)?;
        }

        Ok(())
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    // Builder methods

    /// Set the number of outer iterations.
    pub fn with_n_iterations(mut self, n: usize) -> Self {
        self.n_iterations = n;
        self
    }

    /// Set the collection horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the number of batched environments.
    pub fn with_env_count(mut self, n: usize) -> Self {
        self.env_count = n;
        self
    }

    /// Set the number of optimization epochs per iteration.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the minibatch size in timesteps.
    pub fn with_mini_batch_size(mut self, size: usize) -> Self {
        self.mini_batch_size = size;
        self
    }

    /// Set the clipping ratio.
    pub fn with_clip_ratio(mut self, clip: f32) -> Self {
        self.clip_ratio = clip;
        self
    }

    /// Set the discount factor.
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the GAE λ.
    pub fn with_gae_lambda(mut self, lambda: f32) -> Self {
        self.gae_lambda = lambda;
        self
    }

    /// Set the entropy coefficient.
    pub fn with_entropy_coef(mut self, coef: f32) -> Self {
        self.entropy_coef = coef;
        self
    }

    /// Set both learning rates.
    pub fn with_learning_rates(mut self, actor_lr: f64, critic_lr: f64) -> Self {
        self.actor_lr = actor_lr;
        self.critic_lr = critic_lr;
        self
    }

    pub fn with_normalize_advantages(mut self, normalize: bool) -> Self {
        self.normalize_advantages = normalize;
        self
    }

    pub fn with_max_grad_norm(mut self, norm: Option<f32>) -> Self {
        self.max_grad_norm = norm;
        self
    }

    pub fn with_running_reward_decay(mut self, decay: f32) -> Self {
        self.running_reward_decay = decay;
        self
    }

    /// Set the minibatch shuffling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    Ok(())
}
