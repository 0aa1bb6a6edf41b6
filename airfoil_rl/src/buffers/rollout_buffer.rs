//! Rollout buffer for on-policy training.
//!
//! Key characteristics:
//! - Dense `[env][t]` table preallocated for a fixed horizon
//! - One extra value slot per environment for the bootstrap value
//! - Overwritten (never appended) on every collection pass
//! - Randomized minibatch iteration over timestep indices
//!
//! # Layout
//!
//! All storage is env-major: the entry for `(env, t)` of a per-step field
//! with `k` components lives at `(env * horizon + t) * k`. Values use a
//! stride of `horizon + 1`.
//!
//! # Minibatching
//!
//! [`RolloutBuffer::minibatches`] draws a fresh permutation of `0..horizon`
//! on every call and cuts it into `horizon / batch_size` disjoint chunks.
//! When `horizon` is not divisible by `batch_size` the trailing
//! `horizon % batch_size` timesteps of the permutation are dropped for that
//! call.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Result, TrainError};
use crate::runners::config::ConfigError;

/// One timestep of one environment, borrowed from the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<'a> {
    pub observation: &'a [f32],
    /// Raw (unscaled) action sampled from the policy
    pub action: &'a [f32],
    pub reward: f32,
    pub value: f32,
    pub log_prob: f32,
}

/// Fixed-horizon storage for a batch of environments.
#[derive(Debug, Clone)]
pub struct RolloutBuffer {
    env_count: usize,
    horizon: usize,
    observation_shape: Vec<usize>,
    observation_size: usize,
    action_dim: usize,

    observations: Vec<f32>,
    actions: Vec<f32>,
    rewards: Vec<f32>,
    /// [env][horizon + 1]
    values: Vec<f32>,
    log_probs: Vec<f32>,
    advantages: Vec<f32>,
    returns: Vec<f32>,

    recorded: Vec<bool>,
    bootstrap_set: bool,
    rng: StdRng,
}

impl RolloutBuffer {
    /// Preallocate storage for `env_count` environments over `horizon` steps.
    ///
    /// Minibatch shuffling is seeded from entropy; use [`Self::with_seed`]
    /// for reproducible partitions.
    pub fn allocate(
        env_count: usize,
        horizon: usize,
        observation_shape: &[usize],
        action_dim: usize,
    ) -> Result<Self> {
        for (field, value) in [
            ("env_count", env_count),
            ("horizon", horizon),
            ("action_dim", action_dim),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidCount { field, value }.into());
            }
        }
        let observation_size: usize = observation_shape.iter().product();
        if observation_shape.is_empty() || observation_size == 0 {
            return Err(ConfigError::InvalidCount {
                field: "observation_size",
                value: observation_size,
            }
            .into());
        }

        let steps = env_count * horizon;
        Ok(Self {
            env_count,
            horizon,
            observation_shape: observation_shape.to_vec(),
            observation_size,
            action_dim,
            observations: vec![0.0; steps * observation_size],
            actions: vec![0.0; steps * action_dim],
            rewards: vec![0.0; steps],
            values: vec![0.0; env_count * (horizon + 1)],
            log_probs: vec![0.0; steps],
            advantages: vec![0.0; steps],
            returns: vec![0.0; steps],
            recorded: vec![false; horizon],
            bootstrap_set: false,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reseed the minibatch shuffler.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Start a new collection pass.
    ///
    /// Storage is kept; every slot is expected to be overwritten by
    /// `record` before advantages are estimated.
    pub fn begin_pass(&mut self) {
        self.recorded.iter_mut().for_each(|r| *r = false);
        self.bootstrap_set = false;
        self.advantages.iter_mut().for_each(|a| *a = 0.0);
        self.returns.iter_mut().for_each(|r| *r = 0.0);
    }

    /// Write the batch-of-environments data for timestep `t`.
    ///
    /// Every slice is env-major (`observations` is `env_count *
    /// observation_size` long, `actions` is `env_count * action_dim`, the
    /// rest `env_count`). All shapes are checked before anything is written.
    /// Recording the same `t` twice overwrites the first write.
    pub fn record(
        &mut self,
        t: usize,
        observations: &[f32],
        actions: &[f32],
        rewards: &[f32],
        values: &[f32],
        log_probs: &[f32],
    ) -> Result<()> {
        self.check_timestep(t)?;
        let n = self.env_count;
        TrainError::check_len("observations", n * self.observation_size, observations.len())?;
        TrainError::check_len("actions", n * self.action_dim, actions.len())?;
        TrainError::check_len("rewards", n, rewards.len())?;
        TrainError::check_len("values", n, values.len())?;
        TrainError::check_len("log_probs", n, log_probs.len())?;

        let obs = self.observation_size;
        let act = self.action_dim;
        for env in 0..n {
            let idx = self.flat(env, t);
            self.observations[idx * obs..(idx + 1) * obs]
                .copy_from_slice(&observations[env * obs..(env + 1) * obs]);
            self.actions[idx * act..(idx + 1) * act]
                .copy_from_slice(&actions[env * act..(env + 1) * act]);
            self.rewards[idx] = rewards[env];
            self.log_probs[idx] = log_probs[env];
            self.values[env * (self.horizon + 1) + t] = values[env];
        }
        self.recorded[t] = true;
        Ok(())
    }

    /// Write `values[:, horizon]`, the value of the state after the last action.
    pub fn set_bootstrap_value(&mut self, values_at_horizon: &[f32]) -> Result<()> {
        TrainError::check_len("bootstrap values", self.env_count, values_at_horizon.len())?;
        for (env, &v) in values_at_horizon.iter().enumerate() {
            self.values[env * (self.horizon + 1) + self.horizon] = v;
        }
        self.bootstrap_set = true;
        Ok(())
    }

    /// Store the derived advantage and return tables (`env_count * horizon`).
    pub fn set_advantages(&mut self, advantages: Vec<f32>, returns: Vec<f32>) -> Result<()> {
        let n = self.env_count * self.horizon;
        TrainError::check_len("advantages", n, advantages.len())?;
        TrainError::check_len("returns", n, returns.len())?;
        self.advantages = advantages;
        self.returns = returns;
        Ok(())
    }

    /// True when every timestep and the bootstrap value have been written.
    pub fn is_complete(&self) -> bool {
        self.bootstrap_set && self.recorded.iter().all(|&r| r)
    }

    /// Number of timesteps recorded in the current pass.
    pub fn recorded_steps(&self) -> usize {
        self.recorded.iter().filter(|&&r| r).count()
    }

    pub(crate) fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        Err(TrainError::IncompleteRollout {
            recorded: self.recorded_steps(),
            horizon: self.horizon,
            bootstrap: self.bootstrap_set,
        })
    }

    /// Shuffle timestep indices and cut them into disjoint minibatches.
    ///
    /// Yields exactly `horizon / batch_size` minibatches of `batch_size`
    /// timesteps each. Each minibatch carries the slices of every stored
    /// table for all environments at those timesteps.
    pub fn minibatches(&mut self, batch_size: usize) -> Result<Vec<Minibatch>> {
        if batch_size == 0 || batch_size > self.horizon {
            return Err(ConfigError::DegenerateMinibatch {
                batch_size,
                horizon: self.horizon,
            }
            .into());
        }

        let mut indices: Vec<usize> = (0..self.horizon).collect();
        indices.shuffle(&mut self.rng);

        let n_batches = self.horizon / batch_size;
        indices
            .chunks_exact(batch_size)
            .take(n_batches)
            .map(|chunk| self.gather(chunk))
            .collect()
    }

    /// Collect the rows for the given timesteps into an owned minibatch.
    pub fn gather(&self, timesteps: &[usize]) -> Result<Minibatch> {
        for &t in timesteps {
            self.check_timestep(t)?;
        }

        let rows = self.env_count * timesteps.len();
        let mut batch = Minibatch {
            timesteps: timesteps.to_vec(),
            env_count: self.env_count,
            observation_size: self.observation_size,
            action_dim: self.action_dim,
            observations: Vec::with_capacity(rows * self.observation_size),
            actions: Vec::with_capacity(rows * self.action_dim),
            rewards: Vec::with_capacity(rows),
            values: Vec::with_capacity(rows),
            log_probs: Vec::with_capacity(rows),
            advantages: Vec::with_capacity(rows),
            returns: Vec::with_capacity(rows),
        };

        for env in 0..self.env_count {
            for &t in timesteps {
                let idx = self.flat(env, t);
                batch.observations.extend_from_slice(
                    &self.observations
                        [idx * self.observation_size..(idx + 1) * self.observation_size],
                );
                batch
                    .actions
                    .extend_from_slice(&self.actions[idx * self.action_dim..(idx + 1) * self.action_dim]);
                batch.rewards.push(self.rewards[idx]);
                batch.values.push(self.values[env * (self.horizon + 1) + t]);
                batch.log_probs.push(self.log_probs[idx]);
                batch.advantages.push(self.advantages[idx]);
                batch.returns.push(self.returns[idx]);
            }
        }
        Ok(batch)
    }

    /// Borrow one stored transition.
    pub fn transition(&self, env: usize, t: usize) -> Result<Transition<'_>> {
        self.check_env(env)?;
        self.check_timestep(t)?;
        let idx = self.flat(env, t);
        Ok(Transition {
            observation: &self.observations
                [idx * self.observation_size..(idx + 1) * self.observation_size],
            action: &self.actions[idx * self.action_dim..(idx + 1) * self.action_dim],
            reward: self.rewards[idx],
            value: self.values[env * (self.horizon + 1) + t],
            log_prob: self.log_probs[idx],
        })
    }

    /// Rewards of one environment, `[horizon]`.
    pub fn env_rewards(&self, env: usize) -> Result<&[f32]> {
        self.check_env(env)?;
        Ok(&self.rewards[env * self.horizon..(env + 1) * self.horizon])
    }

    /// Values of one environment including the bootstrap slot, `[horizon + 1]`.
    pub fn env_values(&self, env: usize) -> Result<&[f32]> {
        self.check_env(env)?;
        let stride = self.horizon + 1;
        Ok(&self.values[env * stride..(env + 1) * stride])
    }

    /// Advantages of one environment, `[horizon]`.
    pub fn env_advantages(&self, env: usize) -> Result<&[f32]> {
        self.check_env(env)?;
        Ok(&self.advantages[env * self.horizon..(env + 1) * self.horizon])
    }

    /// Returns of one environment, `[horizon]`.
    pub fn env_returns(&self, env: usize) -> Result<&[f32]> {
        self.check_env(env)?;
        Ok(&self.returns[env * self.horizon..(env + 1) * self.horizon])
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn log_probs(&self) -> &[f32] {
        &self.log_probs
    }

    pub fn actions(&self) -> &[f32] {
        &self.actions
    }

    pub fn observations(&self) -> &[f32] {
        &self.observations
    }

    pub fn advantages(&self) -> &[f32] {
        &self.advantages
    }

    pub fn returns(&self) -> &[f32] {
        &self.returns
    }

    pub fn env_count(&self) -> usize {
        self.env_count
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn observation_shape(&self) -> &[usize] {
        &self.observation_shape
    }

    pub fn observation_size(&self) -> usize {
        self.observation_size
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Total transitions stored per pass.
    pub fn len(&self) -> usize {
        self.env_count * self.horizon
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flat(&self, env: usize, t: usize) -> usize {
        env * self.horizon + t
    }

    fn check_timestep(&self, t: usize) -> Result<()> {
        if t >= self.horizon {
            return Err(TrainError::IndexOutOfRange {
                what: "timestep",
                index: t,
                bound: self.horizon,
            });
        }
        Ok(())
    }

    fn check_env(&self, env: usize) -> Result<()> {
        if env >= self.env_count {
            return Err(TrainError::IndexOutOfRange {
                what: "environment",
                index: env,
                bound: self.env_count,
            });
        }
        Ok(())
    }
}

/// Owned slices of every buffer table for a set of timesteps.
///
/// Rows are env-major: row `env * timesteps.len() + k` is environment `env`
/// at timestep `timesteps[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Minibatch {
    pub timesteps: Vec<usize>,
    pub env_count: usize,
    pub observation_size: usize,
    pub action_dim: usize,
    pub observations: Vec<f32>,
    pub actions: Vec<f32>,
    pub rewards: Vec<f32>,
    pub values: Vec<f32>,
    pub log_probs: Vec<f32>,
    pub advantages: Vec<f32>,
    pub returns: Vec<f32>,
}

impl Minibatch {
    /// Number of rows (`env_count * timesteps`).
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Observations as `[rows, observation_size]`.
    pub fn observations_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(&self.observations[..], device)
            .reshape([self.len(), self.observation_size])
    }

    /// Raw actions as `[rows, action_dim]`.
    pub fn actions_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(&self.actions[..], device).reshape([self.len(), self.action_dim])
    }

    pub fn log_probs_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1> {
        Tensor::<B, 1>::from_floats(&self.log_probs[..], device)
    }

    pub fn advantages_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1> {
        Tensor::<B, 1>::from_floats(&self.advantages[..], device)
    }

    pub fn returns_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1> {
        Tensor::<B, 1>::from_floats(&self.returns[..], device)
    }
}
