//! Outer training loop: collect -> estimate -> optimize -> log.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  for iteration in 0..n_iterations                        │
//! │    1. reset every environment                            │
//! │    2. collect `horizon` steps into the RolloutBuffer     │
//! │    3. bootstrap V(s_horizon)                             │
//! │    4. AdvantageEstimator (GAE)                           │
//! │    5. PPOOptimizer (epochs x minibatches, 1 update each) │
//! │    6. append TrainingMetrics, call the logger            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on the calling thread. The buffer is owned by the loop
//! and reused across iterations; each collection pass overwrites it.

use std::marker::PhantomData;
use std::sync::Arc;

use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;
use tracing::{debug, info};

use crate::algorithms::agent::Agent;
use crate::algorithms::gae::AdvantageEstimator;
use crate::algorithms::gaussian::PolicyDistribution;
use crate::buffers::RolloutBuffer;
use crate::environment::Environment;
use crate::error::{Result, TrainError};
use crate::metrics::{
    training_metrics, IterationRecord, MetricsLogger, SharedTrainingMetrics, TracingLogger,
};
use crate::runners::config::TrainConfig;
use crate::runners::ppo_optimizer::PPOOptimizer;
use crate::tensor::to_vec;

/// On-policy trainer for one agent and a batch of environments.
pub struct TrainLoop<B, A, E>
where
    B: AutodiffBackend,
    A: Agent<B>,
    E: Environment,
{
    config: TrainConfig,
    agent: A,
    envs: Vec<E>,
    buffer: RolloutBuffer,
    estimator: AdvantageEstimator,
    optimizer: PPOOptimizer,
    metrics: SharedTrainingMetrics,
    device: B::Device,
    _backend: PhantomData<B>,
}

impl<B, A, E> TrainLoop<B, A, E>
where
    B: AutodiffBackend,
    A: Agent<B>,
    E: Environment,
{
    /// Validate the configuration and every shape before any training.
    ///
    /// `envs.len()` must equal `config.env_count`, all environments must
    /// share one observation shape and action dimension, and the agent must
    /// consume exactly that shape.
    pub fn new(config: TrainConfig, agent: A, envs: Vec<E>, device: B::Device) -> Result<Self> {
        config.validate()?;
        TrainError::check_len("environments", config.env_count, envs.len())?;

        let first = envs.first().ok_or(TrainError::ShapeMismatch {
            what: "environments",
            expected: config.env_count,
            actual: 0,
        })?;
        let observation_shape = first.observation_shape().to_vec();
        let action_dim = first.action_dim();
        for env in &envs {
            TrainError::check_len("environment action_dim", action_dim, env.action_dim())?;
            TrainError::check_len(
                "environment observation size",
                first.observation_size(),
                env.observation_size(),
            )?;
            if env.observation_shape() != observation_shape.as_slice() {
                return Err(TrainError::ObservationShape {
                    expected: observation_shape,
                    actual: env.observation_shape().to_vec(),
                });
            }
        }
        TrainError::check_len("agent action_dim", action_dim, agent.action_dim())?;
        TrainError::check_len(
            "agent observation size",
            first.observation_size(),
            agent.observation_size(),
        )?;

        let buffer = RolloutBuffer::allocate(
            config.env_count,
            config.horizon,
            &observation_shape,
            action_dim,
        )?
        .with_seed(config.seed);

        Ok(Self {
            estimator: AdvantageEstimator::new(config.gamma, config.gae_lambda)
                .with_normalize(config.normalize_advantages),
            optimizer: PPOOptimizer::from_config(&config),
            metrics: training_metrics(config.running_reward_decay),
            config,
            agent,
            envs,
            buffer,
            device,
            _backend: PhantomData,
        })
    }

    /// Run `n_iterations`, logging through `tracing`.
    pub fn run(&mut self) -> Result<()> {
        self.run_with_logger(&mut TracingLogger::default())
    }

    /// Run `n_iterations`, handing every record to `logger`.
    ///
    /// The first error aborts training; records of completed iterations stay
    /// in [`Self::metrics`].
    pub fn run_with_logger(&mut self, logger: &mut dyn MetricsLogger) -> Result<()> {
        info!(
            iterations = self.config.n_iterations,
            horizon = self.config.horizon,
            envs = self.config.env_count,
            epochs = self.config.epochs,
            mini_batch_size = self.config.mini_batch_size,
            "starting training"
        );
        for _ in 0..self.config.n_iterations {
            let record = self.run_iteration()?;
            logger.log(&record)?;
        }
        logger.flush()
    }

    /// One full collect -> estimate -> optimize -> record cycle.
    pub fn run_iteration(&mut self) -> Result<IterationRecord> {
        let episode_reward = self.collect()?;
        self.estimator.estimate(&mut self.buffer)?;

        let losses = self
            .optimizer
            .optimize(&mut self.agent, &mut self.buffer, &self.device)?;

        let record = self.metrics.write().record(
            self.config.steps_per_iteration(),
            episode_reward,
            losses,
        );
        debug!(
            iteration = record.iteration,
            updates = record.updates,
            running_reward = record.running_reward,
            "iteration recorded"
        );
        Ok(record)
    }

    /// Reset all environments and fill the buffer for one horizon.
    ///
    /// Returns the collected reward per environment, averaged across
    /// environments.
    fn collect(&mut self) -> Result<f32> {
        let n = self.envs.len();
        let obs_size = self.buffer.observation_size();
        let action_dim = self.buffer.action_dim();
        self.buffer.begin_pass();

        let mut observations = Vec::with_capacity(n * obs_size);
        for env in &mut self.envs {
            let obs = env.reset()?;
            TrainError::check_len("reset observation", obs_size, obs.len())?;
            observations.extend(obs);
        }

        let mut reward_sum = 0.0f32;
        for t in 0..self.config.horizon {
            let states = self.observation_tensor(&observations);
            let values = to_vec(self.agent.value(states.clone()).detach())?;
            let distribution = self.agent.action_distribution(states).detach();
            let raw_actions = distribution.sample();
            let log_probs = to_vec(distribution.log_prob(raw_actions.clone()))?;
            let raw_actions = to_vec(raw_actions)?;
            let scaled = self.agent.scale_actions(&raw_actions)?;

            let mut next_observations = Vec::with_capacity(n * obs_size);
            let mut rewards = Vec::with_capacity(n);
            for (e, env) in self.envs.iter_mut().enumerate() {
                let step = env.step(&scaled[e * action_dim..(e + 1) * action_dim])?;
                TrainError::check_len("step observation", obs_size, step.observation.len())?;
                next_observations.extend(step.observation);
                rewards.push(step.reward);
            }

            self.buffer
                .record(t, &observations, &raw_actions, &rewards, &values, &log_probs)?;
            reward_sum += rewards.iter().sum::<f32>();
            observations = next_observations;
        }

        let bootstrap = to_vec(
            self.agent
                .value(self.observation_tensor(&observations))
                .detach(),
        )?;
        self.buffer.set_bootstrap_value(&bootstrap)?;

        Ok(reward_sum / n as f32)
    }

    fn observation_tensor(&self, observations: &[f32]) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(observations, &self.device)
            .reshape([self.envs.len(), self.buffer.observation_size()])
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    /// The buffer as left by the most recent iteration.
    pub fn buffer(&self) -> &RolloutBuffer {
        &self.buffer
    }

    /// Shared handle to the per-iteration history.
    pub fn metrics(&self) -> SharedTrainingMetrics {
        Arc::clone(&self.metrics)
    }

    /// Consume the loop and hand back the trained agent.
    pub fn into_agent(self) -> A {
        self.agent
    }
}
