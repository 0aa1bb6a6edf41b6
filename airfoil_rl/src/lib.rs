//! # airfoil_rl: on-policy actor-critic training core
//!
//! Trains an agent to design airfoils by adding bump primitives to a base
//! shape. The core is environment-agnostic: anything implementing
//! [`Environment`] can be trained.
//!
//! ## Data flow
//!
//! ```text
//! Environment ──► RolloutBuffer ──► AdvantageEstimator ──► PPOOptimizer ──► TrainingMetrics
//!   (reset/step)    (record)          (GAE, writes back)     (Agent updates)    (append-only)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use airfoil_rl::{ActionBounds, MlpConfig, TrainConfig, TrainLoop};
//!
//! let config = TrainConfig::new().with_horizon(10).with_mini_batch_size(5).build()?;
//! let agent = MlpConfig::new(400, 2).init_agent::<B>(&config, bounds, &device);
//! let mut trainer = TrainLoop::new(config, agent, vec![env], device)?;
//! trainer.run()?;
//! let history = trainer.metrics().read().snapshot();
//! ```

pub mod algorithms;
pub mod buffers;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod nn;
pub mod runners;
pub mod tensor;

pub use algorithms::{
    compute_gae, ActionBounds, ActorCriticAgent, AdvantageEstimator, Agent, DiagGaussian,
    PolicyDistribution, PolicyNetwork, ValueNetwork,
};
pub use buffers::{Minibatch, RolloutBuffer, Transition};
pub use environment::{Environment, StepResult};
pub use error::{Result, TrainError};
pub use metrics::{
    CsvLogger, IterationRecord, MetricsLogger, MetricsSnapshot, MultiLogger,
    SharedTrainingMetrics, TracingLogger, TrainingMetrics,
};
pub use nn::{MlpActor, MlpConfig, MlpCritic};
pub use runners::{ConfigError, PPOOptimizer, TrainConfig, TrainLoop};
