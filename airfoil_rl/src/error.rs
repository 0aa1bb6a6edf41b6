//! Error types for the training core.
//!
//! Every failure the core can detect is fatal for the current iteration:
//! shape and index errors are programming errors, configuration errors are
//! raised before training starts, and a non-finite loss aborts the
//! optimization pass without applying the offending update.

use thiserror::Error;

use crate::runners::config::ConfigError;

/// Result type for training operations.
pub type Result<T> = std::result::Result<T, TrainError>;

/// Errors raised by the buffer, estimator, optimizer and train loop.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Data handed to the core does not match the allocated shapes.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A flat buffer that does not split into whole rows.
    #[error("{what} length {len} is not a multiple of {row_len}")]
    RaggedRows {
        what: &'static str,
        len: usize,
        row_len: usize,
    },

    /// Environments disagree on the observation shape.
    #[error("observation shape {actual:?} does not match {expected:?}")]
    ObservationShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A timestep or environment index beyond the allocated bounds.
    #[error("{what} index {index} out of range (bound {bound})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// Advantage estimation requested before every timestep was recorded.
    #[error("rollout incomplete: {recorded} of {horizon} timesteps recorded, bootstrap set: {bootstrap}")]
    IncompleteRollout {
        recorded: usize,
        horizon: usize,
        bootstrap: bool,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Actor or critic loss diverged.
    #[error(
        "non-finite loss at epoch {epoch}, minibatch {minibatch} \
         (actor {actor_loss}, critic {critic_loss})"
    )]
    NonFiniteLoss {
        epoch: usize,
        minibatch: usize,
        actor_loss: f32,
        critic_loss: f32,
    },

    /// An agent refused an update because a loss was NaN or infinite.
    #[error("refusing update with non-finite loss (actor {actor_loss}, critic {critic_loss})")]
    DivergedUpdate { actor_loss: f32, critic_loss: f32 },

    /// Failure reported by an environment collaborator.
    #[error("environment error: {0}")]
    Environment(String),

    /// Tensor data could not be read back as `f32`.
    #[error("tensor data error: {0}")]
    Tensor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl TrainError {
    /// Shorthand used by shape checks.
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(TrainError::ShapeMismatch {
                what,
                expected,
                actual,
            });
        }
        Ok(())
    }
}
