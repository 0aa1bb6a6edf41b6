//! Environment abstraction for the training loop.
//!
//! The train loop only ever talks to an environment through this trait, so
//! the RL core can be exercised with deterministic stubs instead of a real
//! aerodynamic solver.

use crate::error::Result;

/// Result from stepping a single environment.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Observation after the step, flattened row-major
    pub observation: Vec<f32>,
    /// Reward received for the action
    pub reward: f32,
}

impl StepResult {
    pub fn new(observation: Vec<f32>, reward: f32) -> Self {
        Self {
            observation,
            reward,
        }
    }
}

/// A stateful simulation exposing `reset` and `step`.
///
/// Observation shape and action dimensionality are fixed per instance and
/// must match the buffer allocation exactly. Rewards handed back must be
/// finite: substituting a penalty for a faulty reward is the
/// environment's responsibility, the core does not sanitize.
pub trait Environment {
    /// Shape of one observation (e.g. `[2, 200]`).
    fn observation_shape(&self) -> &[usize];

    /// Number of action dimensions.
    fn action_dim(&self) -> usize;

    /// Flattened observation length.
    fn observation_size(&self) -> usize {
        self.observation_shape().iter().product()
    }

    /// Restore the initial state and return the first observation.
    fn reset(&mut self) -> Result<Vec<f32>>;

    /// Apply an action already scaled to the physical action range.
    fn step(&mut self, action: &[f32]) -> Result<StepResult>;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn observation_shape(&self) -> &[usize] {
        (**self).observation_shape()
    }

    fn action_dim(&self) -> usize {
        (**self).action_dim()
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        (**self).reset()
    }

    fn step(&mut self, action: &[f32]) -> Result<StepResult> {
        (**self).step(action)
    }
}
