//! Deterministic stubs shared by the runner tests.

use burn::backend::{Autodiff, NdArray};
use burn::tensor::Tensor;

use crate::algorithms::agent::Agent;
use crate::algorithms::gaussian::{ActionBounds, DiagGaussian};
use crate::environment::{Environment, StepResult};
use crate::error::{Result, TrainError};
use crate::tensor::scalar;

pub type B = Autodiff<NdArray<f32>>;

/// Environment returning a fixed reward and a step-counter observation.
pub struct ConstantRewardEnv {
    pub shape: Vec<usize>,
    pub action_dim: usize,
    pub reward: f32,
    pub steps: usize,
    pub resets: usize,
    pub received: Vec<Vec<f32>>,
}

impl ConstantRewardEnv {
    pub fn new(reward: f32) -> Self {
        Self {
            shape: vec![2, 3],
            action_dim: 2,
            reward,
            steps: 0,
            resets: 0,
            received: Vec::new(),
        }
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.steps as f32 * 0.1; self.observation_size()]
    }
}

impl Environment for ConstantRewardEnv {
    fn observation_shape(&self) -> &[usize] {
        &self.shape
    }

    fn action_dim(&self) -> usize {
        self.action_dim
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.steps = 0;
        self.resets += 1;
        Ok(self.observation())
    }

    fn step(&mut self, action: &[f32]) -> Result<StepResult> {
        if action.len() != self.action_dim {
            return Err(TrainError::Environment(format!(
                "expected {} action values",
                self.action_dim
            )));
        }
        self.steps += 1;
        self.received.push(action.to_vec());
        Ok(StepResult::new(self.observation(), self.reward))
    }
}

/// Agent with a fixed value estimate and a fixed Gaussian policy.
pub struct FixedAgent {
    pub bounds: ActionBounds,
    pub observation_size: usize,
    pub value: f32,
    pub updates: usize,
}

impl FixedAgent {
    pub fn new(value: f32) -> Self {
        Self {
            bounds: ActionBounds::from_upper(vec![0.8, 0.2]).unwrap(),
            observation_size: 6,
            value,
            updates: 0,
        }
    }
}

impl Agent<B> for FixedAgent {
    type Distribution = DiagGaussian<B>;

    fn action_distribution(&self, observations: Tensor<B, 2>) -> DiagGaussian<B> {
        let [batch, _] = observations.dims();
        let device = observations.device();
        let dim = self.bounds.dim();
        DiagGaussian::new(
            Tensor::ones([batch, dim], &device).mul_scalar(0.5),
            Tensor::ones([batch, dim], &device).mul_scalar(0.1f32.ln()),
        )
    }

    fn value(&self, observations: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch, _] = observations.dims();
        Tensor::zeros([batch], &observations.device()).add_scalar(self.value)
    }

    fn action_bounds(&self) -> &ActionBounds {
        &self.bounds
    }

    fn observation_size(&self) -> usize {
        self.observation_size
    }

    fn apply_update(&mut self, actor_loss: Tensor<B, 1>, critic_loss: Tensor<B, 1>) -> Result<()> {
        let actor = scalar(actor_loss)?;
        let critic = scalar(critic_loss)?;
        if !actor.is_finite() || !critic.is_finite() {
            return Err(TrainError::DivergedUpdate {
                actor_loss: actor,
                critic_loss: critic,
            });
        }
        self.updates += 1;
        Ok(())
    }
}
