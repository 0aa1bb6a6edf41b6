//! Agent contract used by the optimizer and the train loop.
//!
//! An [`Agent`] wraps a policy (actor) and a value function (critic). The
//! training core only needs:
//!
//! - `action_distribution`: a [`PolicyDistribution`] for a batch of observations
//! - `value`: one scalar estimate per observation
//! - `scale_actions`: the fixed map from policy space to environment space
//! - `apply_update`: one gradient step on both function approximators
//!
//! [`ActorCriticAgent`] is the stock implementation: any pair of burn
//! modules implementing [`PolicyNetwork`] / [`ValueNetwork`], each with its
//! own optimizer.

use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;

use super::gaussian::{ActionBounds, DiagGaussian, PolicyDistribution};
use crate::error::{Result, TrainError};
use crate::tensor::scalar;

/// Interface the training core requires from a policy/value function.
pub trait Agent<B: AutodiffBackend> {
    type Distribution: PolicyDistribution<B>;

    /// Policy distribution for observations `[batch, observation_size]`.
    fn action_distribution(&self, observations: Tensor<B, 2>) -> Self::Distribution;

    /// Value estimate per observation: `[batch]`.
    fn value(&self, observations: Tensor<B, 2>) -> Tensor<B, 1>;

    /// Physical action range per dimension.
    fn action_bounds(&self) -> &ActionBounds;

    /// Flattened observation length the networks consume.
    fn observation_size(&self) -> usize;

    fn action_dim(&self) -> usize {
        self.action_bounds().dim()
    }

    /// Map raw policy samples (rows of `action_dim`) to environment space.
    fn scale_actions(&self, raw: &[f32]) -> Result<Vec<f32>> {
        self.action_bounds().scale(raw)
    }

    /// One gradient step on actor and critic from the same minibatch.
    ///
    /// Either both losses are applied or neither: a NaN/Inf loss returns
    /// [`TrainError::DivergedUpdate`] before any parameter changes.
    fn apply_update(&mut self, actor_loss: Tensor<B, 1>, critic_loss: Tensor<B, 1>) -> Result<()>;
}

/// Actor network producing a diagonal Gaussian.
pub trait PolicyNetwork<B: AutodiffBackend>: AutodiffModule<B> {
    fn distribution(&self, observations: Tensor<B, 2>) -> DiagGaussian<B>;
}

/// Critic network producing `[batch]` values.
pub trait ValueNetwork<B: AutodiffBackend>: AutodiffModule<B> {
    fn forward(&self, observations: Tensor<B, 2>) -> Tensor<B, 1>;
}

/// Actor and critic modules with independent optimizers.
pub struct ActorCriticAgent<B, P, V, OP, OV>
where
    B: AutodiffBackend,
    P: PolicyNetwork<B>,
    V: ValueNetwork<B>,
    OP: Optimizer<P, B>,
    OV: Optimizer<V, B>,
{
    actor: P,
    critic: V,
    actor_optim: OP,
    critic_optim: OV,
    actor_lr: f64,
    critic_lr: f64,
    bounds: ActionBounds,
    observation_size: usize,
    updates: usize,
    _backend: std::marker::PhantomData<B>,
}

impl<B, P, V, OP, OV> ActorCriticAgent<B, P, V, OP, OV>
where
    B: AutodiffBackend,
    P: PolicyNetwork<B>,
    V: ValueNetwork<B>,
    OP: Optimizer<P, B>,
    OV: Optimizer<V, B>,
{
    pub fn new(
        actor: P,
        critic: V,
        actor_optim: OP,
        critic_optim: OV,
        bounds: ActionBounds,
        observation_size: usize,
    ) -> Self {
        Self {
            actor,
            critic,
            actor_optim,
            critic_optim,
            actor_lr: 3e-4,
            critic_lr: 1e-3,
            bounds,
            observation_size,
            updates: 0,
            _backend: std::marker::PhantomData,
        }
    }

    pub fn with_learning_rates(mut self, actor_lr: f64, critic_lr: f64) -> Self {
        self.actor_lr = actor_lr;
        self.critic_lr = critic_lr;
        self
    }

    pub fn actor(&self) -> &P {
        &self.actor
    }

    pub fn critic(&self) -> &V {
        &self.critic
    }

    /// Number of updates applied so far.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl<B, P, V, OP, OV> Agent<B> for ActorCriticAgent<B, P, V, OP, OV>
where
    B: AutodiffBackend,
    P: PolicyNetwork<B>,
    V: ValueNetwork<B>,
    OP: Optimizer<P, B>,
    OV: Optimizer<V, B>,
{
    type Distribution = DiagGaussian<B>;

    fn action_distribution(&self, observations: Tensor<B, 2>) -> DiagGaussian<B> {
        self.actor.distribution(observations)
    }

    fn value(&self, observations: Tensor<B, 2>) -> Tensor<B, 1> {
        self.critic.forward(observations)
    }

    fn action_bounds(&self) -> &ActionBounds {
        &self.bounds
    }

    fn observation_size(&self) -> usize {
        self.observation_size
    }

    fn apply_update(&mut self, actor_loss: Tensor<B, 1>, critic_loss: Tensor<B, 1>) -> Result<()> {
        let actor_value = scalar(actor_loss.clone())?;
        let critic_value = scalar(critic_loss.clone())?;
        if !actor_value.is_finite() || !critic_value.is_finite() {
            return Err(TrainError::DivergedUpdate {
                actor_loss: actor_value,
                critic_loss: critic_value,
            });
        }

        let grads = critic_loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.critic);
        self.critic = self
            .critic_optim
            .step(self.critic_lr, self.critic.clone(), grads);

        let grads = actor_loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.actor);
        self.actor = self.actor_optim.step(self.actor_lr, self.actor.clone(), grads);

        self.updates += 1;
        Ok(())
    }
}
