//! PPO optimization pass over a filled rollout buffer.
//!
//! For every epoch a fresh set of minibatches is drawn from the buffer, and
//! every minibatch produces exactly one call to [`Agent::apply_update`]:
//!
//! ```text
//! critic_loss = mean((return - V(s))^2)
//! ratio       = exp(log π(a|s) - log π_old(a|s))
//! actor_loss  = -mean(min(ratio * A, clip(ratio, 1-ε, 1+ε) * A)) - c_H * mean(H)
//! ```

use burn::tensor::backend::AutodiffBackend;
use tracing::debug;

use crate::algorithms::agent::Agent;
use crate::algorithms::gaussian::PolicyDistribution;
use crate::algorithms::policy_loss::{ppo_clip_loss, value_loss};
use crate::buffers::{Minibatch, RolloutBuffer};
use crate::error::{Result, TrainError};
use crate::metrics::LossSummary;
use crate::runners::config::TrainConfig;
use crate::tensor::scalar;

/// Drives epochs of minibatch updates against an [`Agent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PPOOptimizer {
    pub epochs: usize,
    pub mini_batch_size: usize,
    pub clip_ratio: f32,
    pub entropy_coef: f32,
}

impl PPOOptimizer {
    pub fn from_config(config: &TrainConfig) -> Self {
        Self {
            epochs: config.epochs,
            mini_batch_size: config.mini_batch_size,
            clip_ratio: config.clip_ratio,
            entropy_coef: config.entropy_coef,
        }
    }

    /// Run all epochs. The buffer is only read; `&mut` is needed for its
    /// minibatch shuffler.
    ///
    /// The buffer must be complete. Reported losses are means over the
    /// applied updates. A non-finite loss aborts the pass with
    /// [`TrainError::NonFiniteLoss`] before that minibatch's update is
    /// applied.
    pub fn optimize<B, A>(
        &self,
        agent: &mut A,
        buffer: &mut RolloutBuffer,
        device: &B::Device,
    ) -> Result<LossSummary>
    where
        B: AutodiffBackend,
        A: Agent<B>,
    {
        buffer.ensure_complete()?;

        let mut total_actor = 0.0f32;
        let mut total_critic = 0.0f32;
        let mut total_entropy = 0.0f32;
        let mut updates = 0usize;

        for epoch in 0..self.epochs {
            for (minibatch, batch) in buffer.minibatches(self.mini_batch_size)?.iter().enumerate() {
                let (actor, critic, entropy) =
                    self.update_minibatch(agent, batch, device, epoch, minibatch)?;

                total_actor += actor;
                total_critic += critic;
                total_entropy += entropy;
                updates += 1;
            }
        }

        let n = updates.max(1) as f32;
        Ok(LossSummary {
            actor_loss: total_actor / n,
            critic_loss: total_critic / n,
            entropy: total_entropy / n,
            updates,
        })
    }

    /// Compute both losses for one minibatch and apply them together.
    fn update_minibatch<B, A>(
        &self,
        agent: &mut A,
        batch: &Minibatch,
        device: &B::Device,
        epoch: usize,
        minibatch: usize,
    ) -> Result<(f32, f32, f32)>
    where
        B: AutodiffBackend,
        A: Agent<B>,
    {
        let states = batch.observations_tensor::<B>(device);
        let actions = batch.actions_tensor::<B>(device);
        let old_log_probs = batch.log_probs_tensor::<B>(device);
        let advantages = batch.advantages_tensor::<B>(device);
        let returns = batch.returns_tensor::<B>(device);

        let critic_loss = value_loss(agent.value(states.clone()), returns);

        let distribution = agent.action_distribution(states);
        let log_probs = distribution.log_prob(actions);
        let entropy = distribution.entropy().mean();
        let actor_loss = ppo_clip_loss(log_probs, old_log_probs, advantages, self.clip_ratio)
            - entropy.clone().mul_scalar(self.entropy_coef);

        let actor_value = scalar(actor_loss.clone())?;
        let critic_value = scalar(critic_loss.clone())?;
        let entropy_value = scalar(entropy)?;
        if !actor_value.is_finite() || !critic_value.is_finite() {
            return Err(TrainError::NonFiniteLoss {
                epoch,
                minibatch,
                actor_loss: actor_value,
                critic_loss: critic_value,
            });
        }

        agent.apply_update(actor_loss, critic_loss)?;

        debug!(
            epoch,
            minibatch,
            actor_loss = actor_value,
            critic_loss = critic_value,
            entropy = entropy_value,
            "minibatch update"
        );
        Ok((actor_value, critic_value, entropy_value))
    }
}
