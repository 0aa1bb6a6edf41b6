//! Algorithm components.
//!
//! - `gae`: Generalized Advantage Estimation
//! - `policy_loss`: PPO clipped surrogate and value losses
//! - `gaussian`: diagonal Gaussian policy distribution and action scaling
//! - `agent`: the actor/critic contract the optimizer depends on

pub mod agent;
pub mod gae;
pub mod gaussian;
pub mod policy_loss;

#[cfg(test)]
mod tests;

pub use agent::{ActorCriticAgent, Agent, PolicyNetwork, ValueNetwork};
pub use gae::{compute_gae, normalize_advantages, AdvantageEstimator};
pub use gaussian::{ActionBounds, DiagGaussian, PolicyDistribution};
pub use policy_loss::{clipped_surrogate, ppo_clip_loss, value_loss};
