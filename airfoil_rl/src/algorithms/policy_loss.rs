//! PPO loss functions.
//!
//! # Numerical Stability
//!
//! The importance ratio is `exp(log_probs - old_log_probs)` with no clamp.
//! A ratio that overflows to infinity against a negative advantage yields an
//! infinite loss, which the optimizer reports as `NonFiniteLoss` instead of
//! stepping the networks.

use burn::tensor::{backend::Backend, Tensor};

/// PPO clipped surrogate loss (tensor computation for gradient).
///
/// L^CLIP(θ) = E[min(r_t(θ) * A_t, clip(r_t(θ), 1-ε, 1+ε) * A_t)]
///
/// where r_t(θ) = π_θ(a_t|s_t) / π_θ_old(a_t|s_t)
///
/// # Arguments
///
/// * `log_probs` - Current policy log probs: [batch_size]
/// * `old_log_probs` - Log probs recorded at collection time: [batch_size]
/// * `advantages` - GAE advantages: [batch_size]
/// * `clip_ratio` - Clipping ratio ε
///
/// # Returns
///
/// Negated mean of the clipped objective, a single-element tensor.
pub fn ppo_clip_loss<B: Backend>(
    log_probs: Tensor<B, 1>,
    old_log_probs: Tensor<B, 1>,
    advantages: Tensor<B, 1>,
    clip_ratio: f32,
) -> Tensor<B, 1> {
    let ratio = (log_probs - old_log_probs).exp();
    clipped_surrogate(ratio, advantages, clip_ratio)
}

/// Clipped surrogate from an explicit ratio tensor.
pub fn clipped_surrogate<B: Backend>(
    ratio: Tensor<B, 1>,
    advantages: Tensor<B, 1>,
    clip_ratio: f32,
) -> Tensor<B, 1> {
    let clipped_ratio = ratio.clone().clamp(1.0 - clip_ratio, 1.0 + clip_ratio);

    let surr1 = ratio * advantages.clone();
    let surr2 = clipped_ratio * advantages;

    // Pessimistic bound, negated for minimization
    -surr1.min_pair(surr2).mean()
}

/// Critic loss: mean((return - value)^2).
pub fn value_loss<B: Backend>(values: Tensor<B, 1>, returns: Tensor<B, 1>) -> Tensor<B, 1> {
    (returns - values).powf_scalar(2.0).mean()
}
