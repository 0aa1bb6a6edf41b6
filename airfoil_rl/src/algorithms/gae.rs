//! Generalized Advantage Estimation.
//!
//! GAE provides a family of policy gradient estimators parameterized by λ:
//! - λ = 0: one-step TD (low variance, high bias)
//! - λ = 1: Monte Carlo (high variance, low bias)
//! - λ ∈ (0, 1): interpolation
//!
//! ## Formula
//!
//! A_t^GAE(γ,λ) = Σ_{l=0}^{∞} (γλ)^l δ_{t+l}
//! where δ_t = r_t + γ V(s_{t+1}) - V(s_t)
//!
//! Each horizon is a single continuous segment: there are no episode
//! boundaries inside it, so the bootstrap term is never masked.
//!
//! ## References
//!
//! - Schulman et al., "High-Dimensional Continuous Control Using
//!   Generalized Advantage Estimation" (2016)

use tracing::debug;

use crate::buffers::RolloutBuffer;
use crate::error::{Result, TrainError};

/// Compute GAE advantages and returns for a single trajectory.
///
/// # Arguments
///
/// * `rewards` - rewards received [T]
/// * `values` - value estimates V(s_0..s_T) [T + 1], last entry is the bootstrap
/// * `gamma` - discount factor
/// * `gae_lambda` - GAE λ parameter
///
/// # Returns
///
/// (advantages, returns) - both [T]
pub fn compute_gae(
    rewards: &[f32],
    values: &[f32],
    gamma: f32,
    gae_lambda: f32,
) -> Result<(Vec<f32>, Vec<f32>)> {
    let n = rewards.len();
    TrainError::check_len("values", n + 1, values.len())?;

    let mut advantages = vec![0.0f32; n];
    let mut returns = vec![0.0f32; n];

    let mut gae = 0.0f32;
    for t in (0..n).rev() {
        // TD residual: δ_t = r_t + γ * V(s_{t+1}) - V(s_t)
        let delta = rewards[t] + gamma * values[t + 1] - values[t];

        // GAE: A_t = δ_t + γλ * A_{t+1}
        gae = delta + gamma * gae_lambda * gae;

        advantages[t] = gae;
        returns[t] = gae + values[t];
    }

    Ok((advantages, returns))
}

/// Normalize advantages to zero mean and unit variance.
///
/// # Edge Cases
///
/// - Empty slice: no-op
/// - Single element: sets to 0.0 (can't compute meaningful variance)
/// - All same values: sets all to 0.0 (variance is 0, epsilon prevents NaN)
pub fn normalize_advantages(advantages: &mut [f32]) {
    if advantages.is_empty() {
        return;
    }

    if advantages.len() == 1 {
        advantages[0] = 0.0;
        return;
    }

    let n = advantages.len() as f32;
    let mean = advantages.iter().sum::<f32>() / n;
    // Population variance with epsilon for stability
    let variance = advantages.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n;
    let std = (variance + 1e-8).sqrt();

    for a in advantages.iter_mut() {
        *a = (*a - mean) / std;
    }
}

/// Computes advantages and returns for every environment of a buffer.
///
/// The output is a pure function of the buffer's rewards and values plus
/// `gamma` and `lambda`. Returns are computed from the raw advantages; the
/// optional normalization only affects the advantages handed to the
/// policy loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvantageEstimator {
    pub gamma: f32,
    pub gae_lambda: f32,
    pub normalize: bool,
}

impl AdvantageEstimator {
    pub fn new(gamma: f32, gae_lambda: f32) -> Self {
        Self {
            gamma,
            gae_lambda,
            normalize: false,
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Fill the buffer's advantage and return tables.
    ///
    /// Fails with [`TrainError::IncompleteRollout`] unless every timestep and
    /// the bootstrap value were written during the current pass.
    pub fn estimate(&self, buffer: &mut RolloutBuffer) -> Result<()> {
        buffer.ensure_complete()?;

        let mut advantages = Vec::with_capacity(buffer.len());
        let mut returns = Vec::with_capacity(buffer.len());
        for env in 0..buffer.env_count() {
            let (adv, ret) = compute_gae(
                buffer.env_rewards(env)?,
                buffer.env_values(env)?,
                self.gamma,
                self.gae_lambda,
            )?;
            advantages.extend(adv);
            returns.extend(ret);
        }

        if self.normalize {
            normalize_advantages(&mut advantages);
        }

        debug!(
            envs = buffer.env_count(),
            horizon = buffer.horizon(),
            mean_advantage = advantages.iter().sum::<f32>() / advantages.len() as f32,
            "estimated advantages"
        );
        buffer.set_advantages(advantages, returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gae_simple() {
        // Simple trajectory: 3 steps, bootstrap 0.5
        let rewards = vec![1.0, 1.0, 1.0];
        let values = vec![0.5, 0.5, 0.5, 0.5];

        let (advantages, returns) = compute_gae(&rewards, &values, 0.99, 0.95).unwrap();

        assert_eq!(advantages.len(), 3);
        assert_eq!(returns.len(), 3);

        for a in &advantages {
            assert!(*a > 0.0, "Expected positive advantages, got {}", a);
        }

        // Verify returns = advantages + values
        for i in 0..3 {
            assert!(
                (returns[i] - (advantages[i] + values[i])).abs() < 1e-6,
                "return[{}] != advantage[{}] + value[{}]",
                i, i, i
            );
        }
    }

    #[test]
    fn test_gae_values_length_checked() {
        let err = compute_gae(&[1.0, 1.0], &[0.0, 0.0], 1.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            TrainError::ShapeMismatch { what: "values", expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_normalize_advantages() {
        let mut advantages = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        normalize_advantages(&mut advantages);

        let mean: f32 = advantages.iter().sum::<f32>() / advantages.len() as f32;
        assert!(mean.abs() < 1e-6, "Expected mean≈0, got {}", mean);

        let variance: f32 = advantages.iter().map(|a| a.powi(2)).sum::<f32>() / advantages.len() as f32;
        assert!((variance.sqrt() - 1.0).abs() < 1e-5, "Expected std≈1, got {}", variance.sqrt());
    }

    #[test]
    fn test_normalize_advantages_single() {
        let mut advantages = vec![5.0];
        normalize_advantages(&mut advantages);
        assert!(advantages[0].abs() < 1e-3);
    }
}
