//! Diagonal Gaussian policy distribution and action scaling.
//!
//! The actor produces a per-call [`DiagGaussian`] (mean + log std) for a
//! batch of observations. Samples live in the policy's native space, the
//! unit interval per dimension, and are mapped to physical ranges by
//! [`ActionBounds`].

use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

// Constants for numerical stability
const LOG_STD_MIN: f32 = -20.0;
const LOG_STD_MAX: f32 = 2.0;

/// A batched action distribution.
pub trait PolicyDistribution<B: Backend> {
    /// Draw one action per row: [batch, action_dim].
    fn sample(&self) -> Tensor<B, 2>;

    /// Log probability of `actions`, summed over action dimensions: [batch].
    fn log_prob(&self, actions: Tensor<B, 2>) -> Tensor<B, 1>;

    /// Entropy per row, summed over action dimensions: [batch].
    fn entropy(&self) -> Tensor<B, 1>;

    /// Cut the distribution out of the autodiff graph.
    fn detach(self) -> Self
    where
        Self: Sized;
}

/// Independent Gaussian per action dimension.
#[derive(Debug, Clone)]
pub struct DiagGaussian<B: Backend> {
    mean: Tensor<B, 2>,
    log_std: Tensor<B, 2>,
}

impl<B: Backend> DiagGaussian<B> {
    /// `mean` and `log_std` are both [batch, action_dim]. log std is clamped
    /// to [-20, 2].
    pub fn new(mean: Tensor<B, 2>, log_std: Tensor<B, 2>) -> Self {
        Self {
            mean,
            log_std: log_std.clamp(LOG_STD_MIN, LOG_STD_MAX),
        }
    }

    /// Build from a state-independent log std row broadcast over the batch.
    pub fn with_shared_log_std(mean: Tensor<B, 2>, log_std: Tensor<B, 1>) -> Self {
        let [batch, dim] = mean.dims();
        let log_std = log_std.reshape([1, dim]).repeat_dim(0, batch);
        Self::new(mean, log_std)
    }

    pub fn mean(&self) -> Tensor<B, 2> {
        self.mean.clone()
    }

    pub fn std(&self) -> Tensor<B, 2> {
        self.log_std.clone().exp()
    }

    pub fn action_dim(&self) -> usize {
        self.mean.dims()[1]
    }
}

impl<B: Backend> PolicyDistribution<B> for DiagGaussian<B> {
    fn sample(&self) -> Tensor<B, 2> {
        let noise: Tensor<B, 2> = Tensor::random(
            self.mean.dims(),
            Distribution::Normal(0.0, 1.0),
            &self.mean.device(),
        );
        self.mean.clone() + self.std() * noise
    }

    fn log_prob(&self, actions: Tensor<B, 2>) -> Tensor<B, 1> {
        // log N(x; μ, σ) = -0.5 * ((x - μ)/σ)² - log(σ) - 0.5 * log(2π)
        let log_2pi = (2.0 * std::f32::consts::PI).ln();
        let normalized = (actions - self.mean.clone()) / self.std();
        let per_dim: Tensor<B, 2> =
            normalized.powf_scalar(2.0).mul_scalar(-0.5) - self.log_std.clone() - 0.5 * log_2pi;
        per_dim.sum_dim(1).flatten(0, 1)
    }

    fn entropy(&self) -> Tensor<B, 1> {
        // H = 0.5 * D * (1 + log(2π)) + sum(log_std)
        let log_2pi = (2.0 * std::f32::consts::PI).ln();
        let constant = 0.5 * self.action_dim() as f32 * (1.0 + log_2pi);
        self.log_std
            .clone()
            .sum_dim(1)
            .flatten::<1>(0, 1)
            .add_scalar(constant)
    }

    fn detach(self) -> Self {
        Self {
            mean: self.mean.detach(),
            log_std: self.log_std.detach(),
        }
    }
}

/// Fixed physical range per action dimension.
///
/// Raw policy samples are clamped to the unit interval and then mapped
/// linearly onto `[low, high]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBounds {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl ActionBounds {
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self> {
        TrainError::check_len("action bounds", low.len(), high.len())?;
        if low.is_empty() {
            return Err(TrainError::ShapeMismatch {
                what: "action bounds",
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self { low, high })
    }

    /// `[0, high_i]` for every dimension.
    pub fn from_upper(high: Vec<f32>) -> Result<Self> {
        Self::new(vec![0.0; high.len()], high)
    }

    pub fn dim(&self) -> usize {
        self.low.len()
    }

    pub fn low(&self) -> &[f32] {
        &self.low
    }

    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Map raw actions (rows of `dim` values) to the physical range.
    pub fn scale(&self, raw: &[f32]) -> Result<Vec<f32>> {
        self.check_rows(raw)?;
        Ok(raw
            .chunks(self.dim())
            .flat_map(|row| {
                row.iter()
                    .zip(self.low.iter().zip(&self.high))
                    .map(|(&x, (&l, &h))| l + x.clamp(0.0, 1.0) * (h - l))
            })
            .collect())
    }

    /// Inverse of [`Self::scale`] for actions inside the bounds.
    pub fn unscale(&self, action: &[f32]) -> Result<Vec<f32>> {
        self.check_rows(action)?;
        Ok(action
            .chunks(self.dim())
            .flat_map(|row| {
                row.iter()
                    .zip(self.low.iter().zip(&self.high))
                    .map(|(&a, (&l, &h))| if h > l { (a - l) / (h - l) } else { 0.0 })
            })
            .collect())
    }

    fn check_rows(&self, values: &[f32]) -> Result<()> {
        if values.len() % self.dim() != 0 {
            return Err(TrainError::RaggedRows {
                what: "actions",
                len: values.len(),
                row_len: self.dim(),
            });
        }
        Ok(())
    }
}
