//! Training drivers.
//!
//! - [`TrainConfig`]: serde-backed configuration with validation
//! - [`PPOOptimizer`]: epochs of clipped-surrogate minibatch updates
//! - [`TrainLoop`]: collect -> estimate -> optimize -> log

pub mod config;
pub mod ppo_optimizer;
pub mod train_loop;

pub use config::{ConfigError, TrainConfig};
pub use ppo_optimizer::PPOOptimizer;
pub use train_loop::TrainLoop;

#[cfg(test)]
mod tests;
