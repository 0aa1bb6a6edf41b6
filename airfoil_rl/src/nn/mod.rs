//! Reference network architectures.
//!
//! - [`mlp`]: ReLU MLP actor (Gaussian, sigmoid mean) and critic

pub mod mlp;

pub use mlp::{MlpActor, MlpConfig, MlpCritic};
