//! Tests for the algorithms module.
//!
//! - `gae_tests`: Generalized Advantage Estimation
//! - `policy_loss_tests`: PPO clipped surrogate and value losses
