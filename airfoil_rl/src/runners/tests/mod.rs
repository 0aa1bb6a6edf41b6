//! Tests for the training drivers.
//!
//! - `train_loop_tests`: end-to-end iterations with stub environments/agents
//! - `ppo_optimizer_tests`: update counts and divergence handling

mod support;
