//! Experience storage for on-policy training.
//!
//! `RolloutBuffer` holds one collection pass worth of transitions for a
//! batch of environments and serves randomized minibatches to the
//! optimizer.

pub mod rollout_buffer;

pub use rollout_buffer::{Minibatch, RolloutBuffer, Transition};

#[cfg(test)]
mod tests;
