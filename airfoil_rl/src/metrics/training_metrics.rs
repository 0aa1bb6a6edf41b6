//! Per-iteration training history.
//!
//! `TrainingMetrics` is append-only: the train loop adds one
//! [`IterationRecord`] after every iteration and nothing rewrites past
//! entries. Observers read it through [`SharedTrainingMetrics`] or take an
//! owned [`MetricsSnapshot`] for export.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Scalars recorded for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Zero-based iteration index
    pub iteration: usize,
    /// Cumulative environment steps after this iteration
    pub steps: usize,
    /// Reward collected this iteration, averaged across environments
    pub episode_reward: f32,
    /// Exponential moving average of `episode_reward`
    pub running_reward: f32,
    /// Mean actor loss over the iteration's minibatch updates
    pub actor_loss: f32,
    /// Mean critic loss over the iteration's minibatch updates
    pub critic_loss: f32,
    /// Mean policy entropy over the iteration's minibatch updates
    pub entropy: f32,
    /// Minibatch updates applied
    pub updates: usize,
}

/// Column-oriented copy of the whole history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub steps: Vec<usize>,
    pub episode_reward: Vec<f32>,
    pub running_reward: Vec<f32>,
    pub actor_loss: Vec<f32>,
    pub critic_loss: Vec<f32>,
    pub entropy: Vec<f32>,
}

/// Losses summarized over one optimization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LossSummary {
    pub actor_loss: f32,
    pub critic_loss: f32,
    pub entropy: f32,
    pub updates: usize,
}

/// Append-only training history.
#[derive(Debug, Clone)]
pub struct TrainingMetrics {
    records: Vec<IterationRecord>,
    running_reward_decay: f32,
}

impl TrainingMetrics {
    /// Create an empty history. `running_reward_decay` weighs the previous
    /// running reward (0.99 gives a slow moving average).
    pub fn new(running_reward_decay: f32) -> Self {
        Self {
            records: Vec::new(),
            running_reward_decay,
        }
    }

    /// Append the next iteration and return the stored record.
    ///
    /// The first running reward equals the first episode reward; afterwards
    /// `running = decay * previous + (1 - decay) * episode_reward`.
    pub fn record(
        &mut self,
        steps_this_iteration: usize,
        episode_reward: f32,
        losses: LossSummary,
    ) -> IterationRecord {
        let (iteration, steps, running_reward) = match self.records.last() {
            Some(prev) => (
                prev.iteration + 1,
                prev.steps + steps_this_iteration,
                self.running_reward_decay * prev.running_reward
                    + (1.0 - self.running_reward_decay) * episode_reward,
            ),
            None => (0, steps_this_iteration, episode_reward),
        };

        let record = IterationRecord {
            iteration,
            steps,
            episode_reward,
            running_reward,
            actor_loss: losses.actor_loss,
            critic_loss: losses.critic_loss,
            entropy: losses.entropy,
            updates: losses.updates,
        };
        self.records.push(record);
        record
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot::default();
        for r in &self.records {
            snapshot.steps.push(r.steps);
            snapshot.episode_reward.push(r.episode_reward);
            snapshot.running_reward.push(r.running_reward);
            snapshot.actor_loss.push(r.actor_loss);
            snapshot.critic_loss.push(r.critic_loss);
            snapshot.entropy.push(r.entropy);
        }
        snapshot
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(&self.snapshot())?)?;
        Ok(())
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new(0.99)
    }
}

/// Shared training metrics handle.
pub type SharedTrainingMetrics = Arc<RwLock<TrainingMetrics>>;

/// Create new shared training metrics.
pub fn training_metrics(running_reward_decay: f32) -> SharedTrainingMetrics {
    Arc::new(RwLock::new(TrainingMetrics::new(running_reward_decay)))
}
