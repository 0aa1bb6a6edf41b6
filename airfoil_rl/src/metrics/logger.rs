//! Training loggers.
//!
//! The train loop hands every finished [`IterationRecord`] to a
//! [`MetricsLogger`]. Rendering plots is left to consumers of the CSV or
//! JSON output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::training_metrics::IterationRecord;
use crate::error::Result;

/// Sink for per-iteration metrics.
pub trait MetricsLogger {
    /// Log one iteration.
    fn log(&mut self, record: &IterationRecord) -> Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Emits one `tracing` event per logged iteration.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    log_interval: usize,
}

impl TracingLogger {
    /// Log every `log_interval`-th iteration (0 is treated as 1).
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(1)
    }
}

impl MetricsLogger for TracingLogger {
    fn log(&mut self, record: &IterationRecord) -> Result<()> {
        if record.iteration % self.log_interval == 0 {
            info!(
                iteration = record.iteration,
                steps = record.steps,
                episode_reward = record.episode_reward,
                running_reward = record.running_reward,
                actor_loss = record.actor_loss,
                critic_loss = record.critic_loss,
                entropy = record.entropy,
                "iteration complete"
            );
        }
        Ok(())
    }
}

/// CSV file logger.
pub struct CsvLogger {
    writer: BufWriter<File>,
}

impl CsvLogger {
    /// Create the file and write the header row.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "iteration,steps,episode_reward,running_reward,actor_loss,critic_loss,entropy,updates"
        )?;
        Ok(Self { writer })
    }
}

impl MetricsLogger for CsvLogger {
    fn log(&mut self, r: &IterationRecord) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{}",
            r.iteration,
            r.steps,
            r.episode_reward,
            r.running_reward,
            r.actor_loss,
            r.critic_loss,
            r.entropy,
            r.updates
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for CsvLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Fans every record out to several loggers.
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logger.
    pub fn add<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, record: &IterationRecord) -> Result<()> {
        for logger in &mut self.loggers {
            logger.log(record)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for logger in &mut self.loggers {
            logger.flush()?;
        }
        Ok(())
    }
}
