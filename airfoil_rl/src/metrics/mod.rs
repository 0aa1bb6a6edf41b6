//! Training metrics and logging.
//!
//! ## Metrics
//!
//! - [`TrainingMetrics`]: append-only per-iteration history
//! - [`SharedTrainingMetrics`]: Arc/RwLock wrapper for observers
//!
//! ## Loggers
//!
//! - [`TracingLogger`]: structured `tracing` events
//! - [`CsvLogger`]: CSV file logging for analysis
//! - [`MultiLogger`]: Combine multiple loggers

pub mod logger;
pub mod training_metrics;

pub use logger::{CsvLogger, MetricsLogger, MultiLogger, TracingLogger};
pub use training_metrics::{
    training_metrics, IterationRecord, LossSummary, MetricsSnapshot, SharedTrainingMetrics,
    TrainingMetrics,
};
