//! Error types for the airfoil environment.

use airfoil_rl::TrainError;
use thiserror::Error;

/// Failures while building an airfoil from circles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("bump at x={x} with radius {radius} is not a valid circle")]
    InvalidBump { x: f64, radius: f64 },

    #[error("{what} has {count} points, need more to continue")]
    TooFewPoints { what: &'static str, count: usize },

    #[error("degenerate chord length {chord}")]
    DegenerateChord { chord: f64 },
}

/// Failures reported by an aerodynamic solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("solver did not converge at alpha={alpha_deg} deg after {iterations} iterations")]
    NotConverged { alpha_deg: f64, iterations: usize },

    #[error("solver rejected geometry: {0}")]
    InvalidGeometry(String),

    #[error("solver backend failure: {0}")]
    Backend(String),
}

impl From<GeometryError> for TrainError {
    fn from(err: GeometryError) -> Self {
        TrainError::Environment(err.to_string())
    }
}
