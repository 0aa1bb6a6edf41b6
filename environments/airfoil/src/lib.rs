//! Bump-primitive airfoil design environment.
//!
//! An agent shapes an airfoil by adding circles on the chord line. The
//! airfoil is the convex hull of all circles, resampled to a fixed number of
//! surface points, and each step is rewarded with the lift-to-drag ratio
//! reported by an [`AeroSolver`].
//!
//! # Example
//!
//! ```rust,ignore
//! use airfoil_env::{AeroCoefficients, Airfoil, AirfoilEnv, FlowCondition, SolverError};
//! use airfoil_rl::{nn::MlpConfig, TrainConfig, TrainLoop};
//!
//! let env = AirfoilEnv::new(|_: &Airfoil, _: &FlowCondition| {
//!     Ok::<_, SolverError>(AeroCoefficients::new(0.8, 0.01))
//! })?;
//! let config = TrainConfig::default();
//! let agent = MlpConfig::new(env.observation_size(), 2)
//!     .init_agent::<B>(&config, airfoil_env::action_bounds()?, &device);
//! TrainLoop::new(config, agent, vec![env], device)?.run()?;
//! ```
//!
//! The observation is `[2, 200]`: row 0 holds x, row 1 holds y, with the
//! upper surface from trailing to leading edge followed by the lower
//! surface from leading to trailing edge.

pub mod env;
pub mod error;
pub mod geometry;
pub mod solver;

pub use env::{action_bounds, AirfoilEnv, AirfoilEnvConfig, ACTION_UPPER, FAILURE_PENALTY};
pub use error::{GeometryError, SolverError};
pub use geometry::{Airfoil, BumpGeometry, Circle, Point};
pub use solver::{AeroCoefficients, AeroSolver, FlowCondition};

#[cfg(test)]
mod tests;
