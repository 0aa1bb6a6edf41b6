//! Aerodynamic solver seam.
//!
//! The environment only needs lift and drag for one flow condition. Real
//! panel or CFD codes plug in behind [`AeroSolver`]; tests use stubs.

use serde::{Deserialize, Serialize};

use crate::error::SolverError;
use crate::geometry::Airfoil;

/// Operating point the airfoil is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowCondition {
    /// Chord Reynolds number
    pub reynolds: f64,
    /// Angle of attack in degrees
    pub alpha_deg: f64,
    /// Iteration cap handed to iterative solvers
    pub max_iterations: usize,
}

impl Default for FlowCondition {
    fn default() -> Self {
        Self {
            reynolds: 1e6,
            alpha_deg: 5.0,
            max_iterations: 100,
        }
    }
}

impl FlowCondition {
    pub fn with_reynolds(mut self, reynolds: f64) -> Self {
        self.reynolds = reynolds;
        self
    }

    pub fn with_alpha_deg(mut self, alpha_deg: f64) -> Self {
        self.alpha_deg = alpha_deg;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }
}

/// Lift and drag coefficients at one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AeroCoefficients {
    pub cl: f64,
    pub cd: f64,
}

impl AeroCoefficients {
    pub fn new(cl: f64, cd: f64) -> Self {
        Self { cl, cd }
    }

    /// Lift-to-drag ratio. Non-finite when `cd` is zero.
    pub fn lift_to_drag(&self) -> f64 {
        self.cl / self.cd
    }
}

/// Evaluates an airfoil at a flow condition.
pub trait AeroSolver {
    fn evaluate(
        &mut self,
        airfoil: &Airfoil,
        flow: &FlowCondition,
    ) -> Result<AeroCoefficients, SolverError>;
}

/// Closures act as solvers.
impl<F> AeroSolver for F
where
    F: FnMut(&Airfoil, &FlowCondition) -> Result<AeroCoefficients, SolverError>,
{
    fn evaluate(
        &mut self,
        airfoil: &Airfoil,
        flow: &FlowCondition,
    ) -> Result<AeroCoefficients, SolverError> {
        self(airfoil, flow)
    }
}
