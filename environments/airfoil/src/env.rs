//! Airfoil design environment.
//!
//! Each step appends one circular bump on the chord line, rebuilds the
//! airfoil and scores it by its lift-to-drag ratio. An episode is the
//! sequence of bumps between two resets.

use airfoil_rl::{ActionBounds, Environment, StepResult, TrainError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{Airfoil, BumpGeometry, POINTS_PER_CIRCLE, SURFACE_POINTS};
use crate::solver::{AeroCoefficients, AeroSolver, FlowCondition};

/// Upper bound of each action dimension: bump position and bump radius.
pub const ACTION_UPPER: [f32; 2] = [0.8, 0.2];

/// Reward handed back when the solver cannot produce a usable ratio.
pub const FAILURE_PENALTY: f32 = -1.0;

/// Bounds matching [`ACTION_UPPER`], for building an agent.
pub fn action_bounds() -> airfoil_rl::Result<ActionBounds> {
    ActionBounds::from_upper(ACTION_UPPER.to_vec())
}

/// Environment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirfoilEnvConfig {
    pub flow: FlowCondition,
    pub points_per_circle: usize,
    pub surface_points: usize,
    pub failure_penalty: f32,
}

impl Default for AirfoilEnvConfig {
    fn default() -> Self {
        Self {
            flow: FlowCondition::default(),
            points_per_circle: POINTS_PER_CIRCLE,
            surface_points: SURFACE_POINTS,
            failure_penalty: FAILURE_PENALTY,
        }
    }
}

impl AirfoilEnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow(mut self, flow: FlowCondition) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_surface_points(mut self, n: usize) -> Self {
        self.surface_points = n;
        self
    }

    pub fn with_failure_penalty(mut self, penalty: f32) -> Self {
        self.failure_penalty = penalty;
        self
    }
}

/// Bump-primitive airfoil environment scored by an [`AeroSolver`].
pub struct AirfoilEnv<S: AeroSolver> {
    config: AirfoilEnvConfig,
    solver: S,
    geometry: BumpGeometry,
    airfoil: Airfoil,
    shape: [usize; 2],
    last_coefficients: Option<AeroCoefficients>,
}

impl<S: AeroSolver> AirfoilEnv<S> {
    /// Environment with the default flow condition.
    pub fn new(solver: S) -> airfoil_rl::Result<Self> {
        Self::from_config(AirfoilEnvConfig::default(), solver)
    }

    pub fn from_config(config: AirfoilEnvConfig, solver: S) -> airfoil_rl::Result<Self> {
        let geometry = BumpGeometry::new()
            .with_points_per_circle(config.points_per_circle)
            .with_surface_points(config.surface_points);
        let airfoil = geometry.airfoil()?;
        Ok(Self {
            shape: airfoil.observation_shape(),
            config,
            solver,
            geometry,
            airfoil,
            last_coefficients: None,
        })
    }

    pub fn config(&self) -> &AirfoilEnvConfig {
        &self.config
    }

    pub fn geometry(&self) -> &BumpGeometry {
        &self.geometry
    }

    /// Current airfoil.
    pub fn airfoil(&self) -> &Airfoil {
        &self.airfoil
    }

    /// Coefficients from the last successful evaluation in this episode.
    pub fn last_coefficients(&self) -> Option<AeroCoefficients> {
        self.last_coefficients
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Score the current airfoil, substituting the penalty for failures.
    fn reward(&mut self) -> f32 {
        let coefficients = match self.solver.evaluate(&self.airfoil, &self.config.flow) {
            Ok(c) => c,
            Err(err) => {
                warn!(error = %err, bumps = self.geometry.bumps(), "solver failed, applying penalty");
                self.last_coefficients = None;
                return self.config.failure_penalty;
            }
        };
        self.last_coefficients = Some(coefficients);

        let ratio = coefficients.lift_to_drag() as f32;
        if ratio == 0.0 || !ratio.is_finite() {
            warn!(
                cl = coefficients.cl,
                cd = coefficients.cd,
                "unusable lift-to-drag ratio, applying penalty"
            );
            return self.config.failure_penalty;
        }
        ratio
    }
}

impl<S: AeroSolver> Environment for AirfoilEnv<S> {
    fn observation_shape(&self) -> &[usize] {
        &self.shape
    }

    fn action_dim(&self) -> usize {
        ACTION_UPPER.len()
    }

    fn reset(&mut self) -> airfoil_rl::Result<Vec<f32>> {
        self.geometry.reset();
        self.airfoil = self.geometry.airfoil()?;
        self.last_coefficients = None;
        Ok(self.airfoil.observation())
    }

    fn step(&mut self, action: &[f32]) -> airfoil_rl::Result<StepResult> {
        let &[x, radius] = action else {
            return Err(TrainError::ShapeMismatch {
                what: "airfoil action",
                expected: ACTION_UPPER.len(),
                actual: action.len(),
            });
        };

        self.geometry.add_bump(x as f64, radius as f64)?;
        self.airfoil = self.geometry.airfoil()?;
        let reward = self.reward();

        debug!(x, radius, reward, bumps = self.geometry.bumps(), "bump added");
        Ok(StepResult::new(self.airfoil.observation(), reward))
    }
}
