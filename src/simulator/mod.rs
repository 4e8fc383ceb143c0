pub mod equation;
mod ode;
pub mod solution;

use serde::{Deserialize, Serialize};

use crate::data::{DosingProtocol, PkModel};
use crate::PkError;

pub use equation::{derivative, transfer, CompartmentSystem, StateLayout};
pub use solution::{PairId, Solution, Trajectory};

pub type T = f64;
pub type V = nalgebra::DVector<T>;
pub type M = nalgebra::DMatrix<T>;

/// Default relative tolerance of the integrator
pub const RTOL: f64 = 1e-6;
/// Default absolute tolerance of the integrator
pub const ATOL: f64 = 1e-8;
/// Default initial step size
pub const H0: f64 = 1e-3;
/// Default limit on the number of integrator steps per solve
pub const MAX_STEPS: usize = 100_000;

/// Tolerances and step control for the BDF integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    pub rtol: f64,
    pub atol: f64,
    pub h0: f64,
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: RTOL,
            atol: ATOL,
            h0: H0,
            max_steps: MAX_STEPS,
        }
    }
}

impl SolverOptions {
    pub fn new(rtol: f64, atol: f64) -> Result<Self, PkError> {
        let options = Self {
            rtol,
            atol,
            ..Default::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_h0(mut self, h0: f64) -> Self {
        self.h0 = h0;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn validate(&self) -> Result<(), PkError> {
        if self.max_steps == 0 {
            return Err(PkError::validation("solver option max_steps must be at least 1"));
        }
        for (name, value) in [("rtol", self.rtol), ("atol", self.atol), ("h0", self.h0)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PkError::validation(format!(
                    "solver option {} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Solve the model/protocol pair at `time_points`, returning the full trajectory.
pub fn solve_states<Mo, P>(
    model: &Mo,
    protocol: &P,
    time_points: &[f64],
    options: &SolverOptions,
) -> Result<Trajectory, PkError>
where
    Mo: PkModel + ?Sized,
    P: DosingProtocol + ?Sized,
{
    options.validate()?;
    let system = CompartmentSystem::new(model, protocol)?;
    ode::integrate(&system, time_points, options)
}

/// Solve the model/protocol pair at `time_points`, returning the central compartment quantity.
pub fn solve<Mo, P>(
    model: &Mo,
    protocol: &P,
    time_points: &[f64],
    options: &SolverOptions,
) -> Result<Vec<f64>, PkError>
where
    Mo: PkModel + ?Sized,
    P: DosingProtocol + ?Sized,
{
    Ok(solve_states(model, protocol, time_points, options)?.central())
}
