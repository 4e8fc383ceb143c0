use diffsol::{
    error::{DiffsolError, OdeSolverError},
    ode_solver::method::OdeSolverMethod,
    NalgebraLU, OdeBuilder, OdeSolverStopReason,
};

use crate::data::DosingProtocol;
use crate::simulator::{
    equation::CompartmentSystem, solution::Trajectory, SolverOptions, M, T, V,
};
use crate::PkError;

type LS = NalgebraLU<f64>;

fn check_time_points(time_points: &[f64]) -> Result<(), PkError> {
    if time_points.is_empty() {
        return Err(PkError::validation("at least one time point is required"));
    }
    if let Some(t) = time_points.iter().find(|t| !t.is_finite()) {
        return Err(PkError::validation(format!(
            "time points must be finite, got {}",
            t
        )));
    }
    if let Some(w) = time_points.windows(2).find(|w| w[1] < w[0]) {
        return Err(PkError::validation(format!(
            "time points must be non-decreasing, got {} after {}",
            w[1], w[0]
        )));
    }
    Ok(())
}

fn solver_error(err: DiffsolError) -> PkError {
    match err {
        DiffsolError::OdeSolverError(OdeSolverError::StepSizeTooSmall { .. }) => {
            PkError::Numerical(
                "the step size of the ODE solver went to zero, one of the model parameters is probably close to 0.0 or infinite".to_string(),
            )
        }
        err => PkError::Solver(err),
    }
}

/// Integrates `system` from `time_points[0]` and samples the state at every time point.
pub(crate) fn integrate<P>(
    system: &CompartmentSystem<'_, P>,
    time_points: &[f64],
    options: &SolverOptions,
) -> Result<Trajectory, PkError>
where
    P: DosingProtocol + ?Sized,
{
    check_time_points(time_points)?;
    let layout = system.layout();
    let nstates = layout.nstates();
    let y0 = system.initial_state();
    let t0 = time_points[0];

    let mut states = M::zeros(nstates, time_points.len());
    // Samples at the start time are the initial condition
    let leading = time_points.iter().take_while(|&&t| t == t0).count();
    for j in 0..leading {
        states.column_mut(j).copy_from(&y0);
    }
    let remaining = &time_points[leading..];
    if remaining.is_empty() {
        return Ok(Trajectory::new(time_points.to_vec(), states, layout));
    }

    tracing::debug!(
        nstates,
        t0,
        t_end = time_points[time_points.len() - 1],
        samples = time_points.len(),
        "integrating compartment system"
    );

    let problem = OdeBuilder::<M>::new()
        .rtol(options.rtol)
        .atol(vec![options.atol; nstates])
        .t0(t0)
        .h0(options.h0)
        .rhs_implicit(
            |x: &V, _p: &V, t: T, y: &mut V| system.rhs(x.as_slice(), t, y.as_mut_slice()),
            |_x: &V, _p: &V, _t: T, v: &V, y: &mut V| {
                system.jac_mul(v.as_slice(), y.as_mut_slice())
            },
        )
        .init(|_p: &V, _t: T| y0.clone())
        .build()?;
    let mut solver = problem.bdf::<LS>()?;

    let t_end = remaining[remaining.len() - 1];
    solver.set_stop_time(t_end).map_err(solver_error)?;

    let mut steps = 0usize;
    for (j, &t) in remaining.iter().enumerate() {
        while solver.state().t < t {
            if steps >= options.max_steps {
                tracing::warn!(steps, t = solver.state().t, "step limit reached");
                return Err(PkError::Numerical(format!(
                    "the ODE solver took {} steps without reaching t = {}",
                    steps, t
                )));
            }
            let t_before = solver.state().t;
            let reason = match solver.step() {
                Ok(reason) => reason,
                Err(err) => {
                    tracing::warn!(t = t_before, "integration failed: {}", err);
                    return Err(solver_error(err));
                }
            };
            steps += 1;

            let state = solver.state();
            if !(state.t > t_before) {
                tracing::warn!(t = t_before, "integration stalled");
                return Err(PkError::Numerical(format!(
                    "the ODE solver made no progress past t = {}",
                    t_before
                )));
            }
            if let Some(value) = state.y.iter().find(|v| !v.is_finite()) {
                tracing::warn!(t = state.t, "integration produced a non-finite value");
                return Err(PkError::Numerical(format!(
                    "non-finite value {} in the solution at t = {}",
                    value, state.t
                )));
            }

            match reason {
                OdeSolverStopReason::InternalTimestep => {}
                OdeSolverStopReason::TstopReached => break,
                reason => {
                    return Err(PkError::Numerical(format!(
                        "unexpected solver return value: {:?}",
                        reason
                    )))
                }
            }
        }
        let y = solver.interpolate(t).map_err(solver_error)?;
        if let Some(value) = y.iter().find(|v| !v.is_finite()) {
            tracing::warn!(t, "integration produced a non-finite value");
            return Err(PkError::Numerical(format!(
                "non-finite value {} in the solution at t = {}",
                value, t
            )));
        }
        states.column_mut(leading + j).copy_from(&y);
    }
    tracing::trace!(steps, "integration finished");

    Ok(Trajectory::new(time_points.to_vec(), states, layout))
}
