// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use std::cell::RefCell;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use ode_solvers::dop_shared::OutputType;

use crate::config::SolverOptions;
use crate::hamiltonian::{Ket, Operator, HERMITIAN_TOLERANCE};
use crate::schedule::{evaluate, ScheduleConfig};

/// Maximum deviation from unit norm accepted for an initial state.
pub static NORM_TOLERANCE: f64 = 1e-6;

/// Safety factor, stabilization parameter, and bounds of the step size
/// factor of the Dormand-Prince controller.
static STEP_SAFETY: f64 = 0.9;
static STEP_BETA: f64 = 0.04;
static MIN_STEP_FACTOR: f64 = 0.2;
static MAX_STEP_FACTOR: f64 = 10.0;

/// Number of steps between two stiffness checks.
static STIFFNESS_CHECK: u32 = 1000;

/// Real representation of a state: real parts followed by imaginary parts.
type State = DVector<f64>;

/// Check that the two Hamiltonians act on the same Hermitian space.
pub(crate) fn validate_hamiltonians(hi: &Operator, hf: &Operator) -> anyhow::Result<()> {
    anyhow::ensure!(
        hi.dims() == hf.dims(),
        "initial and final Hamiltonians have different dimensions: {:?} vs. {:?}",
        hi.dims(),
        hf.dims()
    );
    anyhow::ensure!(
        hi.is_hermitian(HERMITIAN_TOLERANCE),
        "the initial Hamiltonian is not Hermitian"
    );
    anyhow::ensure!(
        hf.is_hermitian(HERMITIAN_TOLERANCE),
        "the final Hamiltonian is not Hermitian"
    );
    Ok(())
}

/// Check that a state lives in the space of `op` and has unit norm.
pub(crate) fn validate_state(name: &str, state: &Ket, op: &Operator) -> anyhow::Result<()> {
    anyhow::ensure!(
        state.len() == op.dim(),
        "{} state has dimension {}, expected {}",
        name,
        state.len(),
        op.dim()
    );
    let norm = state.norm();
    anyhow::ensure!(
        (norm - 1.0).abs() <= NORM_TOLERANCE,
        "{} state is not normalized: norm {}",
        name,
        norm
    );
    Ok(())
}

fn to_state(psi: &Ket) -> State {
    State::from_iterator(
        2 * psi.len(),
        psi.iter().map(|c| c.re).chain(psi.iter().map(|c| c.im)),
    )
}

fn to_ket(y: &State) -> Ket {
    let n = y.len() / 2;
    Ket::from_iterator(n, (0..n).map(|i| Complex64::new(y[i], y[n + i])))
}

/// Schrödinger equation with `H(t) = A(t) Hi + B(t) Hf` over one output
/// interval `[t_start, t_start + duration]`, in the rescaled time
/// `tau = (t - t_start) / duration` in [0, 1].
///
/// The first schedule failure is stored in `failure` and the derivative is
/// zero from then on.
struct Schrodinger<'a, A, B> {
    hi: &'a DMatrix<Complex64>,
    hf: &'a DMatrix<Complex64>,
    a: &'a A,
    b: &'a B,
    config: ScheduleConfig,
    t_start: f64,
    duration: f64,
    failure: &'a RefCell<Option<anyhow::Error>>,
}

impl<A, B> ode_solvers::System<f64, State> for Schrodinger<'_, A, B>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    fn system(&self, tau: f64, y: &State, dy: &mut State) {
        let t = self.t_start + tau * self.duration;
        let coefficients = evaluate(self.a, t, self.config)
            .and_then(|a| evaluate(self.b, t, self.config).map(|b| (a, b)));
        let (a, b) = match coefficients {
            Ok(coefficients) => coefficients,
            Err(err) => {
                let mut failure = self.failure.borrow_mut();
                if failure.is_none() {
                    *failure = Some(err);
                }
                dy.fill(0.0);
                return;
            }
        };

        // d psi / d tau = -i duration H(t) psi
        let psi = to_ket(y);
        let h_psi = (self.hi * &psi) * Complex64::from(a) + (self.hf * &psi) * Complex64::from(b);
        let n = psi.len();
        for (i, value) in h_psi.iter().enumerate() {
            dy[i] = self.duration * value.im;
            dy[n + i] = -self.duration * value.re;
        }
    }
}

/// Advance `psi` from `t_start` to `t_end` with the Dormand-Prince 5(4)
/// integrator.
#[allow(clippy::too_many_arguments)]
fn advance<A, B>(
    hi: &Operator,
    hf: &Operator,
    a: &A,
    b: &B,
    config: ScheduleConfig,
    psi: &Ket,
    t_start: f64,
    t_end: f64,
    options: &SolverOptions,
) -> anyhow::Result<Ket>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    let duration = t_end - t_start;
    let failure = RefCell::new(None);
    let system = Schrodinger {
        hi: hi.matrix(),
        hf: hf.matrix(),
        a,
        b,
        config,
        t_start,
        duration,
        failure: &failure,
    };
    let first_step = if options.first_step > 0.0 {
        (options.first_step / duration).min(1.0)
    } else {
        0.0
    };

    let mut stepper = ode_solvers::Dopri5::from_param(
        system,
        0.0,
        1.0,
        1.0,
        to_state(psi),
        options.rtol,
        options.atol,
        STEP_SAFETY,
        STEP_BETA,
        MIN_STEP_FACTOR,
        MAX_STEP_FACTOR,
        1.0,
        first_step,
        options.max_steps,
        STIFFNESS_CHECK,
        OutputType::Sparse,
    );
    let res = stepper.integrate();
    if let Some(err) = failure.borrow_mut().take() {
        return Err(err);
    }
    if let Err(err) = res {
        anyhow::bail!(
            "integration failed between t = {} and t = {}: {:?}",
            t_start,
            t_end,
            err
        );
    }

    let (Some(tau), Some(y)) = (stepper.x_out().last(), stepper.y_out().last()) else {
        anyhow::bail!("no output between t = {} and t = {}", t_start, t_end);
    };
    anyhow::ensure!(
        (tau - 1.0).abs() <= 1e-12,
        "integration stopped at t = {} instead of t = {}",
        t_start + tau * duration,
        t_end
    );
    log::debug!(
        "advanced from t = {} to t = {} in {} steps",
        t_start,
        t_end,
        stepper.x_out().len() - 1
    );
    Ok(to_ket(y))
}

/// Evolve `psi_initial` under `H(t) = A(t) Hi + B(t) Hf` with the default
/// solver options.
///
/// Return the state at every time of the grid, the first one being
/// `psi_initial` itself.
pub fn evolve<A, B>(
    hi: &Operator,
    hf: &Operator,
    psi_initial: &Ket,
    a: &A,
    b: &B,
    time_grid: &[f64],
) -> anyhow::Result<Vec<Ket>>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    evolve_with_options(hi, hf, psi_initial, a, b, time_grid, &SolverOptions::default())
}

/// Same as [`evolve`] with custom solver options.
pub fn evolve_with_options<A, B>(
    hi: &Operator,
    hf: &Operator,
    psi_initial: &Ket,
    a: &A,
    b: &B,
    time_grid: &[f64],
    options: &SolverOptions,
) -> anyhow::Result<Vec<Ket>>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    options.valid()?;
    validate_hamiltonians(hi, hf)?;
    validate_state("initial", psi_initial, hi)?;
    let config = ScheduleConfig::from_time_grid(time_grid)?;
    log::debug!(
        "evolving a {}-dimensional state over {} samples, total duration {}, options {}",
        hi.dim(),
        time_grid.len(),
        config.total_duration,
        options.to_csv()
    );

    let mut states = Vec::with_capacity(time_grid.len());
    states.push(psi_initial.clone());
    for pair in time_grid.windows(2) {
        let last = states.last().cloned().unwrap_or_else(|| psi_initial.clone());
        let next = if pair[1] > pair[0] {
            advance(hi, hf, a, b, config, &last, pair[0], pair[1], options)?
        } else {
            last
        };
        states.push(next);
    }
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::{basis, grover_hamiltonians, uniform_superposition};
    use crate::schedule::{linear_ramp_down, linear_ramp_up};

    fn never(_t: f64, _c: ScheduleConfig) -> f64 {
        0.0
    }

    fn always(_t: f64, _c: ScheduleConfig) -> f64 {
        1.0
    }

    #[test]
    fn test_evolve_output_samples() -> anyhow::Result<()> {
        let (hi, hf) = grover_hamiltonians(0, 2)?;
        let psi = uniform_superposition(2)?;
        let time_grid: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let states = evolve(&hi, &hf, &psi, &linear_ramp_down, &linear_ramp_up, &time_grid)?;
        assert_eq!(time_grid.len(), states.len());
        assert_eq!(psi, states[0]);
        for state in &states {
            assert_float_eq::assert_float_absolute_eq!(1.0, state.norm(), 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_evolve_stationary_state() -> anyhow::Result<()> {
        // The marked state is an eigenstate with zero energy of Hf.
        let (hi, hf) = grover_hamiltonians(2, 2)?;
        let psi = basis(4, 2)?;
        let states = evolve(&hi, &hf, &psi, &never, &always, &[0.0, 1.0, 10.0])?;
        for state in states {
            assert_float_eq::assert_float_absolute_eq!(0.0, (state - &psi).norm(), 1e-10);
        }
        Ok(())
    }

    #[test]
    fn test_evolve_phase() -> anyhow::Result<()> {
        // A state orthogonal to the marked one has energy 1 under Hf, hence
        // it acquires a phase exp(-i t).
        let (hi, hf) = grover_hamiltonians(0, 1)?;
        let psi = basis(2, 1)?;
        let t = 2.0;
        let states = evolve(&hi, &hf, &psi, &never, &always, &[0.0, t])?;
        let expected = Complex64::from_polar(1.0, -t);
        assert_float_eq::assert_float_absolute_eq!(0.0, (states[1][1] - expected).norm(), 1e-5);
        assert_float_eq::assert_float_absolute_eq!(0.0, states[1][0].norm(), 1e-12);
        Ok(())
    }

    #[test]
    fn test_evolve_tolerances() -> anyhow::Result<()> {
        let (hi, hf) = grover_hamiltonians(0, 1)?;
        let psi = basis(2, 1)?;
        let t = 20.0;
        let expected = Complex64::from_polar(1.0, -t);
        let options = SolverOptions {
            atol: 1e-13,
            rtol: 1e-11,
            max_steps: 100_000,
            ..Default::default()
        };
        let states = evolve_with_options(&hi, &hf, &psi, &never, &always, &[0.0, t], &options)?;
        assert_float_eq::assert_float_absolute_eq!(0.0, (states[1][1] - expected).norm(), 1e-8);

        let options = SolverOptions {
            first_step: 0.5,
            ..Default::default()
        };
        let states = evolve_with_options(
            &hi,
            &hf,
            &psi,
            &never,
            &always,
            &[0.0, 1.0, t],
            &options,
        )?;
        assert_eq!(3, states.len());
        assert_float_eq::assert_float_absolute_eq!(0.0, (states[2][1] - expected).norm(), 1e-4);
        Ok(())
    }

    #[test]
    fn test_state_conversion() {
        let psi = Ket::from_vec(vec![Complex64::new(0.6, -0.1), Complex64::new(0.0, 0.8)]);
        let y = to_state(&psi);
        assert_eq!(vec![0.6, 0.0, -0.1, 0.8], y.iter().cloned().collect::<Vec<f64>>());
        assert_eq!(psi, to_ket(&y));
    }

    #[test]
    fn test_evolve_repeated_times() -> anyhow::Result<()> {
        let (hi, hf) = grover_hamiltonians(0, 2)?;
        let psi = uniform_superposition(2)?;
        let states = evolve(&hi, &hf, &psi, &linear_ramp_down, &linear_ramp_up, &[1.0, 1.0, 1.0])?;
        assert_eq!(3, states.len());
        for state in states {
            assert_eq!(psi, state);
        }
        Ok(())
    }

    #[test]
    fn test_evolve_invalid_input() -> anyhow::Result<()> {
        let (hi, hf) = grover_hamiltonians(0, 2)?;
        let psi = uniform_superposition(2)?;
        let grid = [0.0, 1.0];

        // Wrong dimension or norm.
        let small = uniform_superposition(1)?;
        assert!(evolve(&hi, &hf, &small, &never, &always, &grid).is_err());
        let unnormalized = &psi * Complex64::from(2.0);
        assert!(evolve(&hi, &hf, &unnormalized, &never, &always, &grid).is_err());

        // Invalid time grids.
        assert!(evolve(&hi, &hf, &psi, &never, &always, &[]).is_err());
        assert!(evolve(&hi, &hf, &psi, &never, &always, &[1.0, 0.0]).is_err());

        // Mismatching Hamiltonians.
        let (hi_3, _) = grover_hamiltonians(0, 3)?;
        assert!(evolve(&hi_3, &hf, &psi, &never, &always, &grid).is_err());

        // Non-finite schedule.
        let broken = |_t: f64, _c: ScheduleConfig| f64::INFINITY;
        assert!(evolve(&hi, &hf, &psi, &broken, &always, &grid).is_err());

        // Too few steps allowed.
        let options = SolverOptions {
            max_steps: 1,
            first_step: 1e-3,
            ..Default::default()
        };
        assert!(evolve_with_options(
            &hi,
            &hf,
            &psi,
            &linear_ramp_down,
            &linear_ramp_up,
            &grid,
            &options
        )
        .is_err());

        Ok(())
    }
}
