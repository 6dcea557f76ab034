// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use crate::config::SolverOptions;
use crate::evolution::{evolve_with_options, validate_state};
use crate::hamiltonian::{Ket, Operator};
use crate::schedule::ScheduleConfig;

/// Return the probability of measuring `target` in `state`, i.e.,
/// `|<target| rho |target>|` with `rho = |state><state|`.
pub fn state_fidelity(target: &Ket, state: &Ket) -> f64 {
    target.dotc(state).norm_sqr()
}

/// Return the fidelity with respect to `psi_target` of the state obtained at
/// the end of the annealing evolution of `psi_initial`.
pub fn fidelity<A, B>(
    hi: &Operator,
    hf: &Operator,
    psi_initial: &Ket,
    psi_target: &Ket,
    a: &A,
    b: &B,
    time_grid: &[f64],
) -> anyhow::Result<f64>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    fidelity_with_options(
        hi,
        hf,
        psi_initial,
        psi_target,
        a,
        b,
        time_grid,
        &SolverOptions::default(),
    )
}

/// Same as [`fidelity`] with custom solver options.
#[allow(clippy::too_many_arguments)]
pub fn fidelity_with_options<A, B>(
    hi: &Operator,
    hf: &Operator,
    psi_initial: &Ket,
    psi_target: &Ket,
    a: &A,
    b: &B,
    time_grid: &[f64],
    options: &SolverOptions,
) -> anyhow::Result<f64>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    validate_state("target", psi_target, hf)?;
    let states = evolve_with_options(hi, hf, psi_initial, a, b, time_grid, options)?;
    match states.last() {
        Some(psi_final) => Ok(state_fidelity(psi_target, psi_final)),
        None => anyhow::bail!("no state returned by the evolution"),
    }
}

/// Return `num` evenly spaced samples over the closed interval [start, end].
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let delta = (end - start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        end
                    } else {
                        start + i as f64 * delta
                    }
                })
                .collect()
        }
    }
}

/// Return the fidelity for each total duration in `total_times`.
///
/// For a total duration T the evolution is sampled over `num_intervals`
/// points evenly spaced from 1 (not 0) to T, hence every T must be >= 1.
#[allow(clippy::too_many_arguments)]
pub fn fidelity_over_durations<A, B>(
    hi: &Operator,
    hf: &Operator,
    psi_initial: &Ket,
    psi_target: &Ket,
    a: &A,
    b: &B,
    total_times: &[f64],
    num_intervals: usize,
) -> anyhow::Result<Vec<f64>>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    fidelity_over_durations_with_options(
        hi,
        hf,
        psi_initial,
        psi_target,
        a,
        b,
        total_times,
        num_intervals,
        &SolverOptions::default(),
    )
}

/// Same as [`fidelity_over_durations`] with custom solver options.
#[allow(clippy::too_many_arguments)]
pub fn fidelity_over_durations_with_options<A, B>(
    hi: &Operator,
    hf: &Operator,
    psi_initial: &Ket,
    psi_target: &Ket,
    a: &A,
    b: &B,
    total_times: &[f64],
    num_intervals: usize,
    options: &SolverOptions,
) -> anyhow::Result<Vec<f64>>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    anyhow::ensure!(!total_times.is_empty(), "empty list of total durations");
    anyhow::ensure!(num_intervals > 0, "vanishing number of intervals");

    let mut fidelities = Vec::with_capacity(total_times.len());
    for (i, total_time) in total_times.iter().enumerate() {
        anyhow::ensure!(
            *total_time >= 1.0,
            "total duration {} is < 1, the start of the time grid",
            total_time
        );
        let time_grid = linspace(1.0, *total_time, num_intervals);
        let value = fidelity_with_options(
            hi,
            hf,
            psi_initial,
            psi_target,
            a,
            b,
            &time_grid,
            options,
        )?;
        log::info!(
            "[{}/{}] total duration {}, fidelity {}",
            i + 1,
            total_times.len(),
            total_time,
            value
        );
        fidelities.push(value);
    }
    Ok(fidelities)
}
