// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use crate::hamiltonian::Operator;

/// Context passed by value to the schedule functions A(t) and B(t).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduleConfig {
    /// The total duration of the evolution, i.e., the last time of the grid.
    pub total_duration: f64,
}

impl ScheduleConfig {
    /// Derive the configuration from a time grid, which is validated.
    pub fn from_time_grid(time_grid: &[f64]) -> anyhow::Result<Self> {
        validate_time_grid(time_grid)?;
        Ok(Self {
            total_duration: *time_grid.last().unwrap_or(&0.0),
        })
    }
}

/// Check that the time grid is non-empty, finite, and non-decreasing.
///
/// Repeated times are accepted: they produce no evolution between them.
pub fn validate_time_grid(time_grid: &[f64]) -> anyhow::Result<()> {
    anyhow::ensure!(!time_grid.is_empty(), "empty time grid");
    if let Some(t) = time_grid.iter().find(|t| !t.is_finite()) {
        anyhow::bail!("non-finite time in grid: {}", t);
    }
    for (i, pair) in time_grid.windows(2).enumerate() {
        anyhow::ensure!(
            pair[1] >= pair[0],
            "decreasing time grid at position {}: {} < {}",
            i + 1,
            pair[1],
            pair[0]
        );
    }
    Ok(())
}

/// Schedule that decreases linearly from 1 at t = 0 to 0 at the end.
pub fn linear_ramp_down(t: f64, config: ScheduleConfig) -> f64 {
    1.0 - t / config.total_duration
}

/// Schedule that increases linearly from 0 at t = 0 to 1 at the end.
pub fn linear_ramp_up(t: f64, config: ScheduleConfig) -> f64 {
    t / config.total_duration
}

/// Evaluate a schedule, failing if it does not return a finite value.
pub fn evaluate<F>(schedule: &F, t: f64, config: ScheduleConfig) -> anyhow::Result<f64>
where
    F: Fn(f64, ScheduleConfig) -> f64,
{
    let value = schedule(t, config);
    anyhow::ensure!(
        value.is_finite(),
        "schedule returned a non-finite value at t = {}: {}",
        t,
        value
    );
    Ok(value)
}

/// Return the instantaneous Hamiltonian `H(t) = A(t) Hi + B(t) Hf`.
pub fn hamiltonian_at<A, B>(
    hi: &Operator,
    hf: &Operator,
    a: &A,
    b: &B,
    t: f64,
    config: ScheduleConfig,
) -> anyhow::Result<Operator>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    Operator::linear_combination(
        evaluate(a, t, config)?,
        hi,
        evaluate(b, t, config)?,
        hf,
    )
}
