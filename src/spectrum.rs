// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use crate::hamiltonian::Operator;
use crate::schedule::{hamiltonian_at, ScheduleConfig};

/// Return the eigenenergies, in ascending order, of `A(t) Hi + B(t) Hf` for
/// each time `t` of the grid.
///
/// The schedules receive the last time of the grid as total duration.
pub fn spectrum_along_interpolation<A, B>(
    hi: &Operator,
    hf: &Operator,
    a: &A,
    b: &B,
    time_grid: &[f64],
) -> anyhow::Result<Vec<Vec<f64>>>
where
    A: Fn(f64, ScheduleConfig) -> f64,
    B: Fn(f64, ScheduleConfig) -> f64,
{
    crate::evolution::validate_hamiltonians(hi, hf)?;
    let config = ScheduleConfig::from_time_grid(time_grid)?;

    let mut spectra = Vec::with_capacity(time_grid.len());
    for t in time_grid {
        let energies = hamiltonian_at(hi, hf, a, b, *t, config)?.eigenenergies()?;
        log::debug!("t = {}, energies {:?}", t, energies);
        spectra.push(energies);
    }
    Ok(spectra)
}

/// Return the gap between the two lowest eigenenergies of each spectrum.
///
/// The spectra must have at least two energies each.
pub fn spectral_gaps(spectra: &[Vec<f64>]) -> anyhow::Result<Vec<f64>> {
    spectra
        .iter()
        .map(|energies| match energies.as_slice() {
            [ground, first, ..] => Ok(first - ground),
            _ => anyhow::bail!("spectrum with fewer than two energies"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::grover_hamiltonians;
    use crate::schedule::{linear_ramp_down, linear_ramp_up};

    #[test]
    fn test_spectrum_endpoints() -> anyhow::Result<()> {
        let (hi, hf) = grover_hamiltonians(3, 3)?;
        let time_grid: Vec<f64> = (0..=20).map(|i| i as f64 * 0.5).collect();
        let spectra = spectrum_along_interpolation(
            &hi,
            &hf,
            &linear_ramp_down,
            &linear_ramp_up,
            &time_grid,
        )?;
        assert_eq!(time_grid.len(), spectra.len());

        let first = spectra.first().unwrap();
        let last = spectra.last().unwrap();
        for (actual, expected) in first.iter().zip(hi.eigenenergies()?.iter()) {
            assert_float_eq::assert_float_absolute_eq!(*actual, *expected, 1e-10);
        }
        for (actual, expected) in last.iter().zip(hf.eigenenergies()?.iter()) {
            assert_float_eq::assert_float_absolute_eq!(*actual, *expected, 1e-10);
        }

        for energies in &spectra {
            assert_eq!(8, energies.len());
            assert!(energies.windows(2).all(|pair| pair[0] <= pair[1]));
        }
        Ok(())
    }

    #[test]
    fn test_spectrum_minimum_gap() -> anyhow::Result<()> {
        // With n = 2^N states, the gap of the Grover Hamiltonian is
        // sqrt(1 - 4 (1 - 1/n) s (1 - s)), which is minimum at s = 1/2.
        let (hi, hf) = grover_hamiltonians(0, 2)?;
        let spectra = spectrum_along_interpolation(
            &hi,
            &hf,
            &linear_ramp_down,
            &linear_ramp_up,
            &[0.0, 1.0, 2.0],
        )?;
        let gaps = spectral_gaps(&spectra)?;
        assert_float_eq::assert_float_absolute_eq!(1.0, gaps[0], 1e-10);
        assert_float_eq::assert_float_absolute_eq!(0.5, gaps[1], 1e-10);
        assert_float_eq::assert_float_absolute_eq!(1.0, gaps[2], 1e-10);
        Ok(())
    }

    #[test]
    fn test_spectrum_invalid() -> anyhow::Result<()> {
        let (hi, hf) = grover_hamiltonians(0, 2)?;
        for time_grid in [vec![], vec![2.0, 1.0]] {
            assert!(spectrum_along_interpolation(
                &hi,
                &hf,
                &linear_ramp_down,
                &linear_ramp_up,
                &time_grid
            )
            .is_err());
        }
        assert!(spectral_gaps(&[vec![0.0]]).is_err());
        Ok(())
    }
}
