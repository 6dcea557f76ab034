// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SolverOptions {
    /// Absolute tolerance of the local error of a step.
    pub atol: f64,
    /// Relative tolerance of the local error of a step.
    pub rtol: f64,
    /// Maximum number of steps between two consecutive output times.
    pub max_steps: u32,
    /// Size of the first step of each output interval. If zero, it is
    /// selected by the integrator.
    pub first_step: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            atol: 1e-8,
            rtol: 1e-6,
            max_steps: 2500,
            first_step: 0.0,
        }
    }
}

impl SolverOptions {
    pub fn header() -> String {
        String::from("atol,rtol,max_steps,first_step")
    }
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{}",
            self.atol, self.rtol, self.max_steps, self.first_step
        )
    }

    pub(crate) fn valid(&self) -> anyhow::Result<()> {
        let mut errors = vec![];
        if !(self.atol >= 0.0) {
            errors.push(format!("absolute tolerance ({}) < 0", self.atol));
        }
        if !(self.rtol >= 0.0) {
            errors.push(format!("relative tolerance ({}) < 0", self.rtol));
        }
        if self.atol == 0.0 && self.rtol == 0.0 {
            errors.push(String::from("vanishing tolerances"));
        }
        if self.max_steps == 0 {
            errors.push(String::from("vanishing maximum number of steps"));
        }
        if !(self.first_step >= 0.0) || self.first_step.is_infinite() {
            errors.push(format!("invalid first step ({})", self.first_step));
        }
        if !errors.is_empty() {
            anyhow::bail!("invalid solver options: {}", errors.join(","))
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SolverOptions;

    #[test]
    fn test_solver_options_valid() {
        assert!(SolverOptions::default().valid().is_ok());

        let invalid = vec![
            SolverOptions {
                atol: -1.0,
                ..Default::default()
            },
            SolverOptions {
                rtol: f64::NAN,
                ..Default::default()
            },
            SolverOptions {
                atol: 0.0,
                rtol: 0.0,
                ..Default::default()
            },
            SolverOptions {
                max_steps: 0,
                ..Default::default()
            },
            SolverOptions {
                first_step: -0.1,
                ..Default::default()
            },
            SolverOptions {
                first_step: f64::INFINITY,
                ..Default::default()
            },
        ];
        for options in invalid {
            assert!(options.valid().is_err(), "{:?}", options);
        }
    }

    #[test]
    fn test_solver_options_json() -> anyhow::Result<()> {
        let options = SolverOptions {
            atol: 1e-10,
            ..Default::default()
        };
        let serialized = serde_json::to_string(&options)?;
        assert_eq!(options, serde_json::from_str(&serialized)?);
        assert_eq!("atol,rtol,max_steps,first_step", SolverOptions::header());
        assert_eq!("0.0000000001,0.000001,2500,0", options.to_csv());
        Ok(())
    }
}
