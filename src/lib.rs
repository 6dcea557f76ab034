// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

pub mod config;
pub mod evolution;
pub mod fidelity;
pub mod hamiltonian;
pub mod render;
pub mod schedule;
pub mod spectrum;
pub mod topology;
pub mod user_config;
pub mod utils;
