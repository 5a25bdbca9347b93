// Copyright 2025 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! # Thermodynamic states for molecular simulation systems
//!
//! A [`ThermodynamicState`](state::ThermodynamicState) pairs a mutable system
//! description with a temperature and an optional pressure, and keeps the two
//! consistent: at most one supported barostat, matching the state's own
//! temperature and pressure, and only on periodic systems. Compatibility
//! hashing lets an execution context be reused across nearby states by
//! retargeting the integrator and barostat instead of rebuilding the context.

use nalgebra::Vector3;

pub type Point = Vector3<f64>;

pub mod analysis;
pub mod cli;
pub mod context;
pub mod integrator;
pub mod state;
pub mod store;
pub mod system;

pub use context::{Context, Platform};
pub use integrator::Integrator;
pub use state::{ThermodynamicState, ThermodynamicsError};
pub use system::System;

pub use physical_constants::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, MOLAR_GAS_CONSTANT, STANDARD_ATMOSPHERE,
};
