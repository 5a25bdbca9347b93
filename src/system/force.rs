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

//! # Interaction terms of a simulation system
//!
//! Forces are closed variants of the [`Force`] enum. Barostats come in two
//! API generations: the modern one exposes a *default temperature* accessor
//! pair, the legacy one only the plain pair. Code that must work with both
//! probes the modern accessor first and falls back to the plain one on
//! [`AccessorUnsupported`].

use crate::Point;
use serde::{Deserialize, Serialize};

/// Nonbonded treatment of a [`NonbondedForce`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum NonbondedMethod {
    /// No cutoff; all pairs interact. Non-periodic.
    NoCutoff,
    /// Spherical cutoff without minimum image convention. Non-periodic.
    CutoffNonPeriodic,
    /// Spherical cutoff with minimum image convention.
    CutoffPeriodic,
    /// Ewald summation.
    Ewald,
    /// Particle-mesh Ewald.
    Pme,
}

impl NonbondedMethod {
    /// True if the treatment implies periodic boundary conditions.
    pub fn is_periodic(&self) -> bool {
        !matches!(self, Self::NoCutoff | Self::CutoffNonPeriodic)
    }
}

/// Pairwise nonbonded interactions with a given treatment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NonbondedForce {
    method: NonbondedMethod,
    /// Cutoff distance in Å. Ignored for `NoCutoff`.
    cutoff: f64,
}

impl NonbondedForce {
    pub fn new(method: NonbondedMethod, cutoff: f64) -> Self {
        Self { method, cutoff }
    }

    pub fn method(&self) -> NonbondedMethod {
        self.method
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

/// Single harmonic bond between two particles.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HarmonicBond {
    /// Indices of the bonded particles.
    pub particles: (usize, usize),
    /// Equilibrium distance in Å.
    pub length: f64,
    /// Force constant in kJ/(mol·Å²).
    pub force_constant: f64,
}

/// Collection of harmonic bond terms.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HarmonicBondForce {
    bonds: Vec<HarmonicBond>,
}

impl HarmonicBondForce {
    pub fn new(bonds: Vec<HarmonicBond>) -> Self {
        Self { bonds }
    }

    pub fn bonds(&self) -> &[HarmonicBond] {
        &self.bonds
    }
}

/// Generation of the barostat accessor API.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BarostatApi {
    /// Exposes the `default_temperature` accessor pair.
    Modern,
    /// Predates the default-value accessors; only the plain pair exists.
    Legacy,
}

/// Signals that the probed accessor does not exist in the target API generation.
///
/// This is the only failure a capability probe may fall back on; any other
/// error kind must propagate.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("barostat accessor `{accessor}` is not available in the {api:?} API")]
pub struct AccessorUnsupported {
    pub accessor: &'static str,
    pub api: BarostatApi,
}

/// Isotropic Monte Carlo barostat.
///
/// The only pressure-coupling force supported by
/// [`ThermodynamicState`](crate::state::ThermodynamicState).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonteCarloBarostat {
    /// Coupling pressure in atm.
    pressure: f64,
    /// Coupling temperature in K.
    temperature: f64,
    /// Attempt a volume move every `frequency` steps.
    frequency: usize,
    api: BarostatApi,
}

impl MonteCarloBarostat {
    const DEFAULT_FREQUENCY: usize = 25;

    /// New barostat with the given pressure (atm) and temperature (K),
    /// built against the modern accessor API.
    pub fn new(pressure: f64, temperature: f64) -> Self {
        Self {
            pressure,
            temperature,
            frequency: Self::DEFAULT_FREQUENCY,
            api: BarostatApi::Modern,
        }
    }

    /// New barostat built against the legacy accessor API.
    pub fn legacy(pressure: f64, temperature: f64) -> Self {
        Self {
            api: BarostatApi::Legacy,
            ..Self::new(pressure, temperature)
        }
    }

    /// Coupling pressure in atm. Common to both API generations.
    pub fn default_pressure(&self) -> f64 {
        self.pressure
    }

    /// Set the coupling pressure in atm. Common to both API generations.
    pub fn set_default_pressure(&mut self, pressure: f64) {
        self.pressure = pressure;
    }

    /// Coupling temperature in K via the modern accessor.
    pub fn default_temperature(&self) -> Result<f64, AccessorUnsupported> {
        match self.api {
            BarostatApi::Modern => Ok(self.temperature),
            BarostatApi::Legacy => Err(AccessorUnsupported {
                accessor: "default_temperature",
                api: self.api,
            }),
        }
    }

    /// Set the coupling temperature in K via the modern accessor.
    pub fn set_default_temperature(&mut self, temperature: f64) -> Result<(), AccessorUnsupported> {
        match self.api {
            BarostatApi::Modern => {
                self.temperature = temperature;
                Ok(())
            }
            BarostatApi::Legacy => Err(AccessorUnsupported {
                accessor: "set_default_temperature",
                api: self.api,
            }),
        }
    }

    /// Coupling temperature in K via the plain accessor.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Set the coupling temperature in K via the plain accessor.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Coupling temperature, probing the modern accessor first.
    pub fn probe_temperature(&self) -> f64 {
        match self.default_temperature() {
            Ok(temperature) => temperature,
            Err(AccessorUnsupported { .. }) => self.temperature(),
        }
    }

    /// Set the coupling temperature, probing the modern accessor first.
    pub fn probe_set_temperature(&mut self, temperature: f64) {
        match self.set_default_temperature(temperature) {
            Ok(()) => (),
            Err(AccessorUnsupported { .. }) => self.set_temperature(temperature),
        }
    }

    pub fn frequency(&self) -> usize {
        self.frequency
    }
}

/// Anisotropic Monte Carlo barostat with a pressure per box axis.
///
/// Not supported by [`ThermodynamicState`](crate::state::ThermodynamicState);
/// it exists so that unsupported coupling elements are detected and rejected
/// rather than silently accepted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonteCarloAnisotropicBarostat {
    /// Coupling pressure per axis in atm.
    pressure: Point,
    /// Coupling temperature in K.
    temperature: f64,
    /// Attempt a volume move every `frequency` steps.
    frequency: usize,
}

impl MonteCarloAnisotropicBarostat {
    pub fn new(pressure: Point, temperature: f64) -> Self {
        Self {
            pressure,
            temperature,
            frequency: MonteCarloBarostat::DEFAULT_FREQUENCY,
        }
    }

    pub fn default_pressure(&self) -> Point {
        self.pressure
    }

    pub fn default_temperature(&self) -> f64 {
        self.temperature
    }
}

/// Closed set of interaction terms a [`System`](crate::system::System) may hold.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Force {
    /// Pairwise nonbonded interactions.
    Nonbonded(NonbondedForce),
    /// Harmonic bond terms.
    HarmonicBond(HarmonicBondForce),
    /// Isotropic pressure coupling.
    MonteCarloBarostat(MonteCarloBarostat),
    /// Anisotropic pressure coupling (unsupported by thermodynamic states).
    MonteCarloAnisotropicBarostat(MonteCarloAnisotropicBarostat),
}

impl Force {
    /// Concrete type name of the force.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nonbonded(_) => "NonbondedForce",
            Self::HarmonicBond(_) => "HarmonicBondForce",
            Self::MonteCarloBarostat(_) => "MonteCarloBarostat",
            Self::MonteCarloAnisotropicBarostat(_) => "MonteCarloAnisotropicBarostat",
        }
    }

    /// True for any pressure-coupling force, supported or not.
    ///
    /// Discovery is by type name so that future barostat kinds are caught
    /// by the unsupported-barostat check instead of slipping through.
    pub fn is_barostat(&self) -> bool {
        self.name().contains("Barostat")
    }
}

impl From<NonbondedForce> for Force {
    fn from(force: NonbondedForce) -> Self {
        Self::Nonbonded(force)
    }
}

impl From<HarmonicBondForce> for Force {
    fn from(force: HarmonicBondForce) -> Self {
        Self::HarmonicBond(force)
    }
}

impl From<MonteCarloBarostat> for Force {
    fn from(barostat: MonteCarloBarostat) -> Self {
        Self::MonteCarloBarostat(barostat)
    }
}

impl From<MonteCarloAnisotropicBarostat> for Force {
    fn from(barostat: MonteCarloAnisotropicBarostat) -> Self {
        Self::MonteCarloAnisotropicBarostat(barostat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_barostat_accessors() {
        let mut barostat = MonteCarloBarostat::new(1.0, 300.0);
        assert_eq!(barostat.default_temperature(), Ok(300.0));
        assert_eq!(barostat.default_pressure(), 1.0);

        barostat.set_default_temperature(310.0).unwrap();
        assert_eq!(barostat.probe_temperature(), 310.0);
    }

    #[test]
    fn legacy_barostat_falls_back_to_plain_accessors() {
        let mut barostat = MonteCarloBarostat::legacy(1.0, 300.0);
        let err = barostat.default_temperature().unwrap_err();
        assert_eq!(err.accessor, "default_temperature");
        assert_eq!(err.api, BarostatApi::Legacy);

        // The probe must transparently reach the plain accessor pair.
        assert_eq!(barostat.probe_temperature(), 300.0);
        barostat.probe_set_temperature(320.0);
        assert_eq!(barostat.temperature(), 320.0);
        assert_eq!(barostat.probe_temperature(), 320.0);
    }

    #[test]
    fn pressure_accessor_is_common_to_both_apis() {
        let mut barostat = MonteCarloBarostat::legacy(1.0, 300.0);
        barostat.set_default_pressure(2.5);
        assert_eq!(barostat.default_pressure(), 2.5);
    }

    #[test]
    fn barostat_discovery_by_name() {
        let nonbonded: Force = NonbondedForce::new(NonbondedMethod::Pme, 9.0).into();
        let isotropic: Force = MonteCarloBarostat::new(1.0, 300.0).into();
        let anisotropic: Force =
            MonteCarloAnisotropicBarostat::new(crate::Point::new(1.0, 1.0, 1.0), 300.0).into();

        assert!(!nonbonded.is_barostat());
        assert!(isotropic.is_barostat());
        assert!(anisotropic.is_barostat());
        assert_eq!(anisotropic.name(), "MonteCarloAnisotropicBarostat");
    }
}
