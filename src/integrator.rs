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

//! # Integrators
//!
//! Some integrators couple the system to a heat bath, some do not.
//! [`Integrator::temperature`] returns `None` for non-thermostatted
//! integrators, which are vacuously consistent with any thermodynamic state.

use serde::{Deserialize, Serialize};

/// Leap-frog Verlet integrator. No heat bath.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VerletIntegrator {
    /// Integration step size in fs.
    step_size: f64,
}

impl VerletIntegrator {
    pub fn new(step_size: f64) -> Self {
        Self { step_size }
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }
}

/// Langevin dynamics integrator coupled to a heat bath.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LangevinIntegrator {
    /// Heat-bath temperature in K.
    temperature: f64,
    /// Friction coefficient in 1/ps.
    friction: f64,
    /// Integration step size in fs.
    step_size: f64,
}

impl LangevinIntegrator {
    pub fn new(temperature: f64, friction: f64, step_size: f64) -> Self {
        Self {
            temperature,
            friction,
            step_size,
        }
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }
}

/// Selectable collection of integrators with one currently active.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompoundIntegrator {
    integrators: Vec<Integrator>,
    current: usize,
}

impl CompoundIntegrator {
    /// New compound integrator; the first sub-integrator starts active.
    ///
    /// Panics if `integrators` is empty.
    pub fn new(integrators: Vec<Integrator>) -> Self {
        assert!(
            !integrators.is_empty(),
            "compound integrator needs at least one sub-integrator"
        );
        Self {
            integrators,
            current: 0,
        }
    }

    /// Index of the currently active sub-integrator.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Select the active sub-integrator.
    ///
    /// Panics if `index` is out of bounds.
    pub fn set_current(&mut self, index: usize) {
        assert!(index < self.integrators.len(), "sub-integrator out of bounds");
        self.current = index;
    }

    pub fn current_integrator(&self) -> &Integrator {
        &self.integrators[self.current]
    }

    pub fn current_integrator_mut(&mut self) -> &mut Integrator {
        &mut self.integrators[self.current]
    }
}

/// Closed set of integrators.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Integrator {
    Verlet(VerletIntegrator),
    Langevin(LangevinIntegrator),
    Compound(CompoundIntegrator),
}

impl Integrator {
    /// Currently active integrator; resolves nested compound integrators.
    pub fn active(&self) -> &Integrator {
        match self {
            Self::Compound(compound) => compound.current_integrator().active(),
            other => other,
        }
    }

    /// Heat-bath temperature in K, or `None` if not thermostatted.
    ///
    /// For a compound integrator this is the temperature of its currently
    /// active sub-integrator.
    pub fn temperature(&self) -> Option<f64> {
        match self.active() {
            Self::Verlet(_) => None,
            Self::Langevin(langevin) => Some(langevin.temperature),
            Self::Compound(_) => unreachable!("active() never returns a compound"),
        }
    }

    /// Set the heat-bath temperature in K. Silent no-op without a heat bath.
    pub fn set_temperature(&mut self, temperature: f64) {
        match self {
            Self::Verlet(_) => (),
            Self::Langevin(langevin) => langevin.temperature = temperature,
            Self::Compound(compound) => compound
                .current_integrator_mut()
                .set_temperature(temperature),
        }
    }
}

impl From<VerletIntegrator> for Integrator {
    fn from(integrator: VerletIntegrator) -> Self {
        Self::Verlet(integrator)
    }
}

impl From<LangevinIntegrator> for Integrator {
    fn from(integrator: LangevinIntegrator) -> Self {
        Self::Langevin(integrator)
    }
}

impl From<CompoundIntegrator> for Integrator {
    fn from(integrator: CompoundIntegrator) -> Self {
        Self::Compound(integrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verlet_has_no_heat_bath() {
        let mut integrator: Integrator = VerletIntegrator::new(2.0).into();
        assert_eq!(integrator.temperature(), None);
        integrator.set_temperature(300.0); // no-op
        assert_eq!(integrator.temperature(), None);
    }

    #[test]
    fn langevin_temperature_roundtrip() {
        let mut integrator: Integrator = LangevinIntegrator::new(300.0, 1.0, 2.0).into();
        assert_eq!(integrator.temperature(), Some(300.0));
        integrator.set_temperature(310.0);
        assert_eq!(integrator.temperature(), Some(310.0));
    }

    #[test]
    fn compound_delegates_to_active_sub_integrator() {
        let mut compound = CompoundIntegrator::new(vec![
            VerletIntegrator::new(2.0).into(),
            LangevinIntegrator::new(300.0, 1.0, 2.0).into(),
        ]);
        assert_eq!(compound.current(), 0);

        let mut integrator: Integrator = compound.clone().into();
        assert_eq!(integrator.temperature(), None);

        compound.set_current(1);
        integrator = compound.into();
        assert_eq!(integrator.temperature(), Some(300.0));
        integrator.set_temperature(305.0);
        assert_eq!(integrator.temperature(), Some(305.0));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn compound_rejects_invalid_selection() {
        let mut compound = CompoundIntegrator::new(vec![VerletIntegrator::new(2.0).into()]);
        compound.set_current(3);
    }
}
