// Copyright 2025-2026 Mikael Lund
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

//! # Thermodynamic state of a simulation system
//!
//! The part of a context's state that does not change with integration:
//! temperature and, for constant-pressure ensembles, pressure. The state owns
//! a private copy of its system and enforces on every construction and
//! replacement that the system carries at most one barostat, of a supported
//! kind, matching the state's own temperature and pressure, and only on a
//! periodic system.

use std::cell::OnceCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use itertools::Itertools;

use crate::context::{Context, Platform};
use crate::integrator::Integrator;
use crate::system::{Force, MonteCarloBarostat, System};

/// Violations of the consistency contract between a thermodynamic state and
/// its system or integrator.
///
/// These are programmer or input-data errors, never transient: the failed
/// operation aborts and the state is left unchanged.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum ThermodynamicsError {
    #[error("System has multiple barostats.")]
    MultipleBarostats,
    #[error("Found unsupported barostat {0} in system.")]
    UnsupportedBarostat(String),
    #[error("System barostat is inconsistent with thermodynamic state.")]
    InconsistentBarostat,
    #[error("Non-periodic systems cannot have a barostat.")]
    BarostatedNonperiodic,
    #[error("Integrator is coupled to a heat bath at a different temperature.")]
    InconsistentIntegrator,
}

/// Thermodynamic state: temperature and optional pressure, kept in sync with
/// an owned system description.
///
/// The state never aliases caller data: the system is deep-copied on
/// construction, on the [`system`](Self::system) getter, and on the
/// [`set_system`](Self::set_system) setter.
#[derive(Clone, Debug)]
pub struct ThermodynamicState {
    /// Private copy of the system; always satisfies the barostat invariants.
    system: System,
    /// Constant temperature in K. A system without barostat carries no
    /// temperature information of its own, so it is held here.
    temperature: f64,
    /// Standard-system hash, computed on demand and reset when the system
    /// is replaced.
    cached_standard_system_hash: OnceCell<u64>,
}

impl ThermodynamicState {
    /// New state for `system` at the given temperature (K) and optional
    /// pressure (atm).
    ///
    /// The input system is deep-copied and never mutated. If `pressure` is
    /// given and the system has no barostat, one is added; an existing
    /// barostat is validated strictly and an inconsistent one is rejected,
    /// never silently corrected (see [`new_forced`](Self::new_forced) for
    /// the opt-in correction mode).
    pub fn new(
        system: &System,
        temperature: f64,
        pressure: Option<f64>,
    ) -> Result<Self, ThermodynamicsError> {
        let mut state = Self {
            system: system.clone(),
            temperature,
            cached_standard_system_hash: OnceCell::new(),
        };
        if let Some(pressure) = pressure {
            if !state.system.uses_periodic_boundary_conditions() {
                return Err(ThermodynamicsError::BarostatedNonperiodic);
            }
            match Self::find_barostat(&state.system)? {
                Some(barostat) if barostat.default_pressure() != pressure => {
                    return Err(ThermodynamicsError::InconsistentBarostat)
                }
                Some(_) => (),
                None => state
                    .system
                    .add_force(MonteCarloBarostat::new(pressure, temperature)),
            }
        }
        state.check_internal_consistency()?;
        Ok(state)
    }

    /// New state like [`new`](Self::new), but an inconsistent or missing
    /// barostat is reconfigured or added to match `(pressure, temperature)`
    /// instead of being rejected.
    ///
    /// Explicit opt-in: default construction stays strict because silent
    /// correction masks caller bugs. The input system is still never mutated.
    pub fn new_forced(
        system: &System,
        temperature: f64,
        pressure: Option<f64>,
    ) -> Result<Self, ThermodynamicsError> {
        let mut state = Self {
            system: system.clone(),
            temperature,
            cached_standard_system_hash: OnceCell::new(),
        };
        // Retune any existing barostat to the state temperature. Discovery
        // still rejects multiple or unsupported barostats.
        if let Some(barostat) = Self::find_barostat_mut(&mut state.system)? {
            barostat.probe_set_temperature(temperature);
        }
        if let Some(pressure) = pressure {
            state.set_pressure(Some(pressure))?;
        }
        state.check_internal_consistency()?;
        Ok(state)
    }

    /// A copy of the system in this thermodynamic state.
    pub fn system(&self) -> System {
        self.system.clone()
    }

    /// Replace the owned system wholesale.
    ///
    /// The candidate is validated first; on failure the previous owned copy
    /// stays in place. On success the standard-system hash cache is reset.
    pub fn set_system(&mut self, system: &System) -> Result<(), ThermodynamicsError> {
        self.check_system_consistency(system)?;
        self.system = system.clone();
        self.cached_standard_system_hash = OnceCell::new();
        Ok(())
    }

    /// Constant temperature of the state in K.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Set the temperature in K, propagating to the barostat if one exists.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
        if let Some(barostat) = self.barostat_mut() {
            barostat.probe_set_temperature(temperature);
        }
    }

    /// Constant pressure of the state in atm, or `None` if the system is at
    /// constant volume (no barostat).
    pub fn pressure(&self) -> Option<f64> {
        self.barostat().map(MonteCarloBarostat::default_pressure)
    }

    /// Set or clear the pressure in atm.
    ///
    /// `None` removes any barostat; a value adds one (configured at the
    /// state temperature) or retunes the pressure of the existing one.
    /// Fails with [`ThermodynamicsError::BarostatedNonperiodic`] when a
    /// pressure is requested on a non-periodic system.
    pub fn set_pressure(&mut self, pressure: Option<f64>) -> Result<(), ThermodynamicsError> {
        match pressure {
            None => {
                // The standard-system hash strips the barostat, so the
                // cache stays valid across this removal.
                if let Some(index) = self.system.forces().iter().position(Force::is_barostat) {
                    log::debug!("Removing barostat from system");
                    self.system.remove_force(index);
                }
            }
            Some(_) if !self.system.uses_periodic_boundary_conditions() => {
                return Err(ThermodynamicsError::BarostatedNonperiodic);
            }
            Some(pressure) => match self.barostat_mut() {
                Some(barostat) => barostat.set_default_pressure(pressure),
                None => {
                    log::debug!("Adding barostat at {} atm, {} K", pressure, self.temperature);
                    self.system
                        .add_force(MonteCarloBarostat::new(pressure, self.temperature));
                }
            },
        }
        Ok(())
    }

    /// Constant volume of the state in ų.
    ///
    /// `None` if the volume fluctuates (a pressure is set) or the system is
    /// non-periodic.
    pub fn volume(&self) -> Option<f64> {
        if self.pressure().is_some() || !self.system.uses_periodic_boundary_conditions() {
            return None;
        }
        Some(self.system.box_volume())
    }

    // ------------------------------------------------------------------
    // Compatibility hashing
    // ------------------------------------------------------------------

    /// Copy of `system` in its standard representation: the barostat, if
    /// any, is removed and every other force and parameter is untouched.
    ///
    /// The standard system makes the serialization independent of
    /// temperature and pressure, so it can test whether two states may
    /// share an execution context.
    pub fn standard_system(system: &System) -> System {
        let mut system = system.clone();
        if let Some(index) = system.forces().iter().position(Force::is_barostat) {
            system.remove_force(index);
        }
        system
    }

    /// Hash of the canonical serialization of the standard system.
    ///
    /// Two systems hash equal iff their canonical YAML forms, barostat
    /// stripped, are byte-identical.
    pub fn standard_system_hash(system: &System) -> u64 {
        let serialized = serde_yaml::to_string(&Self::standard_system(system))
            .expect("serializing a system never fails");
        let mut hasher = DefaultHasher::new();
        serialized.hash(&mut hasher);
        hasher.finish()
    }

    /// True if a context created by this state could serve `other` as well,
    /// after retargeting integrator and barostat.
    ///
    /// Reflexive and symmetric; insensitive to temperature, pressure and
    /// barostat configuration.
    pub fn is_state_compatible(&self, other: &ThermodynamicState) -> bool {
        self.cached_hash() == other.cached_hash()
    }

    /// True if this state can be applied to the given context.
    pub fn is_context_compatible(&self, context: &Context) -> bool {
        self.cached_hash() == Self::standard_system_hash(&context.system())
    }

    /// Standard-system hash of the owned system, computed once and cached
    /// until the system is replaced.
    pub(crate) fn cached_hash(&self) -> u64 {
        *self
            .cached_standard_system_hash
            .get_or_init(|| Self::standard_system_hash(&self.system))
    }

    // ------------------------------------------------------------------
    // Integrator handling
    // ------------------------------------------------------------------

    /// Create an execution context bound to a fresh copy of the state's
    /// system.
    ///
    /// Fails with [`ThermodynamicsError::InconsistentIntegrator`] if the
    /// integrator couples the system to a heat bath at a different
    /// temperature. `platform` defaults to [`Platform::Reference`].
    pub fn create_context(
        &self,
        integrator: Integrator,
        platform: Option<Platform>,
    ) -> Result<Context, ThermodynamicsError> {
        if !self.is_integrator_consistent(&integrator) {
            return Err(ThermodynamicsError::InconsistentIntegrator);
        }
        Ok(Context::new(
            self.system(),
            integrator,
            platform.unwrap_or_default(),
        ))
    }

    /// False only if the integrator has a heat bath at a temperature other
    /// than the state's. Non-thermostatted integrators are vacuously
    /// consistent. For a compound integrator the check applies to its
    /// currently active sub-integrator.
    pub fn is_integrator_consistent(&self, integrator: &Integrator) -> bool {
        integrator
            .active()
            .temperature()
            .map_or(true, |temperature| temperature == self.temperature)
    }

    /// Set the integrator's heat-bath temperature to the state's.
    /// Silent no-op if the integrator has no heat bath.
    pub fn set_integrator_temperature(&self, integrator: &mut Integrator) {
        integrator.set_temperature(self.temperature);
    }

    // ------------------------------------------------------------------
    // Barostat handling
    // ------------------------------------------------------------------

    /// Index of the single barostat-like force in `system`, if any.
    fn find_barostat_index(system: &System) -> Result<Option<usize>, ThermodynamicsError> {
        system
            .forces()
            .iter()
            .positions(Force::is_barostat)
            .at_most_one()
            .map_err(|_| ThermodynamicsError::MultipleBarostats)
    }

    /// The single supported barostat in `system`, if any.
    ///
    /// Fails on multiple barostat-like forces, or when the one found is not
    /// the isotropic Monte Carlo barostat; the error carries the offending
    /// type name.
    fn find_barostat(system: &System) -> Result<Option<&MonteCarloBarostat>, ThermodynamicsError> {
        let Some(index) = Self::find_barostat_index(system)? else {
            return Ok(None);
        };
        match &system.forces()[index] {
            Force::MonteCarloBarostat(barostat) => Ok(Some(barostat)),
            force => Err(ThermodynamicsError::UnsupportedBarostat(
                force.name().to_string(),
            )),
        }
    }

    fn find_barostat_mut(
        system: &mut System,
    ) -> Result<Option<&mut MonteCarloBarostat>, ThermodynamicsError> {
        let Some(index) = Self::find_barostat_index(system)? else {
            return Ok(None);
        };
        match system.force_mut(index) {
            Some(Force::MonteCarloBarostat(barostat)) => Ok(Some(barostat)),
            Some(force) => Err(ThermodynamicsError::UnsupportedBarostat(
                force.name().to_string(),
            )),
            None => unreachable!("index comes from the same force list"),
        }
    }

    /// Barostat of the owned system. Infallible: the owned system passed
    /// validation, so at most one supported barostat can be present.
    fn barostat(&self) -> Option<&MonteCarloBarostat> {
        self.system.forces().iter().find_map(|force| match force {
            Force::MonteCarloBarostat(barostat) => Some(barostat),
            _ => None,
        })
    }

    fn barostat_mut(&mut self) -> Option<&mut MonteCarloBarostat> {
        let index = self.system.forces().iter().position(Force::is_barostat)?;
        match self.system.force_mut(index) {
            Some(Force::MonteCarloBarostat(barostat)) => Some(barostat),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Consistency validation
    // ------------------------------------------------------------------

    fn check_internal_consistency(&self) -> Result<(), ThermodynamicsError> {
        self.check_system_consistency(&self.system)
    }

    /// Validate a system against this state's temperature and pressure.
    ///
    /// Checks that there is at most one barostat, of a supported kind, with
    /// matching temperature and pressure, and that a barostat only exists on
    /// a periodic system.
    fn check_system_consistency(&self, system: &System) -> Result<(), ThermodynamicsError> {
        if let Some(barostat) = Self::find_barostat(system)? {
            if !self.is_barostat_consistent(barostat) {
                return Err(ThermodynamicsError::InconsistentBarostat);
            }
            // The periodicity scan deliberately ignores the barostat itself;
            // see `System::uses_periodic_boundary_conditions`.
            if !system.uses_periodic_boundary_conditions() {
                return Err(ThermodynamicsError::BarostatedNonperiodic);
            }
        }
        Ok(())
    }

    /// Check the barostat's temperature and pressure against the state's.
    fn is_barostat_consistent(&self, barostat: &MonteCarloBarostat) -> bool {
        barostat.probe_temperature() == self.temperature
            && Some(barostat.default_pressure()) == self.pressure()
    }
}
