// Copyright 2026 Mikael Lund
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

//! # Analysis of stored thermodynamic states
//!
//! Loads a store of state records, rebuilds and validates each state, and
//! reports which states are interchangeable from an integrator's point of
//! view, i.e. could share one execution context.

use crate::state::ThermodynamicState;
use crate::store::Store;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// Kilojoule per joule.
const KILO: f64 = 1e-3;

/// States grouped by compatibility.
#[derive(Debug)]
pub struct CompatibilityReport {
    /// Indices into the store, one vector per group of mutually compatible
    /// states. Singleton groups are included.
    pub groups: Vec<Vec<usize>>,
}

impl CompatibilityReport {
    /// Number of execution contexts needed to serve every stored state.
    pub fn context_count(&self) -> usize {
        self.groups.len()
    }
}

/// Analyze the states stored in a YAML file.
///
/// Every record is rebuilt into a validated [`ThermodynamicState`];
/// an inconsistent record aborts the analysis with its index in the error.
pub fn analyze(store_path: impl AsRef<Path>, verbose: bool) -> anyhow::Result<CompatibilityReport> {
    let store = Store::from_file(&store_path)?;
    log::info!(
        "Loaded {} state record(s) from {:?}",
        store.states.len(),
        store_path.as_ref()
    );

    let mut states = Vec::with_capacity(store.states.len());
    for (index, record) in store.states.iter().enumerate() {
        let state = record
            .to_state()
            .with_context(|| format!("State record {} is inconsistent", index))?;
        report_state(index, &state, verbose);
        states.push(state);
    }
    Ok(group_compatible(&states))
}

fn report_state(index: usize, state: &ThermodynamicState, verbose: bool) {
    let thermal_energy = physical_constants::MOLAR_GAS_CONSTANT * KILO * state.temperature();
    match state.pressure() {
        Some(pressure) => log::info!(
            "State {}: NPT, T = {} K (kT = {:.4} kJ/mol), P = {} atm",
            index,
            state.temperature(),
            thermal_energy,
            pressure
        ),
        None => log::info!(
            "State {}: NVT, T = {} K (kT = {:.4} kJ/mol), V = {}",
            index,
            state.temperature(),
            thermal_energy,
            state
                .volume()
                .map_or("unbounded".to_string(), |v| format!("{:.1} ų", v))
        ),
    }
    if verbose {
        for force in state.system().forces() {
            log::debug!("State {}: force {}", index, force.name());
        }
    }
}

/// Group states by their standard-system hash.
///
/// A `BTreeMap` keyed by hash gives a deterministic group order for a given
/// store file.
fn group_compatible(states: &[ThermodynamicState]) -> CompatibilityReport {
    let mut by_hash: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (index, state) in states.iter().enumerate() {
        by_hash.entry(state.cached_hash()).or_default().push(index);
    }
    for (hash, members) in &by_hash {
        log::info!(
            "States {:?} share standard system {:016x}; one context serves them all",
            members,
            hash
        );
    }
    CompatibilityReport {
        groups: by_hash.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StateRecord;
    use crate::system::{NonbondedForce, NonbondedMethod, System};

    fn periodic_system(side: f64) -> System {
        let mut system = System::cubic(side);
        system.add_force(NonbondedForce::new(NonbondedMethod::Pme, 9.0));
        system
    }

    fn write_store(states: Vec<StateRecord>) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yaml");
        Store { states }.to_file(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn analyze_groups_compatible_states() {
        let (_dir, path) = write_store(vec![
            StateRecord {
                system: periodic_system(30.0),
                temperature: 300.0,
                pressure: None,
            },
            StateRecord {
                system: periodic_system(30.0),
                temperature: 310.0,
                pressure: Some(1.0),
            },
            StateRecord {
                system: periodic_system(40.0),
                temperature: 300.0,
                pressure: None,
            },
        ]);

        let report = analyze(&path, false).unwrap();
        assert_eq!(report.context_count(), 2);
        // Records 0 and 1 differ only in conditions and barostat.
        assert!(report.groups.iter().any(|g| g == &[0, 1]));
        assert!(report.groups.iter().any(|g| g == &[2]));
    }

    #[test]
    fn analyze_rejects_inconsistent_record() {
        let mut system = periodic_system(30.0);
        system.add_force(crate::system::MonteCarloBarostat::new(1.0, 280.0));
        let (_dir, path) = write_store(vec![StateRecord {
            system,
            temperature: 300.0,
            pressure: Some(1.0),
        }]);

        let err = analyze(&path, false).unwrap_err();
        assert!(err.to_string().contains("State record 0"));
    }
}
