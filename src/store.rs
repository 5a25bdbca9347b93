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

//! Save and load thermodynamic state records for later analysis.

use crate::state::{ThermodynamicState, ThermodynamicsError};
use crate::system::System;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Saved record of a single thermodynamic state.
///
/// Only the defining quantities are saved; the validated state is rebuilt
/// on load, so an inconsistent record is caught at that point instead of
/// silently producing wrong results downstream.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateRecord {
    pub system: System,
    /// Temperature in K.
    pub temperature: f64,
    /// Pressure in atm, or `None` for constant volume.
    pub pressure: Option<f64>,
}

impl StateRecord {
    /// Rebuild the validated thermodynamic state from this record.
    pub fn to_state(&self) -> Result<ThermodynamicState, ThermodynamicsError> {
        ThermodynamicState::new(&self.system, self.temperature, self.pressure)
    }

    /// Record the defining quantities of a state.
    pub fn from_state(state: &ThermodynamicState) -> Self {
        Self {
            system: state.system(),
            temperature: state.temperature(),
            pressure: state.pressure(),
        }
    }
}

/// Store of state records in a YAML file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    pub states: Vec<StateRecord>,
}

impl Store {
    /// Load a store from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read store file {:?}", path.as_ref()))?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Save the store to a YAML file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write store file {:?}", path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{NonbondedForce, NonbondedMethod};

    fn periodic_system() -> System {
        let mut system = System::cubic(30.0);
        system.add_force(NonbondedForce::new(NonbondedMethod::Pme, 9.0));
        system
    }

    #[test]
    fn record_roundtrips_through_state() {
        let state = ThermodynamicState::new(&periodic_system(), 300.0, Some(1.0)).unwrap();
        let record = StateRecord::from_state(&state);
        let rebuilt = record.to_state().unwrap();
        assert_eq!(rebuilt.temperature(), 300.0);
        assert_eq!(rebuilt.pressure(), Some(1.0));
        assert!(state.is_state_compatible(&rebuilt));
    }

    #[test]
    fn store_roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yaml");

        let store = Store {
            states: vec![
                StateRecord {
                    system: periodic_system(),
                    temperature: 300.0,
                    pressure: None,
                },
                StateRecord {
                    system: periodic_system(),
                    temperature: 310.0,
                    pressure: Some(1.0),
                },
            ],
        };
        store.to_file(&path).unwrap();

        let loaded = Store::from_file(&path).unwrap();
        assert_eq!(loaded.states.len(), 2);
        assert_eq!(loaded.states[1].pressure, Some(1.0));
        assert!(loaded.states[0].to_state().is_ok());
    }

    #[test]
    fn missing_store_file_reports_path() {
        let err = Store::from_file("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }
}
