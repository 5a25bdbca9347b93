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

//! # Simulation system description
//!
//! A [`System`] is a mutable collection of [`Force`] terms plus the global
//! simulation parameters: the three periodic box vectors. Whether the system
//! actually uses periodic boundary conditions is decided by its nonbonded
//! treatments, never by the mere presence of a barostat.

mod force;

pub use force::{
    AccessorUnsupported, BarostatApi, Force, HarmonicBond, HarmonicBondForce,
    MonteCarloAnisotropicBarostat, MonteCarloBarostat, NonbondedForce, NonbondedMethod,
};

use crate::Point;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Description of a simulation system: forces and periodic box vectors.
///
/// The canonical serialization of a system is its YAML form; two systems are
/// interchangeable from an integrator's point of view iff their canonical
/// serializations, with any barostat stripped, are byte-identical.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct System {
    /// Periodic box vectors in Å.
    box_vectors: [Point; 3],
    forces: Vec<Force>,
}

impl System {
    /// New empty system with the given box vectors (Å).
    pub fn new(box_vectors: [Point; 3]) -> Self {
        Self {
            box_vectors,
            forces: Vec::new(),
        }
    }

    /// New empty system with a cubic box of the given side length (Å).
    pub fn cubic(side: f64) -> Self {
        Self::new([
            Point::new(side, 0.0, 0.0),
            Point::new(0.0, side, 0.0),
            Point::new(0.0, 0.0, side),
        ])
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn force(&self, index: usize) -> Option<&Force> {
        self.forces.get(index)
    }

    pub fn force_mut(&mut self, index: usize) -> Option<&mut Force> {
        self.forces.get_mut(index)
    }

    /// Append a force to the system.
    pub fn add_force(&mut self, force: impl Into<Force>) {
        self.forces.push(force.into());
    }

    /// Remove and return the force at `index`, or `None` if out of bounds.
    ///
    /// The relative order of the remaining forces is preserved.
    pub fn remove_force(&mut self, index: usize) -> Option<Force> {
        (index < self.forces.len()).then(|| self.forces.remove(index))
    }

    pub fn box_vectors(&self) -> &[Point; 3] {
        &self.box_vectors
    }

    pub fn set_box_vectors(&mut self, box_vectors: [Point; 3]) {
        self.box_vectors = box_vectors;
    }

    /// Parallelepiped volume of the periodic box in ų.
    ///
    /// Determinant of the 3×3 matrix formed from the box vectors.
    pub fn box_volume(&self) -> f64 {
        let [a, b, c] = self.box_vectors;
        Matrix3::from_columns(&[a, b, c]).determinant()
    }

    /// True if the system uses periodic boundary conditions.
    ///
    /// The scan looks at nonbonded treatments only: `NoCutoff` and
    /// `CutoffNonPeriodic` make the system non-periodic, and a system
    /// without any nonbonded force is non-periodic. A barostat must not
    /// count as periodic here, or the barostated-nonperiodic check in
    /// the state validation would be circular.
    pub fn uses_periodic_boundary_conditions(&self) -> bool {
        let mut methods = self.forces.iter().filter_map(|force| match force {
            Force::Nonbonded(nonbonded) => Some(nonbonded.method()),
            _ => None,
        });
        let mut any = false;
        for method in &mut methods {
            if !method.is_periodic() {
                return false;
            }
            any = true;
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn cubic_box_volume() {
        let system = System::cubic(30.0);
        assert_approx_eq!(f64, system.box_volume(), 27000.0, epsilon = 1e-9);
    }

    #[test]
    fn triclinic_box_volume() {
        // Volume of a sheared box equals that of its orthogonal parent.
        let system = System::new([
            Point::new(20.0, 0.0, 0.0),
            Point::new(5.0, 25.0, 0.0),
            Point::new(-3.0, 7.0, 15.0),
        ]);
        assert_approx_eq!(f64, system.box_volume(), 20.0 * 25.0 * 15.0, epsilon = 1e-9);
    }

    #[test]
    fn periodicity_from_nonbonded_methods() {
        let mut system = System::cubic(30.0);
        assert!(!system.uses_periodic_boundary_conditions());

        system.add_force(NonbondedForce::new(NonbondedMethod::Pme, 9.0));
        assert!(system.uses_periodic_boundary_conditions());

        // A single non-periodic treatment makes the whole system non-periodic.
        system.add_force(NonbondedForce::new(NonbondedMethod::CutoffNonPeriodic, 9.0));
        assert!(!system.uses_periodic_boundary_conditions());
    }

    #[test]
    fn barostat_alone_is_not_periodic() {
        let mut system = System::cubic(30.0);
        system.add_force(MonteCarloBarostat::new(1.0, 300.0));
        assert!(!system.uses_periodic_boundary_conditions());
    }

    #[test]
    fn remove_force_preserves_order() {
        let mut system = System::cubic(30.0);
        system.add_force(NonbondedForce::new(NonbondedMethod::Pme, 9.0));
        system.add_force(MonteCarloBarostat::new(1.0, 300.0));
        system.add_force(HarmonicBondForce::default());

        let removed = system.remove_force(1).unwrap();
        assert!(removed.is_barostat());
        assert_eq!(system.forces().len(), 2);
        assert_eq!(system.force(0).unwrap().name(), "NonbondedForce");
        assert_eq!(system.force(1).unwrap().name(), "HarmonicBondForce");

        assert!(system.remove_force(5).is_none());
    }
}
