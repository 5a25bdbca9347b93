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

//! # Execution contexts
//!
//! A [`Context`] binds a private copy of a system to an integrator on a
//! platform. Contexts are created through
//! [`ThermodynamicState::create_context`](crate::state::ThermodynamicState::create_context),
//! which guarantees the integrator's heat bath matches the state.

use crate::integrator::Integrator;
use crate::system::System;
use serde::{Deserialize, Serialize};

/// Compute platform executing a context.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Platform {
    /// Single-threaded reference implementation.
    #[default]
    Reference,
}

/// Execution context for a single simulation system.
#[derive(Clone, Debug)]
pub struct Context {
    system: System,
    integrator: Integrator,
    platform: Platform,
}

impl Context {
    pub(crate) fn new(system: System, integrator: Integrator, platform: Platform) -> Self {
        Self {
            system,
            integrator,
            platform,
        }
    }

    /// A copy of the context's system.
    ///
    /// A copy rather than a reference, so that no caller can mutate the
    /// system a running context is bound to.
    pub fn system(&self) -> System {
        self.system.clone()
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Mutable access to the integrator, e.g. to retarget the heat bath
    /// when reusing the context for a compatible state.
    pub fn integrator_mut(&mut self) -> &mut Integrator {
        &mut self.integrator
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }
}
