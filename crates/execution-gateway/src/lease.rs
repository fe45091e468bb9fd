// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII lease that returns execution units to the gateway on drop.
//!
//! [`UnitLease`] is how unit release is guaranteed on every exit path. The
//! lease holds an `Arc` back to the gateway, so dropping it (normal scope
//! end, an early `?` return, or a panic unwind) calls
//! [`ExecutionGateway::release`] exactly once.
//!
//! ```text
//! UnitLease::acquire(gateway, hint)
//!       │
//!       ▼
//!   UnitLease  ◄─── owns Vec<UnitHandle>, holds Arc<dyn ExecutionGateway>
//!       │
//!       │  drop()
//!       ▼
//!   ExecutionGateway::release(units)
//! ```

use crate::{ExecutionGateway, GatewayError, UnitHandle};
use std::sync::Arc;

/// Exclusive reservation of a set of execution units.
pub struct UnitLease {
    /// Reserved units. Wrapped in `Option` so we can `take()` them in `drop()`.
    units: Option<Vec<UnitHandle>>,
    /// Handle back to the gateway for release.
    gateway: Arc<dyn ExecutionGateway>,
}

impl UnitLease {
    /// Reserves units from `gateway`.
    pub fn acquire(
        gateway: Arc<dyn ExecutionGateway>,
        unit_count_hint: u32,
    ) -> Result<Self, GatewayError> {
        let units = gateway.allocate(unit_count_hint)?;
        if units.is_empty() {
            // The gateway promised an error instead of an empty set.
            gateway.release(&units);
            return Err(GatewayError::Allocation(format!(
                "gateway '{}' returned no units",
                gateway.name()
            )));
        }
        tracing::info!(
            "leased {} unit(s) x {} thread(s) from '{}'",
            units.len(),
            gateway.threads_per_unit(),
            gateway.name(),
        );
        Ok(Self {
            units: Some(units),
            gateway,
        })
    }

    /// The leased units, in allocation order.
    pub fn units(&self) -> &[UnitHandle] {
        self.units.as_deref().unwrap_or(&[])
    }

    /// Number of leased units.
    pub fn len(&self) -> usize {
        self.units().len()
    }

    /// Returns `true` once the units have been released.
    pub fn is_empty(&self) -> bool {
        self.units().is_empty()
    }

    /// Releases the units now instead of at drop.
    pub fn release(mut self) {
        self.release_units();
    }

    fn release_units(&mut self) {
        if let Some(units) = self.units.take() {
            tracing::debug!("releasing {} unit(s) to '{}'", units.len(), self.gateway.name());
            self.gateway.release(&units);
        }
    }
}

impl Drop for UnitLease {
    fn drop(&mut self) {
        self.release_units();
    }
}

impl std::fmt::Debug for UnitLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitLease")
            .field("gateway", &self.gateway.name())
            .field("units", &self.units())
            .finish()
    }
}
