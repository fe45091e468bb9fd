// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Values that cross the host/device boundary.

use std::fmt;

/// Size of an encoded [`WorkerResult`] record in bytes.
pub const RESULT_RECORD_BYTES: usize = 16;

/// Opaque handle to one reserved execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct UnitHandle(u32);

impl UnitHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Substrate-level unit id.
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Reference to the worker-side program image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProgramRef {
    /// Kernel name the program exports.
    pub name: String,
}

impl ProgramRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for ProgramRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One worker's partial checksum and device cycle count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct WorkerResult {
    pub sum: u64,
    pub cycles: u64,
}

impl WorkerResult {
    pub fn new(sum: u64, cycles: u64) -> Self {
        Self { sum, cycles }
    }

    /// Serialises to the 16-byte little-endian wire layout.
    pub fn to_bytes(&self) -> [u8; RESULT_RECORD_BYTES] {
        let mut out = [0u8; RESULT_RECORD_BYTES];
        out[..8].copy_from_slice(&self.sum.to_le_bytes());
        out[8..].copy_from_slice(&self.cycles.to_le_bytes());
        out
    }

    /// Parses the 16-byte wire layout.
    pub fn from_bytes(bytes: &[u8; RESULT_RECORD_BYTES]) -> Self {
        let mut sum = [0u8; 8];
        let mut cycles = [0u8; 8];
        sum.copy_from_slice(&bytes[..8]);
        cycles.copy_from_slice(&bytes[8..]);
        Self {
            sum: u64::from_le_bytes(sum),
            cycles: u64::from_le_bytes(cycles),
        }
    }
}
