// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Worker identity and the fixed-layout parameter record.
//!
//! A [`WorkerParams`] is what one worker thread reads before it starts: its
//! sub-range bounds and the broadcast loop count, three little-endian `u32`s
//! in a 12-byte record.

use crate::{KeyRange, PlannerError};
use std::fmt;

/// Size of an encoded [`WorkerParams`] record in bytes.
pub const PARAMS_RECORD_BYTES: usize = 12;

/// Identifies one worker thread: `(unit_index, thread_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct WorkerId {
    pub unit: u32,
    pub thread: u32,
}

impl WorkerId {
    pub fn new(unit: u32, thread: u32) -> Self {
        Self { unit, thread }
    }

    /// Recovers the worker from its global linear index.
    pub fn from_linear(idx: u32, threads_per_unit: u32) -> Self {
        Self {
            unit: idx / threads_per_unit,
            thread: idx % threads_per_unit,
        }
    }

    /// Global linear index `unit * threads_per_unit + thread`.
    pub fn linear(&self, threads_per_unit: u32) -> u32 {
        self.unit * threads_per_unit + self.thread
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.unit, self.thread)
    }
}

/// Per-worker dispatch parameters: the sub-range `[fkey, lkey)` and the
/// shared iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct WorkerParams {
    pub fkey: u32,
    pub lkey: u32,
    pub loops: u32,
}

impl WorkerParams {
    /// Builds the record for one worker.
    ///
    /// Fails if any bound or the loop count exceeds the 32-bit record field.
    pub fn encode(range: KeyRange, loops: u64) -> Result<Self, PlannerError> {
        Ok(Self {
            fkey: narrow("fkey", range.fkey)?,
            lkey: narrow("lkey", range.lkey)?,
            loops: narrow("loops", loops)?,
        })
    }

    /// The sub-range this record covers.
    pub fn range(&self) -> KeyRange {
        KeyRange {
            fkey: u64::from(self.fkey),
            lkey: u64::from(self.lkey),
        }
    }

    /// Number of keys this worker will search.
    pub fn num_keys(&self) -> u64 {
        self.range().len()
    }

    /// Serialises to the 12-byte wire layout.
    pub fn to_bytes(&self) -> [u8; PARAMS_RECORD_BYTES] {
        let mut out = [0u8; PARAMS_RECORD_BYTES];
        out[0..4].copy_from_slice(&self.fkey.to_le_bytes());
        out[4..8].copy_from_slice(&self.lkey.to_le_bytes());
        out[8..12].copy_from_slice(&self.loops.to_le_bytes());
        out
    }

    /// Parses the 12-byte wire layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlannerError> {
        let record: &[u8; PARAMS_RECORD_BYTES] =
            bytes.try_into().map_err(|_| PlannerError::BadRecordLength {
                expected: PARAMS_RECORD_BYTES,
                actual: bytes.len(),
            })?;
        let word = |i: usize| u32::from_le_bytes([record[i], record[i + 1], record[i + 2], record[i + 3]]);
        Ok(Self {
            fkey: word(0),
            lkey: word(4),
            loops: word(8),
        })
    }
}

fn narrow(field: &'static str, value: u64) -> Result<u32, PlannerError> {
    u32::try_from(value).map_err(|_| PlannerError::KeyOverflow { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_index_agrees() {
        let threads = 16;
        for idx in 0..64 {
            let w = WorkerId::from_linear(idx, threads);
            assert_eq!(w.linear(threads), idx);
            assert!(w.thread < threads);
        }
        assert_eq!(WorkerId::from_linear(35, 16), WorkerId::new(2, 3));
    }

    #[test]
    fn test_encode_broadcasts_loops() {
        let p = WorkerParams::encode(KeyRange { fkey: 4, lkey: 8 }, 1 << 20).unwrap();
        assert_eq!(p, WorkerParams { fkey: 4, lkey: 8, loops: 1 << 20 });
        assert_eq!(p.num_keys(), 4);
    }

    #[test]
    fn test_encode_rejects_wide_keys() {
        let err = WorkerParams::encode(KeyRange { fkey: 0, lkey: 1 << 33 }, 1).unwrap_err();
        assert_eq!(
            err,
            PlannerError::KeyOverflow { field: "lkey", value: 1 << 33 }
        );
        assert!(WorkerParams::encode(KeyRange { fkey: 0, lkey: 1 }, u64::MAX).is_err());
    }

    #[test]
    fn test_wire_layout_is_little_endian() {
        let p = WorkerParams { fkey: 1, lkey: 0x0102_0304, loops: 7 };
        let bytes = p.to_bytes();
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[4, 3, 2, 1]);
        assert_eq!(WorkerParams::from_bytes(&bytes).unwrap(), p);
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        assert!(matches!(
            WorkerParams::from_bytes(&[0u8; 8]),
            Err(PlannerError::BadRecordLength { expected: 12, actual: 8 })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerId::new(1, 7).to_string(), "01-07");
    }
}
