// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Key ranges: the global search interval and per-worker shares of it.

use crate::PlannerError;
use std::fmt;

/// The half-open interval `[first, last)` of keys to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GlobalRange {
    first: u64,
    last: u64,
}

impl GlobalRange {
    /// Creates a range, rejecting `first > last`.
    pub fn new(first: u64, last: u64) -> Result<Self, PlannerError> {
        if first > last {
            return Err(PlannerError::InvertedRange { first, last });
        }
        Ok(Self { first, last })
    }

    /// First key (inclusive).
    pub fn first(&self) -> u64 {
        self.first
    }

    /// Last key (exclusive).
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Number of keys in the range.
    pub fn len(&self) -> u64 {
        self.last - self.first
    }

    /// Returns `true` if the range holds no keys.
    pub fn is_empty(&self) -> bool {
        self.first == self.last
    }
}

impl fmt::Display for GlobalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.first, self.last)
    }
}

/// One worker's share of the global range, `[fkey, lkey)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct KeyRange {
    pub fkey: u64,
    pub lkey: u64,
}

impl KeyRange {
    /// Number of keys assigned.
    pub fn len(&self) -> u64 {
        self.lkey - self.fkey
    }

    /// Returns `true` for a degenerate (zero-key) assignment.
    pub fn is_empty(&self) -> bool {
        self.fkey == self.lkey
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_len() {
        let r = GlobalRange::new(10, 25).unwrap();
        assert_eq!(r.first(), 10);
        assert_eq!(r.last(), 25);
        assert_eq!(r.len(), 15);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_empty_range_is_legal() {
        let r = GlobalRange::new(42, 42).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(matches!(
            GlobalRange::new(10, 2),
            Err(PlannerError::InvertedRange { first: 10, last: 2 })
        ));
    }

    #[test]
    fn test_key_range_len() {
        let k = KeyRange { fkey: 4, lkey: 8 };
        assert_eq!(k.len(), 4);
        assert!(KeyRange { fkey: 3, lkey: 3 }.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(GlobalRange::new(1, 9).unwrap().to_string(), "[1, 9)");
    }
}
