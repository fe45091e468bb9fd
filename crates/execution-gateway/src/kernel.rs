// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Worker-side search kernel.
//!
//! Each key seeds lane 0 of a zeroed 25-lane Keccak state. The state is
//! permuted with Keccak-f[1600] `loops` times and the final lane 0 is XORed
//! into the worker's checksum. The checksum of an empty range is `0`.

/// Name the kernel program is loaded under.
pub const KERNEL_NAME: &str = "keccakf";

/// Iterated-permutation output for a single key.
pub fn permute_key(key: u64, loops: u32) -> u64 {
    let mut state = [0u64; 25];
    state[0] = key;
    for _ in 0..loops {
        tiny_keccak::keccakf(&mut state);
    }
    state[0]
}

/// XOR of [`permute_key`] over every key in `[fkey, lkey)`.
pub fn search_range(fkey: u64, lkey: u64, loops: u32) -> u64 {
    (fkey..lkey).fold(0, |sum, key| sum ^ permute_key(key, loops))
}
