// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// Test value for the word at `offset` of a region seeded with `seed`.
///
/// A pure xor-shift/add mix: the same inputs give the same word on every call and
/// on every boot, so the verifier recomputes the expected value instead of
/// storing it. Arithmetic wraps at 32 bits, the word width of the target.
pub const fn pattern(offset: u32, seed: u32) -> u32 {
    let mut x = offset.wrapping_add(seed);
    x ^= x >> 13;
    x = x.wrapping_add(x << 7);
    x ^= x >> 17;
    x = x.wrapping_add(x << 5);
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selftest::memory::{OFFSETS, OFF_CHIP_SEED, ON_CHIP_SEED};
    use std::collections::HashSet;

    #[test]
    fn test_known_values() {
        assert_eq!(pattern(0, 42), 178_794);
        assert_eq!(pattern(0, 43), 183_051);
        assert_eq!(pattern(211, 42), 0x0010_6F1D);
        assert_eq!(pattern(1024, 43), 0x0045_4EEA);
    }

    #[test]
    fn test_deterministic() {
        for offset in OFFSETS {
            assert_eq!(pattern(offset, OFF_CHIP_SEED), pattern(offset, OFF_CHIP_SEED));
        }
    }

    #[test]
    fn test_distinct_offsets_give_distinct_words() {
        for seed in [OFF_CHIP_SEED, ON_CHIP_SEED] {
            let words: HashSet<u32> = OFFSETS.iter().map(|&o| pattern(o, seed)).collect();
            assert_eq!(words.len(), OFFSETS.len());
        }
    }

    #[test]
    fn test_distinct_seeds_give_distinct_words() {
        for offset in OFFSETS {
            assert_ne!(pattern(offset, OFF_CHIP_SEED), pattern(offset, ON_CHIP_SEED));
        }
    }

    #[test]
    fn test_wraps_instead_of_overflowing() {
        let _ = pattern(u32::MAX, u32::MAX);
        assert_eq!(pattern(u32::MAX, 1), pattern(0, 0));
    }
}
