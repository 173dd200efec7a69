//! Deterministic, portable pseudo-random number generator.
//!
//! Implements a linear congruential generator with fixed constants
//! (`a = 1103515245`, `c = 12345`, `m = 2^31`). This is the sole source of
//! randomness in roomsync: the game's `setup` hook and every action
//! invocation draw from instances of this generator, seeded identically on
//! every peer, so host and clients never diverge when given the same inputs.
//!
//! **Critical constraint: determinism.** Every method must produce identical
//! output given the same prior state, regardless of platform, compiler
//! version, or optimization level. The generator state advances in pure
//! integer arithmetic; floats are only derived from the already-advanced
//! state. Two conforming peers must agree bit-for-bit, so the constants and
//! the truncation behavior here are load-bearing and must not change.
//!
//! **Not cryptographically secure.** The LCG is chosen for speed and
//! adequate statistical quality for gameplay. Never use it for anything
//! security-sensitive.

use serde::{Deserialize, Serialize};

/// LCG multiplier.
const MULTIPLIER: u64 = 1_103_515_245;
/// LCG increment.
const INCREMENT: u64 = 12_345;
/// LCG modulus (2^31).
const MODULUS: u64 = 1 << 31;

/// Error returned when picking from an empty slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot pick from an empty slice")]
pub struct EmptyPickError;

/// Seeded deterministic random source.
///
/// Two `GameRng` instances created with the same seed produce identical
/// output sequences for every operation, on every peer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new generator from an integer seed.
    ///
    /// Any integer is accepted; the seed is normalized to a positive
    /// non-zero value below the modulus so the generator never degenerates.
    pub fn new(seed: i64) -> Self {
        let mut state = seed.rem_euclid(MODULUS as i64) as u64;
        if state == 0 {
            state = 1;
        }
        Self { state }
    }

    /// Draw the next raw fraction in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (MULTIPLIER.wrapping_mul(self.state).wrapping_add(INCREMENT)) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Draw a uniform integer in `[min, max)`.
    ///
    /// Panics if `min >= max`.
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "range_i64: min must be less than max");
        min + (self.next_f64() * (max - min) as f64) as i64
    }

    /// Draw a uniform float in `[min, max)`.
    ///
    /// Panics if `min >= max`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min < max, "range_f64: min must be less than max");
        min + self.next_f64() * (max - min)
    }

    /// Pick a uniformly random element of `items`.
    ///
    /// Returns [`EmptyPickError`] if the slice is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, EmptyPickError> {
        if items.is_empty() {
            return Err(EmptyPickError);
        }
        let index = self.range_i64(0, items.len() as i64) as usize;
        Ok(&items[index])
    }

    /// Return a randomized permutation of `items` as a new vector.
    ///
    /// The input is left untouched. Identical seed and prior state produce
    /// an identical permutation (Fisher-Yates over the LCG stream).
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out: Vec<T> = items.to_vec();
        if out.len() < 2 {
            return out;
        }
        for i in (1..out.len()).rev() {
            let j = self.range_i64(0, i as i64 + 1) as usize;
            out.swap(i, j);
        }
        out
    }

    /// Return `true` with probability `probability`.
    ///
    /// `probability <= 0.0` always yields `false`; `probability >= 1.0`
    /// always yields `true`. One draw is consumed either way.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Return `true` with probability 0.5.
    pub fn coin_flip(&mut self) -> bool {
        self.chance(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_fraction_sequence() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn same_seed_same_sequence_for_every_operation() {
        let items: Vec<i64> = (0..16).collect();
        let mut a = GameRng::new(777);
        let mut b = GameRng::new(777);
        for _ in 0..1000 {
            assert_eq!(a.range_i64(0, 100), b.range_i64(0, 100));
            assert_eq!(
                a.range_f64(-5.0, 5.0).to_bits(),
                b.range_f64(-5.0, 5.0).to_bits()
            );
            assert_eq!(a.pick(&items).unwrap(), b.pick(&items).unwrap());
            assert_eq!(a.shuffle(&items), b.shuffle(&items));
            assert_eq!(a.coin_flip(), b.coin_flip());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(43);
        // Extremely unlikely to collide on the first value.
        assert_ne!(a.next_f64().to_bits(), b.next_f64().to_bits());
    }

    #[test]
    fn seed_is_normalized_to_positive_non_zero() {
        // Zero and negative seeds must still produce a working generator.
        for seed in [0, -1, -42, i64::MIN, i64::MAX] {
            let mut rng = GameRng::new(seed);
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "seed {seed} produced {v}");
        }
        // Zero normalizes to a fixed non-zero state, deterministically.
        let mut a = GameRng::new(0);
        let mut b = GameRng::new(0);
        assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
    }

    #[test]
    fn known_lcg_sequence_from_seed_one() {
        // First raw states from seed 1 with a=1103515245, c=12345, m=2^31.
        // If this test ever breaks, cross-peer determinism has been violated.
        let mut rng = GameRng::new(1);
        let expected_states: [u64; 3] = {
            let mut s: u64 = 1;
            let mut out = [0u64; 3];
            for slot in &mut out {
                s = (1_103_515_245u64.wrapping_mul(s).wrapping_add(12_345)) % (1 << 31);
                *slot = s;
            }
            out
        };
        assert_eq!(expected_states[0], 1_103_527_590);
        for state in expected_states {
            let v = rng.next_f64();
            assert_eq!(v.to_bits(), (state as f64 / (1u64 << 31) as f64).to_bits());
        }
    }

    #[test]
    fn fractions_stay_in_unit_range() {
        let mut rng = GameRng::new(12_345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "fraction out of range: {v}");
        }
    }

    #[test]
    fn range_i64_within_bounds() {
        let mut rng = GameRng::new(999);
        for _ in 0..10_000 {
            let v = rng.range_i64(10, 20);
            assert!((10..20).contains(&v), "range_i64 out of range: {v}");
        }
    }

    #[test]
    fn range_i64_negative_bounds() {
        let mut rng = GameRng::new(31_337);
        for _ in 0..10_000 {
            let v = rng.range_i64(-20, -10);
            assert!((-20..-10).contains(&v), "range_i64 out of range: {v}");
        }
    }

    #[test]
    fn range_f64_within_bounds() {
        let mut rng = GameRng::new(555);
        for _ in 0..10_000 {
            let v = rng.range_f64(1.5, 3.5);
            assert!(v >= 1.5 && v < 3.5, "range_f64 out of range: {v}");
        }
    }

    #[test]
    fn pick_empty_slice_is_an_error() {
        let mut rng = GameRng::new(1);
        let empty: [u8; 0] = [];
        assert_eq!(rng.pick(&empty), Err(EmptyPickError));
    }

    #[test]
    fn pick_reaches_every_element() {
        let items = [0usize, 1, 2, 3];
        let mut seen = [false; 4];
        let mut rng = GameRng::new(8);
        for _ in 0..1000 {
            seen[*rng.pick(&items).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s), "pick never chose some element");
    }

    #[test]
    fn shuffle_is_a_permutation_and_leaves_input_untouched() {
        let original: Vec<u32> = (0..32).collect();
        let mut rng = GameRng::new(4242);
        let shuffled = rng.shuffle(&original);

        assert_eq!(original, (0..32).collect::<Vec<u32>>());
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }

    #[test]
    fn shuffle_identical_seed_identical_permutation() {
        let items: Vec<u32> = (0..64).collect();
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(7);
        assert_eq!(a.shuffle(&items), b.shuffle(&items));
    }

    #[test]
    fn chance_distribution_near_half() {
        let mut rng = GameRng::new(42);
        let n = 10_000;
        let trues = (0..n).filter(|_| rng.coin_flip()).count();
        let pct = trues as f64 / n as f64;
        assert!(
            (0.45..0.55).contains(&pct),
            "coin_flip should be ~50%, got {:.1}%",
            pct * 100.0
        );
    }

    #[test]
    fn chance_extremes_are_degenerate() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
        }
        for _ in 0..100 {
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn serialized_state_resumes_the_same_sequence() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            rng.next_f64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: GameRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_f64().to_bits(), restored.next_f64().to_bits());
        }
    }
}
