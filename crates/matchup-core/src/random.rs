//! Injected randomness for dealing and shuffling.
//!
//! The engine never reaches for a global generator. Callers pass anything
//! implementing [`RandomSource`]: every `rand::Rng` qualifies through the
//! blanket impl, the simulator supplies its own seeded generator, and tests
//! use [`ScriptedSource`] to pin exact permutations.

use rand::Rng;

/// Uniform index draws.
pub trait RandomSource {
    /// Draw an index uniformly from `[0, bound)`.
    ///
    /// `bound` is always at least 1 when called by this crate.
    fn index_below(&mut self, bound: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn index_below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.gen_range(0..bound)
    }
}

/// Fisher–Yates shuffle driven by `rng`.
///
/// Walks `i` from the last slot down to 1 and swaps it with a slot drawn from
/// `[0, i]`, so a slice of length `n` consumes exactly `n - 1` draws.
pub fn shuffle<T>(items: &mut [T], rng: &mut (impl RandomSource + ?Sized)) {
    for i in (1..items.len()).rev() {
        let j = rng.index_below(i + 1);
        items.swap(i, j.min(i));
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// Each scripted value is reduced modulo the requested bound, so a script
/// written for one deck size never yields an out-of-range index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedSource {
    draws: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    /// Create a source that yields `draws` in order.
    #[must_use]
    pub fn new(draws: impl Into<Vec<usize>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    /// Number of draws consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn index_below(&mut self, bound: usize) -> usize {
        if bound == 0 || self.draws.is_empty() {
            return 0;
        }
        let raw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        raw % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn scripted_shuffle_is_exact() {
        let mut values = vec![1, 2, 3];
        let mut rng = ScriptedSource::new([2, 0]);
        shuffle(&mut values, &mut rng);
        assert_eq!(values, vec![2, 1, 3]);
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn scripted_draws_wrap_to_bound() {
        let mut rng = ScriptedSource::new([7]);
        assert_eq!(rng.index_below(3), 1);
        assert_eq!(rng.index_below(1), 0);
    }

    #[test]
    fn shuffle_of_short_slices_draws_nothing() {
        let mut rng = ScriptedSource::new([5]);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        let mut single = vec![9];
        shuffle(&mut single, &mut rng);
        assert_eq!(single, vec![9]);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn std_rng_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut values: Vec<u32> = (1..=9).collect();
        shuffle(&mut values, &mut rng);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn std_rng_index_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for bound in 1..50 {
            assert!(rng.index_below(bound) < bound);
        }
    }
}
