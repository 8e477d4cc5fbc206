use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Tiny deterministic RNG used by the simulator.
///
/// Reproducible across platforms. It implements [`RngCore`], so it also
/// deals and shuffles rounds through `matchup_core::RandomSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a new deterministic RNG from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Derive an independent stream, e.g. one per simulated player.
    #[must_use]
    pub const fn fork(seed: u64, stream: u64) -> Self {
        Self::new(seed.wrapping_add(stream.wrapping_mul(0xD1B5_4A32_D192_ED03)))
    }

    const fn step(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Next value in `[0, upper_exclusive)`, without modulo bias.
    #[must_use]
    pub fn next_bounded(&mut self, upper_exclusive: u64) -> u64 {
        if upper_exclusive == 0 {
            return 0;
        }
        // Largest multiple of the bound that fits; draws above it are retried.
        let zone = u64::MAX - (u64::MAX % upper_exclusive);
        loop {
            let draw = self.step();
            if draw < zone {
                return draw % upper_exclusive;
            }
        }
    }

    /// Uniform index into a collection of `len` items.
    #[must_use]
    pub fn pick(&mut self, len: usize) -> usize {
        let bound = u64::try_from(len).unwrap_or(u64::MAX);
        usize::try_from(self.next_bounded(bound)).unwrap_or(0)
    }

    /// Bernoulli trial with integer percent.
    #[must_use]
    pub fn hit_rate_percent(&mut self, percent: u8) -> bool {
        if percent == 0 {
            return false;
        }
        if percent >= 100 {
            return true;
        }
        self.next_bounded(100) < u64::from(percent)
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        // High half: the low bits of an LCG cycle quickly.
        u32::try_from(self.step() >> 32).unwrap_or(u32::MAX)
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchup_core::{RandomSource, shuffle};

    #[test]
    fn same_seed_same_stream() {
        let mut a = DeterministicRng::new(42);
        let mut b = DeterministicRng::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn forks_diverge() {
        let mut a = DeterministicRng::fork(42, 0);
        let mut b = DeterministicRng::fork(42, 1);
        let left: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let right: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn bounded_draws_stay_in_range() {
        let mut rng = DeterministicRng::new(7);
        for bound in [1_u64, 2, 3, 10, 97] {
            for _ in 0..200 {
                assert!(rng.next_bounded(bound) < bound);
            }
        }
        assert_eq!(rng.next_bounded(0), 0);
    }

    #[test]
    fn hit_rate_edges() {
        let mut rng = DeterministicRng::new(1);
        assert!(!rng.hit_rate_percent(0));
        assert!(rng.hit_rate_percent(100));
    }

    #[test]
    fn shuffles_through_random_source() {
        let mut rng = DeterministicRng::new(99);
        assert!(RandomSource::index_below(&mut rng, 5) < 5);

        let mut values: Vec<u32> = (0..20).collect();
        shuffle(&mut values, &mut rng);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn fill_bytes_handles_partial_chunks() {
        let mut rng = DeterministicRng::new(3);
        let mut buf = [0_u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|byte| *byte != 0));
    }
}
