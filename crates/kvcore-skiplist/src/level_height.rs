use oorandom::Rand32;

/// Default maximum node height, sufficient for roughly 10^6 entries.
pub const DEFAULT_MAX_LEVEL: usize = 12;

/// A random source for [`random_level`]. Implemented for [`Rand32`] so tests
/// can plug in a seeded generator and get a deterministic level sequence.
pub trait LevelRng {
    fn rand_u32(&mut self) -> u32;
}

impl LevelRng for Rand32 {
    #[inline]
    fn rand_u32(&mut self) -> u32 {
        Self::rand_u32(self)
    }
}

/// Returns a random level in `1..=max_level`, geometrically distributed with
/// success probability `p = 1/4` (within the spec's acceptable `[0.25, 0.5]`
/// range; `n = 4` is the constant LevelDB itself uses and keeps memory use
/// down relative to `n = 2`). Saturates at `max_level` rather than growing
/// further, which biases `max_level` slightly more likely than an unbounded
/// geometric distribution would give it.
pub fn random_level<R: LevelRng>(rng: &mut R, max_level: usize) -> usize {
    let mut level = 1;
    while level < max_level && rng.rand_u32() % 4 == 0 {
        level += 1;
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_at_max_level() {
        let mut rng = Rand32::new(1);
        for _ in 0..10_000 {
            let level = random_level(&mut rng, 3);
            assert!((1..=3).contains(&level));
        }
    }

    #[test]
    fn deterministic_under_seeded_rng() {
        let mut a = Rand32::new(42);
        let mut b = Rand32::new(42);
        let seq_a: Vec<usize> = (0..50).map(|_| random_level(&mut a, 12)).collect();
        let seq_b: Vec<usize> = (0..50).map(|_| random_level(&mut b, 12)).collect();
        assert_eq!(seq_a, seq_b);
    }
}
