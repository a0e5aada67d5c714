//! RNG injection seam.
//!
//! Shuffle and the UNO challenge-button coordinates are the engine's only
//! two sources of randomness. Both go through this trait so tests can swap
//! in a deterministic source without threading a seed through every call
//! site, generalizing the teacher's direct `rand::thread_rng()` use in
//! `Deck::shuffle`.
//!
//! The trait itself exposes only `gen_range_u32` — a generic `shuffle<T>`
//! method would make `dyn TableRng` impossible to form, and every call
//! site here needs a trait object so the poker deck and UNO deck can
//! share one RNG contract. [`shuffle`] is a free function built on top of
//! `gen_range_u32` instead.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

pub trait TableRng: Send {
    /// Uniform in `[low, high)`.
    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32;
}

/// Production RNG backed by the OS-seeded thread-local generator.
#[derive(Default)]
pub struct SystemRng(ThreadRng);

impl TableRng for SystemRng {
    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32 {
        self.0.random_range(low..high)
    }
}

/// Deterministic RNG for tests: seeded `StdRng`, reproducible across runs.
pub struct DeterministicRng(StdRng);

impl DeterministicRng {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl TableRng for DeterministicRng {
    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32 {
        self.0.random_range(low..high)
    }
}

/// In-place Fisher–Yates over any trait object RNG. O(n), unbiased by
/// position, per spec.md §4.A.
pub fn shuffle<T>(slice: &mut [T], rng: &mut dyn TableRng) {
    let n = slice.len();
    for i in (1..n).rev() {
        let j = rng.gen_range_u32(0, (i + 1) as u32) as usize;
        slice.swap(i, j);
    }
}

/// Uniformly random UNO challenge-button coordinates, in percent units,
/// `x` in `[15,85]` and `y` in `[20,75]`.
pub fn gen_button_pos(rng: &mut dyn TableRng) -> (u32, u32) {
    (rng.gen_range_u32(15, 86), rng.gen_range_u32(20, 76))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_rng_is_reproducible() {
        let mut a = DeterministicRng::seeded(7);
        let mut b = DeterministicRng::seeded(7);
        let mut xs = [1, 2, 3, 4, 5];
        let mut ys = [1, 2, 3, 4, 5];
        shuffle(&mut xs, &mut a);
        shuffle(&mut ys, &mut b);
        assert_eq!(xs, ys);
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut rng = DeterministicRng::seeded(3);
        let mut xs = [1, 2, 3, 4, 5, 6, 7];
        shuffle(&mut xs, &mut rng);
        let mut sorted = xs;
        sorted.sort_unstable();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn button_pos_is_within_bounds() {
        let mut rng = DeterministicRng::seeded(1);
        for _ in 0..50 {
            let (x, y) = gen_button_pos(&mut rng);
            assert!((15..=85).contains(&x));
            assert!((20..=75).contains(&y));
        }
    }
}
