//! Evaluation-Order Shuffling.
//!
//! A xorshift generator drives a Fisher-Yates shuffle of the unit order each
//! tick. It is deterministic for a given seed, so a shuffled run that diverges
//! from the fixed order can be replayed exactly.

/// Seed substituted for 0, which xorshift would never leave.
const FALLBACK_SEED: u64 = 123_456_789;

/// Xorshift64 pseudo-random generator.
#[derive(Clone, Debug)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Creates a generator from `seed` (0 is replaced by a fixed non-zero seed).
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    /// Next pseudo-random value.
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform-ish index in `0..bound`; `bound` must be non-zero.
    pub const fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    /// Shuffles `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
