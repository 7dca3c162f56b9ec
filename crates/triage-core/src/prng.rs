//! Seeded linear-congruential stream.
//!
//! The recurrence is `state = state * 1664525 + 1013904223 (mod 2^32)` and each
//! draw maps the low 16 bits of the new state to `(state & 0xFFFF) / 0xFFFF`.
//! Two streams built from the same seed produce identical sequences, which is
//! what makes the synthetic chart reproducible across runs and platforms.
//!
//! Note that the mapping divides by `0xFFFF`, not `0x10000`, so a draw of
//! exactly `1.0` is possible whenever the low half of the state is all ones.

/// LCG multiplier (Numerical Recipes).
pub const LCG_MULTIPLIER: u32 = 1_664_525;
/// LCG increment (Numerical Recipes).
pub const LCG_INCREMENT: u32 = 1_013_904_223;

const LOW_MASK: u32 = 0xFFFF;

/// Deterministic pseudo-random stream over a single 32-bit state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededStream {
    state: u32,
    draws: u64,
}

impl SeededStream {
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed,
            draws: 0,
        }
    }

    /// Advance the state and return the next value.
    #[inline]
    pub fn draw(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.draws += 1;
        f64::from(self.state & LOW_MASK) / f64::from(LOW_MASK)
    }

    /// Current internal state.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Number of draws taken since construction.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Iterator for SeededStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.draw())
    }
}
