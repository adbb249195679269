//! Randomness for spawn positions and serve angles
//!
//! Games only ask for bounded integers, so tests can substitute a scripted
//! sequence for the seeded PCG stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

pub trait RandomSource: Send {
    /// Uniform integer in `0..bound`. A zero bound yields 0.
    fn next_below(&mut self, bound: u32) -> u32;
}

/// Seeded PCG32 stream
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed from the OS entropy source
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.random_range(0..bound)
    }
}

/// Cycles through fixed values, each reduced modulo the requested bound
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<u32>,
    next: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }

    /// Always returns `value` (modulo the bound)
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 || self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next = self.next.wrapping_add(1);
        value % bound
    }
}
