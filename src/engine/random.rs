use std::collections::VecDeque;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Uniform integer source for question and distractor generation.
pub trait RandomSource {
    /// Uniform draw from `[min, max]`. Callers guarantee `min <= max`.
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64;
}

pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<SmallRng> {
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64 {
        self.rng.gen_range(min..=max)
    }
}

/// Replays a fixed list of draws, clamped into the requested range.
/// Once the script runs out every draw returns `min`.
pub struct ScriptedSource {
    draws: VecDeque<i64>,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = i64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedSource {
    fn int_inclusive(&mut self, min: i64, max: i64) -> i64 {
        self.draws.pop_front().unwrap_or(min).clamp(min, max)
    }
}

/// Fisher-Yates shuffle driven by a `RandomSource`.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.int_inclusive(0, i as i64) as usize;
        items.swap(i, j);
    }
}
