//! Injectable randomness for the simulated soil fallback

use rand::Rng;

/// Source of jitter values in `[-1, 1]`
///
/// Only the simulated soil tier draws from it, once per simulated nutrient
/// in N, P, K order. Deterministic runs inject a seeded generator or a
/// [`FixedJitter`].
pub trait JitterSource {
    fn next_jitter(&mut self) -> f64;
}

/// Adapts any `rand` generator
#[derive(Debug, Clone)]
pub struct RngJitter<R> {
    rng: R,
}

impl<R: Rng> RngJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> JitterSource for RngJitter<R> {
    fn next_jitter(&mut self) -> f64 {
        self.rng.random_range(-1.0..=1.0)
    }
}

/// Replays a fixed sequence, cycling when exhausted
///
/// An empty sequence yields `0.0`, i.e. the plain spatial trend.
#[derive(Debug, Clone, Default)]
pub struct FixedJitter {
    values: Vec<f64>,
    next: usize,
}

impl FixedJitter {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }

    /// Always returns zero
    pub fn zero() -> Self {
        Self::default()
    }
}

impl JitterSource for FixedJitter {
    fn next_jitter(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value.clamp(-1.0, 1.0)
    }
}
