use std::cell::RefCell;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator with interior mutability so one instance can be shared
/// (behind an `Rc`) by every factory and entity in a scene.
#[derive(Debug)]
pub struct Rng64 {
    inner: RefCell<ChaCha8Rng>,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: RefCell::new(ChaCha8Rng::from_os_rng()),
        }
    }

    pub fn next_u64(&self) -> u64 {
        self.inner.borrow_mut().next_u64()
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64_01(&self) -> f64 {
        self.inner.borrow_mut().random::<f64>()
    }

    /// Uniform between `min` and `max`, taking both bounds literally.
    ///
    /// `min > max` is allowed and samples between `max` and `min`. An empty or
    /// non-finite span yields `min`.
    pub fn range(&self, min: f64, max: f64) -> f64 {
        let span = max - min;
        if !span.is_finite() || span == 0.0 {
            return min;
        }
        let (lo, hi) = if span > 0.0 { (min, max) } else { (max, min) };
        self.inner.borrow_mut().random_range(lo..hi)
    }

    /// Uniform integer in `[0, n)`; `0` when `n` is not positive.
    pub fn below(&self, n: f64) -> f64 {
        if n.is_nan() || n <= 0.0 {
            return 0.0;
        }
        self.range(0.0, n).floor()
    }

    pub fn angle(&self) -> f64 {
        self.range(0.0, std::f64::consts::TAU)
    }

    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut *self.inner.borrow_mut())
    }
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
