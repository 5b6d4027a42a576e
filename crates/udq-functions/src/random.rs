//! Random draws for `RANDN` and `RANDU`.

use rand::Rng;

/// Source of random numbers handed to the random functions by the caller.
pub trait RandomSource {
    /// Draw from the standard normal distribution.
    fn standard_normal(&mut self) -> f64;

    /// Draw uniformly from `[-1, 1)`.
    fn uniform(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    fn standard_normal(&mut self) -> f64 {
        // Box-Muller; keep u1 away from zero so ln stays finite
        let u1: f64 = self.random::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = self.random::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn uniform(&mut self) -> f64 {
        self.random_range(-1.0..1.0)
    }
}
