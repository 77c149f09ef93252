//! Random sampling for newly created particles.
//!
//! Every particle attribute is sampled as `base ± spread / 2`, either per
//! scalar or per vector axis. Sphere-style positions come from a uniform
//! point on the unit sphere.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seedable random source for particle attributes.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: SmallRng,
}

impl Sampler {
    /// Deterministic sampler; the same seed gives the same particles.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform in `[base - spread / 2, base + spread / 2)`.
    #[inline]
    pub fn value(&mut self, base: f32, spread: f32) -> f32 {
        base + spread * (self.random() - 0.5)
    }

    /// Per-axis [`value`](Self::value): a uniform point in a box.
    pub fn vec3(&mut self, base: Vec3, spread: Vec3) -> Vec3 {
        let offset = Vec3::new(
            self.random() - 0.5,
            self.random() - 0.5,
            self.random() - 0.5,
        );
        base + spread * offset
    }

    /// Uniform point on the surface of the unit sphere.
    pub fn on_unit_sphere(&mut self) -> Vec3 {
        let z = 2.0 * self.random() - 1.0;
        let theta = TAU * self.random();
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_stays_in_range() {
        let mut sampler = Sampler::from_seed(1);
        for _ in 0..1000 {
            let v = sampler.value(2.0, 1.0);
            assert!((1.5..=2.5).contains(&v));
        }
    }

    #[test]
    fn test_zero_spread_is_base() {
        let mut sampler = Sampler::from_seed(2);
        assert_eq!(sampler.value(0.6, 0.0), 0.6);
        assert_eq!(sampler.vec3(Vec3::new(0.0, 0.0, -2.0), Vec3::ZERO), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_vec3_stays_in_box() {
        let mut sampler = Sampler::from_seed(3);
        let base = Vec3::new(0.0, 0.0, -2.0);
        let spread = Vec3::new(10.0, 4.0, 2.0);
        for _ in 0..1000 {
            let offset = (sampler.vec3(base, spread) - base).abs();
            assert!(offset.cmple(spread * 0.5 + 1e-5).all());
        }
    }

    #[test]
    fn test_on_unit_sphere() {
        let mut sampler = Sampler::from_seed(4);
        for _ in 0..1000 {
            let p = sampler.on_unit_sphere();
            assert!((p.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = Sampler::from_seed(42);
        let mut b = Sampler::from_seed(42);
        for _ in 0..10 {
            assert_eq!(a.random(), b.random());
        }
    }
}
