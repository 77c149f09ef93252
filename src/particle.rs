//! A single simulated particle.
//!
//! Particles carry their own kinematic and visual state. Size, color and
//! opacity can be driven over the particle's life by tweens shared with
//! every other particle of the same emitter configuration.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;

use crate::color::hsl_to_rgb;
use crate::tween::Tween;

const DEG_TO_RAD: f32 = PI / 180.0;

/// Tweens applied to every particle of one emitter configuration.
///
/// An empty tween leaves its attribute at the sampled starting value.
/// The color tween is authored in HSL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleTweens {
    /// Size over age.
    pub size: Tween<f32>,
    /// HSL color over age.
    pub color: Tween<Vec3>,
    /// Opacity over age.
    pub opacity: Tween<f32>,
}

/// One particle in the emitter's pool.
#[derive(Debug, Clone)]
pub struct Particle {
    /// World position.
    pub position: Vec3,
    /// Units per second.
    pub velocity: Vec3,
    /// Units per second, per second.
    pub acceleration: Vec3,
    /// Rotation of the sprite in radians.
    pub angle: f32,
    /// Degrees per second.
    pub angle_velocity: f32,
    /// Degrees per second, per second.
    pub angle_acceleration: f32,
    /// Sprite size before distance attenuation.
    pub size: f32,
    /// RGB color, 0-1 per channel.
    pub color: Vec3,
    /// 0 = transparent, 1 = opaque.
    pub opacity: f32,
    /// Seconds since the particle was activated.
    pub age: f32,
    /// Inactive particles are simulated by nobody and drawn invisible.
    pub alive: bool,
    tweens: Arc<ParticleTweens>,
}

impl Particle {
    /// An inactive particle at the origin, bound to `tweens`.
    pub fn new(tweens: Arc<ParticleTweens>) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            angle: 0.0,
            angle_velocity: 0.0,
            angle_acceleration: 0.0,
            size: 16.0,
            color: Vec3::ONE,
            opacity: 1.0,
            age: 0.0,
            alive: false,
            tweens,
        }
    }

    /// Advance the particle by `dt` seconds.
    ///
    /// Position is integrated before velocity (semi-implicit Euler), then
    /// rotation, then age. Non-empty tweens overwrite size, color and
    /// opacity with their value at the new age.
    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.velocity += self.acceleration * dt;

        self.angle += self.angle_velocity * DEG_TO_RAD * dt;
        self.angle_velocity += self.angle_acceleration * DEG_TO_RAD * dt;

        self.age += dt;

        if let Some(size) = self.tweens.size.lerp(self.age) {
            self.size = size;
        }
        if let Some(hsl) = self.tweens.color.lerp(self.age) {
            self.color = hsl_to_rgb(hsl);
        }
        if let Some(opacity) = self.tweens.opacity.lerp(self.age) {
            self.opacity = opacity;
        }
    }

    /// Visibility as stored in the attribute buffer (1.0 alive, 0.0 dead).
    #[inline]
    pub fn visibility(&self) -> f32 {
        if self.alive {
            1.0
        } else {
            0.0
        }
    }

    /// The tweens this particle follows.
    pub fn tweens(&self) -> &Arc<ParticleTweens> {
        &self.tweens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Particle {
        Particle::new(Arc::new(ParticleTweens::default()))
    }

    #[test]
    fn test_new_particle_is_inactive() {
        let p = plain();
        assert!(!p.alive);
        assert_eq!(p.age, 0.0);
        assert_eq!(p.visibility(), 0.0);
    }

    #[test]
    fn test_integrates_position_before_velocity() {
        let mut p = plain();
        p.velocity = Vec3::new(1.0, 0.0, 0.0);
        p.update(0.5);
        assert_eq!(p.position, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(p.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p.age, 0.5);

        let mut q = plain();
        q.acceleration = Vec3::new(0.0, 2.0, 0.0);
        q.update(0.5);
        // Velocity changes only after position has moved.
        assert_eq!(q.position, Vec3::ZERO);
        assert_eq!(q.velocity, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotation_rates_are_degrees() {
        let mut p = plain();
        p.angle_velocity = 180.0;
        p.angle_acceleration = 90.0;
        p.update(1.0);
        assert!((p.angle - PI).abs() < 1e-5);
        assert!((p.angle_velocity - (180.0 + PI / 2.0)).abs() < 1e-4);
    }

    #[test]
    fn test_tweens_override_visuals() {
        let tweens = ParticleTweens {
            size: Tween::new(vec![0.0, 1.0], vec![1.0, 3.0]).unwrap(),
            color: Tween::constant(Vec3::new(0.0, 1.0, 0.5)),
            opacity: Tween::new(vec![0.0, 2.0], vec![1.0, 0.0]).unwrap(),
        };
        let mut p = Particle::new(Arc::new(tweens));
        p.update(0.5);
        assert!((p.size - 2.0).abs() < 1e-6);
        assert!((p.color - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((p.opacity - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_empty_tweens_keep_sampled_values() {
        let mut p = plain();
        p.size = 0.6;
        p.opacity = 0.3;
        p.color = Vec3::new(0.1, 0.2, 0.3);
        p.update(1.0);
        assert_eq!(p.size, 0.6);
        assert_eq!(p.opacity, 0.3);
        assert_eq!(p.color, Vec3::new(0.1, 0.2, 0.3));
    }
}
