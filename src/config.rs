//! Emitter configuration.
//!
//! [`EmitterConfig`] describes how particles are sampled when they are
//! created and how they evolve afterwards. It is plain data: it can be
//! built in code, loaded from JSON, or taken from a preset.
//!
//! # JSON
//!
//! Keys are camelCase and unknown keys are rejected. Missing keys keep
//! their defaults.
//!
//! ```ignore
//! {
//!     "positionStyle": "box",
//!     "positionBase": [0.0, 0.0, -2.0],
//!     "positionSpread": [10.0, 10.0, 10.0],
//!     "velocitySpread": [5.0, 3.0, 5.0],
//!     "sizeBase": 0.6,
//!     "opacityTween": { "times": [0.0, 1.0, 1.1], "values": [0.2, 0.2, 1.0] },
//!     "particlesPerSecond": 80,
//!     "particleDeathAge": 6.1,
//!     "emitterDeathAge": 600
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tween::Tween;

/// Largest pool a configuration may ask for.
pub const MAX_POOL_SIZE: usize = 4_000_000;

/// How a vector attribute is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Uniform within `base ± spread / 2` on each axis (default).
    #[default]
    Box,
    /// On the surface of a sphere around the base position.
    ///
    /// For positions the sphere has `position_radius`; for velocities the
    /// direction points away from `position_base` with a sampled speed.
    Sphere,
}

/// Blend mode forwarded to the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendStyle {
    /// Standard alpha blending with depth testing (default).
    #[default]
    Normal,
    /// Colors add up; overlapping particles glow. Depth test disabled.
    Additive,
    /// Colors multiply, darkening what is behind. Depth test disabled.
    Multiply,
}

impl BlendStyle {
    /// Whether particles drawn with this style are depth tested.
    pub fn depth_test(self) -> bool {
        matches!(self, BlendStyle::Normal)
    }
}

/// Complete emitter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EmitterConfig {
    pub position_style: Distribution,
    pub position_base: Vec3,
    pub position_spread: Vec3,
    /// Distance from `position_base` for [`Distribution::Sphere`].
    pub position_radius: f32,

    pub velocity_style: Distribution,
    pub velocity_base: Vec3,
    pub velocity_spread: Vec3,
    /// Speed range for [`Distribution::Sphere`] velocities.
    pub speed_base: f32,
    pub speed_spread: f32,

    pub acceleration_base: Vec3,
    pub acceleration_spread: Vec3,

    /// Radians.
    pub angle_base: f32,
    pub angle_spread: f32,
    /// Degrees per second.
    pub angle_velocity_base: f32,
    pub angle_velocity_spread: f32,
    /// Degrees per second, per second.
    pub angle_acceleration_base: f32,
    pub angle_acceleration_spread: f32,

    pub size_base: f32,
    pub size_spread: f32,
    pub size_tween: Tween<f32>,

    /// HSL.
    pub color_base: Vec3,
    pub color_spread: Vec3,
    /// HSL over age.
    pub color_tween: Tween<Vec3>,

    pub opacity_base: f32,
    pub opacity_spread: f32,
    pub opacity_tween: Tween<f32>,

    pub particles_per_second: f32,
    /// Seconds a particle lives before it is recycled.
    pub particle_death_age: f32,
    /// Seconds after which the emitter stops activating particles.
    pub emitter_death_age: f32,

    pub blend_style: BlendStyle,
    /// Sprite texture; `None` uses a soft procedural spark.
    pub particle_texture: Option<PathBuf>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            position_style: Distribution::Box,
            position_base: Vec3::ZERO,
            position_spread: Vec3::ZERO,
            position_radius: 0.0,
            velocity_style: Distribution::Box,
            velocity_base: Vec3::ZERO,
            velocity_spread: Vec3::ZERO,
            speed_base: 0.0,
            speed_spread: 0.0,
            acceleration_base: Vec3::ZERO,
            acceleration_spread: Vec3::ZERO,
            angle_base: 0.0,
            angle_spread: 0.0,
            angle_velocity_base: 0.0,
            angle_velocity_spread: 0.0,
            angle_acceleration_base: 0.0,
            angle_acceleration_spread: 0.0,
            size_base: 0.0,
            size_spread: 0.0,
            size_tween: Tween::empty(),
            color_base: Vec3::new(0.0, 1.0, 0.5),
            color_spread: Vec3::ZERO,
            color_tween: Tween::empty(),
            opacity_base: 1.0,
            opacity_spread: 0.0,
            opacity_tween: Tween::empty(),
            particles_per_second: 100.0,
            particle_death_age: 1.0,
            emitter_death_age: 60.0,
            blend_style: BlendStyle::Normal,
            particle_texture: None,
        }
    }
}

impl EmitterConfig {
    /// Fireflies drifting through a 10-unit cube, blinking once per second.
    pub fn fireflies() -> Self {
        let opacity_tween = Tween::new(
            vec![
                0.0, 1.0, 1.1, 2.0, 2.1, 3.0, 3.1, 4.0, 4.1, 5.0, 5.1, 6.0, 6.1,
            ],
            vec![
                0.2, 0.2, 1.0, 1.0, 0.2, 0.2, 1.0, 1.0, 0.2, 0.2, 1.0, 1.0, 0.2,
            ],
        )
        .expect("blink keyframe times are strictly increasing and match the values");

        Self {
            position_style: Distribution::Box,
            position_base: Vec3::new(0.0, 0.0, -2.0),
            position_spread: Vec3::new(10.0, 10.0, 10.0),
            velocity_style: Distribution::Box,
            velocity_base: Vec3::ZERO,
            velocity_spread: Vec3::new(5.0, 3.0, 5.0),
            size_base: 0.6,
            size_spread: 0.2,
            opacity_tween,
            color_base: Vec3::new(0.30, 1.0, 0.6),
            color_spread: Vec3::new(0.3, 0.0, 0.0),
            particles_per_second: 80.0,
            particle_death_age: 6.1,
            emitter_death_age: 600.0,
            ..Default::default()
        }
    }

    /// Number of pool slots this configuration needs.
    ///
    /// Enough for every particle that can be alive at once:
    /// `particles_per_second * min(particle_death_age, emitter_death_age)`,
    /// rounded.
    pub fn pool_size(&self) -> usize {
        let lifetime = self.particle_death_age.min(self.emitter_death_age);
        (self.particles_per_second * lifetime).round().max(0.0) as usize
    }

    /// Check that every numeric field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.particles_per_second.is_finite() || self.particles_per_second < 0.0 {
            return Err(invalid(
                "particlesPerSecond",
                format!("must be a finite, non-negative rate, got {}", self.particles_per_second),
            ));
        }
        if !(self.particle_death_age.is_finite() && self.particle_death_age > 0.0) {
            return Err(invalid(
                "particleDeathAge",
                format!("must be a positive number of seconds, got {}", self.particle_death_age),
            ));
        }
        // An infinite emitter lifetime means "emit forever".
        if self.emitter_death_age.is_nan() || self.emitter_death_age <= 0.0 {
            return Err(invalid(
                "emitterDeathAge",
                format!("must be a positive number of seconds, got {}", self.emitter_death_age),
            ));
        }

        let scalars = [
            ("positionRadius", self.position_radius),
            ("speedBase", self.speed_base),
            ("speedSpread", self.speed_spread),
            ("angleBase", self.angle_base),
            ("angleSpread", self.angle_spread),
            ("angleVelocityBase", self.angle_velocity_base),
            ("angleVelocitySpread", self.angle_velocity_spread),
            ("angleAccelerationBase", self.angle_acceleration_base),
            ("angleAccelerationSpread", self.angle_acceleration_spread),
            ("sizeBase", self.size_base),
            ("sizeSpread", self.size_spread),
            ("opacityBase", self.opacity_base),
            ("opacitySpread", self.opacity_spread),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }

        let vectors = [
            ("positionBase", self.position_base),
            ("positionSpread", self.position_spread),
            ("velocityBase", self.velocity_base),
            ("velocitySpread", self.velocity_spread),
            ("accelerationBase", self.acceleration_base),
            ("accelerationSpread", self.acceleration_spread),
            ("colorBase", self.color_base),
            ("colorSpread", self.color_spread),
        ];
        for (field, value) in vectors {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }

        let pool = self.pool_size();
        if pool > MAX_POOL_SIZE {
            return Err(invalid(
                "particlesPerSecond",
                format!("pool of {pool} particles exceeds the limit of {MAX_POOL_SIZE}"),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firefly_pool_size() {
        let config = EmitterConfig::fireflies();
        assert_eq!(config.pool_size(), 488);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_firefly_blink_keyframes() {
        let blink = EmitterConfig::fireflies().opacity_tween;
        assert_eq!(blink.len(), 13);
        assert!(blink.times().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(blink.lerp(0.0), Some(0.2));
        assert_eq!(blink.lerp(1.1), Some(1.0));
        assert_eq!(blink.lerp(10.0), Some(0.2));
    }

    #[test]
    fn test_pool_uses_shorter_lifetime() {
        let config = EmitterConfig {
            particles_per_second: 10.0,
            particle_death_age: 5.0,
            emitter_death_age: 1.5,
            ..Default::default()
        };
        assert_eq!(config.pool_size(), 15);
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let config = EmitterConfig::from_json("{}").unwrap();
        assert_eq!(config, EmitterConfig::default());
        assert_eq!(config.pool_size(), 100);
    }

    #[test]
    fn test_parses_camel_case_fields() {
        let config = EmitterConfig::from_json(
            r#"{
                "positionStyle": "sphere",
                "positionBase": [1.0, 2.0, 3.0],
                "positionRadius": 4.0,
                "velocityStyle": "sphere",
                "speedBase": 2.0,
                "opacityTween": { "times": [0.0, 1.0], "values": [1.0, 0.0] },
                "blendStyle": "additive",
                "particleTexture": "spark.png",
                "particlesPerSecond": 50,
                "particleDeathAge": 2.0
            }"#,
        )
        .unwrap();

        assert_eq!(config.position_style, Distribution::Sphere);
        assert_eq!(config.position_base, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.velocity_style, Distribution::Sphere);
        assert_eq!(config.opacity_tween.len(), 2);
        assert_eq!(config.blend_style, BlendStyle::Additive);
        assert!(!config.blend_style.depth_test());
        assert_eq!(config.particle_texture, Some(PathBuf::from("spark.png")));
        assert_eq!(config.pool_size(), 100);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = EmitterConfig::from_json(r#"{ "particlesPerMinute": 5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("particlesPerMinute"));
    }

    #[test]
    fn test_rejects_bad_tween() {
        let err = EmitterConfig::from_json(
            r#"{ "sizeTween": { "times": [0.0, 1.0], "values": [1.0] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_rejects_non_positive_death_age() {
        let config = EmitterConfig {
            particle_death_age: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "particleDeathAge", .. })
        ));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let config = EmitterConfig {
            particles_per_second: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_endless_emitter() {
        let config = EmitterConfig {
            emitter_death_age: f32::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.pool_size(), 100);
    }

    #[test]
    fn test_rejects_oversized_pool() {
        let config = EmitterConfig {
            particles_per_second: 1.0e7,
            particle_death_age: 10.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_of_preset() {
        let preset = EmitterConfig::fireflies();
        let json = preset.to_json().unwrap();
        assert_eq!(EmitterConfig::from_json(&json).unwrap(), preset);
    }
}
