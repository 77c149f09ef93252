//! Keyframe tweens.
//!
//! A [`Tween`] maps a particle's age to a value by linearly interpolating
//! between sparse `(time, value)` keyframes. Tweens drive size, color and
//! opacity over a particle's life.
//!
//! # Example
//!
//! ```
//! use firefly::Tween;
//!
//! let fade = Tween::new(vec![0.0, 2.0], vec![0.0_f32, 1.0]).unwrap();
//! assert_eq!(fade.lerp(1.0), Some(0.5));
//! assert_eq!(fade.lerp(5.0), Some(1.0));
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::TweenError;

/// Values that can be linearly interpolated by a [`Tween`].
pub trait Lerp: Copy {
    /// Blend from `self` towards `other` by `t` (0 = self, 1 = other).
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        self + t * (other - self)
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec3::lerp(self, other, t)
    }
}

/// Piecewise-linear keyframe series.
///
/// Keyframe times are validated on construction: they must be finite and
/// non-decreasing, and there must be exactly one value per time. After
/// construction a tween is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Keyframes<V>",
    bound(serialize = "V: Serialize", deserialize = "V: Lerp + Deserialize<'de>")
)]
pub struct Tween<V> {
    times: Vec<f32>,
    values: Vec<V>,
}

/// Unvalidated wire form of a tween.
#[derive(Deserialize)]
struct Keyframes<V> {
    times: Vec<f32>,
    values: Vec<V>,
}

impl<V: Lerp> TryFrom<Keyframes<V>> for Tween<V> {
    type Error = TweenError;

    fn try_from(raw: Keyframes<V>) -> Result<Self, Self::Error> {
        Tween::new(raw.times, raw.values)
    }
}

impl<V> Default for Tween<V> {
    fn default() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<V: Lerp> Tween<V> {
    /// Build a tween from parallel time and value arrays.
    pub fn new(times: Vec<f32>, values: Vec<V>) -> Result<Self, TweenError> {
        if times.len() != values.len() {
            return Err(TweenError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        for (index, &time) in times.iter().enumerate() {
            if !time.is_finite() {
                return Err(TweenError::NonFiniteTime { index });
            }
            if index > 0 && time < times[index - 1] {
                return Err(TweenError::Decreasing {
                    index,
                    time,
                    previous: times[index - 1],
                });
            }
        }
        Ok(Self { times, values })
    }

    /// Build a tween from `(time, value)` pairs.
    pub fn from_keyframes(keyframes: &[(f32, V)]) -> Result<Self, TweenError> {
        let (times, values): (Vec<f32>, Vec<V>) = keyframes.iter().copied().unzip();
        Self::new(times, values)
    }

    /// A tween that holds one value forever.
    pub fn constant(value: V) -> Self {
        Self {
            times: vec![0.0],
            values: vec![value],
        }
    }

    /// An empty tween. Particles leave the attribute untouched.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Interpolated value at time `t`.
    ///
    /// Clamps to the first value before the first keyframe and to the last
    /// value at or after the last keyframe. Returns `None` for an empty
    /// tween.
    pub fn lerp(&self, t: f32) -> Option<V> {
        let (&first_time, &last_time) = (self.times.first()?, self.times.last()?);
        let n = self.times.len();

        if t <= first_time {
            return Some(self.values[0]);
        }
        if t >= last_time {
            return Some(self.values[n - 1]);
        }

        // First keyframe at or after t.
        let i = self.times.partition_point(|&time| time < t);
        if i == 0 {
            return Some(self.values[0]);
        }
        if i >= n {
            return Some(self.values[n - 1]);
        }
        if self.times[i] == t {
            return Some(self.values[i]);
        }

        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let p = (t - t0) / (t1 - t0);
        Some(self.values[i - 1].lerp(self.values[i], p))
    }
}

impl<V> Tween<V> {
    /// Whether the tween has no keyframes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of keyframes.
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Keyframe times.
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    /// Keyframe values.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Time of the last keyframe, or 0 for an empty tween.
    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blink() -> Tween<f32> {
        Tween::new(vec![0.0, 1.0, 1.1, 2.0], vec![0.2, 0.2, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn test_empty_tween_yields_none() {
        let tween: Tween<f32> = Tween::empty();
        assert!(tween.is_empty());
        assert_eq!(tween.lerp(0.5), None);
    }

    #[test]
    fn test_clamps_outside_range() {
        let tween = blink();
        assert_eq!(tween.lerp(-3.0), Some(0.2));
        assert_eq!(tween.lerp(0.0), Some(0.2));
        assert_eq!(tween.lerp(2.0), Some(1.0));
        assert_eq!(tween.lerp(100.0), Some(1.0));
    }

    #[test]
    fn test_exact_at_keyframes() {
        let tween = blink();
        for (&t, &v) in tween.times().iter().zip(tween.values()) {
            assert_eq!(tween.lerp(t), Some(v));
        }
    }

    #[test]
    fn test_linear_between_keyframes() {
        let tween = Tween::new(vec![0.0, 2.0], vec![0.0_f32, 1.0]).unwrap();
        assert_eq!(tween.lerp(1.0), Some(0.5));

        let ramp = blink().lerp(1.05).unwrap();
        assert!((ramp - 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_vector_tween() {
        let tween = Tween::from_keyframes(&[
            (0.0, Vec3::new(0.0, 1.0, 0.5)),
            (4.0, Vec3::new(1.0, 0.0, 0.5)),
        ])
        .unwrap();
        let mid = tween.lerp(1.0).unwrap();
        assert!((mid - Vec3::new(0.25, 0.75, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_step_keyframes_do_not_divide_by_zero() {
        let tween = Tween::new(vec![0.0, 1.0, 1.0, 2.0], vec![0.0_f32, 0.0, 1.0, 1.0]).unwrap();
        let at_step = tween.lerp(1.0).unwrap();
        assert!(at_step.is_finite());
        assert_eq!(tween.lerp(1.5), Some(1.0));
    }

    #[test]
    fn test_constant_tween() {
        let tween = Tween::constant(0.7_f32);
        assert_eq!(tween.lerp(-1.0), Some(0.7));
        assert_eq!(tween.lerp(10.0), Some(0.7));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = Tween::new(vec![0.0, 1.0], vec![1.0_f32]).unwrap_err();
        assert_eq!(err, TweenError::LengthMismatch { times: 2, values: 1 });
    }

    #[test]
    fn test_rejects_decreasing_times() {
        let err = Tween::new(vec![0.0, 2.0, 1.0], vec![0.0_f32, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, TweenError::Decreasing { index: 2, .. }));
    }

    #[test]
    fn test_rejects_nan_time() {
        let err = Tween::new(vec![0.0, f32::NAN], vec![0.0_f32, 0.0]).unwrap_err();
        assert_eq!(err, TweenError::NonFiniteTime { index: 1 });
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Tween<f32> = serde_json::from_str(r#"{"times":[0,1],"values":[0.5,1.0]}"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.duration(), 1.0);

        let bad = serde_json::from_str::<Tween<f32>>(r#"{"times":[1,0],"values":[0.5,1.0]}"#);
        assert!(bad.is_err());
    }
}
