//! HSL color helpers.
//!
//! Emitter colors are authored and tweened in HSL (`x` = hue, `y` =
//! saturation, `z` = lightness, all in 0-1) and stored on particles as RGB.

use glam::Vec3;

/// Convert an HSL triple to RGB.
///
/// Hue wraps around (1.25 is the same as 0.25); saturation and lightness
/// are clamped to 0-1.
pub fn hsl_to_rgb(hsl: Vec3) -> Vec3 {
    let h = hsl.x.rem_euclid(1.0);
    let s = hsl.y.clamp(0.0, 1.0);
    let l = hsl.z.clamp(0.0, 1.0);

    if s == 0.0 {
        return Vec3::splat(l);
    }

    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;

    Vec3::new(
        hue_to_channel(q, p, h + 1.0 / 3.0),
        hue_to_channel(q, p, h),
        hue_to_channel(q, p, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_primary_hues() {
        assert!(close(hsl_to_rgb(Vec3::new(0.0, 1.0, 0.5)), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_rgb(Vec3::new(1.0 / 3.0, 1.0, 0.5)), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(hsl_to_rgb(Vec3::new(2.0 / 3.0, 1.0, 0.5)), Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_grey_when_unsaturated() {
        assert!(close(hsl_to_rgb(Vec3::new(0.4, 0.0, 0.3)), Vec3::splat(0.3)));
    }

    #[test]
    fn test_hue_wraps() {
        let a = hsl_to_rgb(Vec3::new(0.25, 1.0, 0.5));
        let b = hsl_to_rgb(Vec3::new(1.25, 1.0, 0.5));
        let c = hsl_to_rgb(Vec3::new(-0.75, 1.0, 0.5));
        assert!(close(a, b));
        assert!(close(a, c));
    }

    #[test]
    fn test_firefly_green() {
        // Base firefly color: hue 0.3, full saturation, lightness 0.6.
        let rgb = hsl_to_rgb(Vec3::new(0.3, 1.0, 0.6));
        assert!(close(rgb, Vec3::new(0.36, 1.0, 0.2)));
    }

    #[test]
    fn test_lightness_extremes() {
        assert!(close(hsl_to_rgb(Vec3::new(0.6, 1.0, 0.0)), Vec3::ZERO));
        assert!(close(hsl_to_rgb(Vec3::new(0.6, 1.0, 1.0)), Vec3::ONE));
        assert!(close(hsl_to_rgb(Vec3::new(0.6, 1.0, 2.0)), Vec3::ONE));
    }
}
