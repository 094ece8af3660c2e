//! Density bucket resolution and pixel rescaling.
//!
//! Dimension values are recorded at the density they were decoded for and
//! rescaled when a constant state is cloned for a display with a different
//! density.

/// The reference density every `dp` value is declared against.
pub const DENSITY_DEFAULT: i32 = 160;

/// Resolve a reported density against a parent's, mapping the "unknown"
/// marker (0) to [`DENSITY_DEFAULT`].
#[must_use]
pub fn resolve_density(reported: Option<i32>, parent_density: i32) -> i32 {
    let density = reported.unwrap_or(parent_density);
    if density == 0 {
        DENSITY_DEFAULT
    } else {
        density
    }
}

/// Rescale a pixel value from one density bucket to another.
///
/// Identity when the densities match or the value is zero. Otherwise the
/// result is rounded to the nearest pixel; if rounding would collapse a
/// nonzero value to zero, it clamps to ±1 instead, preserving sign, so a
/// visible dimension never disappears when scaling down.
#[must_use]
pub fn scale_pixels(pixels: i32, source_density: i32, target_density: i32) -> i32 {
    if pixels == 0 || source_density == target_density {
        return pixels;
    }

    // Densities and pixel dimensions are small; f32 holds them exactly.
    #[expect(clippy::cast_precision_loss)]
    let scaled = pixels as f32 * target_density as f32 / source_density as f32;

    #[expect(clippy::cast_possible_truncation)]
    let rounded = scaled.round() as i32;
    if rounded != 0 {
        rounded
    } else if pixels > 0 {
        1
    } else {
        -1
    }
}

/// Rescale a float pixel value without rounding or clamping.
#[must_use]
pub fn scale_pixels_f(pixels: f32, source_density: i32, target_density: i32) -> f32 {
    if source_density == target_density {
        return pixels;
    }
    // See scale_pixels for the precision argument.
    #[expect(clippy::cast_precision_loss)]
    {
        pixels * target_density as f32 / source_density as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_density_is_identity() {
        for px in [-37, -1, 0, 1, 10, 12345] {
            assert_eq!(scale_pixels(px, 320, 320), px);
        }
    }

    #[test]
    fn zero_is_a_fixed_point() {
        for (s, t) in [(160, 320), (320, 160), (160, 480), (213, 160)] {
            assert_eq!(scale_pixels(0, s, t), 0);
        }
    }

    #[test]
    fn reference_to_double_density_doubles() {
        assert_eq!(scale_pixels(10, 160, 320), 20);
    }

    #[test]
    fn round_trip_within_one_pixel() {
        // Holds only while the scaler is rounding: 1px at 480dpi clamps to
        // 1px at 160dpi and comes back as 3. The clamp is asserted in
        // downscale_never_collapses_to_zero.
        for px in [2, 3, 7, 10, 33, 100, 255] {
            for (s, t) in [(160, 320), (160, 240), (320, 213), (480, 160)] {
                let there = scale_pixels(px, s, t);
                let back = scale_pixels(there, t, s);
                assert!(
                    (back - px).abs() <= 1,
                    "{px} @ {s}->{t}->{s} came back as {back}"
                );
            }
        }
    }

    #[test]
    fn downscale_never_collapses_to_zero() {
        // 1px at 480dpi is 0.33px at 160dpi, which rounds to 0.
        assert_eq!(scale_pixels(1, 480, 160), 1);
        assert_eq!(scale_pixels(-1, 480, 160), -1);
    }

    #[test]
    fn float_scale_is_exact() {
        assert!((scale_pixels_f(10.0, 160, 320) - 20.0).abs() < f32::EPSILON);
        assert!((scale_pixels_f(1.0, 480, 160) - 1.0 / 3.0).abs() < 1e-6);
        assert!((scale_pixels_f(5.5, 320, 320) - 5.5).abs() < f32::EPSILON);
    }

    #[test]
    fn density_resolution_defaults() {
        assert_eq!(resolve_density(None, 0), DENSITY_DEFAULT);
        assert_eq!(resolve_density(None, 320), 320);
        assert_eq!(resolve_density(Some(0), 320), DENSITY_DEFAULT);
        assert_eq!(resolve_density(Some(480), 160), 480);
    }
}
