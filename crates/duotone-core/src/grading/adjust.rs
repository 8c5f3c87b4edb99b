//! Brightness, contrast and saturation pre-adjustment.
//!
//! # Formula
//! For each channel `v` in `{R, G, B}`, in 0–255:
//! ```text
//!   v  = clamp(v + brightness × 255)
//!   f  = (1 + contrast)²
//!   v  = clamp(((v / 255 − 0.5) × f + 0.5) × 255)        → stored as u8
//!
//!   L  = 0.2126 R + 0.7152 G + 0.0722 B
//!   v  = clamp(L + (v − L) × (1 + saturation))           → stored as u8
//! ```
//!
//! Brightness and contrast share one store; saturation reads the stored
//! bytes. Alpha is never touched.

use crate::color::{clamp_channel, luminance, quantize};
use crate::image::PixelBuffer;
use crate::transform::params::AdjustmentParams;

/// Apply brightness then contrast to one RGB triple.
///
/// `brightness = 0` and `contrast = 0` leave the input unchanged.
pub fn apply_brightness_contrast(rgb: [u8; 3], brightness: f64, contrast: f64) -> [u8; 3] {
    if brightness == 0.0 && contrast == 0.0 {
        return rgb;
    }

    let offset = brightness * 255.0;
    let cf = 1.0 + contrast;
    let factor = cf * cf;

    rgb.map(|v| {
        let mut x = f64::from(v);
        if brightness != 0.0 {
            x = clamp_channel(x + offset);
        }
        if contrast != 0.0 {
            x = clamp_channel(((x / 255.0 - 0.5) * factor + 0.5) * 255.0);
        }
        quantize(x)
    })
}

/// Scale chroma around Rec. 709 luminance by `1 + saturation`.
///
/// One formula covers both signs: positive values push away from gray,
/// negative values pull toward it, `-1` is fully gray.
pub fn apply_saturation(rgb: [u8; 3], saturation: f64) -> [u8; 3] {
    if saturation == 0.0 {
        return rgb;
    }

    let f = rgb.map(f64::from);
    let lum = luminance(f);
    let scale = 1.0 + saturation;
    f.map(|v| quantize(lum + (v - lum) * scale))
}

/// Full adjustment chain on one RGB triple.
pub fn adjust_pixel(rgb: [u8; 3], params: &AdjustmentParams) -> [u8; 3] {
    let rgb = apply_brightness_contrast(rgb, params.brightness, params.contrast);
    apply_saturation(rgb, params.saturation)
}

/// Apply the adjustment chain to every pixel of `buffer`, in place.
pub fn apply_adjustments(buffer: &mut PixelBuffer, params: &AdjustmentParams) {
    let params = params.clamped();
    if params.is_identity() {
        return;
    }
    for px in buffer.pixels_mut() {
        let out = adjust_pixel([px[0], px[1], px[2]], &params);
        px[..3].copy_from_slice(&out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_params_are_identity() {
        for rgb in [[0, 0, 0], [255, 255, 255], [200, 50, 10], [1, 128, 254]] {
            assert_eq!(adjust_pixel(rgb, &AdjustmentParams::default()), rgb);
        }
    }

    #[test]
    fn test_full_brightness_saturates_to_white() {
        assert_eq!(apply_brightness_contrast([200, 50, 10], 1.0, 0.0), [255, 255, 255]);
    }

    #[test]
    fn test_negative_brightness_darkens() {
        assert_eq!(apply_brightness_contrast([200, 50, 10], -0.2, 0.0), [149, 0, 0]);
    }

    #[test]
    fn test_contrast_is_squared() {
        // contrast 0.5 → factor 2.25, not 1.5.
        // ((160/255 − 0.5) × 2.25 + 0.5) × 255 = 200.625
        assert_eq!(apply_brightness_contrast([160, 160, 160], 0.0, 0.5), [201, 201, 201]);
    }

    #[test]
    fn test_full_negative_contrast_flattens_to_mid_gray() {
        // factor (1 − 1)² = 0 → every channel lands on 127.5 → 128.
        assert_eq!(apply_brightness_contrast([0, 90, 255], 0.0, -1.0), [128, 128, 128]);
    }

    #[test]
    fn test_contrast_keeps_mid_gray() {
        let out = apply_brightness_contrast([128, 128, 128], 0.0, 0.8);
        for c in out {
            assert!((i32::from(c) - 128).abs() <= 1, "mid-gray drifted to {c}");
        }
    }

    #[test]
    fn test_saturation_minus_one_is_gray() {
        let out = apply_saturation([200, 50, 10], -1.0);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        // L = 0.2126·200 + 0.7152·50 + 0.0722·10 = 79.0
        assert_eq!(out[0], 79);
    }

    #[test]
    fn test_saturation_positive_and_negative_share_a_formula() {
        let rgb = [180, 90, 40];
        let lum = luminance(rgb.map(f64::from));
        for s in [-0.6, -0.1, 0.3, 0.9] {
            let expected = rgb.map(|v| quantize(lum + (f64::from(v) - lum) * (1.0 + s)));
            assert_eq!(apply_saturation(rgb, s), expected, "s = {s}");
        }
    }

    #[test]
    fn test_saturation_boost_spreads_channels() {
        let rgb = [150, 100, 80];
        let out = apply_saturation(rgb, 0.5);
        assert!(out[0] > rgb[0]);
        assert!(out[2] < rgb[2]);
    }

    #[test]
    fn test_apply_adjustments_leaves_alpha() {
        let mut buffer = PixelBuffer::new(2, 1, vec![10, 20, 30, 7, 200, 100, 50, 250]).unwrap();
        apply_adjustments(&mut buffer, &AdjustmentParams::new(0.3, 0.2, -0.4));
        assert_eq!(buffer.as_bytes()[3], 7);
        assert_eq!(buffer.as_bytes()[7], 250);
    }

    #[test]
    fn test_apply_adjustments_identity_is_byte_identical() {
        let data: Vec<u8> = (0..=255).cycle().take(64 * 4).collect();
        let mut buffer = PixelBuffer::new(8, 8, data.clone()).unwrap();
        apply_adjustments(&mut buffer, &AdjustmentParams::default());
        assert_eq!(buffer.as_bytes(), data.as_slice());
    }
}
