//! Core transform evaluation — applies the full filter chain.

use crate::error::CoreError;
use crate::grading::{adjust_pixel, duotone_pixel};
use crate::image::{CHANNELS, PixelBuffer};
use crate::transform::params::FilterParams;

/// The core function. Every surface goes through this.
///
/// Applies the filter chain to a single RGBA sample:
/// 1. Brightness and contrast
/// 2. Saturation
/// 3. Duotone mapping
///
/// Alpha is returned unchanged.
pub fn evaluate_pixel(rgba: [u8; 4], params: &FilterParams) -> [u8; 4] {
    let rgb = adjust_pixel([rgba[0], rgba[1], rgba[2]], &params.adjustment);
    let rgb = duotone_pixel(rgb, &params.duotone);
    [rgb[0], rgb[1], rgb[2], rgba[3]]
}

/// Apply the filter chain to every pixel of `buffer`, in place.
///
/// Params are clamped before use, so any `FilterParams` value is safe.
pub fn apply_filter(buffer: &mut PixelBuffer, params: &FilterParams) {
    let params = params.clamped();
    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        ?params,
        "applying duotone filter"
    );
    run(buffer.as_bytes_mut(), &params);
}

/// Apply the filter chain to a raw RGBA slice such as a canvas `ImageData`.
///
/// The slice length must be `width × height × 4`.
pub fn apply_filter_to_rgba(
    data: &mut [u8],
    width: u32,
    height: u32,
    params: &FilterParams,
) -> Result<(), CoreError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(CoreError::Dimensions { width, height })?;
    if data.len() != expected {
        return Err(CoreError::BufferSize {
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    run(data, &params.clamped());
    Ok(())
}

fn run(data: &mut [u8], params: &FilterParams) {
    if params.adjustment.is_identity() && params.duotone.intensity == 0.0 {
        return;
    }
    for px in data.chunks_exact_mut(CHANNELS) {
        let out = evaluate_pixel([px[0], px[1], px[2], px[3]], params);
        px.copy_from_slice(&out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::grading::{apply_adjustments, apply_duotone};
    use crate::transform::params::{AdjustmentParams, DuotoneParams};

    fn gradient_buffer() -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..8u8 {
            for x in 0..8u8 {
                data.extend_from_slice(&[x * 32, y * 32, 255 - x * 16, 100 + x + y]);
            }
        }
        PixelBuffer::new(8, 8, data).unwrap()
    }

    #[test]
    fn test_pipeline_matches_stage_by_stage() {
        let params = FilterParams::new(
            AdjustmentParams::new(0.1, 0.3, -0.25),
            DuotoneParams::new(Color::HERO_GREEN, Color::BRAVE_PINK, 0.8),
        );

        let mut staged = gradient_buffer();
        apply_adjustments(&mut staged, &params.adjustment);
        apply_duotone(&mut staged, &params.duotone);

        let mut piped = gradient_buffer();
        apply_filter(&mut piped, &params);

        assert_eq!(staged, piped);
    }

    #[test]
    fn test_stage_order_matters() {
        let params = FilterParams::new(
            AdjustmentParams::new(0.4, 0.0, 0.0),
            DuotoneParams::new(Color::BLACK, Color::new(255, 255, 255), 1.0),
        );

        let mut forward = gradient_buffer();
        apply_filter(&mut forward, &params);

        let mut swapped = gradient_buffer();
        apply_duotone(&mut swapped, &params.duotone);
        apply_adjustments(&mut swapped, &params.adjustment);

        assert_ne!(forward, swapped);
    }

    #[test]
    fn test_default_adjustments_with_zero_intensity_is_noop() {
        let params = FilterParams::new(
            AdjustmentParams::default(),
            DuotoneParams::new(Color::HERO_GREEN, Color::BRAVE_PINK, 0.0),
        );
        let original = gradient_buffer();
        let mut buffer = original.clone();
        apply_filter(&mut buffer, &params);
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_alpha_untouched_by_full_chain() {
        let params = FilterParams::new(
            AdjustmentParams::new(-0.3, 0.9, 1.0),
            DuotoneParams::default(),
        );
        let original = gradient_buffer();
        let mut buffer = original.clone();
        apply_filter(&mut buffer, &params);
        for (a, b) in original.pixels().zip(buffer.pixels()) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn test_raw_slice_rejects_bad_length() {
        let mut data = vec![0u8; 10];
        let err = apply_filter_to_rgba(&mut data, 2, 2, &FilterParams::default()).unwrap_err();
        assert!(matches!(err, CoreError::BufferSize { expected: 16, .. }));
    }

    #[test]
    fn test_raw_slice_matches_buffer_path() {
        let params = FilterParams::default();
        let mut buffer = gradient_buffer();
        apply_filter(&mut buffer, &params);

        let mut raw = gradient_buffer().into_raw();
        apply_filter_to_rgba(&mut raw, 8, 8, &params).unwrap();

        assert_eq!(buffer.as_bytes(), raw.as_slice());
    }

    #[test]
    fn test_unclamped_params_are_clamped_before_use() {
        let wild = FilterParams {
            adjustment: AdjustmentParams {
                brightness: 5.0,
                contrast: 0.0,
                saturation: 0.0,
            },
            duotone: DuotoneParams {
                shadow: Color::BLACK,
                highlight: Color::BLACK,
                intensity: -3.0,
            },
        };
        let mut buffer = PixelBuffer::filled(2, 2, [10, 20, 30, 40]).unwrap();
        apply_filter(&mut buffer, &wild);
        // brightness clamps to 1 → white; intensity clamps to 0 → no duotone.
        assert!(buffer.pixels().all(|px| px == [255, 255, 255, 40]));
    }
}
