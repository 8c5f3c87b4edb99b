//! End-to-end properties of the filter chain over whole buffers.
//!
//! Run with: `cargo test -p duotone-core`

use duotone_core::color::{Color, luminance};
use duotone_core::export::{self, ExportFormat};
use duotone_core::grading::duotone::gradient_at;
use duotone_core::resize;
use duotone_core::transform::params::RawFilterParams;
use duotone_core::{AdjustmentParams, DuotoneParams, FilterParams, PixelBuffer, apply_filter};

/// Deterministic pseudo-random RGBA noise.
fn noise_buffer(width: u32, height: u32, seed: u32) -> PixelBuffer {
    let mut state = seed.max(1);
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height * 4 {
        // xorshift32
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        data.push((state >> 24) as u8);
    }
    PixelBuffer::new(width, height, data).expect("noise buffer length")
}

#[test]
fn test_reference_palette_endpoints() {
    let params = FilterParams::from_raw(RawFilterParams {
        shadow: Some("#1B602F"),
        highlight: Some("#F784C5"),
        intensity: Some("1"),
        ..Default::default()
    });
    let mut buffer = PixelBuffer::new(2, 1, vec![255, 255, 255, 255, 0, 0, 0, 255]).unwrap();
    apply_filter(&mut buffer, &params);
    assert_eq!(buffer.pixel(0, 0), Some([247, 132, 197, 255]));
    assert_eq!(buffer.pixel(1, 0), Some([27, 96, 47, 255]));
}

#[test]
fn test_brightness_one_clamps_to_white_before_duotone() {
    let params = FilterParams::new(
        AdjustmentParams::new(1.0, 0.0, 0.0),
        DuotoneParams::new(Color::HERO_GREEN, Color::BRAVE_PINK, 0.0),
    );
    let mut buffer = PixelBuffer::filled(1, 1, [200, 50, 10, 128]).unwrap();
    apply_filter(&mut buffer, &params);
    assert_eq!(buffer.pixel(0, 0), Some([255, 255, 255, 128]));
}

#[test]
fn test_zero_intensity_and_zero_adjustments_is_byte_identical() {
    let params = FilterParams::new(
        AdjustmentParams::default(),
        DuotoneParams::new(Color::new(1, 2, 3), Color::new(4, 5, 6), 0.0),
    );
    let original = noise_buffer(33, 17, 7);
    let mut buffer = original.clone();
    apply_filter(&mut buffer, &params);
    assert_eq!(buffer, original);
}

#[test]
fn test_full_intensity_output_is_the_gradient_color() {
    let duotone = DuotoneParams::new(Color::new(10, 200, 40), Color::new(230, 20, 180), 1.0);
    let params = FilterParams::new(AdjustmentParams::default(), duotone);
    let original = noise_buffer(16, 16, 99);
    let mut buffer = original.clone();
    apply_filter(&mut buffer, &params);

    for (src, out) in original.pixels().zip(buffer.pixels()) {
        let lum = luminance([src[0], src[1], src[2]].map(f64::from));
        let expected = gradient_at(lum / 255.0, duotone.shadow, duotone.highlight);
        for c in 0..3 {
            assert!(
                (f64::from(out[c]) - expected[c]).abs() <= 0.5 + 1e-9,
                "channel {c}: {} vs {:.3}",
                out[c],
                expected[c]
            );
        }
        assert_eq!(src[3], out[3]);
    }
}

#[test]
fn test_dimensions_preserved_for_many_shapes() {
    let params = FilterParams::new(
        AdjustmentParams::new(0.2, -0.3, 0.5),
        DuotoneParams::new(Color::HERO_GREEN, Color::BRAVE_PINK, 0.6),
    );
    for (w, h) in [(1, 1), (1, 9), (9, 1), (13, 7), (64, 3), (0, 5)] {
        let mut buffer = noise_buffer(w, h, w * 31 + h);
        apply_filter(&mut buffer, &params);
        assert_eq!(buffer.dimensions(), (w, h));
        assert_eq!(buffer.as_bytes().len(), (w * h * 4) as usize);
    }
}

#[test]
fn test_transform_is_idempotent_per_invocation() {
    // Re-running from the same source gives the same result: no hidden state.
    let params = FilterParams::default();
    let source = noise_buffer(20, 20, 3);
    let mut first = source.clone();
    let mut second = source.clone();
    apply_filter(&mut first, &params);
    apply_filter(&mut second, &params);
    assert_eq!(first, second);
}

#[test]
fn test_decode_resize_filter_encode_round_trip() {
    let source = noise_buffer(600, 200, 42);
    let png = export::encode(&source, ExportFormat::Png, export::DEFAULT_QUALITY).unwrap();

    let decoded = export::decode(&png).unwrap();
    let max_edge = resize::clamp_max_edge(Some("300"));
    let mut working = resize::resize_to_max_edge(&decoded, max_edge);
    assert_eq!(working.dimensions(), (300, 100));

    apply_filter(&mut working, &FilterParams::default());
    let out = export::encode(&working, ExportFormat::Png, export::DEFAULT_QUALITY).unwrap();
    assert_eq!(export::decode(&out).unwrap(), working);
}
