//! Resize policy applied before the filter runs.
//!
//! The server caps the longest edge of an upload; the browser fits the
//! preview into a box. Neither affects the pixel math, which works at any
//! resolution.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::image::PixelBuffer;
use crate::transform::params::parse_integer;

/// Default longest edge for server-side processing.
pub const DEFAULT_MAX_EDGE: u32 = 2048;
/// Smallest accepted longest-edge cap.
pub const MIN_MAX_EDGE: u32 = 256;
/// Largest accepted longest-edge cap.
pub const MAX_MAX_EDGE: u32 = 4096;
/// Default preview box on the interactive surface.
pub const PREVIEW_BOX: (u32, u32) = (1400, 1400);

/// Parse a requested longest-edge cap.
///
/// Missing, non-numeric or zero values fall back to [`DEFAULT_MAX_EDGE`];
/// the result is clamped to `[256, 4096]`.
pub fn clamp_max_edge(raw: Option<&str>) -> u32 {
    let requested = parse_integer(raw)
        .filter(|&v| v != 0)
        .unwrap_or(i64::from(DEFAULT_MAX_EDGE));
    requested.clamp(i64::from(MIN_MAX_EDGE), i64::from(MAX_MAX_EDGE)) as u32
}

/// Dimensions after scaling so the longest edge is at most `max_edge`.
///
/// Images already within the cap are returned unchanged; images are never
/// upscaled.
pub fn scaled_to_max_edge(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width, height);
    }
    let scale = f64::from(max_edge) / f64::from(longest);
    (scale_dim(width, scale), scale_dim(height, scale))
}

/// Dimensions after fitting inside a `max_width × max_height` box, keeping
/// the aspect ratio and never upscaling.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let ratio = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height))
        .min(1.0);
    (scale_dim(width, ratio), scale_dim(height, ratio))
}

/// Downscale `buffer` so its longest edge is at most `max_edge`.
///
/// Uses bilinear (triangle) resampling. Returns a clone when no resize is
/// needed.
pub fn resize_to_max_edge(buffer: &PixelBuffer, max_edge: u32) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    let (new_width, new_height) = scaled_to_max_edge(width, height, max_edge);
    if (new_width, new_height) == (width, height) {
        return buffer.clone();
    }

    tracing::debug!(width, height, new_width, new_height, "downscaling source image");
    let source: RgbaImage = buffer.clone().into();
    imageops::resize(&source, new_width, new_height, FilterType::Triangle).into()
}

fn scale_dim(dim: u32, scale: f64) -> u32 {
    ((f64::from(dim) * scale).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_max_edge_defaults_and_bounds() {
        assert_eq!(clamp_max_edge(None), 2048);
        assert_eq!(clamp_max_edge(Some("abc")), 2048);
        assert_eq!(clamp_max_edge(Some("0")), 2048);
        assert_eq!(clamp_max_edge(Some("100")), 256);
        assert_eq!(clamp_max_edge(Some("99999")), 4096);
        assert_eq!(clamp_max_edge(Some("1024px")), 1024);
        assert_eq!(clamp_max_edge(Some("-5")), 256);
    }

    #[test]
    fn test_scaled_to_max_edge_keeps_aspect() {
        assert_eq!(scaled_to_max_edge(4000, 2000, 2048), (2048, 1024));
        assert_eq!(scaled_to_max_edge(1000, 3000, 1500), (500, 1500));
    }

    #[test]
    fn test_scaled_to_max_edge_never_upscales() {
        assert_eq!(scaled_to_max_edge(640, 480, 2048), (640, 480));
        assert_eq!(scaled_to_max_edge(2048, 10, 2048), (2048, 10));
    }

    #[test]
    fn test_thin_images_keep_one_pixel() {
        assert_eq!(scaled_to_max_edge(10_000, 1, 256), (256, 1));
    }

    #[test]
    fn test_fit_within_preview_box() {
        assert_eq!(fit_within(2800, 1400, 1400, 1400), (1400, 700));
        assert_eq!(fit_within(800, 600, 1400, 1400), (800, 600));
        assert_eq!(fit_within(0, 600, 1400, 1400), (0, 600));
    }

    #[test]
    fn test_resize_to_max_edge_downscales_buffer() {
        let buffer = PixelBuffer::filled(600, 300, [200, 100, 50, 255]).unwrap();
        let resized = resize_to_max_edge(&buffer, 256);
        assert_eq!(resized.dimensions(), (256, 128));
        // A flat image stays flat under bilinear filtering.
        assert_eq!(resized.pixel(100, 50), Some([200, 100, 50, 255]));
    }

    #[test]
    fn test_resize_within_cap_is_a_copy() {
        let buffer = PixelBuffer::filled(20, 10, [1, 2, 3, 4]).unwrap();
        assert_eq!(resize_to_max_edge(&buffer, 256), buffer);
    }
}
