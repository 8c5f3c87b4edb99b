//! Luminance-keyed two-color gradient mapping.
//!
//! ```text
//!   L   = 0.2126 R + 0.7152 G + 0.0722 B
//!   t   = L / 255
//!   d   = (1 − t) × shadow + t × highlight
//!   out = clamp(mix × d + (1 − mix) × in)
//! ```
//!
//! `mix = 0` returns the input exactly; `mix = 1` returns the gradient color,
//! which depends on luminance alone.

use crate::color::{Color, luminance, quantize};
use crate::image::PixelBuffer;
use crate::transform::params::DuotoneParams;

/// Linear interpolation between `shadow` (t = 0) and `highlight` (t = 1).
pub fn gradient_at(t: f64, shadow: Color, highlight: Color) -> [f64; 3] {
    let s = shadow.to_f64();
    let h = highlight.to_f64();
    [
        (1.0 - t) * s[0] + t * h[0],
        (1.0 - t) * s[1] + t * h[1],
        (1.0 - t) * s[2] + t * h[2],
    ]
}

/// Map one RGB triple through the duotone gradient.
pub fn duotone_pixel(rgb: [u8; 3], params: &DuotoneParams) -> [u8; 3] {
    let mix = params.intensity;
    if mix == 0.0 {
        return rgb;
    }

    let f = rgb.map(f64::from);
    let t = luminance(f) / 255.0;
    let d = gradient_at(t, params.shadow, params.highlight);

    [
        quantize(mix * d[0] + (1.0 - mix) * f[0]),
        quantize(mix * d[1] + (1.0 - mix) * f[1]),
        quantize(mix * d[2] + (1.0 - mix) * f[2]),
    ]
}

/// Apply the duotone mapping to every pixel of `buffer`, in place.
pub fn apply_duotone(buffer: &mut PixelBuffer, params: &DuotoneParams) {
    let params = params.clamped();
    if params.intensity == 0.0 {
        return;
    }
    for px in buffer.pixels_mut() {
        let out = duotone_pixel([px[0], px[1], px[2]], &params);
        px[..3].copy_from_slice(&out);
    }
}
