//! Parameter structs for the filter pipeline.
//!
//! `FilterParams` is the single configuration object both surfaces build
//! from user input. Every field is clamped into its domain on the way in,
//! so the stages never see out-of-range values.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Brightness, contrast and saturation. Each in `[-1, 1]`, 0 = no change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentParams {
    /// Additive brightness, scaled by 255.
    pub brightness: f64,
    /// Contrast; the factor applied around mid-gray is `(1 + contrast)²`.
    pub contrast: f64,
    /// Saturation; chroma is scaled by `1 + saturation`.
    pub saturation: f64,
}

impl AdjustmentParams {
    pub fn new(brightness: f64, contrast: f64, saturation: f64) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
        }
        .clamped()
    }

    /// Copy with every field forced into `[-1, 1]`. Infinities clamp to the
    /// nearest bound; NaN becomes 0.
    pub fn clamped(self) -> Self {
        Self {
            brightness: clamp_or(self.brightness, -1.0, 1.0, 0.0),
            contrast: clamp_or(self.contrast, -1.0, 1.0, 0.0),
            saturation: clamp_or(self.saturation, -1.0, 1.0, 0.0),
        }
    }

    /// True when applying these params cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0 && self.saturation == 0.0
    }
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
        }
    }
}

/// Two-color gradient and blend factor for the duotone stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuotoneParams {
    /// Color for luminance 0.
    pub shadow: Color,
    /// Color for luminance 255.
    pub highlight: Color,
    /// Blend factor in `[0, 1]`. 0 leaves the image unchanged.
    pub intensity: f64,
}

impl DuotoneParams {
    pub fn new(shadow: Color, highlight: Color, intensity: f64) -> Self {
        Self {
            shadow,
            highlight,
            intensity,
        }
        .clamped()
    }

    /// Copy with intensity forced into `[0, 1]`. Infinities clamp to the
    /// nearest bound; NaN becomes 1.
    pub fn clamped(self) -> Self {
        Self {
            intensity: clamp_or(self.intensity, 0.0, 1.0, DEFAULT_INTENSITY),
            ..self
        }
    }
}

impl Default for DuotoneParams {
    fn default() -> Self {
        Self {
            shadow: Color::HERO_GREEN,
            highlight: Color::BRAVE_PINK,
            intensity: DEFAULT_INTENSITY,
        }
    }
}

/// Everything one invocation of the filter needs.
///
/// Defaults: intensity 1, brightness/contrast/saturation 0,
/// shadow `#1B602F`, highlight `#F784C5`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Pre-adjustment, applied first.
    #[serde(flatten)]
    pub adjustment: AdjustmentParams,
    /// Duotone mapping, applied second.
    #[serde(flatten)]
    pub duotone: DuotoneParams,
}

/// Raw, unvalidated field values as they arrive from a form or query.
///
/// Missing fields take their defaults; malformed numbers do too.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFilterParams<'a> {
    pub shadow: Option<&'a str>,
    pub highlight: Option<&'a str>,
    pub intensity: Option<&'a str>,
    pub brightness: Option<&'a str>,
    pub contrast: Option<&'a str>,
    pub saturation: Option<&'a str>,
}

impl FilterParams {
    pub fn new(adjustment: AdjustmentParams, duotone: DuotoneParams) -> Self {
        Self {
            adjustment: adjustment.clamped(),
            duotone: duotone.clamped(),
        }
    }

    /// Build params from string fields.
    ///
    /// Empty or absent colors use the default palette; present but malformed
    /// colors degrade to black.
    pub fn from_raw(raw: RawFilterParams<'_>) -> Self {
        let adjustment = AdjustmentParams::new(
            parse_number(raw.brightness, 0.0),
            parse_number(raw.contrast, 0.0),
            parse_number(raw.saturation, 0.0),
        );
        let duotone = DuotoneParams::new(
            parse_color(raw.shadow, Color::HERO_GREEN),
            parse_color(raw.highlight, Color::BRAVE_PINK),
            parse_number(raw.intensity, DEFAULT_INTENSITY),
        );

        Self {
            adjustment,
            duotone,
        }
    }

    /// Copy with every field clamped.
    pub fn clamped(self) -> Self {
        Self::new(self.adjustment, self.duotone)
    }
}

const DEFAULT_INTENSITY: f64 = 1.0;

/// Read a color field. Empty or absent means `default`; anything else that
/// is not six hex digits is black.
pub fn parse_color(raw: Option<&str>, default: Color) -> Color {
    match raw.map(str::trim) {
        None | Some("") => default,
        Some(s) => Color::from_hex_lossy(s),
    }
}

/// Parse a decimal number the way a form field is read: the longest leading
/// float wins and trailing garbage is ignored (`"0.5abc"` → 0.5). Overflow
/// gives an infinity, which the params clamp. Falls back on absence or when
/// no number leads the string.
pub fn parse_number(raw: Option<&str>, fallback: f64) -> f64 {
    raw.and_then(leading_float).unwrap_or(fallback)
}

fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse().ok();
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |n| from + n)
    };

    let int_end = digits(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Parse a leading optionally-signed integer the way a form field is read,
/// ignoring trailing garbage (`"1024px"` → 1024, `"75.9"` → 75).
pub fn parse_integer(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs instead of failing.
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

fn clamp_or(v: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if v.is_nan() { fallback } else { v.clamp(min, max) }
}
