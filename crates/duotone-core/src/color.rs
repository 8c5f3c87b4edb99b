//! RGB colors, hex parsing, and the shared luminance / clamp helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rec. 709 luminance weights. Both stages key off these exact values.
pub const LUMA_REC709: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Perceptual luminance of an RGB triple, in the same 0–255 scale as the input.
#[inline]
pub fn luminance(rgb: [f64; 3]) -> f64 {
    rgb[0] * LUMA_REC709[0] + rgb[1] * LUMA_REC709[1] + rgb[2] * LUMA_REC709[2]
}

/// Clamp a channel value to `[0, 255]`.
#[inline]
pub fn clamp_channel(v: f64) -> f64 {
    v.clamp(0.0, 255.0)
}

/// Clamp, then round to the nearest byte (halves away from zero).
///
/// NaN maps to 0.
#[inline]
pub fn quantize(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    clamp_channel(v).round() as u8
}

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Default shadow color (`#1B602F`).
    pub const HERO_GREEN: Self = Self::new(0x1B, 0x60, 0x2F);

    /// Default highlight color (`#F784C5`).
    pub const BRAVE_PINK: Self = Self::new(0xF7, 0x84, 0xC5);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `RRGGBB` hex string, with or without a leading `#`,
    /// case-insensitive. Returns `None` for anything else.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse a hex string, degrading to black when it is malformed.
    pub fn from_hex_lossy(s: &str) -> Self {
        Self::parse_hex(s).unwrap_or(Self::BLACK)
    }

    /// Strict check for the `#RRGGBB` form accepted by hex text inputs.
    pub fn is_strict_hex(s: &str) -> bool {
        s.starts_with('#') && Self::parse_hex(s).is_some()
    }

    /// `#RRGGBB`, uppercase.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Channels as floats, in 0–255.
    pub fn to_f64(self) -> [f64; 3] {
        [f64::from(self.r), f64::from(self.g), f64::from(self.b)]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = std::convert::Infallible;

    /// Never fails: malformed input becomes black.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_hex_lossy(s))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_hex_lossy(&s))
    }
}
