//! Decoding uploads and encoding results for download.

use std::fmt;

#[cfg(feature = "codec")]
use image::codecs::jpeg::JpegEncoder;
#[cfg(feature = "codec")]
use image::codecs::png::PngEncoder;
#[cfg(feature = "codec")]
use image::codecs::webp::WebPEncoder;
#[cfg(feature = "codec")]
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

#[cfg(feature = "codec")]
use crate::error::CoreError;
#[cfg(feature = "codec")]
use crate::image::PixelBuffer;
use crate::transform::params::parse_integer;

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 92;

/// Base name for downloaded files.
const FILE_STEM: &str = "brave-pink";

/// Output formats offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    /// Parse a format name, case-insensitive. `jpg` is accepted for JPEG;
    /// anything unrecognised means PNG.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Self::Jpeg,
            "webp" => Self::Webp,
            _ => Self::Png,
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    /// Suggested download file name, e.g. `brave-pink.jpg`.
    pub fn file_name(self) -> String {
        format!("{FILE_STEM}.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parse a quality value: integer, fallback 92, clamped to `[1, 100]`.
pub fn clamp_quality(raw: Option<&str>) -> u8 {
    parse_integer(raw)
        .filter(|&q| q != 0)
        .map_or(DEFAULT_QUALITY, |q| q.clamp(1, 100) as u8)
}

#[cfg(feature = "codec")]
/// Decode an encoded image (any format the enabled codecs read) into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, CoreError> {
    let img = image::load_from_memory(bytes).map_err(|e| CoreError::Decode(e.to_string()))?;
    Ok(img.to_rgba8().into())
}

#[cfg(feature = "codec")]
/// Encode `buffer` in `format`.
///
/// `quality` applies to JPEG only. JPEG output drops the alpha channel;
/// WebP output is lossless.
pub fn encode(buffer: &PixelBuffer, format: ExportFormat, quality: u8) -> Result<Vec<u8>, CoreError> {
    let (width, height) = buffer.dimensions();
    let mut out = Vec::new();

    let result = match format {
        ExportFormat::Png => PngEncoder::new(&mut out).write_image(
            buffer.as_bytes(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            let rgb: Vec<u8> = buffer.pixels().flat_map(|px| [px[0], px[1], px[2]]).collect();
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        ExportFormat::Webp => WebPEncoder::new_lossless(&mut out).write_image(
            buffer.as_bytes(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };

    result.map_err(|e| CoreError::Encode(e.to_string()))?;
    tracing::debug!(%format, bytes = out.len(), "encoded image");
    Ok(out)
}
