//! The `POST /api/process` job: decode, downscale, filter, encode.

use std::time::Instant;

use duotone_core::export::{self, ExportFormat};
use duotone_core::resize;
use duotone_core::transform::params::RawFilterParams;
use duotone_core::{FilterParams, apply_filter};

use crate::error::ServerError;
use crate::multipart::{FilePart, MultipartForm};

/// Form field carrying the upload.
pub const IMAGE_FIELD: &str = "image";

const ACCEPTED_SUBTYPES: [&str; 5] = ["png", "jpeg", "jpg", "webp", "gif"];

/// Everything needed to process one upload, parsed from the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessJob {
    pub params: FilterParams,
    pub format: ExportFormat,
    pub quality: u8,
    pub max_edge: u32,
    pub image: Vec<u8>,
}

/// Encoded result of a [`ProcessJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ProcessJob {
    /// Validate the upload and read parameters from `form`.
    ///
    /// The image part must exist, declare an accepted image type, and fit in
    /// `max_upload` bytes.
    pub fn from_form(mut form: MultipartForm, max_upload: usize) -> Result<Self, ServerError> {
        let file = form.take_file(IMAGE_FIELD).ok_or(ServerError::NoImage)?;
        check_upload(&file, max_upload)?;

        let params = FilterParams::from_raw(RawFilterParams {
            shadow: form.field("shadow"),
            highlight: form.field("highlight"),
            intensity: form.field("intensity"),
            brightness: form.field("brightness"),
            contrast: form.field("contrast"),
            saturation: form.field("saturation"),
        });

        Ok(Self {
            params,
            format: form.field("format").map_or_else(ExportFormat::default, ExportFormat::parse),
            quality: export::clamp_quality(form.field("quality")),
            max_edge: resize::clamp_max_edge(form.field("maxSize")),
            image: file.data,
        })
    }

    /// Run the pipeline. CPU-bound; call from a blocking task.
    pub fn run(&self) -> Result<ProcessOutput, ServerError> {
        let started = Instant::now();

        let decoded = export::decode(&self.image)?;
        let source = decoded.dimensions();
        let mut buffer = resize::resize_to_max_edge(&decoded, self.max_edge);
        drop(decoded);

        apply_filter(&mut buffer, &self.params);
        let bytes = export::encode(&buffer, self.format, self.quality)?;
        let (width, height) = buffer.dimensions();

        tracing::info!(
            "Processed {}x{} -> {width}x{height} {} ({} bytes) in {:.1}ms",
            source.0,
            source.1,
            self.format,
            bytes.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(ProcessOutput {
            format: self.format,
            bytes,
            width,
            height,
        })
    }
}

/// Whether a declared MIME type is one of the accepted image types.
pub fn is_accepted_mime(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    let essence = mime.split(';').next().unwrap_or_default().trim();
    essence
        .strip_prefix("image/")
        .is_some_and(|sub| ACCEPTED_SUBTYPES.contains(&sub))
}

fn check_upload(file: &FilePart, max_upload: usize) -> Result<(), ServerError> {
    if !file.content_type.as_deref().is_some_and(is_accepted_mime) {
        return Err(ServerError::UnsupportedMedia);
    }
    if file.data.len() > max_upload {
        return Err(ServerError::PayloadTooLarge);
    }
    Ok(())
}
