//! Duotone Core — shared pixel math for the duotone filter.
//!
//! This crate contains the color parsing, adjustment and duotone stages,
//! the resize policy and export encoding. Both the server and the browser
//! surface call into it, so there is exactly one copy of every formula.
//!
//! Diagnostics go through `tracing` at debug level. The server installs a
//! subscriber; `duotone-web` enables `tracing/log` so the same events reach
//! the browser console.

pub mod color;
pub mod error;
pub mod export;
pub mod grading;
pub mod image;
pub mod resize;
pub mod transform;

// Re-exports for convenience.
pub use color::Color;
pub use error::CoreError;
pub use self::image::PixelBuffer;
pub use transform::evaluate::{apply_filter, apply_filter_to_rgba, evaluate_pixel};
pub use transform::params::{AdjustmentParams, DuotoneParams, FilterParams};
