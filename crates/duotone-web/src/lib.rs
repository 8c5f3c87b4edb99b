//! Duotone Web — the filter as WebAssembly for the browser.
//!
//! The page draws the uploaded photo onto a canvas, hands the `ImageData`
//! bytes to these exports and puts the result back. All pixel math lives in
//! `duotone-core`, so a preview here matches what the server returns.
//!
//! Functions ending in `_rgba` or taking only plain values are ordinary Rust
//! and can be tested natively; the `#[wasm_bindgen]` wrappers only convert
//! errors into `JsValue`.

mod filter;

use duotone_core::export::ExportFormat;
use duotone_core::resize::{self, PREVIEW_BOX};
use duotone_core::transform::params::parse_color;
use duotone_core::{AdjustmentParams, Color, CoreError, DuotoneParams, FilterParams};
use wasm_bindgen::prelude::*;

pub use filter::DuotoneFilter;

/// Install the panic hook and console logger when the module loads.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // duotone-core logs through `tracing`; its `log` feature routes those
    // events here. Fails only if a logger is already installed.
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    if console_log::init_with_level(level).is_ok() {
        log::info!("duotone-web initialized");
    }
}

/// Build filter params from the values a page's controls hold.
///
/// Colors follow the form rules: empty means the default palette color,
/// anything else that is not `#RRGGBB` is black. Numbers are clamped.
pub fn params_from_values(
    shadow: &str,
    highlight: &str,
    intensity: f64,
    brightness: f64,
    contrast: f64,
    saturation: f64,
) -> FilterParams {
    FilterParams::new(
        AdjustmentParams::new(brightness, contrast, saturation),
        DuotoneParams::new(
            parse_color(Some(shadow), Color::HERO_GREEN),
            parse_color(Some(highlight), Color::BRAVE_PINK),
            intensity,
        ),
    )
}

/// Filter a canvas `ImageData` buffer in place.
///
/// `data` must hold `width * height * 4` bytes.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn apply_filter(
    data: &mut [u8],
    width: u32,
    height: u32,
    shadow: &str,
    highlight: &str,
    intensity: f64,
    brightness: f64,
    contrast: f64,
    saturation: f64,
) -> Result<(), JsValue> {
    let params = params_from_values(shadow, highlight, intensity, brightness, contrast, saturation);
    duotone_core::apply_filter_to_rgba(data, width, height, &params).map_err(to_js)
}

/// Size of the preview canvas for a `width × height` image inside a
/// `max_width × max_height` box, as `[w, h]`. Never upscales.
#[wasm_bindgen]
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> Vec<u32> {
    let (w, h) = resize::fit_within(width, height, max_width, max_height);
    vec![w, h]
}

/// [`fit_dimensions`] with the default 1400×1400 preview box.
#[wasm_bindgen]
pub fn preview_dimensions(width: u32, height: u32) -> Vec<u32> {
    fit_dimensions(width, height, PREVIEW_BOX.0, PREVIEW_BOX.1)
}

/// `#RRGGBB` (uppercase) for any input; invalid input gives `#000000`.
#[wasm_bindgen]
pub fn normalize_hex(value: &str) -> String {
    Color::from_hex_lossy(value).to_hex()
}

/// Whether `value` is exactly `#` followed by six hex digits.
#[wasm_bindgen]
pub fn is_valid_hex(value: &str) -> bool {
    Color::is_strict_hex(value)
}

/// Download file name for a format choice, e.g. `brave-pink.jpg`.
#[wasm_bindgen]
pub fn export_file_name(format: &str) -> String {
    ExportFormat::parse(format).file_name()
}

/// MIME type for `canvas.toBlob` for a format choice.
#[wasm_bindgen]
pub fn export_mime(format: &str) -> String {
    ExportFormat::parse(format).mime().to_owned()
}

fn to_js(err: CoreError) -> JsValue {
    log::error!("{err}");
    JsValue::from_str(&err.to_string())
}
