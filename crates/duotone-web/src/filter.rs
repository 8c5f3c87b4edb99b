//! Stateful filter handle for interactive pages.

use duotone_core::transform::params::parse_color;
use duotone_core::{Color, CoreError, FilterParams};
use wasm_bindgen::prelude::*;

use crate::to_js;

/// Current slider and color-picker state.
///
/// Each setter clamps its value. [`DuotoneFilter::render`] always works on a
/// fresh copy of the source pixels, so re-rendering after every input event
/// never compounds earlier results.
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct DuotoneFilter {
    params: FilterParams,
}

#[wasm_bindgen]
impl DuotoneFilter {
    /// A filter with the default palette and neutral adjustments.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shadow color; invalid hex gives black, empty restores the default.
    pub fn set_shadow(&mut self, hex: &str) {
        self.params.duotone.shadow = parse_color(Some(hex), Color::HERO_GREEN);
    }

    /// Highlight color; invalid hex gives black, empty restores the default.
    pub fn set_highlight(&mut self, hex: &str) {
        self.params.duotone.highlight = parse_color(Some(hex), Color::BRAVE_PINK);
    }

    pub fn set_intensity(&mut self, value: f64) {
        self.params.duotone.intensity = value;
        self.params = self.params.clamped();
    }

    pub fn set_brightness(&mut self, value: f64) {
        self.params.adjustment.brightness = value;
        self.params = self.params.clamped();
    }

    pub fn set_contrast(&mut self, value: f64) {
        self.params.adjustment.contrast = value;
        self.params = self.params.clamped();
    }

    pub fn set_saturation(&mut self, value: f64) {
        self.params.adjustment.saturation = value;
        self.params = self.params.clamped();
    }

    /// Back to the defaults.
    pub fn reset(&mut self) {
        self.params = FilterParams::default();
    }

    #[wasm_bindgen(getter)]
    pub fn shadow(&self) -> String {
        self.params.duotone.shadow.to_hex()
    }

    #[wasm_bindgen(getter)]
    pub fn highlight(&self) -> String {
        self.params.duotone.highlight.to_hex()
    }

    #[wasm_bindgen(getter)]
    pub fn intensity(&self) -> f64 {
        self.params.duotone.intensity
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f64 {
        self.params.adjustment.brightness
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f64 {
        self.params.adjustment.contrast
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f64 {
        self.params.adjustment.saturation
    }

    /// Filtered copy of `source` (canvas `ImageData` bytes). `source` is
    /// left untouched.
    pub fn render(&self, source: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
        self.render_rgba(source, width, height).map_err(to_js)
    }
}

impl DuotoneFilter {
    /// Current params.
    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// [`DuotoneFilter::render`] without the JavaScript error conversion.
    pub fn render_rgba(&self, source: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CoreError> {
        let mut out = source.to_vec();
        duotone_core::apply_filter_to_rgba(&mut out, width, height, &self.params)?;
        log::debug!("rendered {width}x{height} preview");
        Ok(out)
    }
}
