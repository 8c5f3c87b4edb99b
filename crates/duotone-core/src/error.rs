/// Errors produced by the core crate.
///
/// The transform itself cannot fail; these cover buffer construction and
/// the codec boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image dimensions {width}x{height} overflow the address space")]
    Dimensions { width: u32, height: u32 },
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}
