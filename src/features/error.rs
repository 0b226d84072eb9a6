use thiserror::Error;

/// Failure inside an image decode/encode step. Scoped to the thumbnail or ELA field.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("re-encoded image is {found:?}, expected {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}
