use crate::features::error::CodecError;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encode an image as PNG, the lossless transport format for thumbnails and ELA output.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(CodecError::Encode)?;
    Ok(bytes.into_inner())
}

/// Standard (padded) base64 encoding of an image payload.
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}
