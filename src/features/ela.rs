//! Error Level Analysis.
//!
//! The decoded image is recompressed as JPEG at a fixed quality, decoded again, and the
//! per-channel absolute difference is amplified into a visible map. Regions that were
//! already saved at that quality barely change; regions with a different compression
//! history (pasted or retouched areas) stand out as brighter patches.
//!
//! This is a heuristic visual aid. Large, near-uniform bright regions away from
//! high-frequency edges deserve a closer look; edges and fine texture are naturally
//! bright and prove nothing on their own.

use crate::features::data_url::encode_png;
use crate::features::error::CodecError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// JPEG quality used for the recompression step.
pub const DEFAULT_QUALITY: u8 = 90;
/// Factor applied to every difference value before clamping at 255.
pub const DEFAULT_AMPLIFICATION: u8 = 15;

/// Summary of the raw (unamplified) channel differences.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ElaStatistics {
    pub max_difference: u8,
    pub mean_difference: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElaImage {
    /// Amplified difference map, PNG encoded.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub statistics: ElaStatistics,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElaResult {
    Available(ElaImage),
    Unavailable(String),
}

impl ElaResult {
    pub fn image(&self) -> Option<&ElaImage> {
        match self {
            ElaResult::Available(image) => Some(image),
            ElaResult::Unavailable(_) => None,
        }
    }
}

/// Run ELA and capture any failure as [`ElaResult::Unavailable`].
pub fn analyze(bytes: &[u8], quality: u8, amplification: u8) -> ElaResult {
    match error_level_analysis(bytes, quality, amplification) {
        Ok(image) => ElaResult::Available(image),
        Err(e) => {
            warn!("ELA could not be performed: {e}");
            ElaResult::Unavailable(format!("ELA could not be performed: {e}"))
        }
    }
}

/// The fallible ELA pipeline. Everything happens in memory.
pub fn error_level_analysis(
    bytes: &[u8],
    quality: u8,
    amplification: u8,
) -> Result<ElaImage, CodecError> {
    let original = image::load_from_memory(bytes)
        .map_err(CodecError::Decode)?
        .to_rgb8();
    let resaved = recompress(&original, quality)?;
    let (difference, statistics) = amplified_difference(&original, &resaved, amplification)?;
    debug!(
        width = difference.width(),
        height = difference.height(),
        max_difference = statistics.max_difference,
        mean_difference = statistics.mean_difference,
        "Computed error levels"
    );

    let (width, height) = difference.dimensions();
    let png = encode_png(&DynamicImage::ImageRgb8(difference))?;
    Ok(ElaImage {
        png,
        width,
        height,
        statistics,
    })
}

/// JPEG round trip at `quality` (clamped to 1..=100).
fn recompress(image: &RgbImage, quality: u8) -> Result<RgbImage, CodecError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(image)
        .map_err(CodecError::Encode)?;
    Ok(image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
        .map_err(CodecError::Decode)?
        .to_rgb8())
}

/// `|a - b| * amplification` per channel, saturating at 255.
fn amplified_difference(
    original: &RgbImage,
    resaved: &RgbImage,
    amplification: u8,
) -> Result<(RgbImage, ElaStatistics), CodecError> {
    let mismatch = CodecError::DimensionMismatch {
        expected: original.dimensions(),
        found: resaved.dimensions(),
    };
    if original.dimensions() != resaved.dimensions() {
        return Err(mismatch);
    }

    let mut max_difference = 0u8;
    let mut total: u64 = 0;
    let raw: Vec<u8> = original
        .as_raw()
        .iter()
        .zip(resaved.as_raw())
        .map(|(a, b)| {
            let difference = a.abs_diff(*b);
            max_difference = max_difference.max(difference);
            total += u64::from(difference);
            difference.saturating_mul(amplification)
        })
        .collect();
    let mean_difference = total as f64 / raw.len().max(1) as f64;

    let (width, height) = original.dimensions();
    let difference = RgbImage::from_raw(width, height, raw).ok_or(mismatch)?;
    Ok((
        difference,
        ElaStatistics {
            max_difference,
            mean_difference,
        },
    ))
}
