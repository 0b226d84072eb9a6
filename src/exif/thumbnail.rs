use crate::exif::error::ParseError;
use crate::exif::structs::{Thumbnail, ThumbnailResult};
use crate::exif::tags::{TAG_JPEG_INTERCHANGE_FORMAT, TAG_JPEG_INTERCHANGE_FORMAT_LENGTH};
use crate::exif::tiff::{Ifd, TiffReader};
use crate::features::data_url::encode_png;
use crate::features::error::CodecError;
use tracing::{debug, warn};

/// Slice of the container holding the thumbnail stream.
///
/// `Ok(None)` when the 1st directory does not reference one. A length running past the
/// end of the container is cut short, so the decoder reports the truncation.
fn thumbnail_bytes<'a>(reader: &TiffReader<'a>, ifd1: &Ifd) -> Result<Option<&'a [u8]>, ParseError> {
    let (Some(offset_entry), Some(length_entry)) = (
        ifd1.entry(TAG_JPEG_INTERCHANGE_FORMAT),
        ifd1.entry(TAG_JPEG_INTERCHANGE_FORMAT_LENGTH),
    ) else {
        return Ok(None);
    };
    let offset = reader
        .value(offset_entry)?
        .first_u32()
        .ok_or(ParseError::WrongType {
            tag: TAG_JPEG_INTERCHANGE_FORMAT,
            expected: "SHORT or LONG",
        })? as usize;
    let length = reader
        .value(length_entry)?
        .first_u32()
        .ok_or(ParseError::WrongType {
            tag: TAG_JPEG_INTERCHANGE_FORMAT_LENGTH,
            expected: "SHORT or LONG",
        })? as usize;

    let data = reader.data();
    if length == 0 || offset >= data.len() {
        return Ok(None);
    }
    let end = offset.saturating_add(length).min(data.len());
    Ok(Some(&data[offset..end]))
}

/// Decode an embedded preview and re-encode it as PNG.
pub fn render(bytes: &[u8]) -> Result<Thumbnail, CodecError> {
    let image = image::load_from_memory(bytes).map_err(CodecError::Decode)?;
    let png = encode_png(&image)?;
    Ok(Thumbnail {
        png,
        width: image.width(),
        height: image.height(),
        source_mime_type: image::guess_format(bytes).ok().map(|f| f.to_mime_type()),
    })
}

/// Thumbnail status for a container whose 1st directory is `ifd1`.
pub fn extract(reader: &TiffReader<'_>, ifd1: Option<Result<Ifd, ParseError>>) -> ThumbnailResult {
    let ifd1 = match ifd1 {
        None => return ThumbnailResult::NoThumbnail,
        Some(Ok(ifd1)) => ifd1,
        Some(Err(e)) => {
            warn!("Unreadable thumbnail directory: {e}");
            return ThumbnailResult::DecodeError(format!("Error reading thumbnail directory: {e}"));
        }
    };
    let bytes = match thumbnail_bytes(reader, &ifd1) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return ThumbnailResult::NoThumbnail,
        Err(e) => {
            warn!("Unreadable thumbnail reference: {e}");
            return ThumbnailResult::DecodeError(format!("Error reading thumbnail directory: {e}"));
        }
    };
    debug!(len = bytes.len(), "Found embedded thumbnail");
    match render(bytes) {
        Ok(thumbnail) => ThumbnailResult::Found(thumbnail),
        Err(e) => {
            warn!("Error decoding thumbnail: {e}");
            ThumbnailResult::DecodeError(format!("Error decoding thumbnail: {e}"))
        }
    }
}
