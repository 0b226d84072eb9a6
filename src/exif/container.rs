//! Locates the TIFF metadata container inside an image file.

const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Container format the metadata was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Jpeg,
    Png,
    Tiff,
}

fn is_tiff_header(bytes: &[u8]) -> bool {
    bytes.starts_with(b"II\x2a\x00") || bytes.starts_with(b"MM\x00\x2a")
}

/// Return the TIFF container embedded in `bytes`, if any.
pub fn locate(bytes: &[u8]) -> Option<(ContainerKind, &[u8])> {
    if bytes.starts_with(&[0xFF, 0xD8]) {
        return jpeg_app1(bytes).map(|tiff| (ContainerKind::Jpeg, tiff));
    }
    if bytes.starts_with(PNG_SIGNATURE) {
        return png_exif_chunk(bytes).map(|tiff| (ContainerKind::Png, tiff));
    }
    is_tiff_header(bytes).then_some((ContainerKind::Tiff, bytes))
}

/// Walk JPEG marker segments up to the start of scan, looking for an Exif APP1.
fn jpeg_app1(jpeg: &[u8]) -> Option<&[u8]> {
    let mut idx = 2;
    while idx + 3 < jpeg.len() {
        if jpeg[idx] != 0xFF {
            idx += 1;
            continue;
        }
        let marker = jpeg[idx + 1];
        idx += 2;
        match marker {
            // Fill bytes and standalone markers carry no length.
            0xFF => {
                idx -= 1;
                continue;
            }
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => break,
            _ => {}
        }
        let len = u16::from_be_bytes([jpeg[idx], jpeg[idx + 1]]) as usize;
        if len < 2 || idx + len > jpeg.len() {
            break;
        }
        let payload = &jpeg[idx + 2..idx + len];
        if marker == 0xE1 {
            if let Some(tiff) = payload.strip_prefix(EXIF_PREFIX) {
                return Some(tiff);
            }
            if is_tiff_header(payload) {
                return Some(payload);
            }
        }
        idx += len;
    }
    None
}

/// Find the `eXIf` chunk. CRCs are not checked.
fn png_exif_chunk(png: &[u8]) -> Option<&[u8]> {
    let mut idx = PNG_SIGNATURE.len();
    while idx + 8 <= png.len() {
        let len = u32::from_be_bytes(png[idx..idx + 4].try_into().ok()?) as usize;
        let kind = &png[idx + 4..idx + 8];
        let data_start = idx + 8;
        let data_end = data_start.checked_add(len)?;
        if data_end > png.len() {
            return None;
        }
        match kind {
            b"eXIf" => {
                let data = &png[data_start..data_end];
                return Some(data.strip_prefix(EXIF_PREFIX).unwrap_or(data));
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        idx = data_end + 4;
    }
    None
}
