use crate::exif::container;
use crate::exif::gps::{self, GpsResult};
use crate::exif::structs::{ExifAnalysis, MetadataMap, MetadataResult};
use crate::exif::tags::{Directory, MetadataTag, TAG_EXIF_IFD_POINTER, TAG_GPS_IFD_POINTER};
use crate::exif::thumbnail;
use crate::exif::tiff::{Ifd, TiffReader};
use tracing::{debug, instrument, warn};

/// Follow a pointer tag from the 0th IFD. Any failure only drops that directory.
fn sub_ifd(reader: &TiffReader<'_>, ifd0: &Ifd, pointer_tag: u16, name: &str) -> Option<Ifd> {
    let entry = ifd0.entry(pointer_tag)?;
    let offset = match reader.value(entry) {
        Ok(value) => value.first_u32(),
        Err(e) => {
            warn!("Unreadable {name} IFD pointer: {e}");
            return None;
        }
    };
    let Some(offset) = offset else {
        warn!("{name} IFD pointer has a non-integer type");
        return None;
    };
    reader
        .read_ifd(offset)
        .inspect_err(|e| warn!("Unreadable {name} IFD: {e}"))
        .ok()
}

/// Decode every known tag of `directory` present in `ifd`. Unreadable entries are skipped.
fn collect_tags(reader: &TiffReader<'_>, ifd: &Ifd, directory: Directory, fields: &mut MetadataMap) {
    for tag in MetadataTag::in_directory(directory) {
        let Some(entry) = ifd.entry(tag.id()) else {
            continue;
        };
        match reader.value(entry) {
            Ok(value) => {
                if let Some(text) = value.to_text() {
                    fields.insert(tag, text);
                }
            }
            Err(e) => warn!(tag = tag.name(), "Skipping unreadable tag: {e}"),
        }
    }
}

/// Decode the metadata container of an image: known tags, GPS position and thumbnail.
///
/// Never fails. A missing container is reported as [`MetadataResult::NoExif`], and every
/// malformed piece is scoped to the field it belongs to.
#[instrument(skip_all, fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> ExifAnalysis {
    let Some((kind, data)) = container::locate(bytes) else {
        debug!("No EXIF container found");
        return ExifAnalysis::no_exif();
    };
    debug!(?kind, len = data.len(), "Found EXIF container");

    let reader = match TiffReader::new(data) {
        Ok(reader) => reader,
        Err(e) => {
            warn!("Unreadable EXIF header: {e}");
            return ExifAnalysis::unreadable(e);
        }
    };
    let ifd0 = match reader.read_ifd(reader.ifd0_offset()) {
        Ok(ifd0) => ifd0,
        Err(e) => {
            warn!("Unreadable 0th IFD: {e}");
            return ExifAnalysis::unreadable(e);
        }
    };

    let mut fields = MetadataMap::default();
    collect_tags(&reader, &ifd0, Directory::Primary, &mut fields);
    if let Some(exif_ifd) = sub_ifd(&reader, &ifd0, TAG_EXIF_IFD_POINTER, "Exif") {
        collect_tags(&reader, &exif_ifd, Directory::Exif, &mut fields);
    }
    let metadata = if fields.is_empty() {
        MetadataResult::NoReadableTags
    } else {
        MetadataResult::Decoded(fields)
    };

    let gps = sub_ifd(&reader, &ifd0, TAG_GPS_IFD_POINTER, "GPS")
        .map_or(GpsResult::Absent, |gps_ifd| gps::read_coordinate(&reader, &gps_ifd));

    let ifd1 = (ifd0.next != 0).then(|| reader.read_ifd(ifd0.next));
    let thumbnail = thumbnail::extract(&reader, ifd1);

    ExifAnalysis {
        metadata,
        gps,
        thumbnail,
    }
}
