use serde::{Deserialize, Serialize};

/// Pointer from the 0th IFD to the Exif IFD.
pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
/// Pointer from the 0th IFD to the GPS IFD.
pub const TAG_GPS_IFD_POINTER: u16 = 0x8825;

pub const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
pub const TAG_GPS_LATITUDE: u16 = 0x0002;
pub const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
pub const TAG_GPS_LONGITUDE: u16 = 0x0004;

/// JPEGInterchangeFormat: offset of the thumbnail stream, in the 1st IFD.
pub const TAG_JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
/// JPEGInterchangeFormatLength.
pub const TAG_JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;

/// Which directory a tag is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    Primary,
    Exif,
}

/// The fixed set of fields reported in the metadata map. Anything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum MetadataTag {
    Make,
    Model,
    Software,
    DateTime,
    DateTimeOriginal,
    DateTimeDigitized,
    PixelXDimension,
    PixelYDimension,
}

impl MetadataTag {
    /// All known tags in report order.
    pub const ALL: [MetadataTag; 8] = [
        MetadataTag::Make,
        MetadataTag::Model,
        MetadataTag::Software,
        MetadataTag::DateTime,
        MetadataTag::DateTimeOriginal,
        MetadataTag::DateTimeDigitized,
        MetadataTag::PixelXDimension,
        MetadataTag::PixelYDimension,
    ];

    pub const fn id(self) -> u16 {
        match self {
            MetadataTag::Make => 0x010F,
            MetadataTag::Model => 0x0110,
            MetadataTag::Software => 0x0131,
            MetadataTag::DateTime => 0x0132,
            MetadataTag::DateTimeOriginal => 0x9003,
            MetadataTag::DateTimeDigitized => 0x9004,
            MetadataTag::PixelXDimension => 0xA002,
            MetadataTag::PixelYDimension => 0xA003,
        }
    }

    pub const fn directory(self) -> Directory {
        match self {
            MetadataTag::Make
            | MetadataTag::Model
            | MetadataTag::Software
            | MetadataTag::DateTime => Directory::Primary,
            _ => Directory::Exif,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MetadataTag::Make => "Make",
            MetadataTag::Model => "Model",
            MetadataTag::Software => "Software",
            MetadataTag::DateTime => "DateTime",
            MetadataTag::DateTimeOriginal => "DateTimeOriginal",
            MetadataTag::DateTimeDigitized => "DateTimeDigitized",
            MetadataTag::PixelXDimension => "PixelXDimension",
            MetadataTag::PixelYDimension => "PixelYDimension",
        }
    }

    pub fn in_directory(directory: Directory) -> impl Iterator<Item = MetadataTag> {
        Self::ALL
            .into_iter()
            .filter(move |tag| tag.directory() == directory)
    }
}
