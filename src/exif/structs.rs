use crate::exif::error::ParseError;
use crate::exif::gps::GpsResult;
use crate::exif::tags::MetadataTag;
use crate::features::data_url::to_base64;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Decoded metadata fields, kept in report order. Only known tags are ever inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataMap(BTreeMap<MetadataTag, String>);

impl MetadataMap {
    pub fn insert(&mut self, tag: MetadataTag, value: String) {
        self.0.insert(tag, value);
    }

    pub fn get(&self, tag: MetadataTag) -> Option<&str> {
        self.0.get(&tag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataResult {
    Decoded(MetadataMap),
    /// The file carries no metadata container at all.
    NoExif,
    /// A container exists but none of the known tags could be read from it.
    NoReadableTags,
    Unreadable(ParseError),
}

impl MetadataResult {
    pub fn fields(&self) -> Option<&MetadataMap> {
        match self {
            MetadataResult::Decoded(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Flattened to a string map: the decoded fields, or a single `Status`/`Error` entry.
impl Serialize for MetadataResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataResult::Decoded(fields) => fields.serialize(serializer),
            MetadataResult::NoExif => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Status", "No EXIF data found.")?;
                map.end()
            }
            MetadataResult::NoReadableTags => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Status", "No readable EXIF tags found.")?;
                map.end()
            }
            MetadataResult::Unreadable(e) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Error", &format!("Could not read metadata: {e}"))?;
                map.end()
            }
        }
    }
}

/// Embedded preview re-encoded as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// MIME type of the embedded stream as found in the file.
    pub source_mime_type: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailResult {
    NoExif,
    NoThumbnail,
    Found(Thumbnail),
    DecodeError(String),
}

impl ThumbnailResult {
    pub fn status(&self) -> &'static str {
        match self {
            ThumbnailResult::NoExif => "no_exif",
            ThumbnailResult::NoThumbnail => "no_thumbnail",
            ThumbnailResult::Found(_) => "found",
            ThumbnailResult::DecodeError(_) => "error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ThumbnailResult::NoExif => "No EXIF data found, so no thumbnail.",
            ThumbnailResult::NoThumbnail => "No embedded thumbnail found.",
            ThumbnailResult::Found(_) => {
                "Embedded thumbnail extracted. Compare it to the main image."
            }
            ThumbnailResult::DecodeError(reason) => reason,
        }
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        match self {
            ThumbnailResult::Found(thumbnail) => Some(thumbnail),
            _ => None,
        }
    }
}

impl Serialize for ThumbnailResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let found = self.thumbnail();
        let mut map = serializer.serialize_map(Some(if found.is_some() { 4 } else { 2 }))?;
        map.serialize_entry("status", self.status())?;
        map.serialize_entry("message", self.message())?;
        if let Some(thumbnail) = found {
            map.serialize_entry("thumbnail_b64", &to_base64(&thumbnail.png))?;
            map.serialize_entry("source_format", &thumbnail.source_mime_type)?;
        }
        map.end()
    }
}

/// Everything read from the metadata container.
#[derive(Debug, Clone, PartialEq)]
pub struct ExifAnalysis {
    pub metadata: MetadataResult,
    pub gps: GpsResult,
    pub thumbnail: ThumbnailResult,
}

impl ExifAnalysis {
    pub fn no_exif() -> Self {
        Self {
            metadata: MetadataResult::NoExif,
            gps: GpsResult::Absent,
            thumbnail: ThumbnailResult::NoExif,
        }
    }

    /// The container exists but its header or 0th directory cannot be parsed.
    pub fn unreadable(error: ParseError) -> Self {
        Self {
            thumbnail: ThumbnailResult::DecodeError(format!(
                "Error reading EXIF container: {error}"
            )),
            metadata: MetadataResult::Unreadable(error),
            gps: GpsResult::Absent,
        }
    }
}
