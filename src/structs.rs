use crate::exif::gps::GpsResult;
use crate::exif::structs::{ExifAnalysis, MetadataResult, ThumbnailResult};
use crate::features::data_url::to_base64;
use crate::features::ela::{ElaResult, ElaStatistics};
use crate::features::hashing::FileHashes;
use serde::{Serialize, Serializer};

/// Result of one analysis request. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub filename: String,
    pub hashes: FileHashes,
    pub metadata: MetadataResult,
    pub gps: GpsResult,
    pub thumbnail: ThumbnailResult,
    pub ela: ElaResult,
}

impl AnalysisRecord {
    pub fn new(filename: String, hashes: FileHashes, exif: ExifAnalysis, ela: ElaResult) -> Self {
        Self {
            filename,
            hashes,
            metadata: exif.metadata,
            gps: exif.gps,
            thumbnail: exif.thumbnail,
            ela,
        }
    }
}

/// Wire shape consumed by the API serializer and the report renderer.
#[derive(Serialize)]
struct AnalysisRecordJson<'a> {
    filename: &'a str,
    hashes: &'a FileHashes,
    metadata: &'a MetadataResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    gps_coordinate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gps_error: Option<String>,
    thumbnail: &'a ThumbnailResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    ela_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ela_error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ela_statistics: Option<ElaStatistics>,
}

impl Serialize for AnalysisRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (gps_coordinate, gps_error) = match &self.gps {
            GpsResult::Absent => (None, None),
            GpsResult::Found(coordinate) => (Some(coordinate.to_string()), None),
            GpsResult::Invalid(e) => (None, Some(format!("Error processing GPS data: {e}"))),
        };
        let (ela_image, ela_error, ela_statistics) = match &self.ela {
            ElaResult::Available(image) => (Some(to_base64(&image.png)), None, Some(image.statistics)),
            ElaResult::Unavailable(reason) => (None, Some(reason.as_str()), None),
        };
        AnalysisRecordJson {
            filename: &self.filename,
            hashes: &self.hashes,
            metadata: &self.metadata,
            gps_coordinate,
            gps_error,
            thumbnail: &self.thumbnail,
            ela_image,
            ela_error,
            ela_statistics,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::ParseError;
    use crate::exif::gps::GpsCoordinate;
    use crate::features::hashing::hash_bytes;
    use serde_json::json;

    fn record(gps: GpsResult, ela: ElaResult) -> AnalysisRecord {
        AnalysisRecord {
            filename: "photo.jpg".to_string(),
            hashes: hash_bytes(b"abc"),
            metadata: MetadataResult::NoExif,
            gps,
            thumbnail: ThumbnailResult::NoExif,
            ela,
        }
    }

    #[test]
    fn test_degraded_fields_carry_reasons() {
        let value = serde_json::to_value(record(
            GpsResult::Invalid(ParseError::ZeroDenominator { tag: 2 }),
            ElaResult::Unavailable("ELA could not be performed: boom".to_string()),
        ))
        .unwrap();

        assert_eq!(value["filename"], "photo.jpg");
        assert_eq!(value["hashes"]["MD5"], "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(value["metadata"], json!({"Status": "No EXIF data found."}));
        assert!(value.get("gps_coordinate").is_none());
        assert_eq!(
            value["gps_error"],
            "Error processing GPS data: Zero denominator in tag 0x0002"
        );
        assert_eq!(value["thumbnail"]["status"], "no_exif");
        assert!(value.get("ela_image").is_none());
        assert_eq!(value["ela_error"], "ELA could not be performed: boom");
    }

    #[test]
    fn test_found_coordinate_is_a_plain_string() {
        let value = serde_json::to_value(record(
            GpsResult::Found(GpsCoordinate {
                latitude: -40.0,
                longitude: 4.5,
            }),
            ElaResult::Unavailable(String::new()),
        ))
        .unwrap();
        assert_eq!(value["gps_coordinate"], "-40.0, 4.5");
        assert!(value.get("gps_error").is_none());
    }
}
