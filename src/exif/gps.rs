use crate::exif::error::ParseError;
use crate::exif::tags::{
    TAG_GPS_LATITUDE, TAG_GPS_LATITUDE_REF, TAG_GPS_LONGITUDE, TAG_GPS_LONGITUDE_REF,
};
use crate::exif::tiff::{Ifd, Rational, TiffReader, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Plain decimal notation that never switches to an exponent and always has a point.
fn format_degrees(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

impl fmt::Display for GpsCoordinate {
    /// `"lat, lon"`, always with a decimal point (`40.0`, not `40`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            format_degrees(self.latitude),
            format_degrees(self.longitude)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GpsResult {
    /// No latitude in the GPS directory, or no GPS directory at all.
    Absent,
    Found(GpsCoordinate),
    Invalid(ParseError),
}

impl GpsResult {
    pub fn coordinate(&self) -> Option<GpsCoordinate> {
        match self {
            GpsResult::Found(coordinate) => Some(*coordinate),
            _ => None,
        }
    }
}

/// Hemisphere reference byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn parse(reference: &str) -> Result<Self, ParseError> {
        match reference.trim() {
            "N" => Ok(Hemisphere::North),
            "S" => Ok(Hemisphere::South),
            "E" => Ok(Hemisphere::East),
            "W" => Ok(Hemisphere::West),
            other => Err(ParseError::Reference(other.to_string())),
        }
    }

    const fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }
}

/// Degrees, minutes, seconds to a signed decimal degree.
pub fn to_decimal(
    dms: &[Rational],
    hemisphere: Hemisphere,
    tag: u16,
) -> Result<f64, ParseError> {
    let [degrees, minutes, seconds] = dms else {
        return Err(ParseError::WrongCount {
            tag,
            expected: 3,
            found: dms.len(),
        });
    };
    let component = |r: &Rational| r.to_f64().ok_or(ParseError::ZeroDenominator { tag });
    let decimal = component(degrees)? + component(minutes)? / 60.0 + component(seconds)? / 3600.0;
    Ok(if hemisphere.is_negative() {
        -decimal
    } else {
        decimal
    })
}

fn read_axis(
    reader: &TiffReader<'_>,
    gps: &Ifd,
    value_tag: u16,
    reference_tag: u16,
) -> Result<f64, ParseError> {
    let entry = gps.entry(value_tag).ok_or(ParseError::MissingTag(value_tag))?;
    let Value::Rational(dms) = reader.value(entry)? else {
        return Err(ParseError::WrongType {
            tag: value_tag,
            expected: "RATIONAL",
        });
    };

    let reference_entry = gps
        .entry(reference_tag)
        .ok_or(ParseError::MissingTag(reference_tag))?;
    let reference = reader
        .value(reference_entry)?
        .to_text()
        .ok_or(ParseError::MissingTag(reference_tag))?;

    to_decimal(&dms, Hemisphere::parse(&reference)?, value_tag)
}

/// Convert the GPS directory into a decimal coordinate.
pub fn read_coordinate(reader: &TiffReader<'_>, gps: &Ifd) -> GpsResult {
    if gps.entry(TAG_GPS_LATITUDE).is_none() {
        return GpsResult::Absent;
    }
    let coordinate = read_axis(reader, gps, TAG_GPS_LATITUDE, TAG_GPS_LATITUDE_REF).and_then(
        |latitude| {
            read_axis(reader, gps, TAG_GPS_LONGITUDE, TAG_GPS_LONGITUDE_REF)
                .map(|longitude| GpsCoordinate {
                    latitude,
                    longitude,
                })
        },
    );
    match coordinate {
        Ok(coordinate) => GpsResult::Found(coordinate),
        Err(e) => {
            tracing::warn!("Error processing GPS data: {e}");
            GpsResult::Invalid(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dms(values: [(u32, u32); 3]) -> Vec<Rational> {
        values.iter().map(|(n, d)| Rational::new(*n, *d)).collect()
    }

    #[test]
    fn test_whole_degrees_north() {
        let decimal = to_decimal(&dms([(40, 1), (0, 1), (0, 1)]), Hemisphere::North, 2).unwrap();
        assert_eq!(decimal, 40.0);
    }

    #[test]
    fn test_southern_hemisphere_is_negative() {
        let decimal = to_decimal(&dms([(40, 1), (0, 1), (0, 1)]), Hemisphere::South, 2).unwrap();
        assert_eq!(decimal, -40.0);
    }

    #[test]
    fn test_minutes_and_seconds() {
        let decimal =
            to_decimal(&dms([(52, 1), (22, 1), (4521, 100)]), Hemisphere::North, 2).unwrap();
        assert!((decimal - 52.379_225).abs() < 1e-6);

        let west = to_decimal(&dms([(4, 1), (53, 1), (58, 1)]), Hemisphere::West, 4).unwrap();
        assert!((west + 4.899_444).abs() < 1e-6);
    }

    #[test]
    fn test_zero_denominator_is_a_parse_error() {
        let result = to_decimal(&dms([(40, 1), (0, 0), (0, 1)]), Hemisphere::North, 2);
        assert_eq!(result, Err(ParseError::ZeroDenominator { tag: 2 }));
    }

    #[test]
    fn test_wrong_component_count() {
        let result = to_decimal(&[Rational::new(40, 1)], Hemisphere::North, 2);
        assert!(matches!(
            result,
            Err(ParseError::WrongCount {
                expected: 3,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_reference() {
        assert_eq!(
            Hemisphere::parse("Q"),
            Err(ParseError::Reference("Q".to_string()))
        );
        assert_eq!(Hemisphere::parse("E"), Ok(Hemisphere::East));
    }

    #[test]
    fn test_display_keeps_decimal_point() {
        let coordinate = GpsCoordinate {
            latitude: 40.0,
            longitude: -74.01,
        };
        assert_eq!(coordinate.to_string(), "40.0, -74.01");
    }

    #[test]
    fn test_display_near_null_island_has_no_exponent() {
        let coordinate = GpsCoordinate {
            latitude: 0.00001,
            longitude: -to_decimal(&dms([(0, 1), (0, 1), (1, 100)]), Hemisphere::North, 4)
                .unwrap(),
        };
        let text = coordinate.to_string();
        assert!(!text.contains('e'), "unexpected exponent in {text}");
        assert!(text.starts_with("0.00001, -0.0000027"));
        assert_eq!(
            GpsCoordinate {
                latitude: 0.0,
                longitude: -0.0
            }
            .to_string(),
            "0.0, -0.0"
        );
    }
}
