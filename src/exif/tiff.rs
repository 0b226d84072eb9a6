//! Bounds-checked reader for TIFF-style tagged directories.
//! Operates on borrowed slices; offsets are relative to the container start.

use crate::exif::error::ParseError;

/// TIFF magic number.
pub const TIFF_MAGIC: u16 = 0x002A;
/// Size of the TIFF header in bytes.
pub const TIFF_HEADER_LEN: usize = 8;
/// Size of one IFD entry in bytes.
pub const IFD_ENTRY_LEN: usize = 12;
/// Upper bound on entries per directory. Real files stay far below this.
pub const MAX_IFD_ENTRIES: u16 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    #[inline]
    pub fn read_u16(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    #[inline]
    pub fn read_u32(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    #[inline]
    fn read_u64(self, data: &[u8], offset: usize) -> Option<u64> {
        let bytes: [u8; 8] = data.get(offset..offset.checked_add(8)?)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u64::from_le_bytes(bytes),
            Endian::Big => u64::from_be_bytes(bytes),
        })
    }
}

/// TIFF field types 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
}

impl FieldType {
    pub fn from_u16(raw: u16) -> Option<Self> {
        Some(match raw {
            1 => Self::Byte,
            2 => Self::Ascii,
            3 => Self::Short,
            4 => Self::Long,
            5 => Self::Rational,
            6 => Self::SByte,
            7 => Self::Undefined,
            8 => Self::SShort,
            9 => Self::SLong,
            10 => Self::SRational,
            11 => Self::Float,
            12 => Self::Double,
            _ => return None,
        })
    }

    /// Size in bytes of one value of this type.
    pub const fn unit_size(self) -> usize {
        match self {
            Self::Byte | Self::Ascii | Self::SByte | Self::Undefined => 1,
            Self::Short | Self::SShort => 2,
            Self::Long | Self::SLong | Self::Float => 4,
            Self::Rational | Self::SRational | Self::Double => 8,
        }
    }
}

/// Unsigned (numerator, denominator) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `None` when the denominator is zero.
    pub fn to_f64(self) -> Option<f64> {
        (self.denominator != 0).then(|| f64::from(self.numerator) / f64::from(self.denominator))
    }
}

/// Signed (numerator, denominator) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SRational {
    pub numerator: i32,
    pub denominator: i32,
}

/// A decoded entry value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(Vec<u8>),
    Ascii(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<SRational>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl Value {
    /// Human-readable rendering of the value.
    ///
    /// Byte strings are right-trimmed of NUL and whitespace and decoded as UTF-8 with
    /// invalid sequences replaced. Numbers are joined with `", "`. Returns `None` when
    /// nothing printable remains.
    pub fn to_text(&self) -> Option<String> {
        let text = match self {
            Value::Ascii(bytes) | Value::Byte(bytes) | Value::Undefined(bytes) => {
                String::from_utf8_lossy(trim_trailing(bytes)).into_owned()
            }
            Value::Short(values) => join(values),
            Value::Long(values) => join(values),
            Value::SByte(values) => join(values),
            Value::SShort(values) => join(values),
            Value::SLong(values) => join(values),
            Value::Float(values) => join(values),
            Value::Double(values) => join(values),
            Value::Rational(values) => values
                .iter()
                .map(|r| format!("{}/{}", r.numerator, r.denominator))
                .collect::<Vec<_>>()
                .join(", "),
            Value::SRational(values) => values
                .iter()
                .map(|r| format!("{}/{}", r.numerator, r.denominator))
                .collect::<Vec<_>>()
                .join(", "),
        };
        (!text.is_empty()).then_some(text)
    }

    /// First value of an unsigned integer field, widened to `u32`.
    pub fn first_u32(&self) -> Option<u32> {
        match self {
            Value::Short(values) => values.first().map(|v| u32::from(*v)),
            Value::Long(values) => values.first().copied(),
            Value::Byte(values) => values.first().map(|v| u32::from(*v)),
            _ => None,
        }
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn trim_trailing(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| *b != 0 && !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Single IFD entry (tag, type, count, value/offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub value_offset: u32,
    /// Position of the entry itself, needed to read inline values in file byte order.
    pub entry_offset: usize,
}

/// One parsed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    pub offset: usize,
    pub entries: Vec<IfdEntry>,
    /// Offset of the next directory in the chain, 0 when this is the last one.
    pub next: u32,
}

impl Ifd {
    pub fn entry(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }
}

/// Reader over a complete TIFF container (header included).
#[derive(Debug, Clone, Copy)]
pub struct TiffReader<'a> {
    data: &'a [u8],
    endian: Endian,
    ifd0_offset: u32,
}

impl<'a> TiffReader<'a> {
    /// Validate the header and remember byte order and the 0th IFD offset.
    pub fn new(data: &'a [u8]) -> Result<Self, ParseError> {
        if data.len() < TIFF_HEADER_LEN {
            return Err(ParseError::Truncated {
                what: "TIFF header",
                offset: 0,
            });
        }
        let endian = match [data[0], data[1]] {
            [0x49, 0x49] => Endian::Little,
            [0x4D, 0x4D] => Endian::Big,
            [a, b] => return Err(ParseError::ByteOrder(u16::from_be_bytes([a, b]))),
        };
        let magic = endian.read_u16(data, 2).unwrap_or_default();
        if magic != TIFF_MAGIC {
            return Err(ParseError::Magic(magic));
        }
        let ifd0_offset = endian.read_u32(data, 4).unwrap_or_default();
        Ok(Self {
            data,
            endian,
            ifd0_offset,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn ifd0_offset(&self) -> u32 {
        self.ifd0_offset
    }

    /// Read the directory starting at `offset`.
    pub fn read_ifd(&self, offset: u32) -> Result<Ifd, ParseError> {
        let offset = offset as usize;
        let count = self
            .endian
            .read_u16(self.data, offset)
            .ok_or(ParseError::Truncated {
                what: "IFD entry count",
                offset,
            })?;
        if count > MAX_IFD_ENTRIES {
            return Err(ParseError::EntryCount { offset, count });
        }

        let mut entries = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let entry_offset = offset + 2 + i * IFD_ENTRY_LEN;
            entries.push(self.read_entry(entry_offset)?);
        }

        let next_offset = offset + 2 + count as usize * IFD_ENTRY_LEN;
        // A missing next pointer is tolerated; plenty of writers drop it on the last IFD.
        let next = self
            .endian
            .read_u32(self.data, next_offset)
            .unwrap_or_default();

        Ok(Ifd {
            offset,
            entries,
            next,
        })
    }

    fn read_entry(&self, entry_offset: usize) -> Result<IfdEntry, ParseError> {
        let truncated = ParseError::Truncated {
            what: "IFD entry",
            offset: entry_offset,
        };
        let bo = self.endian;
        Ok(IfdEntry {
            tag: bo.read_u16(self.data, entry_offset).ok_or(truncated.clone())?,
            field_type: bo
                .read_u16(self.data, entry_offset + 2)
                .ok_or(truncated.clone())?,
            count: bo
                .read_u32(self.data, entry_offset + 4)
                .ok_or(truncated.clone())?,
            value_offset: bo.read_u32(self.data, entry_offset + 8).ok_or(truncated)?,
            entry_offset,
        })
    }

    /// Raw bytes backing an entry's value, inline or at its offset.
    fn value_bytes(&self, entry: &IfdEntry, field_type: FieldType) -> Result<&'a [u8], ParseError> {
        let out_of_bounds = ParseError::ValueOutOfBounds {
            tag: entry.tag,
            count: entry.count,
        };
        let total = field_type
            .unit_size()
            .checked_mul(entry.count as usize)
            .ok_or(out_of_bounds.clone())?;
        let start = if total <= 4 {
            entry.entry_offset + 8
        } else {
            entry.value_offset as usize
        };
        let end = start.checked_add(total).ok_or(out_of_bounds.clone())?;
        self.data.get(start..end).ok_or(out_of_bounds)
    }

    /// Decode the value of `entry` according to its declared type.
    pub fn value(&self, entry: &IfdEntry) -> Result<Value, ParseError> {
        let field_type = FieldType::from_u16(entry.field_type).ok_or(ParseError::FieldType {
            tag: entry.tag,
            field_type: entry.field_type,
        })?;
        let raw = self.value_bytes(entry, field_type)?;
        let bo = self.endian;
        let unit = field_type.unit_size();
        let chunks = raw.chunks_exact(unit);

        // Every chunk has exactly `unit` bytes, so the reads below cannot fail.
        let u16_at = |c: &[u8]| bo.read_u16(c, 0).unwrap_or_default();
        let u32_at = |c: &[u8], at: usize| bo.read_u32(c, at).unwrap_or_default();

        Ok(match field_type {
            FieldType::Byte => Value::Byte(raw.to_vec()),
            FieldType::Ascii => Value::Ascii(raw.to_vec()),
            FieldType::Undefined => Value::Undefined(raw.to_vec()),
            FieldType::SByte => Value::SByte(raw.iter().map(|b| *b as i8).collect()),
            FieldType::Short => Value::Short(chunks.map(u16_at).collect()),
            FieldType::SShort => Value::SShort(chunks.map(|c| u16_at(c) as i16).collect()),
            FieldType::Long => Value::Long(chunks.map(|c| u32_at(c, 0)).collect()),
            FieldType::SLong => Value::SLong(chunks.map(|c| u32_at(c, 0) as i32).collect()),
            FieldType::Float => {
                Value::Float(chunks.map(|c| f32::from_bits(u32_at(c, 0))).collect())
            }
            FieldType::Double => Value::Double(
                chunks
                    .map(|c| f64::from_bits(bo.read_u64(c, 0).unwrap_or_default()))
                    .collect(),
            ),
            FieldType::Rational => Value::Rational(
                chunks
                    .map(|c| Rational::new(u32_at(c, 0), u32_at(c, 4)))
                    .collect(),
            ),
            FieldType::SRational => Value::SRational(
                chunks
                    .map(|c| SRational {
                        numerator: u32_at(c, 0) as i32,
                        denominator: u32_at(c, 4) as i32,
                    })
                    .collect(),
            ),
        })
    }
}
