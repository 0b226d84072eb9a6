use thiserror::Error;

/// A malformed piece of the metadata container. Always scoped to the directory, entry
/// or coordinate it was raised for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Container too short for {what} at offset {offset}")]
    Truncated { what: &'static str, offset: usize },

    #[error("Unknown byte order marker {0:#06x}")]
    ByteOrder(u16),

    #[error("Bad TIFF magic number {0}")]
    Magic(u16),

    #[error("Directory at offset {offset} claims {count} entries")]
    EntryCount { offset: usize, count: u16 },

    #[error("Unknown field type {field_type} for tag {tag:#06x}")]
    FieldType { tag: u16, field_type: u16 },

    #[error("Value of tag {tag:#06x} does not fit in the container ({count} values)")]
    ValueOutOfBounds { tag: u16, count: u32 },

    #[error("Tag {tag:#06x} has unexpected type, expected {expected}")]
    WrongType { tag: u16, expected: &'static str },

    #[error("Tag {tag:#06x} holds {found} values, expected {expected}")]
    WrongCount { tag: u16, expected: usize, found: usize },

    #[error("Zero denominator in tag {tag:#06x}")]
    ZeroDenominator { tag: u16 },

    #[error("Missing tag {0:#06x}")]
    MissingTag(u16),

    #[error("Unknown hemisphere reference {0:?}")]
    Reference(String),
}
