//! Decoding of the embedded TIFF/Exif metadata container.
pub mod container;
mod error;
pub mod gps;
mod logic;
pub mod structs;
pub mod tags;
pub mod thumbnail;
pub mod tiff;

pub use error::ParseError;
pub use logic::decode;
