//! # Image Forensics
//!
//! Derive tamper-evidence signals from image files without trusting what the file
//! claims about itself.
//!
//! ## Key Features
//!
//! - **Hashes**: MD5, SHA-1 and SHA-256 fingerprints of the untouched bytes.
//! - **Exif Metadata**: Camera make and model, software, capture timestamps and pixel dimensions, decoded straight from the embedded TIFF directories.
//! - **GPS Location**: Decimal latitude and longitude from the GPS directory.
//! - **Embedded Thumbnail**: The preview stored in the 1st IFD, re-encoded as PNG so it can be compared with the main image.
//! - **Error Level Analysis**: A recompression-difference map highlighting regions with a different compression history.
//!
//! Every analysis degrades on its own. A corrupt thumbnail or an undecodable GPS block
//! is reported in its field of the [`AnalysisRecord`] while everything else is still
//! filled in.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use image_forensics::ForensicAnalyzer;
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let analyzer = ForensicAnalyzer::builder().build();
//!     let record = analyzer.analyze_file(Path::new("photo.jpg")).await?;
//!
//!     println!("SHA-256: {}", record.hashes.sha256);
//!     println!("GPS: {:?}", record.gps.coordinate());
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!
//!     Ok(())
//! }
//! ```

mod error;
pub mod exif;
pub mod features;
pub mod forensic_analyzer;
pub mod structs;
pub mod utils;

#[cfg(test)]
mod fixtures;

pub use error::ForensicsError;
pub use forensic_analyzer::ForensicAnalyzer;
pub use structs::AnalysisRecord;
