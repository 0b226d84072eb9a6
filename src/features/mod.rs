//! Independent analyses over the raw image bytes.
pub mod data_url;
pub mod ela;
pub mod error;
pub mod hashing;
