use crate::ForensicsError;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Content fingerprints of the original, unprocessed bytes. Lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileHashes {
    #[serde(rename = "MD5")]
    pub md5: String,
    #[serde(rename = "SHA-1")]
    pub sha1: String,
    #[serde(rename = "SHA-256")]
    pub sha256: String,
}

/// Feeds every digest from the same chunk so the input is read only once.
struct Hashers {
    md5: md5::Context,
    sha1: Sha1,
    sha256: Sha256,
}

impl Hashers {
    fn new() -> Self {
        Self {
            md5: md5::Context::new(),
            sha1: Sha1::new(),
            sha256: Sha256::new(),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        self.md5.consume(chunk);
        self.sha1.update(chunk);
        self.sha256.update(chunk);
    }

    fn finalize(self) -> FileHashes {
        FileHashes {
            md5: format!("{:x}", self.md5.compute()),
            sha1: hex::encode(self.sha1.finalize()),
            sha256: hex::encode(self.sha256.finalize()),
        }
    }
}

/// Computes MD5, SHA-1 and SHA-256 of an in-memory buffer.
pub fn hash_bytes(bytes: &[u8]) -> FileHashes {
    let mut hashers = Hashers::new();
    for chunk in bytes.chunks(CHUNK_SIZE) {
        hashers.update(chunk);
    }
    hashers.finalize()
}

/// Streaming variant of [`hash_bytes`].
///
/// # Errors
///
/// Returns [`ForensicsError::Input`] when the reader fails.
pub fn hash_reader<R: Read>(mut reader: R) -> Result<FileHashes, ForensicsError> {
    let mut hashers = Hashers::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hashers.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(hashers.finalize())
}

/// Computes the hashes of a file without loading it into memory at once.
pub fn hash_file(path: &Path) -> Result<FileHashes, ForensicsError> {
    hash_reader(File::open(path)?)
}
