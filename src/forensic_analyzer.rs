use crate::ForensicsError;
use crate::exif::{self, structs::ExifAnalysis};
use crate::features::ela::{self, DEFAULT_AMPLIFICATION, DEFAULT_QUALITY, ElaResult};
use crate::features::hashing::{FileHashes, hash_bytes};
use crate::structs::AnalysisRecord;
use bon::bon;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};

/// The entry point of the analysis pipeline.
///
/// Hashing, metadata decoding and error level analysis each read the same immutable
/// buffer and are merged into one [`AnalysisRecord`]. A failure in one of them is
/// recorded in its own field and never blanks out the others.
///
/// Use the builder to construct an instance:
/// ```rust
/// # use image_forensics::ForensicAnalyzer;
/// let analyzer = ForensicAnalyzer::builder()
///     .ela_quality(95) // Optionally configure parameters
///     .build();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ForensicAnalyzer {
    ela_quality: u8,
    ela_amplification: u8,
    parallel: bool,
}

impl Default for ForensicAnalyzer {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn stage<T>(
    abort: &AtomicBool,
    name: &'static str,
    run: impl FnOnce() -> T,
) -> Result<T, ForensicsError> {
    if abort.load(Ordering::Relaxed) {
        debug!(stage = name, "Aborting before stage");
        return Err(ForensicsError::Cancelled);
    }
    Ok(run())
}

#[bon]
impl ForensicAnalyzer {
    /// Constructs a `ForensicAnalyzer` via a builder pattern.
    ///
    /// # Builder Arguments
    ///
    /// * `ela_quality: u8` - (Default: `90`) JPEG quality of the ELA recompression step. Clamped to `1..=100`.
    /// * `ela_amplification: u8` - (Default: `15`) Factor applied to the difference values before they are clamped to 255.
    /// * `parallel: bool` - (Default: `true`) Run the three analyses concurrently on the rayon pool. The result is identical either way.
    #[builder]
    pub fn new(
        #[builder(default = DEFAULT_QUALITY)] ela_quality: u8,
        #[builder(default = DEFAULT_AMPLIFICATION)] ela_amplification: u8,
        #[builder(default = true)] parallel: bool,
    ) -> Self {
        Self {
            ela_quality,
            ela_amplification,
            parallel,
        }
    }

    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        if self.parallel {
            rayon::join(a, b)
        } else {
            (a(), b())
        }
    }

    fn hash(bytes: &[u8]) -> FileHashes {
        let hashes = hash_bytes(bytes);
        debug!(sha256 = %hashes.sha256, "Computed hashes");
        hashes
    }

    fn ela(&self, bytes: &[u8]) -> ElaResult {
        ela::analyze(bytes, self.ela_quality, self.ela_amplification)
    }

    /// Analyzes an in-memory image.
    ///
    /// Always returns a record; degraded analyses carry their reason in their own field.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use image_forensics::ForensicAnalyzer;
    /// let bytes = std::fs::read("photo.jpg").unwrap();
    /// let record = ForensicAnalyzer::default().analyze_bytes("photo.jpg", &bytes);
    /// println!("SHA-256: {}", record.hashes.sha256);
    /// ```
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn analyze_bytes(&self, filename: &str, bytes: &[u8]) -> AnalysisRecord {
        let (hashes, (exif, ela)): (FileHashes, (ExifAnalysis, ElaResult)) = self.join(
            || Self::hash(bytes),
            || self.join(|| exif::decode(bytes), || self.ela(bytes)),
        );
        AnalysisRecord::new(filename.to_string(), hashes, exif, ela)
    }

    /// Like [`Self::analyze_bytes`], checking `abort` before every stage.
    ///
    /// # Errors
    ///
    /// [`ForensicsError::Cancelled`] once `abort` has been raised. Buffers of stages that
    /// already ran are dropped.
    #[instrument(skip(self, bytes, abort), fields(len = bytes.len()))]
    pub fn analyze_bytes_with_abort(
        &self,
        filename: &str,
        bytes: &[u8],
        abort: &AtomicBool,
    ) -> Result<AnalysisRecord, ForensicsError> {
        let (hashes, (exif, ela)) = self.join(
            || stage(abort, "hash", || Self::hash(bytes)),
            || {
                self.join(
                    || stage(abort, "exif", || exif::decode(bytes)),
                    || stage(abort, "ela", || self.ela(bytes)),
                )
            },
        );
        let (hashes, exif, ela) = (hashes?, exif?, ela?);
        stage(abort, "assemble", || {
            AnalysisRecord::new(filename.to_string(), hashes, exif, ela)
        })
    }

    /// Reads and analyzes a file.
    ///
    /// The record's `filename` is the final component of `path`. The CPU-bound work runs
    /// on tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// * [`ForensicsError::Input`]: the file cannot be read. This is the only failure that
    ///   aborts the whole analysis.
    /// * [`ForensicsError::Join`]: the blocking task panicked.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisRecord, ForensicsError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let analyzer = *self;
        let record =
            tokio::task::spawn_blocking(move || analyzer.analyze_bytes(&filename, &bytes)).await?;
        Ok(record)
    }
}
