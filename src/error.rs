use thiserror::Error;

/// Whole-request failures. Everything scoped to a single analysis is reported inside
/// [`crate::AnalysisRecord`] instead.
#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("Could not read image input: {0}")]
    Input(#[from] std::io::Error),

    #[error("Analysis was cancelled")]
    Cancelled,

    #[error("Analysis task failed to complete")]
    Join(#[from] tokio::task::JoinError),
}
