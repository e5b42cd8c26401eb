use thiserror::Error;

use crate::extractor::ExtractError;

/// Errors raised by the job lifecycle.
///
/// `Validation` and `NotFound` are returned synchronously to callers.
/// `Policy` and `Extraction` only ever end up recorded on a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("duration {duration}s exceeds the {limit}s limit")]
    Policy { duration: f64, limit: u64 },

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
