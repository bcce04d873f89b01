//! Export error types.

use thiserror::Error;

use cmux_media::MediaError;
use cmux_models::RangeIssue;

pub type ExportResult<T> = Result<T, ExportError>;

/// Everything that can end an export run.
///
/// All variants are caught at the orchestrator boundary and rendered into
/// one user-facing message; none crash the process, and there is no
/// automatic retry anywhere.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No clips are marked for export")]
    NothingToExport,

    #[error("Clip \"{name}\" cannot be exported: {issue}")]
    InvalidClip { name: String, issue: RangeIssue },

    #[error("Transcoding engine failed to initialize: {0}")]
    EngineInit(#[source] MediaError),

    #[error("Transcoding \"{clip}\" failed: {source}")]
    Transcode {
        clip: String,
        #[source]
        source: MediaError,
    },

    #[error("Concatenation failed: {0}")]
    Concat(#[source] MediaError),

    #[error("Unexpected output format: {0}")]
    OutputFormat(String),

    #[error("Artifact storage failed: {0}")]
    Storage(#[from] MediaError),
}
