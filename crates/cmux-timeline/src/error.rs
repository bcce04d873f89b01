//! Timeline error types.

use thiserror::Error;

use cmux_media::MediaError;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("Import rejected: {requested} clips would exceed the session cap of {max}")]
    TooManyClips { requested: usize, max: usize },

    #[error("Failed to probe \"{name}\": {source}")]
    Probe {
        name: String,
        #[source]
        source: MediaError,
    },
}
