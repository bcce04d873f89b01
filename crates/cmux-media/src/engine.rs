//! The transcoding engine boundary.
//!
//! The export pipeline drives the engine through [`TranscodeEngine`]: it
//! writes inputs into the engine's working storage, invokes it with an
//! argument list per operation, reads artifacts back, and removes them.
//! [`FfmpegEngine`] is the production implementation over the system
//! `ffmpeg` binary, with process-wide one-time initialization.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::progress::ProgressCallback;

/// External transcoding engine handle.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Initialize the engine if it is not ready yet. Idempotent.
    async fn ensure_ready(&self) -> MediaResult<()>;

    /// Write `bytes` into the engine's working storage under `name`.
    async fn write_input(&self, name: &str, bytes: &[u8]) -> MediaResult<()>;

    /// Invoke the engine with one command, forwarding fractional progress.
    async fn run(&self, cmd: &FfmpegCommand, on_progress: ProgressCallback) -> MediaResult<()>;

    /// Read an artifact back out of the working storage.
    async fn read_artifact(&self, name: &str) -> MediaResult<Vec<u8>>;

    /// Remove an artifact from the working storage.
    async fn remove_artifact(&self, name: &str) -> MediaResult<()>;
}

/// Resolved binaries plus the working directory all artifact names live in.
struct EngineState {
    ffmpeg: PathBuf,
    workdir: PathBuf,
    // The working directory is removed when the process exits cleanly.
    _tmp: tempfile::TempDir,
}

static ENGINE_STATE: OnceCell<EngineState> = OnceCell::const_new();

impl EngineState {
    fn init() -> MediaResult<Self> {
        let ffmpeg = which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
        // ffprobe ships alongside ffmpeg; resolving it here surfaces a broken
        // install before the first probe call rather than mid-import.
        which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

        let tmp = tempfile::Builder::new().prefix("cmux-engine").tempdir()?;
        info!(
            ffmpeg = %ffmpeg.display(),
            workdir = %tmp.path().display(),
            "transcoding engine initialized"
        );
        Ok(Self {
            ffmpeg,
            workdir: tmp.path().to_path_buf(),
            _tmp: tmp,
        })
    }

    async fn get() -> MediaResult<&'static EngineState> {
        ENGINE_STATE.get_or_try_init(|| async { Self::init() }).await
    }
}

/// [`TranscodeEngine`] backed by the system `ffmpeg` binary.
///
/// The underlying state (binary paths, working directory) is initialized
/// lazily, exactly once per process, and shared by every handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEngine;

impl FfmpegEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Artifact names are bare file names inside the working directory; anything
/// path-like is rejected before it reaches the filesystem.
fn validate_name(name: &str) -> MediaResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(MediaError::InvalidArtifactName(name.to_string()));
    }
    Ok(())
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn ensure_ready(&self) -> MediaResult<()> {
        EngineState::get().await.map(|_| ())
    }

    async fn write_input(&self, name: &str, bytes: &[u8]) -> MediaResult<()> {
        validate_name(name)?;
        let state = EngineState::get().await?;
        tokio::fs::write(state.workdir.join(name), bytes).await?;
        Ok(())
    }

    async fn run(&self, cmd: &FfmpegCommand, on_progress: ProgressCallback) -> MediaResult<()> {
        let state = EngineState::get().await?;
        FfmpegRunner::new(&state.ffmpeg)
            .current_dir(&state.workdir)
            .run(cmd, on_progress)
            .await
    }

    async fn read_artifact(&self, name: &str) -> MediaResult<Vec<u8>> {
        validate_name(name)?;
        let state = EngineState::get().await?;
        Ok(tokio::fs::read(state.workdir.join(name)).await?)
    }

    async fn remove_artifact(&self, name: &str) -> MediaResult<()> {
        validate_name(name)?;
        let state = EngineState::get().await?;
        tokio::fs::remove_file(state.workdir.join(name)).await?;
        Ok(())
    }
}
