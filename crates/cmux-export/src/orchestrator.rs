//! The export orchestrator: sequences per-clip transcodes, the concat
//! pass, read-back, and cleanup.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info};

use chrono::{DateTime, Utc};
use cmux_media::{
    fit_filter, FfmpegCommand, FfmpegProgress, ProgressCallback, ResourceHandle, ResourceStore,
    TranscodeEngine,
};
use cmux_models::{AspectPreset, EncodingConfig, FitMode};
use cmux_timeline::ClipStore;

use crate::error::{ExportError, ExportResult};
use crate::progress::{ExportProgress, ExportStage, ProgressEstimator};
use crate::session::ExportSession;

/// Output geometry and encoding for one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub preset: AspectPreset,
    pub fit: FitMode,
    pub encoding: EncodingConfig,
}

/// Summary of a completed export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub session_id: String,
    pub file_name: String,
    pub clip_count: usize,
    pub output_seconds: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives the engine through one export run at a time.
///
/// Transcodes are strictly sequential in snapshot order to bound peak
/// memory; only duration probing (at import) runs concurrently. `export`
/// takes `&mut self`, so a second run on the same orchestrator cannot
/// start while one is in flight.
pub struct ExportOrchestrator<E> {
    engine: E,
    resources: ResourceStore,
    progress: Arc<watch::Sender<ExportProgress>>,
    output: Option<ResourceHandle>,
}

impl<E: TranscodeEngine> ExportOrchestrator<E> {
    pub fn new(engine: E, resources: ResourceStore) -> Self {
        let (tx, _) = watch::channel(ExportProgress::default());
        Self {
            engine,
            resources,
            progress: Arc::new(tx),
            output: None,
        }
    }

    /// Watch the stage label and overall percentage of the current run.
    pub fn subscribe(&self) -> watch::Receiver<ExportProgress> {
        self.progress.subscribe()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The last completed run's output, if any.
    pub fn output(&self) -> Option<&ResourceHandle> {
        self.output.as_ref()
    }

    /// Transfer ownership of the output to the caller.
    pub fn take_output(&mut self) -> Option<ResourceHandle> {
        self.output.take()
    }

    /// Run one export over the clips currently included in `store`.
    ///
    /// The included list is snapshotted up front; mutating the store
    /// mid-export does not change the output. Cleanup of engine artifacts
    /// runs whether the run succeeds or fails.
    pub async fn export(
        &mut self,
        store: &ClipStore,
        options: &ExportOptions,
    ) -> ExportResult<ExportReport> {
        // Guard failures reject the run outright: no state transition, no
        // engine call, nothing to clean up.
        let mut session = ExportSession::plan(store)?;

        if let Some(previous) = self.output.take() {
            previous.release();
        }

        let estimator = Arc::new(Mutex::new(ProgressEstimator::new(session.clips.len())));
        let result = self.run(&mut session, options, &estimator).await;

        if let Err(err) = &result {
            let percent = lock(&estimator).current();
            self.publish(ExportStage::Errored { message: err.to_string() }, percent);
        }

        self.cleanup(&session).await;
        result
    }

    async fn run(
        &mut self,
        session: &mut ExportSession,
        options: &ExportOptions,
        estimator: &Arc<Mutex<ProgressEstimator>>,
    ) -> ExportResult<ExportReport> {
        info!(
            session = %session.id,
            clips = session.clips.len(),
            preset = %options.preset,
            fit = %options.fit,
            "starting export"
        );

        self.publish(ExportStage::LoadingEngine, lock(estimator).update(0.0));
        self.engine.ensure_ready().await.map_err(ExportError::EngineInit)?;

        let total = session.clips.len();
        for index in 0..total {
            let planned = session.clips[index].clone();
            let stage = ExportStage::ProcessingClip { index: index + 1, total };
            {
                let mut est = lock(estimator);
                est.begin_transcode(index);
                let percent = est.update(0.0);
                drop(est);
                self.publish(stage.clone(), percent);
            }

            session.record_artifact(&planned.input_name);
            session.record_artifact(&planned.output_name);

            self.engine
                .write_input(&planned.input_name, &planned.media)
                .await
                .map_err(|e| ExportError::Transcode { clip: planned.name.clone(), source: e })?;

            let cmd = FfmpegCommand::new(planned.input_name.as_str(), planned.output_name.as_str())
                .seek(planned.range.start)
                .duration(planned.range.seconds())
                .video_filter(fit_filter(options.preset, options.fit))
                .encoding(&options.encoding);

            let on_progress = self.progress_callback(stage, planned.range.seconds(), estimator);
            self.engine
                .run(&cmd, on_progress)
                .await
                .map_err(|e| ExportError::Transcode { clip: planned.name.clone(), source: e })?;
            info!(session = %session.id, clip = %planned.name, "clip transcoded");
        }

        let manifest_name = session.manifest_name.clone();
        let output_name = session.output_name.clone();
        {
            let mut est = lock(estimator);
            est.begin_concat();
            let percent = est.update(0.0);
            drop(est);
            self.publish(ExportStage::Concatenating, percent);
        }

        session.record_artifact(&manifest_name);
        session.record_artifact(&output_name);

        self.engine
            .write_input(&manifest_name, session.concat_manifest().as_bytes())
            .await
            .map_err(ExportError::Concat)?;

        // Re-encode rather than stream-copy so mismatched segments always
        // concatenate into a playable file.
        let cmd = FfmpegCommand::new(manifest_name.as_str(), output_name.as_str())
            .concat_demuxer()
            .encoding(&options.encoding)
            .faststart();

        let on_progress =
            self.progress_callback(ExportStage::Concatenating, session.total_seconds(), estimator);
        self.engine.run(&cmd, on_progress).await.map_err(ExportError::Concat)?;

        let bytes = self.engine.read_artifact(&output_name).await?;
        if !looks_like_mp4(&bytes) {
            return Err(ExportError::OutputFormat(format!(
                "engine returned {} bytes that are not an MP4 container",
                bytes.len()
            )));
        }

        let file_name = format!("export_{}.mp4", options.preset);
        let handle = self.resources.create(&file_name, &bytes)?;
        self.output = Some(handle);

        let percent = lock(estimator).finish();
        self.publish(ExportStage::Complete, percent);
        info!(session = %session.id, file = %file_name, "export complete");

        Ok(ExportReport {
            session_id: session.id.clone(),
            file_name,
            clip_count: total,
            output_seconds: session.total_seconds(),
            started_at: session.started_at,
            finished_at: Utc::now(),
        })
    }

    /// Best-effort removal of every recorded artifact. Deletion failures
    /// are logged and swallowed, never surfaced.
    async fn cleanup(&self, session: &ExportSession) {
        for name in &session.artifacts {
            if let Err(e) = self.engine.remove_artifact(name).await {
                debug!(session = %session.id, artifact = %name, "cleanup skipped: {e}");
            }
        }
    }

    fn publish(&self, stage: ExportStage, percent: u8) {
        self.progress.send_replace(ExportProgress { stage, percent });
    }

    fn progress_callback(
        &self,
        stage: ExportStage,
        expected_seconds: f64,
        estimator: &Arc<Mutex<ProgressEstimator>>,
    ) -> ProgressCallback {
        let estimator = Arc::clone(estimator);
        let progress = Arc::clone(&self.progress);
        Box::new(move |p: FfmpegProgress| {
            let percent = lock(&estimator).update(p.fraction(expected_seconds));
            progress.send_replace(ExportProgress { stage: stage.clone(), percent });
        })
    }
}

fn lock(estimator: &Mutex<ProgressEstimator>) -> MutexGuard<'_, ProgressEstimator> {
    estimator.lock().unwrap_or_else(PoisonError::into_inner)
}

/// MP4 files open with a box header whose type is `ftyp`.
fn looks_like_mp4(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[4..8] == b"ftyp"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_mp4() {
        let mut mp4 = vec![0, 0, 0, 32];
        mp4.extend_from_slice(b"ftypisom");
        mp4.extend_from_slice(&[0; 8]);
        assert!(looks_like_mp4(&mp4));

        assert!(!looks_like_mp4(b"RIFF....WEBP"));
        assert!(!looks_like_mp4(b""));
    }
}
