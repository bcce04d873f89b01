//! Per-run export session state.
//!
//! A session snapshots the included clips at the moment export starts, so
//! the output order is immune to store mutation mid-export, and keeps the
//! ledger of engine artifacts for cleanup.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use cmux_media::extension_hint;
use cmux_models::{sanitize_base_name, EffectiveRange};
use cmux_timeline::{effective_range, ClipStore};

use crate::error::{ExportError, ExportResult};

/// One clip of the session snapshot, with its engine artifact names.
#[derive(Debug, Clone)]
pub(crate) struct PlannedClip {
    pub name: String,
    pub media: Arc<[u8]>,
    pub range: EffectiveRange,
    pub input_name: String,
    pub output_name: String,
}

/// The transient state of one export run.
#[derive(Debug)]
pub(crate) struct ExportSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub clips: Vec<PlannedClip>,
    pub manifest_name: String,
    pub output_name: String,
    /// Every engine artifact created so far, recorded for cleanup.
    pub artifacts: Vec<String>,
}

impl ExportSession {
    /// Validate the store and snapshot the included clips.
    ///
    /// Rejects the run when nothing is included, or when any included
    /// clip's range is invalid; the first invalid clip in store order
    /// determines the reported error.
    pub fn plan(store: &ClipStore) -> ExportResult<Self> {
        let included: Vec<_> = store.included().collect();
        if included.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        for clip in &included {
            if let Some(issue) = effective_range(clip).issue {
                return Err(ExportError::InvalidClip {
                    name: clip.name.clone(),
                    issue,
                });
            }
        }

        let id = short_id();
        let clips = included
            .iter()
            .enumerate()
            .map(|(i, clip)| {
                let mut base = sanitize_base_name(&clip.name);
                if base.is_empty() {
                    base = format!("clip_{:02}", i + 1);
                }
                let ext = extension_hint(&clip.name);
                PlannedClip {
                    name: clip.name.clone(),
                    media: Arc::clone(&clip.media),
                    range: effective_range(clip),
                    input_name: format!("{id}_src_{i:02}_{base}.{ext}"),
                    output_name: format!("{id}_seg_{i:02}_{base}.mp4"),
                }
            })
            .collect();

        Ok(Self {
            manifest_name: format!("{id}_concat.txt"),
            output_name: format!("{id}_out.mp4"),
            id,
            started_at: Utc::now(),
            clips,
            artifacts: Vec::new(),
        })
    }

    pub fn record_artifact(&mut self, name: &str) {
        self.artifacts.push(name.to_string());
    }

    /// Concat demuxer manifest: one `file '<segment>'` line per clip, in
    /// snapshot order.
    pub fn concat_manifest(&self) -> String {
        let mut manifest = String::new();
        for clip in &self.clips {
            manifest.push_str(&format!("file '{}'\n", clip.output_name));
        }
        manifest
    }

    /// Expected duration of the final output in seconds.
    pub fn total_seconds(&self) -> f64 {
        self.clips.iter().map(|c| c.range.seconds()).sum()
    }
}

fn short_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
