//! The clip store: an ordered clip collection whose order is export order.

use futures::future::try_join_all;
use std::fmt;
use tracing::debug;

use cmux_media::{DurationProbe, ResourceHandle};
use cmux_models::{MAX_CLIPS_PER_SESSION, WARN_INCLUDED_CLIPS, WARN_TOTAL_MEDIA_BYTES};

use crate::clip::{Clip, ClipId, ClipSource};
use crate::error::{TimelineError, TimelineResult};

/// Direction for [`ClipStore::move_clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Toward the front of the export order.
    Earlier,
    /// Toward the back of the export order.
    Later,
}

/// Non-fatal conditions surfaced before an export. Never block anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportWarning {
    ManyClips { included: usize },
    LargePayload { bytes: u64 },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportWarning::ManyClips { included } => write!(
                f,
                "{included} clips are included; exports this large can take a while"
            ),
            ExportWarning::LargePayload { bytes } => write!(
                f,
                "included clips total {} MiB; memory use may be significant",
                bytes / (1024 * 1024)
            ),
        }
    }
}

/// Owns the ordered sequence of clips. All mutation goes through the
/// methods below; derived views are pure queries with no caches.
#[derive(Default)]
pub struct ClipStore {
    clips: Vec<Clip>,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a batch of sources, probing all durations concurrently.
    ///
    /// All-or-nothing: the batch is rejected wholesale when it would push
    /// the session past [`MAX_CLIPS_PER_SESSION`], and any single probe
    /// failure aborts the entire import. The store is unchanged on error.
    pub async fn import<P>(
        &mut self,
        sources: Vec<ClipSource>,
        probe: &P,
        default_outro: f64,
    ) -> TimelineResult<Vec<ClipId>>
    where
        P: DurationProbe + ?Sized,
    {
        let requested = self.clips.len() + sources.len();
        if requested > MAX_CLIPS_PER_SESSION {
            return Err(TimelineError::TooManyClips {
                requested,
                max: MAX_CLIPS_PER_SESSION,
            });
        }

        // Probing is independent per source and cheap relative to
        // transcoding, so one batch probes concurrently.
        let durations = try_join_all(sources.iter().map(|source| async move {
            probe
                .probe_duration(&source.name, &source.media)
                .await
                .map_err(|e| TimelineError::Probe {
                    name: source.name.clone(),
                    source: e,
                })
        }))
        .await?;

        let mut ids = Vec::with_capacity(sources.len());
        for (source, duration) in sources.into_iter().zip(durations) {
            debug!(clip = %source.name, duration, "imported clip");
            let clip = Clip::from_source(source, duration, default_outro);
            ids.push(clip.id.clone());
            self.clips.push(clip);
        }
        Ok(ids)
    }

    /// Apply a transformation to exactly one clip. No-op when the id is
    /// not present.
    pub fn update(&mut self, id: &ClipId, f: impl FnOnce(&mut Clip)) {
        if let Some(clip) = self.clips.iter_mut().find(|c| &c.id == id) {
            f(clip);
        }
    }

    /// Apply a transformation to every clip with `selected == true`.
    pub fn batch_update(&mut self, f: impl Fn(&mut Clip)) {
        for clip in self.clips.iter_mut().filter(|c| c.selected) {
            f(clip);
        }
    }

    /// Set the `selected` flag on every clip.
    pub fn set_all_selected(&mut self, selected: bool) {
        for clip in &mut self.clips {
            clip.selected = selected;
        }
    }

    /// Swap the clip at `index` with its neighbor. No-op at either
    /// boundary. The only reordering primitive.
    pub fn move_clip(&mut self, index: usize, direction: MoveDirection) {
        if index >= self.clips.len() {
            return;
        }
        let neighbor = match direction {
            MoveDirection::Earlier => index.checked_sub(1),
            MoveDirection::Later => index.checked_add(1).filter(|&i| i < self.clips.len()),
        };
        if let Some(neighbor) = neighbor {
            self.clips.swap(index, neighbor);
        }
    }

    /// Attach or replace a clip's preview resource. The prior handle, if
    /// any, is dropped and thereby released.
    pub fn set_preview(&mut self, id: &ClipId, preview: ResourceHandle) {
        self.update(id, |clip| {
            clip.preview = Some(preview);
        });
    }

    /// All clips, in export order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn get(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| &c.id == id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clips participating in the export, order preserved.
    pub fn included(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(|c| c.include)
    }

    pub fn selected_count(&self) -> usize {
        self.clips.iter().filter(|c| c.selected).count()
    }

    /// Non-fatal warnings for the current included set.
    pub fn warnings(&self) -> Vec<ExportWarning> {
        let mut warnings = Vec::new();
        let included = self.included().count();
        if included > WARN_INCLUDED_CLIPS {
            warnings.push(ExportWarning::ManyClips { included });
        }
        let bytes: u64 = self.included().map(Clip::media_len).sum();
        if bytes > WARN_TOTAL_MEDIA_BYTES {
            warnings.push(ExportWarning::LargePayload { bytes });
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cmux_media::{MediaError, MediaResult};
    use std::collections::HashMap;

    /// Probe stub returning canned durations; names ending in `.bad` fail.
    struct StubProbe {
        durations: HashMap<String, f64>,
    }

    impl StubProbe {
        fn new(entries: &[(&str, f64)]) -> Self {
            Self {
                durations: entries.iter().map(|(n, d)| (n.to_string(), *d)).collect(),
            }
        }
    }

    #[async_trait]
    impl DurationProbe for StubProbe {
        async fn probe_duration(&self, name: &str, _media: &[u8]) -> MediaResult<f64> {
            if name.ends_with(".bad") {
                return Err(MediaError::ffprobe_failed("unreadable container", None));
            }
            Ok(self.durations.get(name).copied().unwrap_or(10.0))
        }
    }

    fn source(name: &str) -> ClipSource {
        ClipSource::new(name, vec![0u8; 4])
    }

    async fn store_with(names: &[&str]) -> ClipStore {
        let probe = StubProbe::new(&[]);
        let mut store = ClipStore::new();
        store
            .import(names.iter().map(|n| source(n)).collect(), &probe, 0.0)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_import_probes_and_defaults() {
        let probe = StubProbe::new(&[("a.mp4", 20.0)]);
        let mut store = ClipStore::new();
        let ids = store.import(vec![source("a.mp4")], &probe, 2.5).await.unwrap();

        assert_eq!(ids.len(), 1);
        let clip = store.get(&ids[0]).unwrap();
        assert_eq!(clip.duration, 20.0);
        assert_eq!(clip.trim_end, 20.0);
        assert_eq!(clip.outro_seconds, 2.5);
    }

    #[tokio::test]
    async fn test_import_rejects_over_cap() {
        let probe = StubProbe::new(&[]);
        let mut store = store_with(&["a.mp4"]).await;

        let batch: Vec<_> = (0..MAX_CLIPS_PER_SESSION).map(|i| source(&format!("{i}.mp4"))).collect();
        let err = store.import(batch, &probe, 0.0).await.unwrap_err();

        assert!(matches!(err, TimelineError::TooManyClips { .. }));
        assert_eq!(store.len(), 1, "store must be unchanged on rejection");
    }

    #[tokio::test]
    async fn test_probe_failure_aborts_whole_batch() {
        let probe = StubProbe::new(&[]);
        let mut store = ClipStore::new();

        let err = store
            .import(vec![source("ok.mp4"), source("broken.bad")], &probe, 0.0)
            .await
            .unwrap_err();

        assert!(matches!(err, TimelineError::Probe { ref name, .. } if name == "broken.bad"));
        assert!(store.is_empty(), "partial imports must not survive");
    }

    #[tokio::test]
    async fn test_update_targets_one_clip() {
        let mut store = store_with(&["a.mp4", "b.mp4"]).await;
        let id = store.clips()[0].id.clone();

        store.update(&id, |c| c.include = false);

        assert!(!store.clips()[0].include);
        assert!(store.clips()[1].include);

        // Unknown id is a no-op
        store.update(&ClipId::new(), |c| c.include = false);
        assert!(store.clips()[1].include);
    }

    #[tokio::test]
    async fn test_batch_update_touches_only_selected() {
        let mut store = store_with(&["a.mp4", "b.mp4", "c.mp4"]).await;
        let id = store.clips()[1].id.clone();
        store.update(&id, |c| c.selected = true);

        store.batch_update(|c| c.remove_outro = true);

        assert!(!store.clips()[0].remove_outro);
        assert!(store.clips()[1].remove_outro);
        assert!(!store.clips()[2].remove_outro);
        assert_eq!(store.selected_count(), 1);
    }

    #[tokio::test]
    async fn test_set_all_selected() {
        let mut store = store_with(&["a.mp4", "b.mp4"]).await;
        store.set_all_selected(true);
        assert_eq!(store.selected_count(), 2);
        store.set_all_selected(false);
        assert_eq!(store.selected_count(), 0);
    }

    #[tokio::test]
    async fn test_move_swaps_neighbors() {
        let mut store = store_with(&["a.mp4", "b.mp4", "c.mp4"]).await;

        store.move_clip(0, MoveDirection::Later);
        let names: Vec<_> = store.clips().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b.mp4", "a.mp4", "c.mp4"]);

        // Moving back restores the original order
        store.move_clip(1, MoveDirection::Earlier);
        let names: Vec<_> = store.clips().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a.mp4", "b.mp4", "c.mp4"]);
    }

    #[tokio::test]
    async fn test_move_is_noop_at_boundaries() {
        let mut store = store_with(&["a.mp4", "b.mp4"]).await;

        store.move_clip(0, MoveDirection::Earlier);
        store.move_clip(1, MoveDirection::Later);
        store.move_clip(7, MoveDirection::Earlier);

        let names: Vec<_> = store.clips().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a.mp4", "b.mp4"]);
    }

    #[tokio::test]
    async fn test_included_preserves_order() {
        let mut store = store_with(&["a.mp4", "b.mp4", "c.mp4"]).await;
        let id = store.clips()[1].id.clone();
        store.update(&id, |c| c.include = false);

        let names: Vec<_> = store.included().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a.mp4", "c.mp4"]);
    }

    #[tokio::test]
    async fn test_warnings_thresholds() {
        let mut store = store_with(&["a.mp4"]).await;
        assert!(store.warnings().is_empty());

        let names: Vec<String> = (0..WARN_INCLUDED_CLIPS).map(|i| format!("w{i}.mp4")).collect();
        let probe = StubProbe::new(&[]);
        store
            .import(names.iter().map(|n| source(n)).collect(), &probe, 0.0)
            .await
            .unwrap();

        let warnings = store.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ExportWarning::ManyClips { included: 11 }));

        // Excluded clips do not count toward the threshold
        let id = store.clips()[0].id.clone();
        store.update(&id, |c| c.include = false);
        assert!(store.warnings().is_empty());
    }
}
