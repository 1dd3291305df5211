//! Generation orchestrator.
//!
//! Drives one user-triggered request from the current selection to result
//! shapes on the canvas:
//!
//! ```text
//! Idle -> Collecting -> Pending -> Settled(Success | Failure)
//! ```
//!
//! A single permit is shared by every trigger (toolbar, prompt bar, CLI), so
//! at most one generation is in flight per document. The document lock is
//! only ever taken inside closures and never held across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use genai_canvas_core::{
    connect, place_new_shape, remove_placeholder, show_placeholder, Asset, AssetId, Bounds,
    CanvasError, ConnectOptions, Document, MediaKind, MediaPayload, Placeholder, Shape, ShapeId,
    ShapeKind, SharedDocument, VIDEO_WIDTH,
};
use thiserror::Error;
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::generator::{GenerateError, Generator};

/// Placeholder message while describing an image.
pub const DESCRIBE_MESSAGE: &str = "Generating description...";

/// Placeholder message while generating images.
pub const IMAGE_MESSAGE: &str = "Generating image...";

/// Placeholder message while generating videos.
pub const VIDEO_MESSAGE: &str = "Generating video...";

/// Camera animation when framing created shapes.
pub const FOCUS_ANIMATION: Duration = Duration::from_millis(400);

/// Screen inset used when bringing a placeholder into view.
pub const OFFSCREEN_INSET: f64 = 20.0;

/// Diagonal step between consecutive results.
pub const RESULT_FAN_OUT: f64 = 30.0;

/// How a settled request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Results are on the canvas.
    Success,
    /// The request failed; nothing was added.
    Failure,
}

/// Lifecycle of the most recent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    /// Nothing has been dispatched.
    #[default]
    Idle,
    /// Sources are being gathered from the selection.
    Collecting,
    /// The collaborator is working; a placeholder is on the canvas.
    Pending,
    /// The request finished.
    Settled(Outcome),
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The action failed.
    Error,
    /// The action was refused; retrying later may work.
    Warning,
}

/// A dismissible user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Text shown to the user.
    pub title: String,
    /// How prominently to show it.
    pub severity: Severity,
}

/// Errors surfaced by orchestrated actions.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The generation collaborator failed.
    #[error(transparent)]
    Generation(#[from] GenerateError),
    /// Another generation is already in flight.
    #[error("a generation is already in progress")]
    Busy,
    /// The document rejected a mutation.
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

impl ActionError {
    /// The notification to show for this error.
    #[must_use]
    pub fn toast(&self) -> Toast {
        let severity = match self {
            Self::Busy => Severity::Warning,
            Self::Generation(_) | Self::Canvas(_) => Severity::Error,
        };
        Toast {
            title: self.to_string(),
            severity,
        }
    }
}

/// Number of results requested per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Images per text-to-image request.
    pub image_count: u32,
    /// Videos per request.
    pub video_count: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            image_count: 1,
            video_count: 1,
        }
    }
}

/// Material gathered from the selection.
struct Sources {
    shapes: Vec<ShapeId>,
    prompt: String,
    image: Option<MediaPayload>,
}

/// Coordinates generation requests against a shared document.
#[derive(Clone)]
pub struct Orchestrator {
    document: SharedDocument,
    generator: Arc<dyn Generator>,
    gate: Arc<Semaphore>,
    phase: Arc<watch::Sender<RequestPhase>>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator with default result counts.
    pub fn new(document: SharedDocument, generator: Arc<dyn Generator>) -> Self {
        Self::with_config(document, generator, OrchestratorConfig::default())
    }

    /// Create an orchestrator with explicit result counts.
    pub fn with_config(
        document: SharedDocument,
        generator: Arc<dyn Generator>,
        config: OrchestratorConfig,
    ) -> Self {
        let (phase, _) = watch::channel(RequestPhase::Idle);
        Self {
            document,
            generator,
            gate: Arc::new(Semaphore::new(1)),
            phase: Arc::new(phase),
            config,
        }
    }

    /// The document this orchestrator mutates.
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Phase of the most recent request.
    pub fn phase(&self) -> RequestPhase {
        *self.phase.borrow()
    }

    /// Watch phase changes.
    pub fn subscribe(&self) -> watch::Receiver<RequestPhase> {
        self.phase.subscribe()
    }

    /// Describe every selected image with a text shape linked to it.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Busy`] if another request is in flight, or the
    /// first collaborator failure.
    pub async fn describe_selection(&self) -> Result<(), ActionError> {
        let _permit = self.begin()?;
        self.describe_selected().await
    }

    /// Describe the selected images. The caller holds the permit from
    /// [`Self::begin`].
    pub(crate) async fn describe_selected(&self) -> Result<(), ActionError> {
        let images: Vec<(ShapeId, MediaPayload)> = self.document.read(|doc| {
            doc.selected_shapes()
                .into_iter()
                .filter(|s| matches!(s.kind, ShapeKind::Image { .. }))
                .map(|s| doc.export_image(s.id).map(|payload| (s.id, payload)))
                .collect::<Result<_, _>>()
        })?;
        if images.is_empty() {
            return Ok(());
        }

        self.set_phase(RequestPhase::Collecting);
        let result = self.describe_each(images).await;
        self.settle(result)
    }

    /// Generate images from the selected text, editing the first selected
    /// image if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Busy`] if another request is in flight, or the
    /// collaborator's failure.
    pub async fn generate_image(&self) -> Result<(), ActionError> {
        let _permit = self.begin()?;
        self.run(MediaKind::Image).await
    }

    /// Generate videos from the selected text and/or first selected image.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Busy`] if another request is in flight, or the
    /// collaborator's failure.
    pub async fn generate_video(&self) -> Result<(), ActionError> {
        let _permit = self.begin()?;
        self.run(MediaKind::Video).await
    }

    /// Claim the in-flight token.
    pub(crate) fn begin(&self) -> Result<OwnedSemaphorePermit, ActionError> {
        Arc::clone(&self.gate).try_acquire_owned().map_err(|_| {
            debug!("Rejecting request: generation already in flight");
            ActionError::Busy
        })
    }

    /// Run a generation for the current selection. The caller holds the
    /// permit from [`Self::begin`].
    pub(crate) async fn run(&self, kind: MediaKind) -> Result<(), ActionError> {
        let Some(sources) = self.document.read(collect_sources)? else {
            debug!("Nothing selected to generate from");
            return Ok(());
        };

        self.set_phase(RequestPhase::Collecting);
        let result = self.generate(kind, sources).await;
        self.settle(result)
    }

    async fn generate(&self, kind: MediaKind, sources: Sources) -> Result<(), ActionError> {
        let message = match kind {
            MediaKind::Image => IMAGE_MESSAGE,
            MediaKind::Video => VIDEO_MESSAGE,
        };
        let placeholder = self.show(message)?;

        info!(
            "Requesting {kind:?} from {} source(s), image: {}",
            sources.shapes.len(),
            sources.image.is_some()
        );
        let image = sources.image.as_ref();
        let result = match kind {
            MediaKind::Image => {
                self.generator
                    .generate_images(&sources.prompt, image, self.config.image_count)
                    .await
            }
            MediaKind::Video => {
                self.generator
                    .generate_videos(image, &sources.prompt, self.config.video_count)
                    .await
            }
        };

        let slot = self.clear(&placeholder);
        let media = match result {
            Ok(media) if media.is_empty() => return Err(GenerateError::NoResults.into()),
            Ok(media) => media,
            Err(e) => return Err(e.into()),
        };

        let created = self
            .document
            .transact(|doc| materialize(doc, kind, &media, slot, &sources.shapes))?;
        info!("Added {} {kind:?} result(s)", created.len());
        Ok(())
    }

    async fn describe_each(&self, images: Vec<(ShapeId, MediaPayload)>) -> Result<(), ActionError> {
        for (source, payload) in images {
            let placeholder = self.show(DESCRIBE_MESSAGE)?;
            let result = self.generator.describe(&payload).await;
            let slot = self.clear(&placeholder);
            let description = result?;

            self.document.transact(|doc| {
                let mut text = Shape::text_with_width(description, VIDEO_WIDTH);
                if let Some(slot) = slot {
                    text = text.with_position(slot.x, slot.y);
                }
                let id = doc.create_shape(text)?;
                place_new_shape(doc, id);
                connect(doc, source, id, ConnectOptions::default())?;
                doc.select(&[id])?;
                doc.zoom_to_selection(Some(FOCUS_ANIMATION));
                Ok(())
            })?;
            info!("Described image {source}");
        }
        Ok(())
    }

    /// Show a placeholder, select it and bring it into view.
    fn show(&self, message: &str) -> Result<Placeholder, ActionError> {
        let placeholder = self.document.transact(|doc| {
            let placeholder = show_placeholder(doc, message)?;
            doc.select(&[placeholder.group])?;
            doc.zoom_to_selection_if_offscreen(OFFSCREEN_INSET);
            Ok(placeholder)
        })?;
        self.set_phase(RequestPhase::Pending);
        Ok(placeholder)
    }

    /// Remove a placeholder, returning where it stood.
    fn clear(&self, placeholder: &Placeholder) -> Option<Bounds> {
        self.document.update(|doc| {
            let slot = doc.page_bounds(placeholder.group);
            remove_placeholder(doc, placeholder);
            slot
        })
    }

    fn settle(&self, result: Result<(), ActionError>) -> Result<(), ActionError> {
        match &result {
            Ok(()) => self.set_phase(RequestPhase::Settled(Outcome::Success)),
            Err(e) => {
                warn!("Generation failed: {e}");
                self.set_phase(RequestPhase::Settled(Outcome::Failure));
            }
        }
        result
    }

    fn set_phase(&self, phase: RequestPhase) {
        debug!("Request phase: {phase:?}");
        self.phase.send_replace(phase);
    }
}

/// Gather the prompt and input image from the selection. `None` when
/// there is neither text nor an image.
fn collect_sources(doc: &Document) -> Result<Option<Sources>, CanvasError> {
    let selected = doc.selected_shapes();

    let mut shapes = Vec::new();
    let mut paragraphs = Vec::new();
    for shape in selected.iter().filter(|s| matches!(s.kind, ShapeKind::Text { .. })) {
        shapes.push(shape.id);
        paragraphs.extend(shape.paragraphs());
    }

    let mut image = None;
    if let Some(first) = selected
        .iter()
        .find(|s| matches!(s.kind, ShapeKind::Image { .. }))
    {
        image = Some(doc.export_image(first.id)?);
        shapes.push(first.id);
    }

    if paragraphs.is_empty() && image.is_none() {
        return Ok(None);
    }
    Ok(Some(Sources {
        shapes,
        prompt: paragraphs.join("\n"),
        image,
    }))
}

/// Register results as assets and shapes fanned out from `slot`, link them
/// to every source, and focus the last one.
fn materialize(
    doc: &mut Document,
    kind: MediaKind,
    media: &[MediaPayload],
    slot: Option<Bounds>,
    sources: &[ShapeId],
) -> Result<Vec<ShapeId>, CanvasError> {
    let slot = slot.unwrap_or_default();
    let mut created = Vec::with_capacity(media.len());
    let mut offset = 0.0;

    for (i, payload) in media.iter().enumerate() {
        let asset_id = AssetId::new();
        let (asset, shape) = match kind {
            MediaKind::Image => (
                Asset::image(
                    format!("sample_{i}_{asset_id}.jpg"),
                    payload.to_data_uri(),
                    &payload.mime_type,
                ),
                Shape::image(asset_id),
            ),
            MediaKind::Video => (
                Asset::video(
                    format!("sample_{i}_{asset_id}.mp4"),
                    payload.to_data_uri(),
                    &payload.mime_type,
                ),
                Shape::video(asset_id),
            ),
        };
        doc.create_asset(asset.with_id(asset_id))?;

        let id = doc.create_shape(
            shape
                .with_position(slot.x + offset, slot.y + offset)
                .with_size(slot.w, slot.h),
        )?;
        for &source in sources {
            connect(doc, source, id, ConnectOptions::default())?;
        }
        created.push(id);
        offset += RESULT_FAN_OUT;
    }

    if let Some(&last) = created.last() {
        doc.select(&[last])?;
        doc.zoom_to_selection(Some(FOCUS_ANIMATION));
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use genai_canvas_core::Terminal;
    use tokio::sync::Notify;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        op: &'static str,
        prompt: String,
        image: Option<MediaPayload>,
        count: u32,
    }

    #[derive(Default)]
    struct FakeGenerator {
        media: Vec<MediaPayload>,
        failure: Option<String>,
        release: Option<Arc<Notify>>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeGenerator {
        fn returning(media: Vec<MediaPayload>) -> Self {
            Self {
                media,
                ..Self::default()
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                failure: Some(reason.to_string()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls").clone()
        }

        async fn respond(
            &self,
            op: &'static str,
            prompt: &str,
            image: Option<&MediaPayload>,
            count: u32,
        ) -> Result<Vec<MediaPayload>, GenerateError> {
            self.calls.lock().expect("calls").push(Call {
                op,
                prompt: prompt.to_string(),
                image: image.cloned(),
                count,
            });
            if let Some(release) = &self.release {
                release.notified().await;
            }
            match &self.failure {
                Some(reason) => Err(GenerateError::Filtered(reason.clone())),
                None => Ok(self.media.clone()),
            }
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn describe(&self, image: &MediaPayload) -> Result<String, GenerateError> {
            self.respond("describe", "", Some(image), 1).await?;
            Ok("A cat sitting on a mat.".to_string())
        }

        async fn generate_images(
            &self,
            prompt: &str,
            image: Option<&MediaPayload>,
            count: u32,
        ) -> Result<Vec<MediaPayload>, GenerateError> {
            self.respond("images", prompt, image, count).await
        }

        async fn generate_videos(
            &self,
            image: Option<&MediaPayload>,
            prompt: &str,
            count: u32,
        ) -> Result<Vec<MediaPayload>, GenerateError> {
            self.respond("videos", prompt, image, count).await
        }
    }

    fn jpeg(byte: u8) -> MediaPayload {
        MediaPayload::new("image/jpeg", vec![0xFF, 0xD8, byte])
    }

    fn add_image(doc: &SharedDocument, payload: &MediaPayload, x: f64) -> ShapeId {
        doc.update(|d| {
            let asset = d.create_asset(Asset::image("in.jpg", payload.to_data_uri(), "image/jpeg"))?;
            d.create_shape(Shape::image(asset).with_position(x, 0.0))
        })
        .expect("image")
    }

    fn count_kind(doc: &Document, pred: fn(&ShapeKind) -> bool) -> usize {
        doc.shapes().filter(|s| pred(&s.kind)).count()
    }

    fn is_image(kind: &ShapeKind) -> bool {
        matches!(kind, ShapeKind::Image { .. })
    }

    fn is_video(kind: &ShapeKind) -> bool {
        matches!(kind, ShapeKind::Video { .. })
    }

    fn is_arrow(kind: &ShapeKind) -> bool {
        matches!(kind, ShapeKind::Arrow(_))
    }

    fn is_placeholder(kind: &ShapeKind) -> bool {
        matches!(kind, ShapeKind::Group | ShapeKind::Geo { .. })
    }

    #[tokio::test]
    async fn text_prompt_yields_linked_images() {
        let doc = SharedDocument::default();
        let text = doc
            .update(|d| d.create_shape(Shape::text("a cat")))
            .expect("text");
        doc.update(|d| d.select(&[text])).expect("select");

        let generator = Arc::new(FakeGenerator::returning(vec![jpeg(1), jpeg(2), jpeg(3)]));
        let orchestrator = Orchestrator::with_config(
            doc.clone(),
            generator.clone(),
            OrchestratorConfig {
                image_count: 3,
                video_count: 1,
            },
        );

        orchestrator.generate_image().await.expect("generate");

        assert_eq!(
            generator.calls(),
            vec![Call {
                op: "images",
                prompt: "a cat".to_string(),
                image: None,
                count: 3,
            }]
        );
        assert_eq!(
            orchestrator.phase(),
            RequestPhase::Settled(Outcome::Success)
        );

        doc.read(|d| {
            assert_eq!(count_kind(d, is_image), 3);
            assert_eq!(count_kind(d, is_arrow), 3);
            assert_eq!(count_kind(d, is_placeholder), 0);
            assert_eq!(d.asset_count(), 3);
            assert_eq!(d.bindings_to(text).len(), 3);

            let results: Vec<_> = d.shapes().filter(|s| is_image(&s.kind)).collect();
            for result in &results {
                let from_text = d
                    .bindings_to(result.id)
                    .into_iter()
                    .any(|b| b.terminal == Terminal::End);
                assert!(from_text, "result {} has no incoming arrow", result.id);
            }

            let selected = d.selected_ids();
            assert_eq!(selected.len(), 1);
            let last = d.get_shape(selected[0]).expect("selected");
            assert!(is_image(&last.kind));
            let first_x = results.iter().map(|s| s.x).fold(f64::INFINITY, f64::min);
            assert!((last.x - (first_x + 2.0 * RESULT_FAN_OUT)).abs() < 1e-9);
            assert_eq!(
                d.last_frame().and_then(|f| f.animation),
                Some(FOCUS_ANIMATION)
            );
            assert!(d
                .assets()
                .all(|a| a.name.starts_with("sample_") && a.name.ends_with(".jpg")));
        });
    }

    #[tokio::test]
    async fn filtered_video_leaves_no_trace() {
        let doc = SharedDocument::default();
        let image = add_image(&doc, &jpeg(7), 0.0);
        let text = doc
            .update(|d| d.create_shape(Shape::text("make it dance").with_position(0.0, 400.0)))
            .expect("text");
        doc.update(|d| d.select(&[image, text])).expect("select");
        let before = doc.read(Document::shape_count);

        let reason = "Video blocked: celebrity likeness";
        let generator = Arc::new(FakeGenerator::failing(reason));
        let orchestrator = Orchestrator::new(doc.clone(), generator.clone());

        let err = orchestrator.generate_video().await.expect_err("filtered");

        assert_eq!(err.to_string(), reason);
        assert_eq!(
            err.toast(),
            Toast {
                title: reason.to_string(),
                severity: Severity::Error,
            }
        );
        assert_eq!(
            orchestrator.phase(),
            RequestPhase::Settled(Outcome::Failure)
        );
        let call = &generator.calls()[0];
        assert_eq!(call.op, "videos");
        assert_eq!(call.image, Some(jpeg(7)));
        doc.read(|d| {
            assert_eq!(count_kind(d, is_video), 0);
            assert_eq!(count_kind(d, is_placeholder), 0);
            assert_eq!(d.shape_count(), before);
        });
    }

    #[tokio::test]
    async fn empty_selection_is_noop() {
        let doc = SharedDocument::default();
        doc.update(|d| d.create_shape(Shape::text("unselected")))
            .expect("text");
        let generator = Arc::new(FakeGenerator::returning(vec![jpeg(1)]));
        let orchestrator = Orchestrator::new(doc.clone(), generator.clone());

        orchestrator.generate_image().await.expect("noop");
        orchestrator.generate_video().await.expect("noop");
        orchestrator.describe_selection().await.expect("noop");

        assert!(generator.calls().is_empty());
        assert_eq!(orchestrator.phase(), RequestPhase::Idle);
        assert_eq!(doc.read(Document::shape_count), 1);
    }

    #[tokio::test]
    async fn blank_text_counts_as_nothing() {
        let doc = SharedDocument::default();
        let text = doc
            .update(|d| d.create_shape(Shape::text("  \n\n ")))
            .expect("text");
        doc.update(|d| d.select(&[text])).expect("select");
        let generator = Arc::new(FakeGenerator::returning(vec![jpeg(1)]));
        let orchestrator = Orchestrator::new(doc, generator.clone());

        orchestrator.generate_image().await.expect("noop");

        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn second_request_while_pending_is_busy() {
        let doc = SharedDocument::default();
        let text = doc
            .update(|d| d.create_shape(Shape::text("a cat")))
            .expect("text");
        doc.update(|d| d.select(&[text])).expect("select");

        let release = Arc::new(Notify::new());
        let generator = Arc::new(FakeGenerator {
            media: vec![jpeg(1)],
            release: Some(Arc::clone(&release)),
            ..FakeGenerator::default()
        });
        let orchestrator = Orchestrator::new(doc.clone(), generator.clone());

        let mut phases = orchestrator.subscribe();
        let running = orchestrator.clone();
        let task = tokio::spawn(async move { running.generate_image().await });
        phases
            .wait_for(|p| *p == RequestPhase::Pending)
            .await
            .expect("pending");

        let shapes_while_pending = doc.read(Document::shape_count);
        let err = orchestrator.generate_video().await.expect_err("busy");
        assert!(matches!(err, ActionError::Busy));
        assert_eq!(err.toast().severity, Severity::Warning);
        assert_eq!(doc.read(Document::shape_count), shapes_while_pending);

        release.notify_one();
        task.await.expect("join").expect("generate");
        assert_eq!(generator.calls().len(), 1);
        assert_eq!(doc.read(|d| count_kind(d, is_image)), 1);

        // The token is released once the request settles.
        doc.update(|d| d.select(&[text])).expect("select");
        release.notify_one();
        orchestrator.generate_image().await.expect("second run");
        assert_eq!(generator.calls().len(), 2);
    }

    #[tokio::test]
    async fn empty_results_are_a_failure() {
        let doc = SharedDocument::default();
        let text = doc
            .update(|d| d.create_shape(Shape::text("a cat")))
            .expect("text");
        doc.update(|d| d.select(&[text])).expect("select");
        let orchestrator = Orchestrator::new(doc.clone(), Arc::new(FakeGenerator::default()));

        let err = orchestrator.generate_image().await.expect_err("no results");

        assert!(matches!(
            err,
            ActionError::Generation(GenerateError::NoResults)
        ));
        assert_eq!(doc.read(Document::shape_count), 1);
    }

    #[tokio::test]
    async fn describe_links_text_to_image() {
        let doc = SharedDocument::default();
        let image = add_image(&doc, &jpeg(9), 0.0);
        doc.update(|d| d.select(&[image])).expect("select");
        let generator = Arc::new(FakeGenerator::default());
        let orchestrator = Orchestrator::new(doc.clone(), generator.clone());

        orchestrator.describe_selection().await.expect("describe");

        assert_eq!(generator.calls()[0].image, Some(jpeg(9)));
        doc.read(|d| {
            let text = d
                .shapes()
                .find(|s| s.text_content() == Some("A cat sitting on a mat."))
                .expect("description");
            assert!((text.w - VIDEO_WIDTH).abs() < f64::EPSILON);
            assert_eq!(d.selected_ids(), &[text.id]);
            assert_eq!(d.bindings_to(image).len(), 1);
            assert_eq!(count_kind(d, is_placeholder), 0);
        });
    }

    #[tokio::test]
    async fn only_first_image_is_used() {
        let doc = SharedDocument::default();
        let first = add_image(&doc, &jpeg(1), 0.0);
        let second = add_image(&doc, &jpeg(2), 1000.0);
        let text = doc
            .update(|d| d.create_shape(Shape::text("blue\nsky").with_position(0.0, 500.0)))
            .expect("text");
        doc.update(|d| d.select(&[second, text, first])).expect("select");
        let generator = Arc::new(FakeGenerator::returning(vec![jpeg(3)]));
        let orchestrator = Orchestrator::new(doc.clone(), generator.clone());

        orchestrator.generate_image().await.expect("edit");

        let call = &generator.calls()[0];
        assert_eq!(call.prompt, "blue\nsky");
        assert_eq!(call.image, Some(jpeg(2)));
        doc.read(|d| {
            assert_eq!(d.bindings_to(second).len(), 1);
            assert_eq!(d.bindings_to(text).len(), 1);
            assert!(d.bindings_to(first).is_empty());
        });
    }

    #[tokio::test]
    async fn video_results_are_playing_media() {
        let doc = SharedDocument::default();
        let text = doc
            .update(|d| d.create_shape(Shape::text("waves")))
            .expect("text");
        doc.update(|d| d.select(&[text])).expect("select");
        let clip = MediaPayload::new("video/mp4", vec![0, 0, 0, 24]);
        let generator = Arc::new(FakeGenerator::returning(vec![clip.clone(), clip]));
        let orchestrator = Orchestrator::with_config(
            doc.clone(),
            generator,
            OrchestratorConfig {
                image_count: 1,
                video_count: 2,
            },
        );

        orchestrator.generate_video().await.expect("video");

        doc.read(|d| {
            let videos: Vec<_> = d.shapes().filter(|s| is_video(&s.kind)).collect();
            assert_eq!(videos.len(), 2);
            assert_ne!(videos[0].id, videos[1].id);
            assert!(videos
                .iter()
                .all(|s| matches!(s.kind, ShapeKind::Video { playing: true, .. })));
            assert!(d.assets().all(|a| a.kind == MediaKind::Video
                && a.is_animated
                && a.name.ends_with(".mp4")));
        });
    }
}
