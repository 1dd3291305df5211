//! Prompt bar flows.
//!
//! A submission drops the uploaded image and the prompt text onto the
//! canvas, selects them, and hands off to the orchestrator as if the user
//! had picked them from the toolbar.

use genai_canvas_core::{
    place_new_shape, Asset, AssetId, CanvasResult, MediaKind, MediaPayload, Shape, ShapeId,
    SharedDocument,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::orchestrator::{ActionError, Orchestrator, FOCUS_ANIMATION};

/// What the prompt bar asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptAction {
    /// Generate images.
    Image,
    /// Generate videos.
    Video,
}

impl From<PromptAction> for MediaKind {
    fn from(action: PromptAction) -> Self {
        match action {
            PromptAction::Image => Self::Image,
            PromptAction::Video => Self::Video,
        }
    }
}

/// A prompt bar submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSubmission {
    /// Prompt text; may be empty when an image is attached.
    pub prompt: String,
    /// Attached image as a data URI.
    #[serde(default)]
    pub image: Option<String>,
    /// Requested output.
    pub action: PromptAction,
}

impl PromptSubmission {
    /// A text-only submission.
    pub fn new(prompt: impl Into<String>, action: PromptAction) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            action,
        }
    }

    /// Attach an image.
    #[must_use]
    pub fn with_image(mut self, image: &MediaPayload) -> Self {
        self.image = Some(image.to_data_uri());
        self
    }

    fn is_empty(&self) -> bool {
        self.prompt.trim().is_empty() && self.image.is_none()
    }
}

/// Put the submission's image and text on the canvas, select them and
/// frame them. Returns the created shapes, image first.
///
/// # Errors
///
/// Returns an error if the attached image is not a valid data URI; the
/// document is unchanged in that case.
pub fn stage(document: &SharedDocument, submission: &PromptSubmission) -> CanvasResult<Vec<ShapeId>> {
    let image = submission
        .image
        .as_deref()
        .map(MediaPayload::from_data_uri)
        .transpose()?;

    document.transact(|doc| {
        let mut created = Vec::new();

        if let Some(image) = &image {
            let asset_id = AssetId::new();
            doc.create_asset(
                Asset::image(
                    format!("uploaded_image_{asset_id}.jpg"),
                    image.to_data_uri(),
                    &image.mime_type,
                )
                .with_id(asset_id),
            )?;
            let id = doc.create_shape(Shape::image(asset_id))?;
            place_new_shape(doc, id);
            created.push(id);
        }

        if !submission.prompt.trim().is_empty() {
            let id = doc.create_shape(Shape::text(submission.prompt.clone()))?;
            place_new_shape(doc, id);
            created.push(id);
        }

        doc.select(&created)?;
        doc.zoom_to_selection(Some(FOCUS_ANIMATION));
        debug!("Staged {} shape(s) from the prompt bar", created.len());
        Ok(created)
    })
}

/// Stage a submission and run the requested generation on it.
///
/// # Errors
///
/// Returns [`ActionError::Busy`] if a generation is already in flight,
/// [`ActionError::Canvas`] for a malformed image, or the collaborator's
/// failure.
pub async fn submit(orchestrator: &Orchestrator, submission: PromptSubmission) -> Result<(), ActionError> {
    let _permit = orchestrator.begin()?;
    if submission.is_empty() {
        return Ok(());
    }

    stage(orchestrator.document(), &submission)?;
    info!("Prompt bar requested {:?}", submission.action);
    orchestrator.run(submission.action.into()).await
}
