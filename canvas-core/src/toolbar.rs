//! Contextual actions offered for the current selection.
//!
//! Pure functions over a classified [`SelectionSummary`]; no hidden state.

use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;
use crate::{Document, ShapeKind};

/// Distance between the selection's bottom edge and the toolbar.
pub const TOOLBAR_OFFSET: f64 = 75.0;

/// Selected shapes counted by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSummary {
    /// Text shapes.
    pub text: usize,
    /// Image shapes.
    pub image: usize,
    /// Anything else.
    pub other: usize,
}

impl SelectionSummary {
    /// Classify the current selection of `doc`.
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        doc.selected_shapes()
            .into_iter()
            .fold(Self::default(), |mut summary, shape| {
                match shape.kind {
                    ShapeKind::Text { .. } => summary.text += 1,
                    ShapeKind::Image { .. } => summary.image += 1,
                    _ => summary.other += 1,
                }
                summary
            })
    }
}

/// An action the toolbar can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextAction {
    /// Describe the selected image(s).
    Describe,
    /// Generate an image from the selected text, editing the selected
    /// image when there is one.
    GenerateImage {
        /// Whether an input image is part of the request.
        from_image: bool,
    },
    /// Generate a video from the selected text and/or image.
    GenerateVideo,
}

impl ContextAction {
    /// Button label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Describe => "Describe",
            Self::GenerateImage { .. } => "Generate image",
            Self::GenerateVideo => "Generate video",
        }
    }

    /// Tooltip.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Describe => "Describe image",
            Self::GenerateImage { from_image: false } => "Generate image from text",
            Self::GenerateImage { from_image: true } => "Generate image from image and text",
            Self::GenerateVideo => "Generate video from text and/or image",
        }
    }

    /// Icon name.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Describe => "genai-describe-image",
            Self::GenerateImage { .. } => "genai-generate-image",
            Self::GenerateVideo => "genai-generate-video",
        }
    }
}

/// Actions offered for a selection, in toolbar order.
#[must_use]
pub fn contextual_actions(summary: SelectionSummary) -> Vec<ContextAction> {
    if summary.other > 0 {
        return Vec::new();
    }
    let has_text = summary.text > 0;
    let has_image = summary.image > 0;

    let mut actions = Vec::new();
    match (has_text, has_image) {
        (false, true) => actions.push(ContextAction::Describe),
        (true, from_image) => actions.push(ContextAction::GenerateImage { from_image }),
        (false, false) => return actions,
    }
    actions.push(ContextAction::GenerateVideo);
    actions
}

/// Where the toolbar sits: the selection's bounds moved below its bottom
/// edge. `None` without a selection.
#[must_use]
pub fn toolbar_anchor(doc: &Document) -> Option<Bounds> {
    doc.selection_page_bounds().map(|b| Bounds {
        y: b.max_y() + TOOLBAR_OFFSET,
        ..b
    })
}
