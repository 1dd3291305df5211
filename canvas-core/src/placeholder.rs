//! Transient "generation in progress" markers.

use crate::placement::place_new_shape;
use crate::{CanvasResult, Document, Shape, ShapeId, VIDEO_HEIGHT, VIDEO_WIDTH};

/// Vertical gap between the selection and the placeholder.
pub const PLACEHOLDER_MARGIN: f64 = 100.0;

/// Horizontal inset of the status text from the marker's centre.
const TEXT_INSET: f64 = 100.0;

/// Identities of a placeholder group and its two members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// The group holding both members.
    pub group: ShapeId,
    /// The rectangular marker.
    pub geo: ShapeId,
    /// The status text.
    pub text: ShapeId,
}

impl Placeholder {
    /// All three identities, group first.
    #[must_use]
    pub fn ids(&self) -> [ShapeId; 3] {
        [self.group, self.geo, self.text]
    }
}

/// Show a placeholder carrying `message` below the current selection.
///
/// The marker is media-sized so the results that replace it land in the
/// same spot. The group is placed clear of existing content.
///
/// # Errors
///
/// Returns an error only if the document rejects the new shapes.
pub fn show_placeholder(doc: &mut Document, message: &str) -> CanvasResult<Placeholder> {
    let anchor = doc.selection_page_bounds().unwrap_or_default();
    let top = anchor.max_y() + PLACEHOLDER_MARGIN;

    let placeholder = doc.transact(|doc| {
        let geo = doc.create_shape(Shape::geo(VIDEO_WIDTH, VIDEO_HEIGHT).with_position(anchor.x, top))?;
        let text = doc.create_shape(Shape::text(message).with_position(
            anchor.x + VIDEO_WIDTH / 2.0 - TEXT_INSET,
            top + VIDEO_HEIGHT / 2.0,
        ))?;
        let group = doc.group_shapes(&[geo, text], ShapeId::new())?;
        Ok(Placeholder { group, geo, text })
    })?;

    place_new_shape(doc, placeholder.group);
    tracing::debug!("Showing placeholder {} ({message})", placeholder.group);
    Ok(placeholder)
}

/// Remove every shape of a placeholder. Already-deleted ids are ignored.
pub fn remove_placeholder(doc: &mut Document, placeholder: &Placeholder) {
    doc.delete_shapes(&placeholder.ids());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, ShapeKind};

    #[test]
    fn test_placeholder_below_selection() {
        let mut doc = Document::default();
        let source = doc
            .create_shape(Shape::geo(200.0, 80.0).with_position(40.0, 10.0))
            .expect("source");
        doc.select(&[source]).expect("select");

        let placeholder = show_placeholder(&mut doc, "Generating image...").expect("show");

        let bounds = doc.page_bounds(placeholder.geo).expect("geo bounds");
        assert_eq!(bounds, Bounds::new(40.0, 190.0, VIDEO_WIDTH, VIDEO_HEIGHT));
        assert_eq!(
            doc.get_shape(placeholder.text).and_then(Shape::text_content),
            Some("Generating image...")
        );
        assert_eq!(
            doc.get_shape(placeholder.group).map(|s| &s.kind),
            Some(&ShapeKind::Group)
        );
        assert_eq!(
            doc.sorted_child_ids(Some(placeholder.group)),
            vec![placeholder.geo, placeholder.text]
        );
    }

    #[test]
    fn test_placeholder_avoids_existing_content() {
        let mut doc = Document::default();
        let source = doc
            .create_shape(Shape::geo(100.0, 100.0).with_position(0.0, 0.0))
            .expect("source");
        let blocker = doc
            .create_shape(Shape::geo(100.0, 100.0).with_position(0.0, 250.0))
            .expect("blocker");
        doc.select(&[source]).expect("select");

        let placeholder = show_placeholder(&mut doc, "Generating video...").expect("show");

        let group = doc.page_bounds(placeholder.group).expect("bounds");
        let blocker = doc.page_bounds(blocker).expect("bounds");
        assert!((group.min_x() - (blocker.max_x() + 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_remove_placeholder_deletes_all_three() {
        let mut doc = Document::default();
        let placeholder = show_placeholder(&mut doc, "Working").expect("show");

        remove_placeholder(&mut doc, &placeholder);

        for id in placeholder.ids() {
            assert!(!doc.contains_shape(id), "{id} survived");
        }
        assert!(doc.is_empty());
    }
}
