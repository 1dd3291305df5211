//! Provenance arrows between shapes.
//!
//! An arrow is created together with one binding per terminal in a single
//! transaction, so the document never holds an arrow without both of its
//! bindings.

use crate::geometry::{Bounds, PageTransform, Vec2};
use crate::{
    ArrowBinding, ArrowProps, BindingId, CanvasError, CanvasResult, Document, Shape, ShapeId,
    ShapeKind, Terminal,
};

/// Stroke color of provenance arrows.
pub const ARROW_COLOR: &str = "violet";

/// Dash style of provenance arrows.
pub const ARROW_DASH: &str = "dashed";

/// Bend of provenance arrows.
pub const ARROW_BEND: f64 = 50.0;

/// How one end of an arrow attaches to its shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Point within the shape's bounds, 0..1 on each axis.
    pub normalized: Vec2,
    /// Point exactly at the anchor instead of the shape's edge.
    pub is_exact: bool,
    /// Keep the anchor where it is instead of snapping to the centre.
    pub is_precise: bool,
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            normalized: Vec2::new(0.5, 0.5),
            is_exact: false,
            is_precise: false,
        }
    }
}

/// Options for [`connect`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectOptions {
    /// Container for the arrow; top level if `None`.
    pub parent: Option<ShapeId>,
    /// Anchor on the start shape.
    pub start: Anchor,
    /// Anchor on the end shape.
    pub end: Anchor,
}

/// Page position of an anchor on a shape with the given page bounds and
/// rotation.
#[must_use]
pub fn terminal_position(bounds: &Bounds, rotation: f64, anchor: Vec2) -> Vec2 {
    bounds.point() + (bounds.size() * anchor).rot(rotation)
}

/// Create an arrow from `start` to `end` with a binding on each terminal.
///
/// Returns `Ok(None)` without touching the document if either shape's
/// bounds cannot be resolved.
///
/// # Errors
///
/// Returns [`CanvasError::ParentNotFound`] if `options.parent` names a
/// shape that does not exist; this is a caller bug.
pub fn connect(
    doc: &mut Document,
    start: ShapeId,
    end: ShapeId,
    options: ConnectOptions,
) -> CanvasResult<Option<ShapeId>> {
    let parent_transform = match options.parent {
        None => PageTransform::identity(),
        Some(parent) => doc
            .page_transform(parent)
            .ok_or_else(|| CanvasError::ParentNotFound(parent.to_string()))?,
    };

    let (Some(start_bounds), Some(end_bounds)) = (doc.page_bounds(start), doc.page_bounds(end))
    else {
        tracing::debug!("Skipping arrow {start} -> {end}: unresolved bounds");
        return Ok(None);
    };
    let start_rotation = doc.page_rotation(start).unwrap_or_default();
    let end_rotation = doc.page_rotation(end).unwrap_or_default();

    let start_page = terminal_position(&start_bounds, start_rotation, options.start.normalized);
    let end_page = terminal_position(&end_bounds, end_rotation, options.end.normalized);

    let origin_page = start_page.min(end_page);
    let origin = parent_transform.invert_point(origin_page);
    let start_local = parent_transform.invert_point(start_page) - origin;
    let end_local = parent_transform.invert_point(end_page) - origin;

    let mut arrow = Shape::new(ShapeKind::Arrow(ArrowProps {
        color: ARROW_COLOR.to_string(),
        dash: ARROW_DASH.to_string(),
        bend: ARROW_BEND,
        start: start_local,
        end: end_local,
    }))
    .with_position(origin.x, origin.y)
    .with_size(
        (end_local.x - start_local.x).abs(),
        (end_local.y - start_local.y).abs(),
    );
    arrow.parent = options.parent;

    doc.transact(|doc| {
        let arrow_id = doc.create_shape(arrow)?;
        for (target, terminal, anchor) in [
            (start, Terminal::Start, options.start),
            (end, Terminal::End, options.end),
        ] {
            doc.create_binding(ArrowBinding {
                id: BindingId::new(),
                arrow: arrow_id,
                target,
                terminal,
                normalized_anchor: anchor.normalized,
                is_exact: anchor.is_exact,
                is_precise: anchor.is_precise,
            })?;
        }
        tracing::debug!("Connected {start} -> {end} with arrow {arrow_id}");
        Ok(Some(arrow_id))
    })
}
