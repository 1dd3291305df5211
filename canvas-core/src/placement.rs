//! Non-overlapping placement of newly inserted shapes.
//!
//! A greedy left-to-right sweep over the new shape's siblings: the shape
//! keeps its vertical position and is pushed right past every sibling that
//! shares its vertical span and would otherwise collide.

use crate::geometry::Vec2;
use crate::{Document, ShapeId};

/// Horizontal gap left between a placed shape and the sibling it was
/// pushed past.
pub const SPACING_BETWEEN_OBJECTS: f64 = 50.0;

/// Move `id` right until it clears every vertically overlapping sibling.
///
/// Silently does nothing if the shape or its bounds cannot be resolved.
pub fn place_new_shape(doc: &mut Document, id: ShapeId) {
    let Some(parent) = doc.get_shape(id).map(|s| s.parent) else {
        return;
    };
    let Some(bounds) = doc.page_bounds(id) else {
        return;
    };

    let mut siblings: Vec<_> = doc
        .sorted_child_ids(parent)
        .into_iter()
        .filter(|&sibling| sibling != id)
        .filter_map(|sibling| doc.page_bounds(sibling))
        .collect();
    // Stable: ties keep paint order.
    siblings.sort_by(|a, b| a.min_x().total_cmp(&b.min_x()));

    let mut target_left = bounds.min_x();
    for sibling in &siblings {
        if !bounds.overlaps_vertically(sibling) {
            continue;
        }
        if sibling.max_x() < target_left {
            continue;
        }
        if sibling.min_x() > target_left + bounds.w {
            continue;
        }
        target_left = sibling.max_x() + SPACING_BETWEEN_OBJECTS;
    }

    let dx = target_left - bounds.min_x();
    if dx != 0.0 {
        tracing::debug!("Placing {id}: shifting right by {dx}");
        doc.nudge_shapes(&[id], Vec2::new(dx, 0.0));
    }
}
