//! Canonical serialized representation of a canvas document.

use serde::{Deserialize, Serialize};

use crate::document::{Camera, Document};
use crate::{ArrowBinding, Asset, CanvasResult, Shape, ShapeId};

/// Viewport information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Camera position.
    #[serde(default)]
    pub camera: Camera,
}

/// Canonical document form.
///
/// Shapes are listed depth-first in paint order so parents always precede
/// their children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Viewport metadata.
    pub viewport: ViewportSnapshot,
    /// Shapes, parents first, siblings in paint order.
    pub shapes: Vec<Shape>,
    /// Assets ordered by id.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Arrow bindings ordered by id.
    #[serde(default)]
    pub bindings: Vec<ArrowBinding>,
    /// Selected shapes in selection order.
    #[serde(default)]
    pub selected: Vec<ShapeId>,
}

impl DocumentSnapshot {
    /// Build a snapshot from a live document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let mut shapes = Vec::with_capacity(doc.shape_count());
        collect_depth_first(doc, None, &mut shapes);

        let mut assets: Vec<Asset> = doc.assets().cloned().collect();
        assets.sort_by_key(|a| a.id);
        let mut bindings: Vec<ArrowBinding> = doc.bindings().copied().collect();
        bindings.sort_by_key(|b| b.id);

        let (width, height) = doc.viewport_size();
        Self {
            viewport: ViewportSnapshot {
                width,
                height,
                camera: doc.camera(),
            },
            shapes,
            assets,
            bindings,
            selected: doc.selected_ids().to_vec(),
        }
    }

    /// Rebuild a document, validating every record.
    ///
    /// # Errors
    ///
    /// Returns the first validation error raised while inserting records.
    pub fn into_document(self) -> CanvasResult<Document> {
        let mut doc = Document::new(self.viewport.width, self.viewport.height);
        doc.set_camera(self.viewport.camera);
        for asset in self.assets {
            doc.create_asset(asset)?;
        }
        for shape in self.shapes {
            doc.create_shape(shape)?;
        }
        for binding in self.bindings {
            doc.create_binding(binding)?;
        }
        doc.select(&self.selected)?;
        Ok(doc)
    }
}

fn collect_depth_first(doc: &Document, parent: Option<ShapeId>, out: &mut Vec<Shape>) {
    for id in doc.sorted_child_ids(parent) {
        if let Some(shape) = doc.get_shape(id) {
            out.push(shape.clone());
            collect_depth_first(doc, Some(id), out);
        }
    }
}

impl Document {
    /// Serialize the document to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CanvasError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string_pretty(&DocumentSnapshot::from_document(
            self,
        ))?)
    }

    /// Parse a document from JSON produced by [`Document::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a record is invalid.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let snapshot: DocumentSnapshot = serde_json::from_str(json)?;
        snapshot.into_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindingId, CanvasError, Terminal, Vec2};

    #[test]
    fn test_json_preserves_hierarchy_and_order() {
        let mut doc = Document::new(1024.0, 768.0);
        let asset = doc
            .create_asset(Asset::image(
                "sample_0.jpg",
                "data:image/jpeg;base64,AQID",
                "image/jpeg",
            ))
            .expect("asset");
        let a = doc.create_shape(Shape::image(asset)).expect("image");
        let b = doc
            .create_shape(Shape::text("caption").with_position(0.0, 400.0))
            .expect("text");
        let group = doc.group_shapes(&[a, b], ShapeId::new()).expect("group");
        let loose = doc.create_shape(Shape::geo(10.0, 10.0)).expect("geo");
        doc.reorder_children(None, &[loose, group]).expect("reorder");
        doc.select(&[b]).expect("select");

        let json = doc.to_json().expect("serialize");
        let back = Document::from_json(&json).expect("parse");

        assert_eq!(back.sorted_child_ids(None), vec![loose, group]);
        assert_eq!(back.sorted_child_ids(Some(group)), vec![a, b]);
        assert_eq!(back.selected_ids(), &[b]);
        assert_eq!(back.page_bounds(b), doc.page_bounds(b));
        assert_eq!(back.asset_count(), 1);
    }

    #[test]
    fn test_json_keeps_bindings() {
        let mut doc = Document::default();
        let target = doc.create_shape(Shape::geo(10.0, 10.0)).expect("geo");
        let arrow = doc
            .create_shape(Shape::new(crate::ShapeKind::Arrow(crate::ArrowProps {
                color: "violet".into(),
                dash: "dashed".into(),
                bend: 50.0,
                start: Vec2::zero(),
                end: Vec2::new(5.0, 5.0),
            })))
            .expect("arrow");
        doc.create_binding(ArrowBinding {
            id: BindingId::new(),
            arrow,
            target,
            terminal: Terminal::End,
            normalized_anchor: Vec2::new(0.5, 0.0),
            is_exact: false,
            is_precise: false,
        })
        .expect("binding");

        let back = Document::from_json(&doc.to_json().expect("json")).expect("parse");
        assert_eq!(back.bindings_to(target).len(), 1);
    }

    #[test]
    fn test_from_json_rejects_dangling_parent() {
        let snapshot = DocumentSnapshot {
            viewport: ViewportSnapshot {
                width: 100.0,
                height: 100.0,
                camera: Camera::default(),
            },
            shapes: vec![Shape::text("orphan").with_parent(ShapeId::new())],
            assets: Vec::new(),
            bindings: Vec::new(),
            selected: Vec::new(),
        };
        assert!(matches!(
            snapshot.into_document(),
            Err(CanvasError::ParentNotFound(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Document::from_json("{\"shapes\": 3}"),
            Err(CanvasError::Serialization(_))
        ));
    }
}
