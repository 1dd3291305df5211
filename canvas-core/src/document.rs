//! The canvas document: shapes, assets, bindings, selection and camera.
//!
//! Callers hold identities, never references, across mutations. Every
//! operation resolves ids against the current state and reads are
//! consistent immediately after writes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, PageTransform, Vec2};
use crate::media::MediaPayload;
use crate::{
    ArrowBinding, Asset, AssetId, BindingId, CanvasError, CanvasResult, Shape, ShapeId, ShapeKind,
};

/// Smallest zoom the camera will frame at.
const MIN_ZOOM: f64 = 0.1;

/// Largest zoom used when framing shapes.
const MAX_FRAME_ZOOM: f64 = 1.0;

/// Screen-space padding used when framing.
const FRAME_INSET: f64 = 64.0;

/// Camera position. A page point `p` appears on screen at `(p + (x, y)) * zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Horizontal offset in page units.
    pub x: f64,
    /// Vertical offset in page units.
    pub y: f64,
    /// Zoom level (1.0 = 100%).
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// The most recent request to frame part of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRequest {
    /// Page bounds that were framed.
    pub bounds: Bounds,
    /// Animation length, if the move was animated.
    pub animation: Option<Duration>,
}

/// An explicit, mutable canvas document.
#[derive(Debug, Clone)]
pub struct Document {
    shapes: HashMap<ShapeId, Shape>,
    /// Paint order of top-level shapes.
    root: Vec<ShapeId>,
    /// Paint order of each group's children.
    children: HashMap<ShapeId, Vec<ShapeId>>,
    /// Shared so snapshots taken by [`Document::transact`] don't copy media.
    assets: HashMap<AssetId, Arc<Asset>>,
    bindings: HashMap<BindingId, ArrowBinding>,
    selected: Vec<ShapeId>,
    camera: Camera,
    viewport_width: f64,
    viewport_height: f64,
    last_frame: Option<FrameRequest>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl Document {
    /// Create an empty document with the given screen viewport size.
    #[must_use]
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            shapes: HashMap::new(),
            root: Vec::new(),
            children: HashMap::new(),
            assets: HashMap::new(),
            bindings: HashMap::new(),
            selected: Vec::new(),
            camera: Camera::default(),
            viewport_width,
            viewport_height,
            last_frame: None,
        }
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Run `f` atomically: if it returns an error, every change it made is
    /// discarded and the document is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns whatever error `f` returns.
    pub fn transact<T, F>(&mut self, f: F) -> CanvasResult<T>
    where
        F: FnOnce(&mut Self) -> CanvasResult<T>,
    {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::debug!("Transaction rolled back: {e}");
                *self = snapshot;
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Shapes
    // -----------------------------------------------------------------------

    /// Insert a shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken, the geometry is not finite, the
    /// parent is missing or not a group, or a media shape references a
    /// missing asset.
    pub fn create_shape(&mut self, shape: Shape) -> CanvasResult<ShapeId> {
        let id = shape.id;
        if self.shapes.contains_key(&id) {
            return Err(CanvasError::DuplicateId(id.to_string()));
        }
        if !shape.has_finite_geometry() {
            return Err(CanvasError::InvalidGeometry(id.to_string()));
        }
        if let Some(parent) = shape.parent {
            match self.shapes.get(&parent) {
                None => return Err(CanvasError::ParentNotFound(parent.to_string())),
                Some(p) if p.kind != ShapeKind::Group => {
                    return Err(CanvasError::InvalidOperation(format!(
                        "{parent} is a {} and cannot contain shapes",
                        p.kind.type_name()
                    )));
                }
                Some(_) => {}
            }
        }
        if let Some(asset_id) = shape.kind.asset_id() {
            if !self.assets.contains_key(&asset_id) {
                return Err(CanvasError::AssetNotFound(asset_id.to_string()));
            }
        }

        tracing::debug!("Creating {} shape {id}", shape.kind.type_name());
        self.child_list_mut(shape.parent).push(id);
        if shape.kind == ShapeKind::Group {
            self.children.entry(id).or_default();
        }
        self.shapes.insert(id, shape);
        Ok(id)
    }

    /// Insert several shapes atomically.
    ///
    /// # Errors
    ///
    /// Returns the first creation error; no shape is inserted in that case.
    pub fn create_shapes(&mut self, shapes: Vec<Shape>) -> CanvasResult<Vec<ShapeId>> {
        self.transact(|doc| {
            shapes
                .into_iter()
                .map(|shape| doc.create_shape(shape))
                .collect()
        })
    }

    /// Get a shape by ID.
    #[must_use]
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Whether a shape exists.
    #[must_use]
    pub fn contains_shape(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// All shapes, in no particular order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    /// Number of shapes in the document.
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the document has no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Update a shape using a closure.
    ///
    /// The identity and parent cannot be changed this way.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ShapeNotFound`] if the shape does not exist,
    /// [`CanvasError::InvalidOperation`] if the closure changed the id or
    /// parent, and [`CanvasError::InvalidGeometry`] if the result is not
    /// finite.
    pub fn update_shape<F>(&mut self, id: ShapeId, f: F) -> CanvasResult<()>
    where
        F: FnOnce(&mut Shape),
    {
        let current = self
            .shapes
            .get(&id)
            .ok_or_else(|| CanvasError::ShapeNotFound(id.to_string()))?;
        let mut updated = current.clone();
        f(&mut updated);
        if updated.id != current.id || updated.parent != current.parent {
            return Err(CanvasError::InvalidOperation(format!(
                "cannot change the identity or parent of {id}"
            )));
        }
        if !updated.has_finite_geometry() {
            return Err(CanvasError::InvalidGeometry(id.to_string()));
        }
        self.shapes.insert(id, updated);
        Ok(())
    }

    /// Delete shapes, their descendants and every binding touching them.
    ///
    /// Unknown ids are ignored.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) {
        let mut doomed = Vec::new();
        for &id in ids {
            self.collect_subtree(id, &mut doomed);
        }
        if doomed.is_empty() {
            return;
        }
        tracing::debug!("Deleting {} shapes", doomed.len());

        for id in &doomed {
            if let Some(shape) = self.shapes.remove(id) {
                self.child_list_mut(shape.parent).retain(|c| c != id);
            }
            self.children.remove(id);
        }
        self.bindings
            .retain(|_, b| !doomed.contains(&b.arrow) && !doomed.contains(&b.target));
        self.selected.retain(|id| !doomed.contains(id));
    }

    /// Translate shapes by a page-space delta.
    ///
    /// Unknown ids are ignored.
    pub fn nudge_shapes(&mut self, ids: &[ShapeId], delta: Vec2) {
        for &id in ids {
            let Some(parent) = self.shapes.get(&id).map(|s| s.parent) else {
                continue;
            };
            let parent_rotation = parent
                .and_then(|p| self.page_transform(p))
                .map_or(0.0, |t| t.rotation);
            let local = delta.rot(-parent_rotation);
            if let Some(shape) = self.shapes.get_mut(&id) {
                shape.x += local.x;
                shape.y += local.y;
            }
        }
    }

    fn collect_subtree(&self, id: ShapeId, out: &mut Vec<ShapeId>) {
        if !self.shapes.contains_key(&id) || out.contains(&id) {
            return;
        }
        out.push(id);
        if let Some(children) = self.children.get(&id) {
            for &child in children {
                self.collect_subtree(child, out);
            }
        }
    }

    fn child_list_mut(&mut self, parent: Option<ShapeId>) -> &mut Vec<ShapeId> {
        match parent {
            None => &mut self.root,
            Some(p) => self.children.entry(p).or_default(),
        }
    }

    // -----------------------------------------------------------------------
    // Sibling ordering
    // -----------------------------------------------------------------------

    /// Children of `parent` (or top-level shapes for `None`) in paint order.
    #[must_use]
    pub fn sorted_child_ids(&self, parent: Option<ShapeId>) -> Vec<ShapeId> {
        match parent {
            None => self.root.clone(),
            Some(p) => self.children.get(&p).cloned().unwrap_or_default(),
        }
    }

    /// Rewrite the paint order of `parent`'s children.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidOperation`] unless `order` is a
    /// permutation of the current children.
    pub fn reorder_children(&mut self, parent: Option<ShapeId>, order: &[ShapeId]) -> CanvasResult<()> {
        let mut current = self.sorted_child_ids(parent);
        let mut proposed = order.to_vec();
        current.sort_unstable();
        proposed.sort_unstable();
        if current != proposed {
            return Err(CanvasError::InvalidOperation(
                "new order must contain exactly the existing children".to_string(),
            ));
        }
        *self.child_list_mut(parent) = order.to_vec();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Page geometry
    // -----------------------------------------------------------------------

    /// Transform from a shape's local space to page space.
    #[must_use]
    pub fn page_transform(&self, id: ShapeId) -> Option<PageTransform> {
        let shape = self.shapes.get(&id)?;
        let base = match shape.parent {
            None => PageTransform::identity(),
            Some(parent) => self.page_transform(parent)?,
        };
        Some(base.compose(shape.position(), shape.rotation))
    }

    /// Accumulated rotation of a shape in page space.
    #[must_use]
    pub fn page_rotation(&self, id: ShapeId) -> Option<f64> {
        self.page_transform(id).map(|t| t.rotation)
    }

    /// Axis-aligned page bounds of a shape.
    ///
    /// Groups cover their children; arrows cover their two terminals.
    /// Returns `None` for unknown shapes and empty groups.
    #[must_use]
    pub fn page_bounds(&self, id: ShapeId) -> Option<Bounds> {
        let shape = self.shapes.get(&id)?;
        match &shape.kind {
            ShapeKind::Group => self
                .children
                .get(&id)?
                .iter()
                .filter_map(|&child| self.page_bounds(child))
                .reduce(|a, b| a.union(&b)),
            ShapeKind::Arrow(props) => {
                let t = self.page_transform(id)?;
                Bounds::from_points([t.apply(props.start), t.apply(props.end)])
            }
            _ => {
                let t = self.page_transform(id)?;
                Bounds::from_points(
                    [
                        Vec2::zero(),
                        Vec2::new(shape.w, 0.0),
                        Vec2::new(shape.w, shape.h),
                        Vec2::new(0.0, shape.h),
                    ]
                    .map(|corner| t.apply(corner)),
                )
            }
        }
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Group sibling shapes under a new group shape.
    ///
    /// The group is positioned at the children's common page bounds and the
    /// children keep their page positions.
    ///
    /// # Errors
    ///
    /// Returns an error if `ids` is empty, a shape is missing, the shapes do
    /// not share a parent, or `group_id` is already taken.
    pub fn group_shapes(&mut self, ids: &[ShapeId], group_id: ShapeId) -> CanvasResult<ShapeId> {
        let first = ids
            .first()
            .ok_or_else(|| CanvasError::InvalidOperation("cannot group zero shapes".into()))?;
        let parent = self
            .shapes
            .get(first)
            .ok_or_else(|| CanvasError::ShapeNotFound(first.to_string()))?
            .parent;
        let mut bounds: Option<Bounds> = None;
        for &id in ids {
            let shape = self
                .shapes
                .get(&id)
                .ok_or_else(|| CanvasError::ShapeNotFound(id.to_string()))?;
            if shape.parent != parent {
                return Err(CanvasError::InvalidOperation(
                    "grouped shapes must share a parent".to_string(),
                ));
            }
            let b = self
                .page_bounds(id)
                .ok_or_else(|| CanvasError::InvalidOperation(format!("{id} has no bounds")))?;
            bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
        }
        let bounds = bounds.unwrap_or_default();

        self.transact(|doc| {
            let parent_transform = parent
                .and_then(|p| doc.page_transform(p))
                .unwrap_or_else(PageTransform::identity);
            let origin = parent_transform.invert_point(bounds.point());

            let siblings = doc.sorted_child_ids(parent);
            let insert_at = siblings
                .iter()
                .position(|s| ids.contains(s))
                .unwrap_or(siblings.len());
            let members: Vec<ShapeId> = siblings.into_iter().filter(|s| ids.contains(s)).collect();

            let mut group = Shape::new(ShapeKind::Group)
                .with_id(group_id)
                .with_position(origin.x, origin.y)
                .with_size(bounds.w, bounds.h);
            group.parent = parent;
            doc.create_shape(group)?;

            // Move the group from the end of the list to the first member's slot.
            let list = doc.child_list_mut(parent);
            list.retain(|s| *s != group_id && !members.contains(s));
            list.insert(insert_at.min(list.len()), group_id);

            let group_transform = parent_transform.compose(origin, 0.0);
            for &member in &members {
                let page = doc
                    .page_transform(member)
                    .ok_or_else(|| CanvasError::ShapeNotFound(member.to_string()))?;
                let local = group_transform.invert_point(page.translation);
                if let Some(shape) = doc.shapes.get_mut(&member) {
                    shape.x = local.x;
                    shape.y = local.y;
                    shape.rotation = page.rotation - group_transform.rotation;
                    shape.parent = Some(group_id);
                }
            }
            doc.children.insert(group_id, members);
            Ok(group_id)
        })
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Register an asset.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateId`] if the id is taken.
    pub fn create_asset(&mut self, asset: Asset) -> CanvasResult<AssetId> {
        let id = asset.id;
        if self.assets.contains_key(&id) {
            return Err(CanvasError::DuplicateId(id.to_string()));
        }
        tracing::debug!("Registering {:?} asset {id} ({})", asset.kind, asset.name);
        self.assets.insert(id, Arc::new(asset));
        Ok(id)
    }

    /// Get an asset by ID.
    #[must_use]
    pub fn get_asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id).map(AsRef::as_ref)
    }

    /// All assets, in no particular order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values().map(AsRef::as_ref)
    }

    /// Number of registered assets.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// The still image behind an image shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is missing, is not an image, or its
    /// asset cannot be decoded.
    pub fn export_image(&self, id: ShapeId) -> CanvasResult<MediaPayload> {
        let shape = self
            .shapes
            .get(&id)
            .ok_or_else(|| CanvasError::ShapeNotFound(id.to_string()))?;
        let ShapeKind::Image { asset_id } = shape.kind else {
            return Err(CanvasError::InvalidOperation(format!(
                "{id} is a {} shape, not an image",
                shape.kind.type_name()
            )));
        };
        let asset = self
            .assets
            .get(&asset_id)
            .ok_or_else(|| CanvasError::AssetNotFound(asset_id.to_string()))?;
        MediaPayload::from_data_uri(&asset.src)
    }

    // -----------------------------------------------------------------------
    // Bindings
    // -----------------------------------------------------------------------

    /// Record an arrow binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the arrow or target shape does not exist, or the
    /// arrow is not an arrow shape.
    pub fn create_binding(&mut self, binding: ArrowBinding) -> CanvasResult<BindingId> {
        match self.shapes.get(&binding.arrow) {
            None => return Err(CanvasError::ShapeNotFound(binding.arrow.to_string())),
            Some(s) if !matches!(s.kind, ShapeKind::Arrow(_)) => {
                return Err(CanvasError::InvalidOperation(format!(
                    "{} is not an arrow",
                    binding.arrow
                )));
            }
            Some(_) => {}
        }
        if !self.shapes.contains_key(&binding.target) {
            return Err(CanvasError::ShapeNotFound(binding.target.to_string()));
        }
        if self.bindings.contains_key(&binding.id) {
            return Err(CanvasError::DuplicateId(binding.id.to_string()));
        }
        self.bindings.insert(binding.id, binding);
        Ok(binding.id)
    }

    /// All bindings, in no particular order.
    pub fn bindings(&self) -> impl Iterator<Item = &ArrowBinding> {
        self.bindings.values()
    }

    /// Bindings owned by an arrow, start terminal first.
    #[must_use]
    pub fn bindings_from_arrow(&self, arrow: ShapeId) -> Vec<&ArrowBinding> {
        let mut found: Vec<_> = self.bindings.values().filter(|b| b.arrow == arrow).collect();
        found.sort_by_key(|b| b.terminal == crate::Terminal::End);
        found
    }

    /// Bindings that reference `shape` as either the arrow or the target.
    #[must_use]
    pub fn bindings_for(&self, shape: ShapeId) -> Vec<&ArrowBinding> {
        self.bindings
            .values()
            .filter(|b| b.arrow == shape || b.target == shape)
            .collect()
    }

    /// Bindings whose terminal attaches to `target`.
    #[must_use]
    pub fn bindings_to(&self, target: ShapeId) -> Vec<&ArrowBinding> {
        self.bindings
            .values()
            .filter(|b| b.target == target)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Replace the selection.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ShapeNotFound`] if any id is unknown; the
    /// selection is unchanged in that case.
    pub fn select(&mut self, ids: &[ShapeId]) -> CanvasResult<()> {
        if let Some(missing) = ids.iter().find(|id| !self.shapes.contains_key(id)) {
            return Err(CanvasError::ShapeNotFound(missing.to_string()));
        }
        self.selected.clear();
        for &id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        Ok(())
    }

    /// Clear the selection.
    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn selected_ids(&self) -> &[ShapeId] {
        &self.selected
    }

    /// Selected shapes in selection order.
    #[must_use]
    pub fn selected_shapes(&self) -> Vec<&Shape> {
        self.selected
            .iter()
            .filter_map(|id| self.shapes.get(id))
            .collect()
    }

    /// Union of the selected shapes' page bounds.
    #[must_use]
    pub fn selection_page_bounds(&self) -> Option<Bounds> {
        self.selected
            .iter()
            .filter_map(|&id| self.page_bounds(id))
            .reduce(|a, b| a.union(&b))
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------

    /// Current camera.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Set the screen viewport size.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// The part of the page currently visible.
    #[must_use]
    pub fn viewport_page_bounds(&self) -> Bounds {
        Bounds::new(
            -self.camera.x,
            -self.camera.y,
            self.viewport_width / self.camera.zoom,
            self.viewport_height / self.camera.zoom,
        )
    }

    /// The most recent framing request.
    #[must_use]
    pub fn last_frame(&self) -> Option<FrameRequest> {
        self.last_frame
    }

    /// Frame the selection. No-op for an empty selection.
    pub fn zoom_to_selection(&mut self, animation: Option<Duration>) {
        if let Some(bounds) = self.selection_page_bounds() {
            self.zoom_to_bounds(bounds, animation);
        }
    }

    /// Pan to the selection only if part of it is outside the viewport
    /// (shrunk by `inset` screen pixels).
    pub fn zoom_to_selection_if_offscreen(&mut self, inset: f64) {
        let Some(bounds) = self.selection_page_bounds() else {
            return;
        };
        let visible = self
            .viewport_page_bounds()
            .expand_by(-inset / self.camera.zoom);
        if visible.contains(&bounds) {
            return;
        }
        let fits = bounds.w * self.camera.zoom <= self.viewport_width - inset * 2.0
            && bounds.h * self.camera.zoom <= self.viewport_height - inset * 2.0;
        if fits {
            self.center_on(bounds.center(), self.camera.zoom);
            self.last_frame = Some(FrameRequest {
                bounds,
                animation: None,
            });
        } else {
            self.zoom_to_bounds(bounds, None);
        }
    }

    /// Frame every shape on the page.
    pub fn zoom_to_fit(&mut self) {
        let bounds = self
            .root
            .iter()
            .filter_map(|&id| self.page_bounds(id))
            .reduce(|a, b| a.union(&b));
        if let Some(bounds) = bounds {
            self.zoom_to_bounds(bounds, None);
        }
    }

    fn zoom_to_bounds(&mut self, bounds: Bounds, animation: Option<Duration>) {
        let avail_w = (self.viewport_width - FRAME_INSET * 2.0).max(1.0);
        let avail_h = (self.viewport_height - FRAME_INSET * 2.0).max(1.0);
        let fit = (avail_w / bounds.w.max(1.0)).min(avail_h / bounds.h.max(1.0));
        let zoom = fit.clamp(MIN_ZOOM, MAX_FRAME_ZOOM);
        self.center_on(bounds.center(), zoom);
        self.last_frame = Some(FrameRequest { bounds, animation });
    }

    fn center_on(&mut self, center: Vec2, zoom: f64) {
        self.camera = Camera {
            x: self.viewport_width / 2.0 / zoom - center.x,
            y: self.viewport_height / 2.0 / zoom - center.y,
            zoom,
        };
    }

    // -----------------------------------------------------------------------
    // Snapshot access for the schema module
    // -----------------------------------------------------------------------

    pub(crate) fn viewport_size(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }

    pub(crate) fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }
}
