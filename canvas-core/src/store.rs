//! Shared document storage.
//!
//! [`SharedDocument`] wraps a [`Document`] so the orchestrator, command
//! handlers and background tasks all mutate the same canvas. Locks are
//! scoped to a closure and can never be held across an `.await`.

use std::sync::{Arc, RwLock};

use crate::{CanvasResult, Document};

/// Thread-safe document handle.
///
/// # Example
///
/// ```
/// use genai_canvas_core::store::SharedDocument;
/// use genai_canvas_core::Shape;
///
/// let doc = SharedDocument::default();
/// let id = doc.update(|d| d.create_shape(Shape::text("Hello"))).unwrap();
/// assert!(doc.read(|d| d.contains_shape(id)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    inner: Arc<RwLock<Document>>,
}

impl SharedDocument {
    /// Wrap an existing document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            inner: Arc::new(RwLock::new(document)),
        }
    }

    /// Read the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let doc = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&doc)
    }

    /// Mutate the document.
    pub fn update<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut doc = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut doc)
    }

    /// Mutate the document atomically; on error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns whatever error `f` returns.
    pub fn transact<T>(
        &self,
        f: impl FnOnce(&mut Document) -> CanvasResult<T>,
    ) -> CanvasResult<T> {
        self.update(|doc| doc.transact(f))
    }

    /// Serialize the current document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        self.read(Document::to_json)
    }
}
