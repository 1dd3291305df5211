//! First-run getting-started gate.
//!
//! Whether the user has been here before is injected by the host along with
//! a callback that records the dismissal; the core keeps no global state.

use std::fmt;

/// Text shown to first-time users.
pub const GETTING_STARTED: &str = "\
Getting started
  1. Select a text shape and choose \"Generate image\" to turn it into pictures.
  2. Select an image to describe it, or add text to edit it.
  3. Select text and/or an image and choose \"Generate video\" to animate it.
Generated shapes are linked to their sources with arrows.";

/// Gate around the getting-started overlay.
pub struct FirstRunGate {
    has_visited: bool,
    on_dismiss: Option<Box<dyn FnOnce() + Send>>,
}

impl FirstRunGate {
    /// Create a gate from the stored flag and a callback that persists the
    /// dismissal.
    #[must_use]
    pub fn new(has_visited: bool, on_dismiss: impl FnOnce() + Send + 'static) -> Self {
        Self {
            has_visited,
            on_dismiss: Some(Box::new(on_dismiss)),
        }
    }

    /// Whether the overlay should be shown.
    #[must_use]
    pub fn should_show(&self) -> bool {
        !self.has_visited
    }

    /// Hide the overlay. The callback runs at most once.
    pub fn dismiss(&mut self) {
        self.has_visited = true;
        if let Some(callback) = self.on_dismiss.take() {
            callback();
        }
    }
}

impl fmt::Debug for FirstRunGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstRunGate")
            .field("has_visited", &self.has_visited)
            .finish_non_exhaustive()
    }
}
