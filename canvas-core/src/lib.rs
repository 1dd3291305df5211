//! # GenAI Canvas Core
//!
//! Document model and layout engine for a generative-AI canvas.
//! Synchronous and runtime-free; the async orchestration lives in
//! `genai-canvas-studio`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              genai-canvas-core              │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Layout                  │
//! │  - Shapes/groups │  - Placement sweep       │
//! │  - Assets        │  - Arrow bindings        │
//! │  - Selection     │  - Placeholders          │
//! ├─────────────────────────────────────────────┤
//! │  Geometry        │  UI logic                │
//! │  - Bounds        │  - Contextual toolbar    │
//! │  - Transforms    │  - First-run gate        │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arrow;
pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod media;
pub mod onboarding;
pub mod placeholder;
pub mod placement;
pub mod schema;
pub mod store;
pub mod toolbar;

pub use arrow::{connect, Anchor, ConnectOptions};
pub use document::{Camera, Document, FrameRequest};
pub use element::{
    ArrowBinding, ArrowProps, Asset, AssetId, BindingId, GeoKind, MediaKind, Shape, ShapeId,
    ShapeKind, Terminal, VIDEO_HEIGHT, VIDEO_WIDTH,
};
pub use error::{CanvasError, CanvasResult};
pub use geometry::{Bounds, PageTransform, Vec2};
pub use media::MediaPayload;
pub use onboarding::FirstRunGate;
pub use placeholder::{remove_placeholder, show_placeholder, Placeholder};
pub use placement::{place_new_shape, SPACING_BETWEEN_OBJECTS};
pub use schema::DocumentSnapshot;
pub use store::SharedDocument;
pub use toolbar::{contextual_actions, toolbar_anchor, ContextAction, SelectionSummary};

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
