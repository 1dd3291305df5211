//! Canvas records - shapes, assets and arrow bindings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Vec2;

/// Default media width (half of 1280).
pub const VIDEO_WIDTH: f64 = 1280.0 / 2.0;

/// Default media height (half of 720).
pub const VIDEO_HEIGHT: f64 = 720.0 / 2.0;

/// Estimated advance of one character of auto-sized text.
const TEXT_CHAR_WIDTH: f64 = 12.0;

/// Estimated height of one line of text.
const TEXT_LINE_HEIGHT: f64 = 32.0;

/// Minimum width of a text shape.
const TEXT_MIN_WIDTH: f64 = 32.0;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new unique ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Unique identifier for a shape.
    ShapeId
);
record_id!(
    /// Unique identifier for an asset.
    AssetId
);
record_id!(
    /// Unique identifier for an arrow binding.
    BindingId
);

/// Geometric marker styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoKind {
    /// Plain rectangle.
    Rectangle,
    /// Ellipse.
    Ellipse,
}

/// Visual properties of an arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowProps {
    /// Stroke color name.
    pub color: String,
    /// Dash style name.
    pub dash: String,
    /// Bend amount of the arc.
    pub bend: f64,
    /// Start terminal, relative to the arrow's origin.
    pub start: Vec2,
    /// End terminal, relative to the arrow's origin.
    pub end: Vec2,
}

/// The type of content a shape carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props", rename_all = "lowercase")]
pub enum ShapeKind {
    /// A text label.
    Text {
        /// Plain text, one paragraph per line.
        content: String,
        /// Whether the box follows the content.
        auto_size: bool,
    },

    /// A still image backed by an asset.
    Image {
        /// Referenced asset.
        asset_id: AssetId,
    },

    /// A video backed by an asset.
    Video {
        /// Referenced asset.
        asset_id: AssetId,
        /// Whether the video autoplays.
        playing: bool,
    },

    /// A geometric marker (used for placeholders).
    Geo {
        /// Marker style.
        geo: GeoKind,
    },

    /// A container for other shapes.
    Group,

    /// A directed connector.
    Arrow(ArrowProps),
}

impl ShapeKind {
    /// Short tag naming the type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Geo { .. } => "geo",
            Self::Group => "group",
            Self::Arrow(_) => "arrow",
        }
    }

    /// The asset referenced by a media shape.
    #[must_use]
    pub fn asset_id(&self) -> Option<AssetId> {
        match self {
            Self::Image { asset_id } | Self::Video { asset_id, .. } => Some(*asset_id),
            _ => None,
        }
    }
}

/// A positioned, sized visual object.
///
/// `x`/`y` are relative to the parent shape, or page coordinates for
/// top-level shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier.
    pub id: ShapeId,
    /// Shape content type.
    pub kind: ShapeKind,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
    /// Rotation in radians, relative to the parent.
    pub rotation: f64,
    /// Containing group, if any.
    pub parent: Option<ShapeId>,
}

impl Shape {
    /// Create a new shape with the given kind at the origin.
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: ShapeId::new(),
            kind,
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 100.0,
            rotation: 0.0,
            parent: None,
        }
    }

    /// An auto-sized text shape.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        let (w, h) = estimate_text_size(&content);
        Self::new(ShapeKind::Text {
            content,
            auto_size: true,
        })
        .with_size(w, h)
    }

    /// A fixed-width text shape; height follows the wrapped content.
    #[must_use]
    pub fn text_with_width(content: impl Into<String>, width: f64) -> Self {
        let content = content.into();
        let (natural_w, line_h) = estimate_text_size(&content);
        let wrapped_lines = (natural_w / width.max(TEXT_MIN_WIDTH)).ceil().max(1.0);
        Self::new(ShapeKind::Text {
            content,
            auto_size: false,
        })
        .with_size(width, line_h * wrapped_lines)
    }

    /// An image shape of default media size.
    #[must_use]
    pub fn image(asset_id: AssetId) -> Self {
        Self::new(ShapeKind::Image { asset_id }).with_size(VIDEO_WIDTH, VIDEO_HEIGHT)
    }

    /// A playing video shape of default media size.
    #[must_use]
    pub fn video(asset_id: AssetId) -> Self {
        Self::new(ShapeKind::Video {
            asset_id,
            playing: true,
        })
        .with_size(VIDEO_WIDTH, VIDEO_HEIGHT)
    }

    /// A rectangle marker.
    #[must_use]
    pub fn geo(w: f64, h: f64) -> Self {
        Self::new(ShapeKind::Geo {
            geo: GeoKind::Rectangle,
        })
        .with_size(w, h)
    }

    /// Use a specific identity.
    #[must_use]
    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.w = w;
        self.h = h;
        self
    }

    /// Set the rotation in radians.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the parent.
    #[must_use]
    pub fn with_parent(mut self, parent: ShapeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Local position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Whether position, size and rotation are all finite.
    #[must_use]
    pub fn has_finite_geometry(&self) -> bool {
        [self.x, self.y, self.w, self.h, self.rotation]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Text content, for text shapes.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            ShapeKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Non-empty paragraphs of a text shape, in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.text_content()
            .unwrap_or_default()
            .lines()
            .filter(|line| !line.trim().is_empty())
    }
}

#[allow(clippy::cast_precision_loss)]
fn estimate_text_size(content: &str) -> (f64, f64) {
    let lines = content.lines().count().max(1);
    let longest = content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let w = (longest as f64 * TEXT_CHAR_WIDTH).max(TEXT_MIN_WIDTH);
    (w, lines as f64 * TEXT_LINE_HEIGHT)
}

/// The kind of media an asset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

/// A binary media resource referenced by shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier.
    pub id: AssetId,
    /// Media kind.
    pub kind: MediaKind,
    /// Display name.
    pub name: String,
    /// Inline data URI.
    pub src: String,
    /// MIME type.
    pub mime_type: String,
    /// Display width.
    pub w: f64,
    /// Display height.
    pub h: f64,
    /// Whether the media animates.
    pub is_animated: bool,
}

impl Asset {
    /// A still image asset of default media size.
    #[must_use]
    pub fn image(name: impl Into<String>, src: impl Into<String>, mime_type: &str) -> Self {
        Self {
            id: AssetId::new(),
            kind: MediaKind::Image,
            name: name.into(),
            src: src.into(),
            mime_type: mime_type.to_string(),
            w: VIDEO_WIDTH,
            h: VIDEO_HEIGHT,
            is_animated: false,
        }
    }

    /// An animated video asset of default media size.
    #[must_use]
    pub fn video(name: impl Into<String>, src: impl Into<String>, mime_type: &str) -> Self {
        Self {
            id: AssetId::new(),
            kind: MediaKind::Video,
            name: name.into(),
            src: src.into(),
            mime_type: mime_type.to_string(),
            w: VIDEO_WIDTH,
            h: VIDEO_HEIGHT,
            is_animated: true,
        }
    }

    /// Use a specific identity.
    #[must_use]
    pub fn with_id(mut self, id: AssetId) -> Self {
        self.id = id;
        self
    }
}

/// Which end of an arrow a binding attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    /// The tail.
    Start,
    /// The head.
    End,
}

/// How an arrow terminal attaches to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowBinding {
    /// Unique identifier.
    pub id: BindingId,
    /// The arrow shape.
    pub arrow: ShapeId,
    /// The shape the terminal attaches to.
    pub target: ShapeId,
    /// Which end of the arrow.
    pub terminal: Terminal,
    /// Anchor within the target's bounds, 0..1 on each axis.
    pub normalized_anchor: Vec2,
    /// Whether the arrow points exactly at the anchor.
    pub is_exact: bool,
    /// Whether the anchor is pinned rather than snapped to the centre.
    pub is_precise: bool,
}
