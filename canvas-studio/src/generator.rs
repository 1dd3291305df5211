//! The generation collaborator contract.
//!
//! The orchestrator only sees this trait; the Gemini client is one
//! implementation and tests supply scripted fakes.

use async_trait::async_trait;
use genai_canvas_core::MediaPayload;
use thiserror::Error;

/// Errors reported by a generation collaborator.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The configured endpoint URL is invalid.
    #[error("invalid generation endpoint URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// A payload could not be parsed.
    #[error("failed to parse generation payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The service rejected the request.
    #[error("generation API error {code}: {message}")]
    Api {
        /// Status code reported by the service.
        code: i64,
        /// Human readable message.
        message: String,
    },
    /// Output was withheld by content moderation. Displays the reason only.
    #[error("{0}")]
    Filtered(String),
    /// An image edit returned no image.
    #[error("No image data found for prompt: {prompt}")]
    NoImageData {
        /// The prompt that produced nothing.
        prompt: String,
    },
    /// The request succeeded but produced no media.
    #[error("the model returned no results")]
    NoResults,
    /// Returned media could not be decoded.
    #[error("failed to decode generated media: {0}")]
    Decode(String),
    /// The response did not have the expected shape.
    #[error("unexpected generation response: {0}")]
    Unexpected(String),
}

/// Remote generative model operations.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Describe an image in prose.
    async fn describe(&self, image: &MediaPayload) -> Result<String, GenerateError>;

    /// Generate `count` images from a prompt, or edit `image` (at most one
    /// result) when one is given.
    async fn generate_images(
        &self,
        prompt: &str,
        image: Option<&MediaPayload>,
        count: u32,
    ) -> Result<Vec<MediaPayload>, GenerateError>;

    /// Generate `count` videos from a prompt and optional start image.
    async fn generate_videos(
        &self,
        image: Option<&MediaPayload>,
        prompt: &str,
        count: u32,
    ) -> Result<Vec<MediaPayload>, GenerateError>;
}
