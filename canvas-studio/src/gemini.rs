//! Client for the Gemini API (Gemini, Imagen and Veo models).
//!
//! Speaks the `v1beta` REST surface: `generateContent` for description and
//! image edits, `predict` for Imagen and `predictLongRunning` plus operation
//! polling for Veo.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use genai_canvas_core::MediaPayload;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::generator::{GenerateError, Generator};

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Prompt sent alongside an image to describe it.
const DESCRIBE_PROMPT: &str = "Describe the image";

/// Aspect ratio of generated media.
const ASPECT_RATIO: &str = "16:9";

/// MIME type requested from Imagen.
const IMAGE_MIME: &str = "image/jpeg";

/// MIME type of downloaded Veo samples.
const VIDEO_MIME: &str = "video/mp4";

/// Model names, endpoint and polling for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Service root, e.g. [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Model used to describe images.
    pub describe_model: String,
    /// Model used for text-to-image.
    pub image_model: String,
    /// Model used for image edits.
    pub image_edit_model: String,
    /// Model used for video.
    pub video_model: String,
    /// Delay between video operation polls.
    pub poll_interval: Duration,
}

impl GeminiConfig {
    /// Default models against the public endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            describe_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-4.0-fast-generate-001".to_string(),
            image_edit_model: "gemini-2.5-flash-image-preview".to_string(),
            video_model: "veo-3.0-fast-generate-001".to_string(),
            poll_interval: Duration::from_secs(10),
        }
    }

    /// Use a different service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different video polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Asynchronous Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    base: Url,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidUrl`] if the base URL is malformed.
    /// Returns [`GenerateError::Http`] if the HTTP client fails to build.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerateError> {
        let mut base =
            Url::parse(&config.base_url).map_err(|e| GenerateError::InvalidUrl(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("genai-canvas/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient { http, base, config }),
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.inner.config
    }

    fn endpoint(&self, relative: &str) -> Result<Url, GenerateError> {
        self.inner
            .base
            .join(relative)
            .map_err(|e| GenerateError::InvalidUrl(e.to_string()))
    }

    fn model_endpoint(&self, model: &str, method: &str) -> Result<Url, GenerateError> {
        self.endpoint(&format!("v1beta/models/{model}:{method}"))
    }

    async fn post<T: DeserializeOwned>(&self, url: Url, body: &Value) -> Result<T, GenerateError> {
        debug!("POST {}", url.path());
        let response = self
            .inner
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.inner.config.api_key)
            .json(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, GenerateError> {
        let response = self
            .inner
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.inner.config.api_key)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GenerateError> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body).map_or_else(
                |_| String::from_utf8_lossy(&body).into_owned(),
                |envelope| envelope.error.message,
            );
            return Err(GenerateError::Api {
                code: i64::from(status.as_u16()),
                message,
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<Part>,
    ) -> Result<GenerateContentResponse, GenerateError> {
        let url = self.model_endpoint(model, "generateContent")?;
        let body = json!({ "contents": [{ "parts": parts }] });
        self.post(url, &body).await
    }

    async fn imagen(&self, prompt: &str, count: u32) -> Result<Vec<MediaPayload>, GenerateError> {
        let url = self.model_endpoint(&self.inner.config.image_model, "predict")?;
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": count,
                "aspectRatio": ASPECT_RATIO,
                "outputOptions": { "mimeType": IMAGE_MIME },
            },
        });
        let response: PredictResponse = self.post(url, &body).await?;

        let mut images = Vec::new();
        let mut filtered = None;
        for prediction in response.predictions {
            match prediction.bytes_base64_encoded {
                Some(bytes) => {
                    let mime = prediction.mime_type.as_deref().unwrap_or(IMAGE_MIME);
                    images.push(decode(mime, &bytes)?);
                }
                None => {
                    if filtered.is_none() {
                        filtered = prediction.rai_filtered_reason;
                    }
                }
            }
        }
        match filtered {
            Some(reason) if images.is_empty() => Err(GenerateError::Filtered(reason)),
            _ => Ok(images),
        }
    }

    async fn edit_image(
        &self,
        prompt: &str,
        image: &MediaPayload,
    ) -> Result<Vec<MediaPayload>, GenerateError> {
        let response = self
            .generate_content(
                &self.inner.config.image_edit_model,
                vec![Part::inline(image), Part::text(prompt)],
            )
            .await?;
        let inline = response
            .first_parts()
            .iter()
            .find_map(|part| part.inline_data.as_ref())
            .ok_or_else(|| GenerateError::NoImageData {
                prompt: prompt.to_string(),
            })?;
        Ok(vec![decode(&inline.mime_type, &inline.data)?])
    }

    async fn poll_operation(&self, mut operation: Operation) -> Result<Operation, GenerateError> {
        let url = self.endpoint(&format!("v1beta/{}", operation.name))?;
        while !operation.done {
            tokio::time::sleep(self.inner.config.poll_interval).await;
            debug!("Polling video operation {}", operation.name);
            operation = self.get(url.clone()).await?;
        }
        Ok(operation)
    }

    async fn download(&self, uri: &str) -> Result<MediaPayload, GenerateError> {
        let url = Url::parse(uri).map_err(|e| GenerateError::InvalidUrl(e.to_string()))?;
        let response = self
            .inner
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.inner.config.api_key)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(MediaPayload::new(VIDEO_MIME, bytes.to_vec()))
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn describe(&self, image: &MediaPayload) -> Result<String, GenerateError> {
        let response = self
            .generate_content(
                &self.inner.config.describe_model,
                vec![Part::text(DESCRIBE_PROMPT), Part::inline(image)],
            )
            .await?;
        let text: String = response
            .first_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            return Err(GenerateError::Unexpected(
                "description response contained no text".to_string(),
            ));
        }
        Ok(text)
    }

    async fn generate_images(
        &self,
        prompt: &str,
        image: Option<&MediaPayload>,
        count: u32,
    ) -> Result<Vec<MediaPayload>, GenerateError> {
        let images = match image {
            Some(image) => self.edit_image(prompt, image).await?,
            None => self.imagen(prompt, count).await?,
        };
        info!("Generated {} image(s)", images.len());
        Ok(images)
    }

    async fn generate_videos(
        &self,
        image: Option<&MediaPayload>,
        prompt: &str,
        count: u32,
    ) -> Result<Vec<MediaPayload>, GenerateError> {
        let url = self.model_endpoint(&self.inner.config.video_model, "predictLongRunning")?;
        let mut instance = json!({ "prompt": prompt });
        if let Some(image) = image {
            instance["image"] = json!({
                "bytesBase64Encoded": image.to_base64(),
                "mimeType": image.mime_type,
            });
        }
        let body = json!({
            "instances": [instance],
            "parameters": { "aspectRatio": ASPECT_RATIO, "sampleCount": count },
        });

        let started: Operation = self.post(url, &body).await?;
        info!("Started video operation {}", started.name);
        let operation = self.poll_operation(started).await?;

        if let Some(error) = operation.error {
            warn!("Video operation {} failed: {}", operation.name, error.message);
            return Err(GenerateError::Api {
                code: error.code,
                message: error.message,
            });
        }
        let Some(result) = operation
            .response
            .and_then(|response| response.generate_video_response)
        else {
            return Ok(Vec::new());
        };

        if result.rai_media_filtered_count > 0 {
            if let Some(reason) = result.rai_media_filtered_reasons.into_iter().next() {
                return Err(GenerateError::Filtered(reason));
            }
        }

        let uris: Vec<String> = result
            .generated_samples
            .into_iter()
            .filter_map(|sample| sample.video.and_then(|video| video.uri))
            .collect();
        try_join_all(uris.iter().map(|uri| self.download(uri))).await
    }
}

fn decode(mime_type: &str, data: &str) -> Result<MediaPayload, GenerateError> {
    MediaPayload::from_base64(mime_type, data).map_err(|e| GenerateError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline(media: &MediaPayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: media.mime_type.clone(),
                data: media.to_base64(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map_or(&[], |content| content.parts.as_slice())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
    rai_filtered_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<Status>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<VideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResponse {
    #[serde(default)]
    generated_samples: Vec<Sample>,
    #[serde(default)]
    rai_media_filtered_count: u32,
    #[serde(default)]
    rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Sample {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Status,
}
