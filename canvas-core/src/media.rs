//! Encoded media payloads and data URI conversion.
//!
//! Generated images and videos travel through the canvas as raw encoded
//! bytes plus a MIME type. Assets store them as data URIs such as
//! `data:image/jpeg;base64,/9j/4AAQ...`.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// Encoded media bytes (JPEG, PNG, MP4, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPayload {
    /// MIME type such as `image/jpeg` or `video/mp4`.
    pub mime_type: String,
    /// Encoded bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl MediaPayload {
    /// Create a payload from a MIME type and encoded bytes.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Decode a base64 string into a payload.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidMedia`] if the string is not valid base64.
    pub fn from_base64(mime_type: impl Into<String>, encoded: &str) -> CanvasResult<Self> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| CanvasError::InvalidMedia(format!("Failed to decode base64: {e}")))?;
        Ok(Self::new(mime_type, data))
    }

    /// The bytes as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Encode as a base64 data URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Parse a data URI.
    ///
    /// Accepts base64 and percent-encoded payloads. A missing MIME type
    /// defaults to `text/plain` as in RFC 2397.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidMedia`] if the URI is malformed.
    pub fn from_data_uri(uri: &str) -> CanvasResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| CanvasError::InvalidMedia("Not a data URI".to_string()))?;

        let (metadata, encoded) = rest
            .split_once(',')
            .ok_or_else(|| CanvasError::InvalidMedia("Invalid data URI: missing comma".into()))?;

        let is_base64 = metadata.ends_with(";base64");
        let mime_type = metadata
            .split(';')
            .next()
            .filter(|m| !m.is_empty())
            .unwrap_or("text/plain");

        if is_base64 {
            Self::from_base64(mime_type, encoded)
        } else {
            Ok(Self::new(mime_type, percent_decode(encoded)?))
        }
    }

    /// Whether the payload is an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

fn percent_decode(input: &str) -> CanvasResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| CanvasError::InvalidMedia("Invalid URL encoding".to_string()))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}
