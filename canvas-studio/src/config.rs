//! Command-line configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use genai_canvas_core::{FirstRunGate, MediaPayload};
use thiserror::Error;

use crate::gemini::{GeminiConfig, DEFAULT_BASE_URL};
use crate::orchestrator::OrchestratorConfig;

/// Marker file recording that the getting-started text was shown.
const VISITED_MARKER: &str = "visited";

/// Errors raised while loading local configuration or inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file extension is not a supported image format.
    #[error("unsupported image file: {0}")]
    UnsupportedImage(PathBuf),
}

/// Command-line arguments for genai-canvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "genai-canvas")]
#[command(about = "Generate images, videos and descriptions onto a canvas")]
#[command(version)]
pub struct CliArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Gemini API root (e.g., <https://generativelanguage.googleapis.com>)
    #[arg(long, env = "GENAI_CANVAS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds between video status checks
    #[arg(long, env = "GENAI_CANVAS_POLL_SECS", default_value = "10")]
    pub poll_secs: u64,

    /// Directory for local state such as the first-run marker
    #[arg(long, env = "GENAI_CANVAS_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// What to generate
    #[command(subcommand)]
    pub command: Command,
}

/// Actions available from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate images from a prompt, or edit an image
    Image {
        /// Prompt text
        prompt: String,
        /// Image to edit
        #[arg(long)]
        image: Option<PathBuf>,
        /// Number of images for text-only prompts
        #[arg(long, default_value = "1")]
        count: u32,
    },
    /// Generate a video from a prompt and optional start image
    Video {
        /// Prompt text
        prompt: String,
        /// Start image
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Describe an image
    Describe {
        /// Image to describe
        image: PathBuf,
    },
}

impl CliArgs {
    /// Client configuration for the Gemini API.
    #[must_use]
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_poll_interval(Duration::from_secs(self.poll_secs))
    }

    /// Result counts for the orchestrator.
    #[must_use]
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        match self.command {
            Command::Image { count, .. } => OrchestratorConfig {
                image_count: count.max(1),
                ..OrchestratorConfig::default()
            },
            _ => OrchestratorConfig::default(),
        }
    }

    /// The state directory, defaulting to `~/.genai-canvas`.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".genai-canvas")
        })
    }
}

/// First-run gate backed by a marker file in `state_dir`.
///
/// Dismissing the gate writes the marker; a failed write is logged and the
/// text will show again next time.
#[must_use]
pub fn first_run_gate(state_dir: &Path) -> FirstRunGate {
    let marker = state_dir.join(VISITED_MARKER);
    let has_visited = marker.exists();
    let dir = state_dir.to_path_buf();
    FirstRunGate::new(has_visited, move || {
        let result = std::fs::create_dir_all(&dir).and_then(|()| std::fs::write(&marker, b""));
        if let Err(e) = result {
            tracing::warn!("Failed to record first run in {}: {}", dir.display(), e);
        }
    })
}

/// Read an image file, inferring its MIME type from the extension.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedImage`] for unknown extensions and
/// [`ConfigError::Read`] if the file cannot be read.
pub fn load_image(path: &Path) -> Result<MediaPayload, ConfigError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let mime_type = match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => return Err(ConfigError::UnsupportedImage(path.to_path_buf())),
    };
    let data = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(MediaPayload::new(mime_type, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["genai-canvas", "--api-key", "k"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).expect("parse")
    }

    #[test]
    fn test_image_command() {
        let args = parse(&["image", "a cat", "--count", "3"]);
        assert_eq!(
            args.command,
            Command::Image {
                prompt: "a cat".to_string(),
                image: None,
                count: 3,
            }
        );
        assert_eq!(args.orchestrator_config().image_count, 3);
    }

    #[test]
    fn test_gemini_config_from_args() {
        let args = parse(&[
            "--base-url",
            "http://localhost:9999",
            "--poll-secs",
            "2",
            "video",
            "waves",
        ]);
        let config = args.gemini_config();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(args.orchestrator_config(), OrchestratorConfig::default());
    }

    #[test]
    fn test_explicit_state_dir() {
        let args = parse(&["--state-dir", "/tmp/canvas-state", "describe", "cat.png"]);
        assert_eq!(args.state_dir(), PathBuf::from("/tmp/canvas-state"));
    }

    #[test]
    fn test_first_run_gate_writes_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = dir.path().join("state");

        let mut gate = first_run_gate(&state);
        assert!(gate.should_show());
        gate.dismiss();

        assert!(state.join(VISITED_MARKER).exists());
        assert!(!first_run_gate(&state).should_show());
    }

    #[test]
    fn test_load_image_infers_mime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("photo.JPG");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).expect("write");

        let payload = load_image(&path).expect("load");

        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.data, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_load_image_rejects_unknown_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").expect("write");

        assert!(matches!(
            load_image(&path),
            Err(ConfigError::UnsupportedImage(_))
        ));
        assert!(matches!(
            load_image(&dir.path().join("missing.png")),
            Err(ConfigError::Read { .. })
        ));
    }
}
