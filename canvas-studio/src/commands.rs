//! Command execution shared by the binary and integration tests.

use std::path::Path;

use genai_canvas_core::{Document, SharedDocument};
use thiserror::Error;
use tracing::info;

use crate::config::{load_image, Command, ConfigError};
use crate::orchestrator::{ActionError, Orchestrator, Severity, Toast};
use crate::prompt::{stage, submit, PromptAction, PromptSubmission};

/// Errors from running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A local input could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The action failed.
    #[error(transparent)]
    Action(#[from] ActionError),
}

impl CommandError {
    /// The notification to show for this error.
    #[must_use]
    pub fn toast(&self) -> Toast {
        match self {
            Self::Config(e) => Toast {
                title: e.to_string(),
                severity: Severity::Error,
            },
            Self::Action(e) => e.toast(),
        }
    }
}

/// Run `command` against the orchestrator's document.
///
/// # Errors
///
/// Returns [`CommandError::Config`] if an input image cannot be loaded, or
/// the action's failure.
pub async fn execute(orchestrator: &Orchestrator, command: &Command) -> Result<(), CommandError> {
    match command {
        Command::Image { prompt, image, .. } => {
            let submission = build_submission(prompt, image.as_deref(), PromptAction::Image)?;
            submit(orchestrator, submission).await?;
        }
        Command::Video { prompt, image } => {
            let submission = build_submission(prompt, image.as_deref(), PromptAction::Video)?;
            submit(orchestrator, submission).await?;
        }
        Command::Describe { image } => {
            let payload = load_image(image)?;
            let upload = PromptSubmission::new("", PromptAction::Image).with_image(&payload);
            let _permit = orchestrator.begin()?;
            stage(orchestrator.document(), &upload).map_err(ActionError::from)?;
            orchestrator.describe_selected().await?;
        }
    }
    orchestrator.document().update(Document::zoom_to_fit);
    info!(
        "Command finished with {} shape(s) on the canvas",
        orchestrator.document().read(Document::shape_count)
    );
    Ok(())
}

fn build_submission(
    prompt: &str,
    image: Option<&Path>,
    action: PromptAction,
) -> Result<PromptSubmission, ConfigError> {
    let mut submission = PromptSubmission::new(prompt, action);
    if let Some(path) = image {
        submission = submission.with_image(&load_image(path)?);
    }
    Ok(submission)
}

/// A fresh document sized to the given viewport.
#[must_use]
pub fn new_document(width: u32, height: u32) -> SharedDocument {
    SharedDocument::new(Document::new(f64::from(width), f64::from(height)))
}
