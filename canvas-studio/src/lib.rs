//! # GenAI Canvas Studio
//!
//! Generation orchestration for GenAI Canvas: the collaborator contract,
//! a Gemini/Imagen/Veo client, the request orchestrator and the prompt bar
//! flows. This library is used by both the binary and integration tests.

pub mod commands;
pub mod config;
pub mod gemini;
pub mod generator;
pub mod orchestrator;
pub mod prompt;

pub use commands::{execute, new_document, CommandError};
pub use config::{CliArgs, Command, ConfigError};
pub use gemini::{GeminiClient, GeminiConfig};
pub use generator::{GenerateError, Generator};
pub use orchestrator::{
    ActionError, Orchestrator, OrchestratorConfig, Outcome, RequestPhase, Severity, Toast,
};
pub use prompt::{stage, submit, PromptAction, PromptSubmission};
