// Core NoorAI functionality:
// - Gemini API client and wire types
// - Configuration loading
// - Conversation history and request assembly
// - Prompt templates and the guidance flows
// - Shared error types

// Export client module - API client for Gemini
pub mod client;
pub use client::*;

// Export types module - Gemini request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

pub mod history;
pub use history::{Conversation, Role, Turn};

pub mod request;
pub use request::{validate_input, GuidanceRequest, HistoryWindow, RequestAssembler};

pub mod prompt;
pub use prompt::{PromptKind, PromptTemplates};

pub mod guidance;
pub use guidance::*;

pub mod session;
pub use session::{GuidanceSession, Outcome};
