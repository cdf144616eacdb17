//! Shared types for Threadloom.
//!
//! Holds the generation request / calendar result data model, the
//! completion-client abstraction used by the daemon, and the pure
//! tabular export consumed by threadloomctl.

pub mod export;
pub mod llm_client;
pub mod types;

pub use llm_client::{
    ChatMessage, CompletionClient, CompletionConfig, CompletionError, HttpCompletionClient,
    ScriptedCompletionClient,
};
pub use types::{
    CalendarResult, DraftCalendar, DraftComment, DraftPost, EnrichedComment, EnrichedPost,
    GenerationRequest, Persona,
};
