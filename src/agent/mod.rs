//! The planning agent: conversation state, termination policy, prompt
//! library, and the tool-orchestration loop.
//!
//! The loop follows a "tools in a loop" pattern:
//! 1. Build context with the system prompt and the trip request
//! 2. Call the LLM with the travel tools attached
//! 3. If the LLM requests tool calls, execute them in order and feed the
//!    results back
//! 4. Repeat until the LLM produces a final itinerary, or the tool-call
//!    ceiling forces one

mod agent_loop;
pub mod prompt;
mod state;
pub mod termination;

pub use agent_loop::{PlanOutcome, Planner};
pub use state::Conversation;

use thiserror::Error;

/// Hard failures that abort a planning request.
///
/// Transient data-source failures never appear here: a tool whose backend
/// call fails is reported back into the conversation as its result, and
/// the model decides how to proceed. These variants are configuration or
/// programming defects, surfaced to the caller with no partial itinerary.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("model invocation failed: {0}")]
    ModelInvocation(#[source] anyhow::Error),

    #[error("model requested unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidToolArguments { tool: String, reason: String },

    #[error("model returned an empty response")]
    EmptyResponse,
}
