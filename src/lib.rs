//! # Wayfarer
//!
//! A multi-agent AI travel planner service.
//!
//! This library provides:
//! - An HTTP API for trip planning requests
//! - A tool-based planning loop that gathers flight, hotel, weather, and
//!   place data before synthesizing an itinerary
//! - Scoring engines that rank flights and pick hotels from raw search
//!   results
//! - Integration with OpenRouter or Groq for LLM access
//!
//! ## Architecture
//!
//! The planner follows the "tools in a loop" pattern:
//! 1. Receive a trip request via the API
//! 2. Build context with the system prompt and the travel tool schemas
//! 3. Call the LLM, execute any requested tool calls in order
//! 4. Feed results back to the LLM, repeat until it produces the final
//!    itinerary or the tool-call ceiling forces one
//!
//! ## Example
//!
//! ```rust,ignore
//! use wayfarer::{config::Config, api};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod ranking;
pub mod tools;

pub use config::Config;
