//! AXIOM Gemini - hosted model backend for the idea assistant
//!
//! Implements [`axiom_core::IdeaAssistant`] over the Gemini `generateContent`
//! HTTP API. Every call asks the model for a fixed JSON shape and maps
//! transport and parse failures onto [`axiom_core::AssistError`], so the
//! workflow falls back to its fixed answers instead of failing.
//!
//! # Example
//!
//! ```rust,ignore
//! use axiom_gemini::{GeminiClient, GeminiConfig};
//!
//! let client = GeminiClient::new(GeminiConfig::from_env())?;
//! let plan = axiom_core::plan_or_fallback(&client, &idea).await;
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
mod prompts;
mod wire;

pub use client::GeminiClient;
pub use config::{GeminiConfig, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::GeminiError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
