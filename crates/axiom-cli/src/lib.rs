//! AXIOM CLI - notes, refinement, scoring, plans, and backups from the terminal
//!
//! Works on a local JSON store file. The binary is `axiom`; this library
//! holds the command implementations so they can be tested directly.

#![warn(unreachable_pub)]

pub mod commands;
pub mod config;
pub mod logging;
pub mod refine;

pub use commands::{
    read_stories, render_galaxy, render_ideas, render_notes, score, App, LocalWizard, PlanSource,
};
pub use refine::Refinement;
pub use config::{AppConfig, DEFAULT_STORE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
