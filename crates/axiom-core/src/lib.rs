//! AXIOM Core - idea refinement workflow
//!
//! Turns raw captured notes into evaluated ideas with an action plan:
//! - Captures brain-dump notes
//! - Questions an idea through a triage dialogue
//! - Rates urgency, scale, and excitement and derives scores
//! - Generates an action plan, with fixed fallbacks when no assistant answers
//! - Exports the result as markdown
//!
//! # Example
//!
//! ```rust,ignore
//! use axiom_core::prelude::*;
//!
//! # async fn example(ctx: axiom_sync::SyncContext) -> Result<(), Box<dyn std::error::Error>> {
//! let mut wizard = Wizard::from_context(&ctx)?;
//! let note = wizard.add_note("An app that tells commuters when buses are late")?;
//!
//! wizard.start_triage(&note.id)?;
//! wizard.update_idea(&IdeaPatch::new().with_problem("late buses"))?;
//! wizard.complete_triage()?;
//!
//! let plan = wizard.complete_evaluation(&OfflineAssistant).await?;
//! println!("{} stories", plan.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod assist;
pub mod error;
pub mod evaluation;
pub mod export;
pub mod scoring;
pub mod triage;
pub mod types;
pub mod wizard;

pub use assist::{
    chat_or_fallback, evaluate_or_fallback, intro_or_fallback, plan_or_fallback, ChatReply,
    EvaluationGuess, IdeaAssistant, OfflineAssistant,
};
pub use error::{AssistError, WizardError};
pub use evaluation::{Evaluation, EvaluationAnswer, EvaluationStep};
pub use export::{plan_file_name, render_markdown_plan};
pub use scoring::{feasibility_score, opportunity_score, score, Scores};
pub use triage::{AssistedTriage, ScriptedTriage, TriageField};
pub use types::{
    new_id, BrainDumpNote, ChatMessage, IdeaNode, IdeaPatch, NoteStatus, Scale, Sender, Stage,
    UserStory,
};
pub use wizard::{allowed_transitions, validate_transition, Wizard};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with AXIOM Core
    pub use crate::{
        BrainDumpNote, Evaluation, EvaluationAnswer, IdeaAssistant, IdeaNode, IdeaPatch,
        OfflineAssistant, Scale, ScriptedTriage, Stage, UserStory, Wizard, WizardError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
