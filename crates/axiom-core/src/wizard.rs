//! Refinement workflow
//!
//! Drives one idea at a time from a captured note to a completed idea:
//!
//! ```text
//! Capture ──► Triage ──► Evaluation ──► ActionPlan ──► Capture
//!    │                                      │
//!    └──────────────► Galaxy ◄──────────────┘
//!                       │
//!                       └──► Capture
//! ```
//!
//! Notes and completed ideas live in any [`RecordList`]: synced collections
//! by default, or local-only collections. The active idea and its plan are
//! in-memory only.

use crate::assist::{plan_or_fallback, IdeaAssistant};
use crate::error::WizardError;
use crate::scoring;
use crate::types::{BrainDumpNote, IdeaNode, IdeaPatch, Stage, UserStory};
use axiom_sync::{RecordList, SyncContext, SyncError, SyncedCollection, IDEAS, NOTES};
use chrono::Utc;
use std::sync::Arc;

/// Validate a stage change
///
/// # Errors
/// `WizardError::InvalidTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), WizardError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(WizardError::InvalidTransition { from, to })
    }
}

/// Stages reachable from `from`
#[must_use]
pub fn allowed_transitions(from: Stage) -> Vec<Stage> {
    match from {
        Stage::Capture => vec![Stage::Triage, Stage::Galaxy],
        Stage::Triage => vec![Stage::Evaluation],
        Stage::Evaluation => vec![Stage::ActionPlan],
        Stage::ActionPlan => vec![Stage::Capture, Stage::Galaxy],
        Stage::Galaxy => vec![Stage::Capture],
    }
}

/// Workflow state over the notes and completed ideas collections
#[derive(Debug)]
pub struct Wizard<N = SyncedCollection<BrainDumpNote>, I = SyncedCollection<IdeaNode>> {
    stage: Stage,
    notes: Arc<N>,
    ideas: Arc<I>,
    active: Option<IdeaNode>,
    plan: Vec<UserStory>,
}

impl Wizard {
    /// Create wizard with fresh synced notes and ideas collections
    ///
    /// # Errors
    /// `SyncError::UnknownCollection` if the context's registry lacks
    /// `notes` or `ideas`
    pub fn from_context(ctx: &SyncContext) -> Result<Self, SyncError> {
        let notes = Arc::new(ctx.collection(NOTES, Vec::new())?);
        let ideas = Arc::new(ctx.collection(IDEAS, Vec::new())?);
        Ok(Self::new(notes, ideas))
    }
}

impl<N, I> Wizard<N, I>
where
    N: RecordList<BrainDumpNote>,
    I: RecordList<IdeaNode>,
{
    /// Create wizard at the capture stage
    #[must_use]
    pub fn new(notes: Arc<N>, ideas: Arc<I>) -> Self {
        Self {
            stage: Stage::Capture,
            notes,
            ideas,
            active: None,
            plan: Vec::new(),
        }
    }

    /// Current stage
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Notes collection
    #[inline]
    #[must_use]
    pub fn notes(&self) -> &Arc<N> {
        &self.notes
    }

    /// Completed ideas collection
    #[inline]
    #[must_use]
    pub fn ideas(&self) -> &Arc<I> {
        &self.ideas
    }

    /// Idea being refined
    #[inline]
    #[must_use]
    pub fn active_idea(&self) -> Option<&IdeaNode> {
        self.active.as_ref()
    }

    /// Action plan of the active idea
    #[inline]
    #[must_use]
    pub fn plan(&self) -> &[UserStory] {
        &self.plan
    }

    fn transition(&mut self, to: Stage) -> Result<(), WizardError> {
        validate_transition(self.stage, to)?;
        tracing::debug!(from = %self.stage, to = %to, "stage change");
        self.stage = to;
        Ok(())
    }

    /// Capture a note, newest first
    ///
    /// # Errors
    /// `WizardError::EmptyNote` if `content` is blank
    pub fn add_note(&mut self, content: &str) -> Result<BrainDumpNote, WizardError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(WizardError::EmptyNote);
        }

        let note = BrainDumpNote::new(content);
        self.notes.update(|notes| notes.insert(0, note.clone()));
        tracing::info!(note = %note.id, "captured note");
        Ok(note)
    }

    /// Start refining a note
    ///
    /// # Errors
    /// - `WizardError::InvalidTransition` outside the capture stage
    /// - `WizardError::UnknownNote` if no note has `note_id`
    /// - `WizardError::NoteAlreadyWoven` if the note was already refined
    pub fn start_triage(&mut self, note_id: &str) -> Result<&IdeaNode, WizardError> {
        validate_transition(self.stage, Stage::Triage)?;

        let note = self
            .notes
            .get()
            .into_iter()
            .find(|n| n.id == note_id)
            .ok_or_else(|| WizardError::UnknownNote(note_id.to_string()))?;
        if note.is_woven() {
            return Err(WizardError::NoteAlreadyWoven(note.id));
        }

        self.transition(Stage::Triage)?;
        self.plan.clear();
        let idea = self.active.insert(IdeaNode::from_note(&note));
        tracing::info!(idea = %idea.id, note = %note.id, "started triage");
        Ok(idea)
    }

    /// Merge fields into the active idea
    ///
    /// # Errors
    /// `WizardError::NoActiveIdea` if nothing is being refined
    pub fn update_idea(&mut self, patch: &IdeaPatch) -> Result<&IdeaNode, WizardError> {
        let idea = self.active.as_mut().ok_or(WizardError::NoActiveIdea)?;
        patch.apply(idea);
        Ok(idea)
    }

    /// Move from triage to evaluation
    ///
    /// # Errors
    /// `WizardError::InvalidTransition` outside the triage stage
    pub fn complete_triage(&mut self) -> Result<(), WizardError> {
        self.transition(Stage::Evaluation)
    }

    /// Score the active idea and generate its action plan
    ///
    /// Uses the generic plan if the assistant fails.
    ///
    /// # Errors
    /// - `WizardError::InvalidTransition` outside the evaluation stage
    /// - `WizardError::NoActiveIdea` if nothing is being refined
    /// - `WizardError::AxisOutOfRange` if a recorded rating is invalid
    pub async fn complete_evaluation(
        &mut self,
        assistant: &dyn IdeaAssistant,
    ) -> Result<&[UserStory], WizardError> {
        validate_transition(self.stage, Stage::ActionPlan)?;
        let idea = self.active.as_mut().ok_or(WizardError::NoActiveIdea)?;

        let scores = scoring::score(idea)?;
        scores.apply_to(idea);
        tracing::info!(
            idea = %idea.id,
            opportunity = scores.opportunity,
            feasibility = scores.feasibility,
            "evaluation complete"
        );

        let snapshot = idea.clone();
        self.plan = plan_or_fallback(assistant, &snapshot).await;
        self.transition(Stage::ActionPlan)?;
        Ok(&self.plan)
    }

    /// Flip a story's completion, returning its new state
    ///
    /// # Errors
    /// `WizardError::UnknownStory` if the plan has no story with `story_id`
    pub fn toggle_story(&mut self, story_id: &str) -> Result<bool, WizardError> {
        let story = self
            .plan
            .iter_mut()
            .find(|s| s.id == story_id)
            .ok_or_else(|| WizardError::UnknownStory(story_id.to_string()))?;
        story.completed = !story.completed;
        Ok(story.completed)
    }

    /// Complete the active idea and return to capture
    ///
    /// # Errors
    /// - `WizardError::InvalidTransition` outside the action plan stage
    /// - `WizardError::NoActiveIdea` if nothing is being refined
    pub fn finish_idea(&mut self) -> Result<IdeaNode, WizardError> {
        validate_transition(self.stage, Stage::Capture)?;
        let idea = self.complete_active().ok_or(WizardError::NoActiveIdea)?;
        self.transition(Stage::Capture)?;
        Ok(idea)
    }

    /// Show completed ideas, completing the active idea first if any
    ///
    /// # Errors
    /// `WizardError::InvalidTransition` unless at capture or action plan
    pub fn show_galaxy(&mut self) -> Result<Vec<IdeaNode>, WizardError> {
        validate_transition(self.stage, Stage::Galaxy)?;
        self.complete_active();
        self.transition(Stage::Galaxy)?;
        Ok(self.ideas.get())
    }

    /// Leave the completed ideas view
    ///
    /// # Errors
    /// `WizardError::InvalidTransition` outside the galaxy stage
    pub fn leave_galaxy(&mut self) -> Result<(), WizardError> {
        if self.stage != Stage::Galaxy {
            return Err(WizardError::InvalidTransition {
                from: self.stage,
                to: Stage::Capture,
            });
        }
        self.transition(Stage::Capture)
    }

    // Appends the active idea to the completed list exactly once and marks
    // its source note woven.
    fn complete_active(&mut self) -> Option<IdeaNode> {
        let mut idea = self.active.take()?;
        let now = Utc::now();
        idea.completed_at = Some(now);

        self.ideas.update(|ideas| ideas.push(idea.clone()));
        self.notes.update(|notes| {
            for note in notes.iter_mut().filter(|n| idea.originates_from(n)) {
                note.weave(now);
            }
        });
        self.plan.clear();

        tracing::info!(idea = %idea.id, "idea completed");
        Some(idea)
    }
}
