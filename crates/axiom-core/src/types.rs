//! Core types for AXIOM
//!
//! Defines the records moved through the workflow:
//! - Brain-dump notes and their status
//! - Ideas being refined, with their evaluation axes and scores
//! - Chat messages and action-plan stories
//! - Workflow stages
//!
//! Field names serialize in camelCase so records stay readable by existing
//! stored data; original status and scale labels are accepted on input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Generate a prefixed, time-sortable id such as `note-01hx...`
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new().to_string().to_lowercase())
}

/// Whether a note has been refined into an idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoteStatus {
    /// Waiting to be refined
    #[default]
    #[serde(rename = "unwoven", alias = "À Tisser")]
    Unwoven,
    /// Refined into a completed idea
    #[serde(rename = "woven", alias = "Tissé")]
    Woven,
}

/// Free-form captured thought
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrainDumpNote {
    /// Note id (`note-…`)
    pub id: String,
    /// Note text
    pub content: String,
    /// Refinement status
    #[serde(default)]
    pub status: NoteStatus,
    /// Creation time
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BrainDumpNote {
    /// Create unwoven note with a fresh id
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: new_id("note"),
            content: content.into(),
            status: NoteStatus::Unwoven,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Whether the note has been woven into an idea
    #[inline]
    #[must_use]
    pub fn is_woven(&self) -> bool {
        self.status == NoteStatus::Woven
    }

    /// Mark as woven
    pub fn weave(&mut self, at: DateTime<Utc>) {
        self.status = NoteStatus::Woven;
        self.updated_at = Some(at);
    }
}

/// Market scale of an idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    /// Small, specialized market
    Niche,
    /// Mid-sized market
    #[serde(alias = "Moyen")]
    Medium,
    /// Mass market
    #[serde(alias = "Massif")]
    Massive,
}

impl Scale {
    /// All scales, smallest first
    pub const ALL: [Scale; 3] = [Scale::Niche, Scale::Medium, Scale::Massive];

    /// Weight used in the opportunity score
    #[inline]
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Niche => 3,
            Self::Medium => 6,
            Self::Massive => 10,
        }
    }

    /// Display label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Niche => "Niche",
            Self::Medium => "Medium",
            Self::Massive => "Massive",
        }
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "niche" => Ok(Self::Niche),
            "medium" | "moyen" => Ok(Self::Medium),
            "massive" | "massif" => Ok(Self::Massive),
            other => Err(format!("unknown scale '{other}'")),
        }
    }
}

/// Idea under refinement, or completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaNode {
    /// Idea id (`idea-…`)
    pub id: String,
    /// Note this idea was started from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_note_id: Option<String>,
    /// Text of the originating note
    pub original_note: String,
    /// Project or solution name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Problem being solved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    /// Who has the problem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    /// Urgency, 1 to 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<u8>,
    /// Market scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    /// Builder excitement, 1 to 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excitement: Option<u8>,
    /// Derived opportunity score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_score: Option<u8>,
    /// Derived feasibility score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility_score: Option<u8>,
    /// Creation time
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Completion time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl IdeaNode {
    /// Start an idea from a note
    #[must_use]
    pub fn from_note(note: &BrainDumpNote) -> Self {
        Self {
            id: new_id("idea"),
            source_note_id: Some(note.id.clone()),
            original_note: note.content.clone(),
            project_name: None,
            problem: None,
            target_audience: None,
            urgency: None,
            scale: None,
            excitement: None,
            opportunity_score: None,
            feasibility_score: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Whether this idea came from `note`
    ///
    /// Ideas recorded without a source id are matched by note text.
    #[must_use]
    pub fn originates_from(&self, note: &BrainDumpNote) -> bool {
        match &self.source_note_id {
            Some(id) => *id == note.id,
            None => self.original_note == note.content,
        }
    }
}

/// Partial update of an idea; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaPatch {
    /// New project name
    pub project_name: Option<String>,
    /// New problem statement
    pub problem: Option<String>,
    /// New target audience
    pub target_audience: Option<String>,
    /// New urgency
    pub urgency: Option<u8>,
    /// New scale
    pub scale: Option<Scale>,
    /// New excitement
    pub excitement: Option<u8>,
}

impl IdeaPatch {
    /// Create empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With project name
    #[inline]
    #[must_use]
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// With problem
    #[inline]
    #[must_use]
    pub fn with_problem(mut self, problem: impl Into<String>) -> Self {
        self.problem = Some(problem.into());
        self
    }

    /// With target audience
    #[inline]
    #[must_use]
    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }

    /// With urgency
    #[inline]
    #[must_use]
    pub fn with_urgency(mut self, urgency: u8) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// With scale
    #[inline]
    #[must_use]
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    /// With excitement
    #[inline]
    #[must_use]
    pub fn with_excitement(mut self, excitement: u8) -> Self {
        self.excitement = Some(excitement);
        self
    }

    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `idea`
    pub fn apply(&self, idea: &mut IdeaNode) {
        if let Some(name) = &self.project_name {
            idea.project_name = Some(name.clone());
        }
        if let Some(problem) = &self.problem {
            idea.problem = Some(problem.clone());
        }
        if let Some(audience) = &self.target_audience {
            idea.target_audience = Some(audience.clone());
        }
        if self.urgency.is_some() {
            idea.urgency = self.urgency;
        }
        if self.scale.is_some() {
            idea.scale = self.scale;
        }
        if self.excitement.is_some() {
            idea.excitement = self.excitement;
        }
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person refining the idea
    User,
    /// The assistant
    Axiom,
}

/// One line of the triage dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub sender: Sender,
    /// Message text
    pub text: String,
}

impl ChatMessage {
    /// Message from the user
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// Message from the assistant
    #[must_use]
    pub fn axiom(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Axiom,
            text: text.into(),
        }
    }
}

/// Action-plan item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    /// Story id (`story-…`)
    pub id: String,
    /// Story text
    pub text: String,
    /// Whether the story is done
    #[serde(default)]
    pub completed: bool,
}

impl UserStory {
    /// Create open story with a fresh id
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id("story"),
            text: text.into(),
            completed: false,
        }
    }
}

/// Workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Collecting notes
    Capture,
    /// Questioning the active idea
    Triage,
    /// Rating the active idea
    Evaluation,
    /// Working through the generated plan
    ActionPlan,
    /// Browsing completed ideas
    Galaxy,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Capture => "capture",
            Self::Triage => "triage",
            Self::Evaluation => "evaluation",
            Self::ActionPlan => "action_plan",
            Self::Galaxy => "galaxy",
        };
        f.write_str(name)
    }
}
