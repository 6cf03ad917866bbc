//! Text assistant contract and fallbacks
//!
//! The assistant is optional. Every call site goes through one of the
//! `*_or_fallback` helpers, which log the failure and substitute a fixed
//! reply, so the workflow never stalls on the assistant.

use crate::error::AssistError;
use crate::scoring::{AXIS_MAX, AXIS_MIN};
use crate::types::{ChatMessage, IdeaNode, IdeaPatch, Scale, UserStory};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reply to one triage message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Text shown to the user
    pub response: String,
    /// Fields the assistant picked out of the conversation
    pub extracted: IdeaPatch,
    /// Whether enough is known to move on to evaluation
    pub ready_for_evaluation: bool,
}

/// Ratings inferred from free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationGuess {
    /// Urgency, 1 to 10
    pub urgency: Option<u8>,
    /// Market scale
    pub scale: Option<Scale>,
    /// Excitement, 1 to 10
    pub excitement: Option<u8>,
}

impl EvaluationGuess {
    /// Convert into an idea patch, clamping ratings into 1 to 10
    #[must_use]
    pub fn into_patch(self) -> IdeaPatch {
        IdeaPatch {
            urgency: self.urgency.map(|v| v.clamp(AXIS_MIN, AXIS_MAX)),
            scale: self.scale,
            excitement: self.excitement.map(|v| v.clamp(AXIS_MIN, AXIS_MAX)),
            ..IdeaPatch::default()
        }
    }
}

/// Conversational helper for refining ideas
#[async_trait]
pub trait IdeaAssistant: Send + Sync + std::fmt::Debug {
    /// Opening line for the triage dialogue about `note`
    async fn triage_intro(&self, note: &str) -> Result<String, AssistError>;

    /// Answer a triage message and extract idea fields
    async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        idea: &IdeaNode,
    ) -> Result<ChatReply, AssistError>;

    /// Infer ratings from a free-text answer
    async fn evaluate(&self, idea: &IdeaNode, input: &str) -> Result<EvaluationGuess, AssistError>;

    /// Generate action-plan story texts, most important first
    async fn action_plan(&self, idea: &IdeaNode) -> Result<Vec<String>, AssistError>;
}

/// Assistant that is never available
///
/// Every call fails, so the fallbacks are always used.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAssistant;

#[async_trait]
impl IdeaAssistant for OfflineAssistant {
    async fn triage_intro(&self, _note: &str) -> Result<String, AssistError> {
        Err(offline())
    }

    async fn chat(
        &self,
        _message: &str,
        _history: &[ChatMessage],
        _idea: &IdeaNode,
    ) -> Result<ChatReply, AssistError> {
        Err(offline())
    }

    async fn evaluate(&self, _idea: &IdeaNode, _input: &str) -> Result<EvaluationGuess, AssistError> {
        Err(offline())
    }

    async fn action_plan(&self, _idea: &IdeaNode) -> Result<Vec<String>, AssistError> {
        Err(offline())
    }
}

fn offline() -> AssistError {
    AssistError::Unavailable("no assistant configured".to_string())
}

/// Fixed replies used when the assistant fails
pub mod fallback {
    use super::EvaluationGuess;
    use crate::scoring::DEFAULT_AXIS;
    use crate::types::{IdeaNode, Scale, UserStory};

    /// Opening triage question
    pub const INTRO: &str =
        "Interesting! To start, what is the main problem you want to solve?";

    /// Reply when a chat message could not be answered
    pub const APOLOGY: &str = "Hmm, I hit a small glitch. Could you rephrase that?";

    /// Neutral ratings
    #[must_use]
    pub fn evaluation() -> EvaluationGuess {
        EvaluationGuess {
            urgency: Some(DEFAULT_AXIS),
            scale: Some(Scale::Medium),
            excitement: Some(DEFAULT_AXIS),
        }
    }

    /// Generic four-step plan
    #[must_use]
    pub fn action_plan(idea: &IdeaNode) -> Vec<UserStory> {
        let audience = idea.target_audience.as_deref().unwrap_or("user");
        let problem = idea.problem.as_deref().unwrap_or("this problem");

        [
            format!("As a {audience}, I want to solve {problem} easily."),
            "Build a simple landing page to validate interest.".to_string(),
            "Implement the core MVP feature.".to_string(),
            "Set up a user feedback system.".to_string(),
        ]
        .into_iter()
        .map(UserStory::new)
        .collect()
    }
}

/// Triage opening line, or the fixed intro question
pub async fn intro_or_fallback(assistant: &dyn IdeaAssistant, note: &str) -> String {
    match assistant.triage_intro(note).await {
        Ok(intro) if !intro.trim().is_empty() => intro.trim().to_string(),
        Ok(_) => fallback::INTRO.to_string(),
        Err(error) => {
            tracing::warn!(%error, "triage intro failed; using fallback");
            fallback::INTRO.to_string()
        }
    }
}

/// Chat reply, or the fixed apology with nothing extracted
pub async fn chat_or_fallback(
    assistant: &dyn IdeaAssistant,
    message: &str,
    history: &[ChatMessage],
    idea: &IdeaNode,
) -> ChatReply {
    match assistant.chat(message, history, idea).await {
        Ok(reply) => reply,
        Err(error) => {
            tracing::warn!(%error, "chat failed; using fallback");
            ChatReply {
                response: fallback::APOLOGY.to_string(),
                ..ChatReply::default()
            }
        }
    }
}

/// Inferred ratings, or neutral ratings
pub async fn evaluate_or_fallback(
    assistant: &dyn IdeaAssistant,
    idea: &IdeaNode,
    input: &str,
) -> EvaluationGuess {
    match assistant.evaluate(idea, input).await {
        Ok(guess) => guess,
        Err(error) => {
            tracing::warn!(%error, "evaluation failed; using neutral ratings");
            fallback::evaluation()
        }
    }
}

/// Generated plan, or the generic four-step plan
///
/// An empty generated plan is treated as a failure.
pub async fn plan_or_fallback(assistant: &dyn IdeaAssistant, idea: &IdeaNode) -> Vec<UserStory> {
    match assistant.action_plan(idea).await {
        Ok(stories) if !stories.is_empty() => {
            tracing::info!(idea = %idea.id, stories = stories.len(), "generated action plan");
            stories.into_iter().map(UserStory::new).collect()
        }
        Ok(_) => {
            tracing::warn!(idea = %idea.id, "assistant returned an empty plan; using fallback");
            fallback::action_plan(idea)
        }
        Err(error) => {
            tracing::warn!(idea = %idea.id, %error, "action plan failed; using fallback");
            fallback::action_plan(idea)
        }
    }
}
