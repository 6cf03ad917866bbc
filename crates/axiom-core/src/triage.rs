//! Triage dialogue
//!
//! Two ways to question a fresh idea:
//! - [`ScriptedTriage`] asks three fixed questions and stores each answer
//!   verbatim in the matching idea field.
//! - [`AssistedTriage`] forwards each message to an [`IdeaAssistant`] and
//!   merges whatever fields it extracts.
//!
//! Both return [`IdeaPatch`]es; applying them to the active idea is the
//! caller's job.

use crate::assist::{chat_or_fallback, intro_or_fallback, IdeaAssistant};
use crate::types::{ChatMessage, IdeaNode, IdeaPatch};

/// Idea field filled by a triage answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageField {
    /// `problem`
    Problem,
    /// `targetAudience`
    TargetAudience,
    /// `projectName`
    ProjectName,
}

impl TriageField {
    /// Patch setting this field to `answer`
    #[must_use]
    pub fn patch(self, answer: &str) -> IdeaPatch {
        let patch = IdeaPatch::new();
        match self {
            Self::Problem => patch.with_problem(answer),
            Self::TargetAudience => patch.with_target_audience(answer),
            Self::ProjectName => patch.with_project_name(answer),
        }
    }
}

/// Fixed questions, asked in order
pub const TRIAGE_QUESTIONS: [(TriageField, &str); 3] = [
    (
        TriageField::Problem,
        "Interesting. I read your note. To start, what is the **main problem** you are trying to solve here?",
    ),
    (
        TriageField::TargetAudience,
        "Got it. And who is **the person** who has this problem the most?",
    ),
    (
        TriageField::ProjectName,
        "Perfect. What project or solution name do you have in mind for this idea?",
    ),
];

/// Message appended after the last answer
pub const CLOSING_MESSAGE: &str =
    "Excellent. We have enough information to move on to evaluation. Ready?";

/// Fixed three-question dialogue
#[derive(Debug, Clone)]
pub struct ScriptedTriage {
    step: usize,
    history: Vec<ChatMessage>,
}

impl ScriptedTriage {
    /// Start the dialogue with the first question
    #[must_use]
    pub fn new() -> Self {
        let (_, first) = TRIAGE_QUESTIONS[0];
        Self {
            step: 0,
            history: vec![ChatMessage::axiom(first)],
        }
    }

    /// Record an answer to the current question
    ///
    /// Blank answers, and answers after the last question, are ignored and
    /// return `None`.
    pub fn answer(&mut self, text: &str) -> Option<IdeaPatch> {
        let answer = text.trim();
        if answer.is_empty() {
            return None;
        }
        let (field, _) = *TRIAGE_QUESTIONS.get(self.step)?;

        self.history.push(ChatMessage::user(answer));
        self.step += 1;

        match TRIAGE_QUESTIONS.get(self.step) {
            Some((_, question)) => self.history.push(ChatMessage::axiom(*question)),
            None => self.history.push(ChatMessage::axiom(CLOSING_MESSAGE)),
        }

        Some(field.patch(answer))
    }

    /// Field the next answer will fill
    #[must_use]
    pub fn current_field(&self) -> Option<TriageField> {
        TRIAGE_QUESTIONS.get(self.step).map(|(field, _)| *field)
    }

    /// Whether every question has been answered
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.step >= TRIAGE_QUESTIONS.len()
    }

    /// Dialogue so far
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

impl Default for ScriptedTriage {
    fn default() -> Self {
        Self::new()
    }
}

/// Assistant-driven dialogue
#[derive(Debug, Clone, Default)]
pub struct AssistedTriage {
    history: Vec<ChatMessage>,
    ready: bool,
}

impl AssistedTriage {
    /// Start the dialogue with an opening line about `note`
    pub async fn start(assistant: &dyn IdeaAssistant, note: &str) -> Self {
        let intro = intro_or_fallback(assistant, note).await;
        Self {
            history: vec![ChatMessage::axiom(intro)],
            ready: false,
        }
    }

    /// Send a message, returning the fields extracted from it
    ///
    /// Blank messages are ignored and return `None`.
    pub async fn send(
        &mut self,
        assistant: &dyn IdeaAssistant,
        idea: &IdeaNode,
        text: &str,
    ) -> Option<IdeaPatch> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }

        let reply = chat_or_fallback(assistant, message, &self.history, idea).await;
        self.history.push(ChatMessage::user(message));
        self.history.push(ChatMessage::axiom(reply.response));
        self.ready |= reply.ready_for_evaluation;

        tracing::debug!(
            idea = %idea.id,
            ready = self.ready,
            extracted = !reply.extracted.is_empty(),
            "triage reply"
        );
        Some(reply.extracted)
    }

    /// Whether the assistant judged the idea ready for evaluation
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Dialogue so far
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}
