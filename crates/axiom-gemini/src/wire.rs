//! Request and response shapes
//!
//! Covers the `generateContent` envelope and the JSON documents the prompts
//! ask the model to produce inside the candidate text.

use crate::error::GeminiError;
use axiom_core::{ChatReply, EvaluationGuess, IdeaPatch, Scale};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Part {
    pub(crate) text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

impl Content {
    pub(crate) fn user(text: impl Into<String>) -> Self {
        Self::with_role("user", text)
    }

    pub(crate) fn model(text: impl Into<String>) -> Self {
        Self::with_role("model", text)
    }

    fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_mime_type: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    pub(crate) contents: Vec<Content>,
    pub(crate) generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    pub(crate) fn text(&self) -> Result<String, GeminiError> {
        let text: String = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(GeminiError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

/// Decode a JSON document from candidate text, tolerating code fences
pub(crate) fn decode<T: DeserializeOwned>(text: &str) -> Result<T, GeminiError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim()).map_err(|e| GeminiError::Malformed(e.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "null")
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatPayload {
    response: String,
    #[serde(default)]
    extracted_problem: Option<String>,
    #[serde(default)]
    extracted_target_audience: Option<String>,
    #[serde(default)]
    extracted_project_name: Option<String>,
    #[serde(default)]
    is_ready_for_evaluation: bool,
}

impl From<ChatPayload> for ChatReply {
    fn from(payload: ChatPayload) -> Self {
        Self {
            response: payload.response,
            extracted: IdeaPatch {
                problem: non_blank(payload.extracted_problem),
                target_audience: non_blank(payload.extracted_target_audience),
                project_name: non_blank(payload.extracted_project_name),
                ..IdeaPatch::default()
            },
            ready_for_evaluation: payload.is_ready_for_evaluation,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluationPayload {
    #[serde(default)]
    urgency: Option<f64>,
    #[serde(default)]
    scale: Option<String>,
    #[serde(default)]
    excitement: Option<f64>,
}

// Clamped into 1 to 10 before narrowing.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rating(value: Option<f64>) -> Option<u8> {
    let value = value?;
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(1.0, 10.0) as u8)
}

impl From<EvaluationPayload> for EvaluationGuess {
    fn from(payload: EvaluationPayload) -> Self {
        Self {
            urgency: rating(payload.urgency),
            scale: payload.scale.and_then(|s| s.parse::<Scale>().ok()),
            excitement: rating(payload.excitement),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoryPayload {
    story: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanPayload {
    user_stories: Vec<StoryPayload>,
}

impl PlanPayload {
    pub(crate) fn into_stories(self) -> Vec<String> {
        self.user_stories
            .into_iter()
            .map(|s| s.story.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
