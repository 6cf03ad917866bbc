//! Gemini-backed idea assistant
//!
//! One `generateContent` call per assistant operation. Chat, evaluation, and
//! plan calls ask for a JSON document; the triage intro is plain text.

use crate::config::GeminiConfig;
use crate::error::GeminiError;
use crate::prompts;
use crate::wire::{
    decode, ChatPayload, Content, EvaluationPayload, GenerateRequest, GenerateResponse,
    GenerationConfig, PlanPayload,
};
use async_trait::async_trait;
use axiom_core::{AssistError, ChatMessage, ChatReply, EvaluationGuess, IdeaAssistant, IdeaNode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const JSON_MIME: &str = "application/json";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini HTTP client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` if no key is configured, or `Http` if the
    /// underlying client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        if !config.has_api_key() {
            return Err(GeminiError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout())
            .build()
            .map_err(|error| GeminiError::Http {
                status: None,
                message: error.to_string(),
            })?;

        Ok(Self { config, http })
    }

    /// Client configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// `generateContent` endpoint for the configured model
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request(&self, contents: Vec<Content>, temperature: Option<f32>, json: bool) -> GenerateRequest {
        GenerateRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature.or(temperature),
                response_mime_type: json.then_some(JSON_MIME),
            },
        }
    }

    /// Send one request and return the candidate text
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GeminiError> {
        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(GeminiError::Http {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|error| GeminiError::Malformed(error.to_string()))?;
        body.text()
    }

    async fn generate_json<T: serde::de::DeserializeOwned>(
        &self,
        contents: Vec<Content>,
        temperature: Option<f32>,
    ) -> Result<T, GeminiError> {
        let text = self.generate(&self.request(contents, temperature, true)).await?;
        decode(&text).map_err(|e| {
            warn!(error = %e, "unexpected model output");
            e
        })
    }
}

#[async_trait]
impl IdeaAssistant for GeminiClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn triage_intro(&self, note: &str) -> Result<String, AssistError> {
        let request = self.request(
            vec![Content::user(prompts::triage_intro(note))],
            Some(prompts::INTRO_TEMPERATURE),
            false,
        );
        let text = self.generate(&request).await?;
        Ok(text.trim().to_string())
    }

    #[instrument(skip_all, fields(model = %self.config.model, history = history.len()))]
    async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        idea: &IdeaNode,
    ) -> Result<ChatReply, AssistError> {
        let contents = vec![
            Content::user(prompts::SYSTEM_PROMPT),
            Content::model(prompts::SYSTEM_ACK),
            Content::user(prompts::chat(message, history, idea)),
        ];
        let payload: ChatPayload = self
            .generate_json(contents, Some(prompts::CHAT_TEMPERATURE))
            .await?;
        let reply = ChatReply::from(payload);
        debug!(ready = reply.ready_for_evaluation, "chat reply");
        Ok(reply)
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn evaluate(&self, idea: &IdeaNode, input: &str) -> Result<EvaluationGuess, AssistError> {
        let payload: EvaluationPayload = self
            .generate_json(vec![Content::user(prompts::evaluate(idea, input))], None)
            .await?;
        Ok(payload.into())
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn action_plan(&self, idea: &IdeaNode) -> Result<Vec<String>, AssistError> {
        let payload: PlanPayload = self
            .generate_json(
                vec![Content::user(prompts::action_plan(idea))],
                Some(prompts::PLAN_TEMPERATURE),
            )
            .await?;
        let stories = payload.into_stories();
        debug!(stories = stories.len(), "plan generated");
        Ok(stories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(config: GeminiConfig) -> GeminiClient {
        GeminiClient::new(config.with_api_key("k")).unwrap()
    }

    #[test]
    fn requires_api_key() {
        assert!(matches!(
            GeminiClient::new(GeminiConfig::new()),
            Err(GeminiError::MissingApiKey)
        ));
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = client(
            GeminiConfig::new()
                .with_base_url("http://localhost:9000/v1/")
                .with_model("gemini-pro"),
        );
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn configured_temperature_overrides_call_default() {
        let fixed = client(GeminiConfig::new().with_temperature(0.2));
        let request = fixed.request(vec![Content::user("x")], Some(0.8), true);
        assert_eq!(request.generation_config.temperature, Some(0.2));
        assert_eq!(request.generation_config.response_mime_type, Some(JSON_MIME));

        let default = client(GeminiConfig::new());
        let request = default.request(vec![Content::user("x")], Some(0.9), false);
        assert_eq!(request.generation_config.temperature, Some(0.9));
        assert_eq!(request.generation_config.response_mime_type, None);
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        let client = client(
            GeminiConfig::new()
                .with_base_url("http://127.0.0.1:1")
                .with_model("m"),
        );
        let idea = IdeaNode::from_note(&axiom_core::BrainDumpNote::new("x"));
        let err = client.action_plan(&idea).await;
        assert!(matches!(err, Err(AssistError::Unavailable(_))));
    }
}
