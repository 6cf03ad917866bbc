//! Testing utilities for AXIOM workspace
//!
//! Shared test doubles and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use axiom_core::{
    AssistError, BrainDumpNote, ChatMessage, ChatReply, EvaluationGuess, IdeaAssistant, IdeaNode,
};
use axiom_sync::{MemoryRemoteStore, OwnerId, RemoteStore, TransportError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// One call made against a [`RecordingRemoteStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Get {
        owner: OwnerId,
        collection: String,
    },
    Save {
        owner: OwnerId,
        collection: String,
        records: Vec<Value>,
    },
}

/// In-memory remote store that records calls and can fail or stall on demand
#[derive(Debug, Default)]
pub struct RecordingRemoteStore {
    inner: MemoryRemoteStore,
    calls: Mutex<Vec<RemoteCall>>,
    fail_gets: Mutex<Option<TransportError>>,
    fail_saves: Mutex<Option<TransportError>>,
    get_delays: Mutex<HashMap<OwnerId, Duration>>,
}

impl RecordingRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, owner: &OwnerId, collection: &str, records: Vec<Value>) {
        self.inner.insert(owner, collection, records);
    }

    pub fn snapshot(&self, owner: &OwnerId, collection: &str) -> Option<Vec<Value>> {
        self.inner.snapshot(owner, collection)
    }

    /// Every `get` fails with `error` until [`Self::heal`]
    pub fn fail_gets(&self, error: TransportError) {
        *self.fail_gets.lock() = Some(error);
    }

    /// Every `save` fails with `error` until [`Self::heal`]
    pub fn fail_saves(&self, error: TransportError) {
        *self.fail_saves.lock() = Some(error);
    }

    pub fn heal(&self) {
        *self.fail_gets.lock() = None;
        *self.fail_saves.lock() = None;
    }

    /// Stall `get` for `owner` by `delay` (tokio time, so pausable)
    pub fn delay_gets_for(&self, owner: &OwnerId, delay: Duration) {
        self.get_delays.lock().insert(owner.clone(), delay);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    /// Records passed to each `save`, in call order
    pub fn saves(&self) -> Vec<(OwnerId, String, Vec<Value>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RemoteCall::Save {
                    owner,
                    collection,
                    records,
                } => Some((owner.clone(), collection.clone(), records.clone())),
                RemoteCall::Get { .. } => None,
            })
            .collect()
    }

    pub fn save_count(&self) -> usize {
        self.saves().len()
    }

    pub fn get_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RemoteCall::Get { .. }))
            .count()
    }
}

#[async_trait]
impl RemoteStore for RecordingRemoteStore {
    async fn get(
        &self,
        owner: &OwnerId,
        collection: &str,
    ) -> Result<Option<Vec<Value>>, TransportError> {
        self.calls.lock().push(RemoteCall::Get {
            owner: owner.clone(),
            collection: collection.to_string(),
        });

        let delay = self.get_delays.lock().get(owner).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.fail_gets.lock().clone();
        match failure {
            Some(error) => Err(error),
            None => self.inner.get(owner, collection).await,
        }
    }

    async fn save(
        &self,
        owner: &OwnerId,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<(), TransportError> {
        self.calls.lock().push(RemoteCall::Save {
            owner: owner.clone(),
            collection: collection.to_string(),
            records: records.clone(),
        });

        let failure = self.fail_saves.lock().clone();
        match failure {
            Some(error) => Err(error),
            None => self.inner.save(owner, collection, records).await,
        }
    }
}

/// Assistant with canned answers; anything not configured fails
#[derive(Debug, Default)]
pub struct ScriptedAssistant {
    intro: Option<String>,
    replies: Mutex<VecDeque<ChatReply>>,
    evaluation: Option<EvaluationGuess>,
    plan: Option<Vec<String>>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = Some(intro.into());
        self
    }

    /// Queue a chat reply; replies are handed out in order
    #[must_use]
    pub fn with_reply(self, reply: ChatReply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    #[must_use]
    pub fn with_evaluation(mut self, guess: EvaluationGuess) -> Self {
        self.evaluation = Some(guess);
        self
    }

    #[must_use]
    pub fn with_plan<I, S>(mut self, stories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plan = Some(stories.into_iter().map(Into::into).collect());
        self
    }
}

fn unscripted(what: &str) -> AssistError {
    AssistError::Unavailable(format!("no scripted {what}"))
}

#[async_trait]
impl IdeaAssistant for ScriptedAssistant {
    async fn triage_intro(&self, _note: &str) -> Result<String, AssistError> {
        self.intro.clone().ok_or_else(|| unscripted("intro"))
    }

    async fn chat(
        &self,
        _message: &str,
        _history: &[ChatMessage],
        _idea: &IdeaNode,
    ) -> Result<ChatReply, AssistError> {
        self.replies.lock().pop_front().ok_or_else(|| unscripted("reply"))
    }

    async fn evaluate(&self, _idea: &IdeaNode, _input: &str) -> Result<EvaluationGuess, AssistError> {
        self.evaluation.ok_or_else(|| unscripted("evaluation"))
    }

    async fn action_plan(&self, _idea: &IdeaNode) -> Result<Vec<String>, AssistError> {
        self.plan.clone().ok_or_else(|| unscripted("plan"))
    }
}

/// Owner id fixture
pub fn owner(id: &str) -> OwnerId {
    OwnerId::new(id).unwrap()
}

/// Note fixture with a fixed id
pub fn note(id: &str, content: &str) -> BrainDumpNote {
    let mut note = BrainDumpNote::new(content);
    note.id = id.to_string();
    note
}

/// Notes as the legacy local store kept them: original status labels, no
/// timestamps
pub fn legacy_notes_json(contents: &[&str]) -> String {
    let notes: Vec<Value> = contents
        .iter()
        .enumerate()
        .map(|(i, content)| json!({ "id": format!("note-{i}"), "content": content, "status": "À Tisser" }))
        .collect();
    Value::Array(notes).to_string()
}
