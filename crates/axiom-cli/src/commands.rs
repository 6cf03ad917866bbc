//! Command implementations
//!
//! Each command works on the local store only; no remote store is reachable
//! from the command line. Output text is returned, or written to a writer the
//! caller supplies, so the binary decides where it goes.

use crate::config::AppConfig;
use crate::refine::{self, Refinement};
use anyhow::{bail, Context, Result};
use axiom_core::assist::fallback;
use axiom_core::scoring::validate_axis;
use axiom_core::{
    feasibility_score, opportunity_score, plan_or_fallback, BrainDumpNote, IdeaAssistant,
    IdeaNode, OfflineAssistant, Scale, Scores, UserStory, Wizard,
};
use axiom_gemini::GeminiClient;
use axiom_sync::{
    backup_file_name, clear_local, export_backup, import_backup, Backup, CollectionRegistry,
    FileLocalStore, LocalCollection, LocalStore, IDEAS, NOTES,
};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Where a plan comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    /// JSON file holding an array of stories or story texts
    File(PathBuf),
    /// Ask the configured assistant, falling back to the generic plan
    Generate,
    /// Generic four-step plan
    Fallback,
}

/// Refinement workflow over the local store
pub type LocalWizard = Wizard<LocalCollection<BrainDumpNote>, LocalCollection<IdeaNode>>;

/// Open local store plus the collections built over it
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    registry: CollectionRegistry,
    local: Arc<dyn LocalStore>,
}

impl App {
    /// Open the store named by `config`
    ///
    /// # Errors
    /// If the store file exists but cannot be read
    pub fn open(config: AppConfig) -> Result<Self> {
        let local = FileLocalStore::open(&config.store)
            .with_context(|| format!("failed to open store {}", config.store.display()))?;
        Ok(Self {
            config,
            registry: CollectionRegistry::standard(),
            local: Arc::new(local),
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn collection<T>(&self, name: &str) -> Result<LocalCollection<T>>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Clone,
    {
        let spec = self.registry.get(name)?;
        Ok(LocalCollection::open(
            spec.legacy_key.clone(),
            Vec::new(),
            Arc::clone(&self.local),
        ))
    }

    fn notes(&self) -> Result<LocalCollection<BrainDumpNote>> {
        self.collection(NOTES)
    }

    fn ideas(&self) -> Result<LocalCollection<IdeaNode>> {
        self.collection(IDEAS)
    }

    /// Refinement workflow over the stored notes and ideas
    ///
    /// # Errors
    /// If the notes or ideas collection is not registered
    pub fn wizard(&self) -> Result<LocalWizard> {
        Ok(Wizard::new(Arc::new(self.notes()?), Arc::new(self.ideas()?)))
    }
    /// Capture a note at the front of the list
    ///
    /// # Errors
    /// If the text is blank
    pub fn add_note(&self, text: &str) -> Result<BrainDumpNote> {
        let text = text.trim();
        if text.is_empty() {
            bail!("note is empty");
        }
        let note = BrainDumpNote::new(text);
        self.notes()?.update(|notes| notes.insert(0, note.clone()));
        info!(note = %note.id, "captured note");
        Ok(note)
    }

    /// Stored notes, newest first
    ///
    /// # Errors
    /// If the notes collection is not registered
    pub fn list_notes(&self) -> Result<Vec<BrainDumpNote>> {
        Ok(self.notes()?.get())
    }

    /// Completed ideas
    ///
    /// # Errors
    /// If the ideas collection is not registered
    pub fn list_ideas(&self) -> Result<Vec<IdeaNode>> {
        Ok(self.ideas()?.get())
    }

    /// Look up a completed idea by id
    ///
    /// # Errors
    /// If no idea has that id
    pub fn find_idea(&self, id: &str) -> Result<IdeaNode> {
        self.list_ideas()?
            .into_iter()
            .find(|idea| idea.id == id)
            .with_context(|| format!("no idea with id '{id}'"))
    }

    /// Refine a stored note into a completed idea, reading answers from
    /// `input` and writing questions to `output`
    ///
    /// # Errors
    /// If the note is unknown or already refined, or input ends early
    pub async fn refine(
        &self,
        note_id: &str,
        assistant: &dyn IdeaAssistant,
        input: impl BufRead,
        output: impl Write,
    ) -> Result<Refinement> {
        let mut wizard = self.wizard()?;
        refine::run(&mut wizard, note_id, assistant, input, output).await
    }

    /// Completed ideas as shown in the galaxy view
    ///
    /// # Errors
    /// If the notes or ideas collection is not registered
    pub fn galaxy(&self) -> Result<Vec<IdeaNode>> {
        let mut wizard = self.wizard()?;
        let ideas = wizard.show_galaxy()?;
        wizard.leave_galaxy()?;
        Ok(ideas)
    }

    /// Assistant for plan generation, offline when no key is configured
    #[must_use]
    pub fn assistant(&self) -> Box<dyn IdeaAssistant> {
        match GeminiClient::new(self.config.gemini.clone()) {
            Ok(client) => Box::new(client),
            Err(error) => {
                warn!(%error, "assistant unavailable; using fixed answers");
                Box::new(OfflineAssistant)
            }
        }
    }

    /// Stories for an idea
    ///
    /// # Errors
    /// If a plan file cannot be read or parsed
    pub async fn plan_for(&self, idea: &IdeaNode, source: &PlanSource) -> Result<Vec<UserStory>> {
        match source {
            PlanSource::File(path) => read_stories(path),
            PlanSource::Generate => {
                let assistant = self.assistant();
                Ok(plan_or_fallback(assistant.as_ref(), idea).await)
            }
            PlanSource::Fallback => Ok(fallback::action_plan(idea)),
        }
    }

    /// Snapshot the store into a backup document
    #[must_use]
    pub fn export(&self, now: DateTime<Utc>) -> Backup {
        export_backup(&self.registry, self.local.as_ref(), now)
    }

    /// Write a backup to `dir`, named after its date
    ///
    /// # Errors
    /// If the file cannot be written
    pub fn export_to_dir(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
        let path = dir.join(backup_file_name(now.date_naive()));
        self.export_to_file(&path, now)?;
        Ok(path)
    }

    /// Write a backup to `path`
    ///
    /// # Errors
    /// If the file cannot be written
    pub fn export_to_file(&self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        let json = self.export(now).to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write backup {}", path.display()))?;
        info!(path = %path.display(), "exported backup");
        Ok(())
    }

    /// Restore collections from a backup file
    ///
    /// # Errors
    /// If the file cannot be read or is not a backup
    pub fn import_from_file(&self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read backup {}", path.display()))?;
        let backup = Backup::from_json(&text)?;
        Ok(import_backup(&self.registry, self.local.as_ref(), &backup)?)
    }

    /// Remove every collection from the store
    ///
    /// # Errors
    /// If the store cannot be written
    pub fn clear(&self) -> Result<()> {
        Ok(clear_local(&self.registry, self.local.as_ref())?)
    }
}

/// Validate ratings and derive scores
///
/// # Errors
/// If a rating is outside 1 to 10
pub fn score(urgency: Option<u8>, scale: Option<Scale>, excitement: Option<u8>) -> Result<Scores> {
    if let Some(value) = urgency {
        validate_axis("urgency", value)?;
    }
    if let Some(value) = excitement {
        validate_axis("excitement", value)?;
    }
    Ok(Scores {
        opportunity: opportunity_score(urgency, scale),
        feasibility: feasibility_score(excitement),
    })
}

/// Read a plan file
///
/// Accepts an array of stories or an array of plain story texts.
///
/// # Errors
/// If the file cannot be read or has neither shape
pub fn read_stories(path: &Path) -> Result<Vec<UserStory>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    if let Ok(stories) = serde_json::from_str::<Vec<UserStory>>(&text) {
        return Ok(stories);
    }
    let texts: Vec<String> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a list of stories", path.display()))?;
    Ok(texts.into_iter().map(UserStory::new).collect())
}

/// One line per note: marker, id, content
#[must_use]
pub fn render_notes(notes: &[BrainDumpNote]) -> String {
    let mut out = String::new();
    for note in notes {
        let mark = if note.is_woven() { "x" } else { " " };
        let _ = writeln!(out, "[{mark}] {}  {}", note.id, note.content);
    }
    out
}

/// One line per idea: id, name, scores
#[must_use]
pub fn render_ideas(ideas: &[IdeaNode]) -> String {
    let mut out = String::new();
    for idea in ideas {
        let name = idea.project_name.as_deref().unwrap_or("Untitled");
        let score = |v: Option<u8>| v.map_or_else(|| "-".to_string(), |n| n.to_string());
        let _ = writeln!(
            out,
            "{}  {name}  opportunity {} feasibility {}",
            idea.id,
            score(idea.opportunity_score),
            score(idea.feasibility_score),
        );
    }
    out
}

/// Completed ideas ranked by combined score, best first
#[must_use]
pub fn render_galaxy(ideas: &[IdeaNode]) -> String {
    let total = |idea: &IdeaNode| {
        u16::from(idea.opportunity_score.unwrap_or(0))
            + u16::from(idea.feasibility_score.unwrap_or(0))
    };
    let mut ranked: Vec<&IdeaNode> = ideas.iter().collect();
    ranked.sort_by_key(|idea| std::cmp::Reverse(total(idea)));

    let mut out = String::new();
    for (rank, idea) in ranked.iter().enumerate() {
        let name = idea.project_name.as_deref().unwrap_or("Untitled Idea");
        let _ = writeln!(out, "{:>2}. {name}  ({}/20)  {}", rank + 1, total(idea), idea.id);
    }
    out
}
