//! Command tests over a temporary store file.

use axiom_cli::{read_stories, render_galaxy, App, AppConfig, PlanSource};
use axiom_core::{
    render_markdown_plan, BrainDumpNote, IdeaNode, NoteStatus, OfflineAssistant, Scale,
};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn app(dir: &Path) -> App {
    App::open(AppConfig::default().with_store(dir.join("store.json"))).unwrap()
}

fn completed_idea(note: &BrainDumpNote) -> IdeaNode {
    let mut idea = IdeaNode::from_note(note);
    idea.project_name = Some("BusBuddy".into());
    idea.problem = Some("late buses".into());
    idea.target_audience = Some("commuters".into());
    idea.opportunity_score = Some(7);
    idea.feasibility_score = Some(9);
    idea
}

#[test]
fn notes_persist_across_opens() {
    let dir = TempDir::new().unwrap();
    let first = app(dir.path()).add_note("  first idea ").unwrap();
    let second = app(dir.path()).add_note("second idea").unwrap();

    let notes = app(dir.path()).list_notes().unwrap();
    assert_eq!(notes, vec![second, first.clone()]);
    assert_eq!(first.content, "first idea");
    assert_eq!(notes[1].status, NoteStatus::Unwoven);

    assert!(app(dir.path()).add_note("   ").is_err());
}

#[test]
fn backup_round_trip_through_files() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let note = app(source.path()).add_note("bus app").unwrap();
    let path = app(source.path())
        .export_to_dir(source.path(), now)
        .unwrap();
    assert!(path.ends_with("axiom-backup-2024-05-01.json"));

    let restored = app(target.path());
    assert_eq!(restored.import_from_file(&path).unwrap(), 1);
    assert_eq!(restored.list_notes().unwrap(), vec![note]);
    assert!(restored.list_ideas().unwrap().is_empty());

    restored.clear().unwrap();
    assert!(app(target.path()).list_notes().unwrap().is_empty());
}

#[test]
fn import_rejects_non_backup_files() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.json");
    std::fs::write(&bogus, "not json").unwrap();
    assert!(app(dir.path()).import_from_file(&bogus).is_err());
}

#[tokio::test]
async fn plan_renders_stored_idea_with_story_file() {
    let dir = TempDir::new().unwrap();
    let note = BrainDumpNote::new("bus app");
    let idea = completed_idea(&note);

    let backup = serde_json::json!({
        "notes": serde_json::to_string(&[&note]).unwrap(),
        "completedIdeas": serde_json::to_string(&[&idea]).unwrap(),
        "exportDate": "2024-05-01T12:00:00Z",
        "version": "1.0",
    });
    let backup_path = dir.path().join("backup.json");
    std::fs::write(&backup_path, backup.to_string()).unwrap();

    let app = app(dir.path());
    app.import_from_file(&backup_path).unwrap();
    let found = app.find_idea(&idea.id).unwrap();
    assert_eq!(found, idea);
    assert!(app.find_idea("idea-missing").is_err());

    let stories_path = dir.path().join("stories.json");
    std::fs::write(&stories_path, r#"["Map bus stops", "Push alerts"]"#).unwrap();
    let stories = app
        .plan_for(&found, &PlanSource::File(stories_path))
        .await
        .unwrap();
    assert_eq!(stories.len(), 2);

    let date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap().date_naive();
    let markdown = render_markdown_plan(&found, &stories, date);
    assert!(markdown.contains("BusBuddy"));
    assert!(markdown.contains("1. [ ] Map bus stops"));
    assert!(markdown.contains("**Progress:** 0/2 (0%)"));
}

#[tokio::test]
async fn plan_falls_back_without_assistant() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());
    let idea = completed_idea(&BrainDumpNote::new("bus app"));

    let generic = app.plan_for(&idea, &PlanSource::Fallback).await.unwrap();
    assert_eq!(generic.len(), 4);

    // no API key configured in the default config
    let mut config = AppConfig::default().with_store(dir.path().join("other.json"));
    config.gemini.api_key.clear();
    let offline = App::open(config).unwrap();
    let generated = offline.plan_for(&idea, &PlanSource::Generate).await.unwrap();
    assert_eq!(generated[0].text, "As a commuters, I want to solve late buses easily.");
}

#[test]
fn story_files_accept_full_stories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stories.json");
    std::fs::write(
        &path,
        r#"[{"id": "story-1", "text": "Ship it", "completed": true}]"#,
    )
    .unwrap();

    let stories = read_stories(&path).unwrap();
    assert!(stories[0].completed);
    assert_eq!(stories[0].id, "story-1");

    std::fs::write(&path, r#"{"stories": []}"#).unwrap();
    assert!(read_stories(&path).is_err());
}

#[tokio::test]
async fn refine_turns_a_note_into_a_stored_idea() {
    let dir = TempDir::new().unwrap();
    let note = app(dir.path()).add_note("bus app").unwrap();

    // a blank triage answer and an out-of-range rating are asked again
    let answers = "late buses\n\ncommuters\nBusBuddy\n11\n8\nmedium\n9\n";
    let mut output = Vec::new();
    let refined = app(dir.path())
        .refine(&note.id, &OfflineAssistant, Cursor::new(answers), &mut output)
        .await
        .unwrap();

    let idea = &refined.idea;
    assert_eq!(idea.problem.as_deref(), Some("late buses"));
    assert_eq!(idea.target_audience.as_deref(), Some("commuters"));
    assert_eq!(idea.project_name.as_deref(), Some("BusBuddy"));
    assert_eq!(idea.scale, Some(Scale::Medium));
    assert_eq!(idea.opportunity_score, Some(7));
    assert_eq!(idea.feasibility_score, Some(9));
    assert!(idea.completed_at.is_some());
    assert_eq!(refined.plan.len(), 4);

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("who is **the person**"));
    assert!(text.contains("urgency must be between 1 and 10, got 11"));
    assert!(text.contains(&format!("Saved idea {}", idea.id)));

    let reopened = app(dir.path());
    assert_eq!(reopened.list_ideas().unwrap(), vec![idea.clone()]);
    assert!(reopened.list_notes().unwrap()[0].is_woven());
    assert!(reopened
        .refine(&note.id, &OfflineAssistant, Cursor::new(answers), Vec::new())
        .await
        .is_err());
}

#[tokio::test]
async fn refine_stops_when_answers_run_out() {
    let dir = TempDir::new().unwrap();
    let note = app(dir.path()).add_note("bus app").unwrap();

    let result = app(dir.path())
        .refine(&note.id, &OfflineAssistant, Cursor::new("late buses\n"), Vec::new())
        .await;

    assert!(result.unwrap_err().to_string().contains("input ended during triage"));
    assert!(app(dir.path()).list_ideas().unwrap().is_empty());
    assert!(!app(dir.path()).list_notes().unwrap()[0].is_woven());
}

#[tokio::test]
async fn galaxy_lists_refined_ideas() {
    let dir = TempDir::new().unwrap();
    assert!(app(dir.path()).galaxy().unwrap().is_empty());

    let note = app(dir.path()).add_note("bus app").unwrap();
    let answers = "late buses\ncommuters\nBusBuddy\n8\nmassive\n6\n";
    app(dir.path())
        .refine(&note.id, &OfflineAssistant, Cursor::new(answers), Vec::new())
        .await
        .unwrap();

    let ideas = app(dir.path()).galaxy().unwrap();
    assert_eq!(ideas.len(), 1);
    assert!(render_galaxy(&ideas).starts_with(" 1. BusBuddy"));
}
