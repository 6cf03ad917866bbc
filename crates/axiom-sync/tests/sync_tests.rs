//! Functional tests for synced collections.
//!
//! These tests drive a `SyncedCollection` against a recording remote store
//! with tokio time paused, covering:
//! - Plain local behavior while signed out
//! - Debounced saves collapsing bursts of changes
//! - One-time migration of legacy local data
//! - Discarding loads that finish after the owner changed
//! - Never carrying one owner's records over to the next
//! - Fallback and status reporting on remote failures

use axiom_sync::{
    CollectionSpec, LocalStore, MemoryLocalStore, Session, SyncConfig, SyncStage, SyncStatus,
    SyncedCollection, TransportError,
};
use axiom_test_utils::{legacy_notes_json, owner, RecordingRemoteStore};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: String,
    content: String,
}

fn item(id: &str, content: &str) -> Item {
    Item {
        id: id.to_string(),
        content: content.to_string(),
    }
}

struct Fixture {
    remote: Arc<RecordingRemoteStore>,
    local: Arc<MemoryLocalStore>,
    notes: SyncedCollection<Item>,
}

fn fixture_with_local(local: MemoryLocalStore) -> Fixture {
    let remote = Arc::new(RecordingRemoteStore::new());
    let local = Arc::new(local);
    let notes = SyncedCollection::new(
        CollectionSpec::new("notes", "axiom_notes"),
        Vec::new(),
        remote.clone(),
        local.clone(),
        SyncConfig::new(),
    );
    Fixture {
        remote,
        local,
        notes,
    }
}

fn fixture() -> Fixture {
    fixture_with_local(MemoryLocalStore::new())
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Signed out, the collection is plain state and never touches the remote.
#[tokio::test(start_paused = true)]
async fn signed_out_changes_stay_local() {
    let f = fixture();

    f.notes.set(vec![item("a", "one")]);
    f.notes.update(|v| v.push(item("b", "two")));
    sleep_ms(5_000).await;

    assert_eq!(f.notes.get().len(), 2);
    assert!(f.remote.calls().is_empty());
    assert_eq!(f.notes.status(), SyncStatus::Idle);
}

/// Changes spaced closer than the window produce exactly one save, carrying
/// the final value, no earlier than the window after the last change.
#[tokio::test(start_paused = true)]
async fn burst_of_changes_collapses_into_one_save() {
    let f = fixture();
    let alice = owner("alice");

    f.notes.set_owner(Some(alice.clone()));
    assert_eq!(f.notes.settled().await, SyncStatus::Synced);

    for i in 0..5 {
        f.notes.update(|v| v.push(item(&format!("n{i}"), "x")));
        sleep_ms(100).await;
    }
    assert_eq!(f.notes.status(), SyncStatus::Pending);

    // 100ms already elapsed since the last change
    sleep_ms(390).await;
    assert_eq!(f.remote.save_count(), 0);

    sleep_ms(50).await;
    let saves = f.remote.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0, alice);
    assert_eq!(saves[0].2.len(), 5);
    assert_eq!(saves[0].2[4]["id"], "n4");
    assert_eq!(f.notes.status(), SyncStatus::Synced);
    assert_eq!(f.notes.stats().saves, 1);
}

/// Remote data replaces the local value and keeps its order.
#[tokio::test(start_paused = true)]
async fn remote_data_wins_on_load() {
    let f = fixture_with_local(MemoryLocalStore::with_entry(
        "axiom_notes",
        legacy_notes_json(&["legacy"]),
    ));
    let alice = owner("alice");
    f.remote.insert(
        &alice,
        "notes",
        vec![
            json!({"id": "c", "content": "3"}),
            json!({"id": "a", "content": "1"}),
        ],
    );

    f.notes.set_owner(Some(alice));
    f.notes.settled().await;

    assert_eq!(f.notes.get(), vec![item("c", "3"), item("a", "1")]);
    assert_eq!(f.remote.save_count(), 0);
}

/// Empty remote plus legacy local data: the legacy records are adopted and
/// pushed to the remote immediately, without waiting for the window.
#[tokio::test(start_paused = true)]
async fn legacy_data_is_migrated_immediately() {
    let legacy = legacy_notes_json(&["first", "second"]);
    let f = fixture_with_local(MemoryLocalStore::with_entry("axiom_notes", legacy.clone()));
    let alice = owner("alice");
    let start = tokio::time::Instant::now();

    f.notes.set_owner(Some(alice.clone()));
    assert_eq!(f.notes.settled().await, SyncStatus::Synced);
    assert!(start.elapsed() < SyncConfig::new().debounce());

    let saves = f.remote.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0, alice);
    let expected: Vec<Value> = serde_json::from_str(&legacy).unwrap();
    let migrated: Vec<Value> = saves[0]
        .2
        .iter()
        .map(|v| json!({"id": v["id"], "content": v["content"]}))
        .collect();
    let expected: Vec<Value> = expected
        .iter()
        .map(|v| json!({"id": v["id"], "content": v["content"]}))
        .collect();
    assert_eq!(migrated, expected);

    assert_eq!(f.notes.get().len(), 2);
    assert_eq!(f.notes.stats().migrations, 1);
    // legacy data is left in place
    assert!(f.local.get("axiom_notes").is_some());
}

/// A second load for the same owner finds the migrated data and does not
/// migrate again.
#[tokio::test(start_paused = true)]
async fn migration_happens_once() {
    let f = fixture_with_local(MemoryLocalStore::with_entry(
        "axiom_notes",
        legacy_notes_json(&["only"]),
    ));
    let alice = owner("alice");

    f.notes.set_owner(Some(alice.clone()));
    f.notes.settled().await;
    f.notes.set_owner(None);
    f.notes.set_owner(Some(alice.clone()));
    f.notes.settled().await;

    assert_eq!(f.remote.save_count(), 1);
    assert_eq!(f.remote.get_count(), 2);
    assert_eq!(f.remote.snapshot(&alice, "notes").unwrap().len(), 1);
}

/// No remote data and no legacy data on the first sign-in: what was typed
/// while signed out is kept, since no other owner's data is held.
#[tokio::test(start_paused = true)]
async fn nothing_stored_keeps_current_value() {
    let f = fixture();
    f.notes.set(vec![item("draft", "typed before sign-in")]);

    f.notes.set_owner(Some(owner("alice")));
    assert_eq!(f.notes.settled().await, SyncStatus::Synced);

    assert_eq!(f.notes.get(), vec![item("draft", "typed before sign-in")]);
    assert_eq!(f.remote.save_count(), 0);
}

/// A load for a previous owner that finishes late never overwrites the
/// current owner's data.
#[tokio::test(start_paused = true)]
async fn late_load_for_previous_owner_is_discarded() {
    let f = fixture();
    let alice = owner("alice");
    let bob = owner("bob");
    f.remote.insert(&alice, "notes", vec![json!({"id": "a", "content": "alice"})]);
    f.remote.insert(&bob, "notes", vec![json!({"id": "b", "content": "bob"})]);
    f.remote.delay_gets_for(&alice, Duration::from_secs(1));

    f.notes.set_owner(Some(alice));
    f.notes.set_owner(Some(bob.clone()));
    f.notes.settled().await;
    assert_eq!(f.notes.get(), vec![item("b", "bob")]);

    sleep_ms(2_000).await;
    assert_eq!(f.notes.get(), vec![item("b", "bob")]);
    assert_eq!(f.notes.owner(), Some(bob));
    assert_eq!(f.notes.stats().loads, 1);
}

/// After alice, bob with nothing stored starts from the default and his
/// first save carries only their own records.
#[tokio::test(start_paused = true)]
async fn switching_owner_never_exposes_previous_data() {
    let f = fixture();
    let alice = owner("alice");
    let bob = owner("bob");
    f.remote.insert(&alice, "notes", vec![json!({"id": "a", "content": "alice secret"})]);

    f.notes.set_owner(Some(alice.clone()));
    f.notes.settled().await;
    assert_eq!(f.notes.get(), vec![item("a", "alice secret")]);
    f.notes.set_owner(None);

    f.notes.set_owner(Some(bob.clone()));
    assert_eq!(f.notes.settled().await, SyncStatus::Synced);
    assert!(f.notes.get().is_empty());

    f.notes.update(|v| v.push(item("b", "bob")));
    sleep_ms(600).await;

    assert_eq!(
        f.remote.snapshot(&bob, "notes"),
        Some(vec![json!({"id": "b", "content": "bob"})])
    );
    assert_eq!(f.remote.snapshot(&alice, "notes").unwrap().len(), 1);
}

/// A direct switch whose remote read fails, with no local fallback, also
/// starts from the default.
#[tokio::test(start_paused = true)]
async fn failed_load_after_switch_starts_from_default() {
    let f = fixture();
    let alice = owner("alice");
    f.remote.insert(&alice, "notes", vec![json!({"id": "a", "content": "alice secret"})]);

    f.notes.set_owner(Some(alice));
    f.notes.settled().await;
    f.remote.fail_gets(TransportError::unavailable("offline"));

    f.notes.set_owner(Some(owner("bob")));
    assert!(f.notes.settled().await.is_failed());
    assert!(f.notes.get().is_empty());
    assert!(f.notes.is_loaded());
}

/// A debounced save, sign-out, and sign-in as the same owner gives back the
/// saved records in order.
#[tokio::test(start_paused = true)]
async fn saved_value_reloads_for_same_owner() {
    let f = fixture();
    let alice = owner("alice");
    let saved = vec![item("c", "third"), item("a", "first"), item("b", "second")];

    f.notes.set_owner(Some(alice.clone()));
    f.notes.settled().await;
    f.notes.set(saved.clone());
    sleep_ms(600).await;
    assert_eq!(f.remote.save_count(), 1);

    f.notes.set_owner(None);
    f.notes.set(vec![item("z", "signed out")]);
    f.notes.set_owner(Some(alice));
    assert_eq!(f.notes.settled().await, SyncStatus::Synced);

    assert_eq!(f.notes.get(), saved);
    assert_eq!(f.remote.get_count(), 2);
}

/// Setting the same owner twice starts a single load.
#[tokio::test(start_paused = true)]
async fn repeated_owner_is_a_no_op() {
    let f = fixture();
    let alice = owner("alice");

    f.notes.set_owner(Some(alice.clone()));
    f.notes.set_owner(Some(alice.clone()));
    f.notes.settled().await;
    f.notes.set_owner(Some(alice));

    assert_eq!(f.remote.get_count(), 1);
}

/// Signing out cancels a pending save and keeps the value locally.
#[tokio::test(start_paused = true)]
async fn sign_out_cancels_pending_save() {
    let f = fixture();
    f.notes.set_owner(Some(owner("alice")));
    f.notes.settled().await;

    f.notes.update(|v| v.push(item("x", "unsaved")));
    sleep_ms(100).await;
    f.notes.set_owner(None);
    sleep_ms(2_000).await;

    assert_eq!(f.remote.save_count(), 0);
    assert_eq!(f.notes.get(), vec![item("x", "unsaved")]);
    assert_eq!(f.notes.status(), SyncStatus::Idle);
}

/// Changes made while the load is in flight are not saved on their own.
#[tokio::test(start_paused = true)]
async fn changes_during_load_do_not_schedule_saves() {
    let f = fixture();
    let alice = owner("alice");
    f.remote.delay_gets_for(&alice, Duration::from_secs(1));

    f.notes.set_owner(Some(alice));
    f.notes.update(|v| v.push(item("early", "x")));
    assert!(!f.notes.is_loaded());

    f.notes.settled().await;
    sleep_ms(2_000).await;
    assert_eq!(f.remote.save_count(), 0);
}

/// A failed save is reported, not retried, and the value is kept.
#[tokio::test(start_paused = true)]
async fn failed_save_is_reported_without_retry() {
    let f = fixture();
    f.notes.set_owner(Some(owner("alice")));
    f.notes.settled().await;
    f.remote.fail_saves(TransportError::unavailable("offline"));

    f.notes.set(vec![item("k", "kept")]);
    sleep_ms(10_000).await;

    assert_eq!(f.remote.save_count(), 1);
    assert_eq!(f.notes.get(), vec![item("k", "kept")]);
    match f.notes.status() {
        SyncStatus::Failed(failure) => {
            assert_eq!(failure.stage, SyncStage::Save);
            assert!(failure.message.contains("offline"));
        }
        other => panic!("expected a failed save, got {other:?}"),
    }

    // the next change schedules a fresh save
    f.remote.heal();
    f.notes.update(|v| v.push(item("k2", "again")));
    sleep_ms(600).await;
    assert_eq!(f.remote.save_count(), 2);
    assert_eq!(f.notes.status(), SyncStatus::Synced);
}

/// A failed remote read falls back to the legacy local data.
#[tokio::test(start_paused = true)]
async fn failed_load_falls_back_to_local_data() {
    let f = fixture_with_local(MemoryLocalStore::with_entry(
        "axiom_notes",
        legacy_notes_json(&["offline note"]),
    ));
    f.remote.fail_gets(TransportError::permission_denied("denied"));

    f.notes.set_owner(Some(owner("alice")));
    let status = f.notes.settled().await;

    assert!(matches!(status, SyncStatus::Failed(ref s) if s.stage == SyncStage::Load));
    assert_eq!(f.notes.get()[0].content, "offline note");
    assert!(f.notes.is_loaded());
    assert_eq!(f.remote.save_count(), 0);
}

/// A failed migration push still adopts the legacy data.
#[tokio::test(start_paused = true)]
async fn failed_migration_still_adopts_legacy_data() {
    let f = fixture_with_local(MemoryLocalStore::with_entry(
        "axiom_notes",
        legacy_notes_json(&["keep me"]),
    ));
    f.remote.fail_saves(TransportError::unavailable("offline"));

    f.notes.set_owner(Some(owner("alice")));
    let status = f.notes.settled().await;

    assert!(matches!(status, SyncStatus::Failed(ref s) if s.stage == SyncStage::Migrate));
    assert_eq!(f.notes.get()[0].content, "keep me");
    assert_eq!(f.notes.stats().failures, 1);
}

/// Malformed legacy text is treated as absent when the remote read fails.
#[tokio::test(start_paused = true)]
async fn malformed_legacy_data_is_ignored_on_fallback() {
    let f = fixture_with_local(MemoryLocalStore::with_entry("axiom_notes", "{not json"));
    f.notes.set(vec![item("mine", "x")]);
    f.remote.fail_gets(TransportError::unavailable("offline"));

    f.notes.set_owner(Some(owner("alice")));
    f.notes.settled().await;

    assert_eq!(f.notes.get(), vec![item("mine", "x")]);
}

/// A collection following a session loads on sign-in and detaches on
/// sign-out.
#[tokio::test(start_paused = true)]
async fn follows_session_identity() {
    let f = fixture();
    let alice = owner("alice");
    f.remote.insert(&alice, "notes", vec![json!({"id": "a", "content": "hi"})]);

    let notes = Arc::new(f.notes);
    let session = Session::new();
    let task = notes.follow(session.subscribe());

    session.sign_in(alice.clone());
    sleep_ms(10).await;
    notes.settled().await;
    assert_eq!(notes.owner(), Some(alice));
    assert_eq!(notes.get(), vec![item("a", "hi")]);

    session.sign_out();
    sleep_ms(10).await;
    assert!(notes.owner().is_none());
    assert_eq!(notes.status(), SyncStatus::Idle);

    drop(session);
    task.await.unwrap();
}
