//! Integration tests for the file-backed storage and outbox adapters
//!
//! These tests run the real adapters against temporary directories.

#![allow(clippy::expect_used, clippy::panic)]

use std::{sync::Arc, time::Duration};

use application::{
    ApplicationError, AutosaveOutcome, ComposerPhase, ComposerSession, DraftRestore, DraftService,
    MediaService, SubmitOutcome,
    ports::{DraftStoragePort, PostSubmissionPort, SelectedFile},
};
use domain::{Composer, ComposerLimits, ReplyPolicy, Sentiment};
use infrastructure::{
    adapters::{ObjectUrlRegistry, OutboxPostGateway},
    persistence::{LocalKeyValueStore, LocalStorageDraftStore, StorageError},
};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

// ============================================================================
// Test Helpers
// ============================================================================

fn open_store(dir: &TempDir, quota_bytes: Option<u64>) -> Arc<LocalKeyValueStore> {
    let path = dir.path().join("storage.json");
    Arc::new(LocalKeyValueStore::open(path, quota_bytes).expect("Failed to open store"))
}

fn draft_service(store: Arc<LocalKeyValueStore>) -> DraftService {
    DraftService::new(Arc::new(LocalStorageDraftStore::with_default_key(store)))
}

fn composer_with(text: &str) -> Composer {
    let mut composer = Composer::default();
    let id = composer.blocks()[0].id();
    composer
        .update_block_text(id, text)
        .expect("Failed to set text");
    composer
}

fn new_session(previews: Arc<ObjectUrlRegistry>) -> ComposerSession {
    ComposerSession::new(ComposerLimits::default(), MediaService::new(previews))
}

// ============================================================================
// Key-Value Store Tests
// ============================================================================

mod key_value_store_tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir, None);
        assert_ok!(store.set_item("greeting", "gm"));
        drop(store);

        let reopened = open_store(&dir, None);
        assert_eq!(reopened.get_item("greeting").as_deref(), Some("gm"));
    }

    #[test]
    fn missing_parent_directory_is_created() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("deeper").join("storage.json");
        let store = LocalKeyValueStore::open(&path, None).expect("Failed to open store");

        assert_ok!(store.set_item("k", "v"));
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_rejected_on_open() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2").expect("Failed to write file");

        let err = LocalKeyValueStore::open(&path, None).expect_err("Open should fail");
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn quota_failure_leaves_file_untouched() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir, Some(20));
        assert_ok!(store.set_item("a", "short"));

        assert_err!(store.set_item("b", "this value is far too long"));

        let reopened = open_store(&dir, Some(20));
        assert_eq!(reopened.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn remove_persists() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir, None);
        assert_ok!(store.set_item("a", "1"));
        assert!(store.remove_item("a").expect("Failed to remove"));

        let reopened = open_store(&dir, None);
        assert!(reopened.get_item("a").is_none());
    }
}

// ============================================================================
// Draft Store Tests
// ============================================================================

mod draft_store_tests {
    use super::*;

    #[tokio::test]
    async fn history_cap_survives_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let service = draft_service(open_store(&dir, None));

        for i in 0..25 {
            let outcome = service.autosave(&composer_with(&format!("draft {i}"))).await;
            assert!(matches!(outcome, AutosaveOutcome::Saved(_)));
        }

        let reopened = draft_service(open_store(&dir, None));
        let drafts = reopened.list().await.expect("Failed to list");
        assert_eq!(drafts.len(), 20);
        assert_eq!(drafts[0].blocks[0].text, "draft 24");
        assert_eq!(drafts[19].blocks[0].text, "draft 5");
    }

    #[tokio::test]
    async fn stored_layout_is_camel_case_json_array() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir, None);
        let service = draft_service(Arc::clone(&store));
        let mut composer = composer_with("layout");
        composer.set_sentiment(Some(Sentiment::Bearish));

        assert_ok!(service.save_now(&composer).await);

        let raw = store.get_item("composer-drafts").expect("Drafts key missing");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("Invalid JSON");
        let first = &json.as_array().expect("Not an array")[0];
        assert!(first.get("createdAt").is_some());
        assert_eq!(first["replyPolicy"], "everyone");
        assert_eq!(first["sentiment"], "bearish");
        assert_eq!(first["blocks"][0]["text"], "layout");
    }

    #[tokio::test]
    async fn media_is_dropped_after_confirmation() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let previews = Arc::new(ObjectUrlRegistry::new());
        let mut session = new_session(Arc::clone(&previews));
        let block = session.composer().blocks()[0].id();
        session.update_text(block, "hello").expect("Failed to set text");
        session
            .attach_files(&[SelectedFile::new("m1.png", "image/png", 512)])
            .expect("Failed to attach");

        let service = draft_service(open_store(&dir, None));
        let id = service
            .save_now(session.composer())
            .await
            .expect("Failed to save")
            .expect("Nothing saved");

        let reopened = draft_service(open_store(&dir, None));
        assert_eq!(
            reopened.open(id, false).await.expect("Failed to open"),
            DraftRestore::NeedsConfirmation { media_count: 1 }
        );
        let DraftRestore::Restored(restored) = reopened.open(id, true).await.expect("Failed to open")
        else {
            panic!("expected a restored draft");
        };

        let mut fresh = new_session(previews);
        fresh.restore_draft(restored);
        let blocks = fresh.composer().blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "hello");
        assert!(blocks[0].media().is_empty());
    }

    #[tokio::test]
    async fn corrupt_draft_value_reads_as_empty_and_is_replaced() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir, None);
        assert_ok!(store.set_item("composer-drafts", "{\"not\": \"a list\"}"));
        let service = draft_service(Arc::clone(&store));

        assert!(service.list().await.expect("Failed to list").is_empty());

        assert!(matches!(
            service.autosave(&composer_with("fresh start")).await,
            AutosaveOutcome::Saved(_)
        ));
        assert_eq!(service.list().await.expect("Failed to list").len(), 1);
    }

    #[tokio::test]
    async fn quota_exceeded_drops_tick_and_keeps_history() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir, Some(1200));
        let service = draft_service(Arc::clone(&store));
        assert!(matches!(
            service.autosave(&composer_with("small")).await,
            AutosaveOutcome::Saved(_)
        ));

        let huge = composer_with(&"x".repeat(2000));
        assert_eq!(service.autosave(&huge).await, AutosaveOutcome::Failed);

        let drafts = service.list().await.expect("Failed to list");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].blocks[0].text, "small");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_saves_are_all_stored() {
        let service = DraftService::new(Arc::new(LocalStorageDraftStore::with_default_key(
            Arc::new(LocalKeyValueStore::in_memory(None)),
        )));
        let tick = composer_with("autosave tick");
        let explicit = composer_with("explicit save");

        let (a, b) = tokio::join!(service.save_now(&tick), service.save_now(&explicit));
        let a = a.expect("First save failed").expect("Nothing saved");
        let b = b.expect("Second save failed").expect("Nothing saved");

        let drafts = service.list().await.expect("Failed to list");
        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().any(|d| d.id == a));
        assert!(drafts.iter().any(|d| d.id == b));
    }

    #[tokio::test]
    async fn custom_key_is_isolated() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir, None);
        let custom = LocalStorageDraftStore::new(Arc::clone(&store), "other-drafts");
        let default = LocalStorageDraftStore::with_default_key(Arc::clone(&store));

        let draft = domain::ComposerDraft::capture(&composer_with("elsewhere"))
            .expect("Nothing captured");
        assert_ok!(custom.save_drafts(&[draft]).await);

        assert!(default.load_drafts().await.expect("Failed to load").is_empty());
        assert_eq!(custom.load_drafts().await.expect("Failed to load").len(), 1);
    }
}

// ============================================================================
// Outbox Gateway Tests
// ============================================================================

mod outbox_tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn posts_are_appended_in_order() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = OutboxPostGateway::new(dir.path().join("outbox.jsonl"));
        let mut session = new_session(Arc::new(ObjectUrlRegistry::new()));

        for text in ["first post", "second post"] {
            let block = session.composer().blocks()[0].id();
            session.update_text(block, text).expect("Failed to set text");
            let outcome = session.submit(&gateway, TIMEOUT).await.expect("Submit refused");
            assert!(matches!(outcome, SubmitOutcome::Posted));
        }

        let records = gateway.read_records().await.expect("Failed to read outbox");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].post.blocks[0].text(), "first post");
        assert_eq!(records[1].post.blocks[0].text(), "second post");
        assert_ne!(records[0].id, records[1].id);
    }

    #[tokio::test]
    async fn thread_keeps_block_order_and_selections() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = OutboxPostGateway::new(dir.path().join("outbox.jsonl"));
        let mut session = new_session(Arc::new(ObjectUrlRegistry::new()));
        let first = session.composer().blocks()[0].id();
        session.update_text(first, "1/2").expect("Failed to set text");
        let second = session.add_block().expect("Failed to add block");
        session.update_text(second, "2/2").expect("Failed to set text");
        session.choose_reply_policy(ReplyPolicy::Following);
        session.set_sentiment(Some(Sentiment::Bullish));

        session.submit(&gateway, TIMEOUT).await.expect("Submit refused");

        assert_eq!(session.phase(), ComposerPhase::Idle);
        let records = gateway.read_records().await.expect("Failed to read outbox");
        let post = &records[0].post;
        assert_eq!(post.blocks[0].text(), "1/2");
        assert_eq!(post.blocks[1].text(), "2/2");
        assert_eq!(post.reply_policy, ReplyPolicy::Following);
        assert_eq!(post.sentiment, Some(Sentiment::Bullish));
    }

    #[tokio::test]
    async fn missing_outbox_reads_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = OutboxPostGateway::new(dir.path().join("never-written.jsonl"));
        assert!(gateway.read_records().await.expect("Failed to read").is_empty());
    }

    #[tokio::test]
    async fn unwritable_outbox_fails_submission() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        // A directory cannot be opened for appending
        let gateway = OutboxPostGateway::new(dir.path());
        let mut session = new_session(Arc::new(ObjectUrlRegistry::new()));
        let block = session.composer().blocks()[0].id();
        session.update_text(block, "lost?").expect("Failed to set text");

        let outcome = session.submit(&gateway, TIMEOUT).await.expect("Submit refused");

        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(ApplicationError::Submission(_))
        ));
        assert_eq!(session.phase(), ComposerPhase::Active);
        assert_eq!(session.composer().blocks()[0].text(), "lost?");
    }

    #[tokio::test]
    async fn gateway_is_usable_through_the_port() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let gateway: Arc<dyn PostSubmissionPort> =
            Arc::new(OutboxPostGateway::new(dir.path().join("outbox.jsonl")));
        let mut session = new_session(Arc::new(ObjectUrlRegistry::new()));
        let block = session.composer().blocks()[0].id();
        session.update_text(block, "via port").expect("Failed to set text");

        let pending = session.begin_submit().expect("Submit refused");
        let outcome = pending.send(gateway.as_ref(), TIMEOUT).await;
        session.finish_submit(&outcome);

        assert!(matches!(outcome, SubmitOutcome::Posted));
        assert!(!session.composer().has_content());
    }
}
