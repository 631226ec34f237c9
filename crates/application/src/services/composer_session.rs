//! Composer Session - Drives the composer aggregate from UI actions
//!
//! Owns the transient state around the block collection: focus phase, open
//! popover, media editor and the submission lifecycle. Submission is split
//! into [`ComposerSession::begin_submit`], [`PendingPost::send`] and
//! [`ComposerSession::finish_submit`] so a shared session is never locked
//! while the gateway call is in flight.

use std::{sync::Arc, time::Duration};

use domain::{
    BlockId, CodeBlockId, Composer, ComposerLimits, ComposerMetrics, DomainError, MediaId,
    MediaTransform, ReplyPolicy, Sentiment, SensitivityTag,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::{
    draft_service::RestoredDraft,
    media_service::{AttachReport, MediaEdit, MediaService},
};
use crate::{
    error::ApplicationError,
    ports::{PostPayload, PostSubmissionPort, SelectedFile},
};

/// Default time to wait for the submission gateway
pub const DEFAULT_SUBMISSION_TIMEOUT: Duration = Duration::from_secs(30);

/// A session shared between the host and background tasks
pub type SharedSession = Arc<Mutex<ComposerSession>>;

/// Focus and submission phase of the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposerPhase {
    /// Collapsed, nothing focused
    #[default]
    Idle,
    /// Expanded, a block has focus
    Active,
    /// A submission is in flight
    Posting,
    /// The gateway did not answer in time; content kept
    Stalled,
}

/// Popovers anchored to the composer toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popover {
    ReplyMenu,
    EmojiPicker,
    CodeBlockModal,
}

/// How a submission ended
#[derive(Debug)]
pub enum SubmitOutcome {
    Posted,
    Failed(ApplicationError),
    TimedOut,
}

/// A submission that has been started but not sent
///
/// Holds an owned snapshot, so edits made after [`ComposerSession::begin_submit`]
/// never reach the gateway.
#[derive(Debug, Clone)]
pub struct PendingPost {
    payload: PostPayload,
}

impl PendingPost {
    pub const fn payload(&self) -> &PostPayload {
        &self.payload
    }

    /// Hand the snapshot to the gateway, giving up after `timeout`
    #[instrument(skip(self, gateway), fields(blocks = self.payload.blocks.len()))]
    pub async fn send(&self, gateway: &dyn PostSubmissionPort, timeout: Duration) -> SubmitOutcome {
        match tokio::time::timeout(timeout, gateway.submit(&self.payload)).await {
            Ok(Ok(())) => SubmitOutcome::Posted,
            Ok(Err(e)) => SubmitOutcome::Failed(e),
            Err(_) => SubmitOutcome::TimedOut,
        }
    }
}

/// Interactive composer state
#[derive(Debug)]
pub struct ComposerSession {
    composer: Composer,
    media: MediaService,
    phase: ComposerPhase,
    popover: Option<Popover>,
    media_editor: Option<MediaEdit>,
    last_error: Option<String>,
}

impl ComposerSession {
    /// Create a session with a single empty block
    pub fn new(limits: ComposerLimits, media: MediaService) -> Self {
        Self {
            composer: Composer::new(limits),
            media,
            phase: ComposerPhase::Idle,
            popover: None,
            media_editor: None,
            last_error: None,
        }
    }

    /// Wrap the session for sharing with background tasks
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub const fn composer(&self) -> &Composer {
        &self.composer
    }

    pub const fn phase(&self) -> ComposerPhase {
        self.phase
    }

    pub const fn popover(&self) -> Option<Popover> {
        self.popover
    }

    pub const fn media_editor(&self) -> Option<&MediaEdit> {
        self.media_editor.as_ref()
    }

    /// Message of the last failed submission, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_posting(&self) -> bool {
        self.phase == ComposerPhase::Posting
    }

    pub fn metrics(&self) -> ComposerMetrics {
        self.composer.metrics()
    }

    /// Owned copy of the aggregate, e.g. for autosave
    pub fn snapshot(&self) -> Composer {
        self.composer.clone()
    }

    // ------------------------------------------------------------------
    // Focus and popovers
    // ------------------------------------------------------------------

    /// Focus a block and expand the composer
    pub fn focus(&mut self, block: BlockId) -> Result<(), ApplicationError> {
        self.composer.set_active_block(block)?;
        if self.phase == ComposerPhase::Idle {
            self.phase = ComposerPhase::Active;
        }
        Ok(())
    }

    /// Collapse the composer; ignored while a submission is pending
    pub fn click_outside(&mut self) {
        if matches!(self.phase, ComposerPhase::Posting | ComposerPhase::Stalled) {
            return;
        }
        self.popover = None;
        self.phase = ComposerPhase::Idle;
    }

    /// Open a popover, or close it if it is already open
    pub fn toggle_popover(&mut self, popover: Popover) {
        self.popover = if self.popover == Some(popover) {
            None
        } else {
            Some(popover)
        };
    }

    pub fn close_popovers(&mut self) {
        self.popover = None;
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn update_text(
        &mut self,
        block: BlockId,
        text: impl Into<String>,
    ) -> Result<(), ApplicationError> {
        self.composer.update_block_text(block, text)?;
        Ok(())
    }

    pub fn set_cursor(&mut self, block: BlockId, offset: usize) -> Result<(), ApplicationError> {
        self.composer.set_cursor(block, offset)?;
        Ok(())
    }

    /// Append a block and focus it
    pub fn add_block(&mut self) -> Result<BlockId, ApplicationError> {
        let id = self.composer.add_block()?;
        self.composer.set_active_block(id)?;
        debug!(block = %id, count = self.composer.blocks().len(), "Block added");
        Ok(id)
    }

    /// Delete a block, releasing its media previews
    pub fn delete_block(&mut self, block: BlockId) -> Result<(), ApplicationError> {
        let removed = self.composer.delete_block(block)?;
        self.media.release(std::slice::from_ref(&removed));
        if self.media_editor.as_ref().is_some_and(|e| e.block() == block) {
            self.media_editor = None;
        }
        debug!(block = %block, "Block deleted");
        Ok(())
    }

    /// Attach files to the active block
    pub fn attach_files(&mut self, files: &[SelectedFile]) -> Result<AttachReport, ApplicationError> {
        let block = self.target_block()?;
        self.media.attach(&mut self.composer, block, files)
    }

    pub fn remove_media(&mut self, block: BlockId, media_id: MediaId) -> Result<(), ApplicationError> {
        self.media.remove(&mut self.composer, block, media_id)?;
        Ok(())
    }

    pub fn reorder_media(
        &mut self,
        block: BlockId,
        from: usize,
        to: usize,
    ) -> Result<(), ApplicationError> {
        self.composer.reorder_media(block, from, to)?;
        Ok(())
    }

    /// Insert an emoji into the active block and close the picker
    pub fn select_emoji(&mut self, emoji: &str) -> Result<(), ApplicationError> {
        let block = self.target_block()?;
        self.composer.insert_emoji(block, emoji)?;
        self.close_if_open(Popover::EmojiPicker);
        Ok(())
    }

    /// Insert a code snippet into the active block and close the modal
    pub fn insert_code_block(
        &mut self,
        code: impl Into<String>,
        language: &str,
    ) -> Result<CodeBlockId, ApplicationError> {
        let block = self.target_block()?;
        let id = self.composer.insert_code_block(block, code, language)?;
        self.close_if_open(Popover::CodeBlockModal);
        Ok(id)
    }

    pub fn remove_code_block(
        &mut self,
        block: BlockId,
        code_block: CodeBlockId,
    ) -> Result<(), ApplicationError> {
        self.composer.remove_code_block(block, code_block)?;
        Ok(())
    }

    /// Pick the reply audience and close the menu
    pub fn choose_reply_policy(&mut self, policy: ReplyPolicy) {
        self.composer.set_reply_policy(policy);
        self.close_if_open(Popover::ReplyMenu);
    }

    pub fn set_sentiment(&mut self, sentiment: Option<Sentiment>) {
        self.composer.set_sentiment(sentiment);
    }

    // ------------------------------------------------------------------
    // Media editor
    // ------------------------------------------------------------------

    pub fn open_media_editor(
        &mut self,
        block: BlockId,
        media_id: MediaId,
    ) -> Result<(), ApplicationError> {
        self.media_editor = Some(MediaEdit::open(&self.composer, block, media_id)?);
        Ok(())
    }

    /// Apply the editor's changes and close it
    pub fn save_media_edit(
        &mut self,
        transform: MediaTransform,
        alt: impl Into<String>,
        sensitivity: &[SensitivityTag],
    ) -> Result<(), ApplicationError> {
        let edit = self
            .media_editor
            .take()
            .ok_or_else(|| ApplicationError::InvalidOperation("no media editor open".into()))?;
        edit.save(&mut self.composer, transform, alt, sensitivity)?;
        Ok(())
    }

    pub fn cancel_media_edit(&mut self) {
        self.media_editor = None;
    }

    // ------------------------------------------------------------------
    // Drafts and reset
    // ------------------------------------------------------------------

    /// Replace the content with a restored draft
    pub fn restore_draft(&mut self, draft: RestoredDraft) {
        self.media.release(self.composer.blocks());
        self.composer
            .initialize(draft.blocks, draft.reply_policy, draft.sentiment);
        self.media_editor = None;
        self.popover = None;
        if !self.is_posting() {
            self.phase = ComposerPhase::Active;
        }
        info!(draft_id = %draft.draft_id, "Draft loaded into composer");
    }

    /// Back to one empty block, collapsed
    pub fn reset(&mut self) {
        self.media.release(self.composer.blocks());
        self.composer.reset();
        self.popover = None;
        self.media_editor = None;
        self.last_error = None;
        self.phase = ComposerPhase::Idle;
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Start a submission and capture the snapshot to send
    ///
    /// Refused while another submission is in flight or when the post is
    /// not ready. Allowed again after a stall.
    pub fn begin_submit(&mut self) -> Result<PendingPost, ApplicationError> {
        if self.is_posting() {
            return Err(ApplicationError::InvalidOperation(
                "a submission is already in flight".into(),
            ));
        }
        if !self.composer.can_post() {
            return Err(ApplicationError::InvalidOperation("post is not ready".into()));
        }

        self.phase = ComposerPhase::Posting;
        self.popover = None;
        self.last_error = None;
        let payload = PostPayload {
            blocks: self.composer.blocks().to_vec(),
            reply_policy: self.composer.reply_policy(),
            sentiment: self.composer.sentiment(),
        };
        info!(
            blocks = payload.blocks.len(),
            media = payload.media_count(),
            "Submission started"
        );
        Ok(PendingPost { payload })
    }

    /// Apply the outcome of a submission
    pub fn finish_submit(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Posted => {
                info!("Post published");
                self.reset();
            },
            SubmitOutcome::Failed(e) => {
                error!(error = %e, "Post submission failed");
                self.last_error = Some(e.to_string());
                self.phase = ComposerPhase::Active;
            },
            SubmitOutcome::TimedOut => {
                warn!("Post submission stalled");
                self.phase = ComposerPhase::Stalled;
            },
        }
    }

    /// Begin, send and finish a submission in one call
    pub async fn submit(
        &mut self,
        gateway: &dyn PostSubmissionPort,
        timeout: Duration,
    ) -> Result<SubmitOutcome, ApplicationError> {
        let pending = self.begin_submit()?;
        let outcome = pending.send(gateway, timeout).await;
        self.finish_submit(&outcome);
        Ok(outcome)
    }

    fn target_block(&mut self) -> Result<BlockId, ApplicationError> {
        self.composer
            .ensure_active_block()
            .ok_or_else(|| DomainError::BlockLimitReached { max: 0 }.into())
    }

    fn close_if_open(&mut self, popover: Popover) {
        if self.popover == Some(popover) {
            self.popover = None;
        }
    }
}

/// Submit a shared session without holding its lock across the send
pub async fn submit_shared(
    session: &SharedSession,
    gateway: &dyn PostSubmissionPort,
    timeout: Duration,
) -> Result<SubmitOutcome, ApplicationError> {
    let pending = session.lock().begin_submit()?;
    let outcome = pending.send(gateway, timeout).await;
    session.lock().finish_submit(&outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::ports::{MediaPreviewPort, MockPostSubmissionPort};

    #[derive(Debug, Default)]
    struct CountingPreviews {
        revoked: StdMutex<usize>,
    }

    impl MediaPreviewPort for CountingPreviews {
        fn create_preview(&self, file: &SelectedFile) -> Result<String, ApplicationError> {
            Ok(format!("blob:{}", file.name))
        }

        fn revoke_preview(&self, _reference: &str) {
            *self.revoked.lock().unwrap() += 1;
        }
    }

    /// Gateway that records payloads
    #[derive(Debug, Default)]
    struct RecordingGateway {
        received: tokio::sync::Mutex<Vec<PostPayload>>,
    }

    #[async_trait]
    impl PostSubmissionPort for RecordingGateway {
        async fn submit(&self, payload: &PostPayload) -> Result<(), ApplicationError> {
            self.received.lock().await.push(payload.clone());
            Ok(())
        }
    }

    /// Gateway that never answers
    #[derive(Debug)]
    struct HangingGateway;

    #[async_trait]
    impl PostSubmissionPort for HangingGateway {
        async fn submit(&self, _payload: &PostPayload) -> Result<(), ApplicationError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn session_with_previews() -> (ComposerSession, Arc<CountingPreviews>) {
        let previews = Arc::new(CountingPreviews::default());
        let session = ComposerSession::new(
            ComposerLimits::default(),
            MediaService::new(previews.clone()),
        );
        (session, previews)
    }

    fn session() -> ComposerSession {
        session_with_previews().0
    }

    fn first_block(session: &ComposerSession) -> BlockId {
        session.composer().blocks()[0].id()
    }

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn focus_and_click_outside() {
        let mut session = session();
        let block = first_block(&session);
        session.focus(block).unwrap();
        session.toggle_popover(Popover::ReplyMenu);
        assert_eq!(session.phase(), ComposerPhase::Active);

        session.click_outside();

        assert_eq!(session.phase(), ComposerPhase::Idle);
        assert!(session.popover().is_none());
    }

    #[test]
    fn focus_unknown_block_fails() {
        let mut session = session();
        assert!(session.focus(BlockId::new()).unwrap_err().is_not_found());
        assert_eq!(session.phase(), ComposerPhase::Idle);
    }

    #[test]
    fn popovers_are_exclusive() {
        let mut session = session();
        session.toggle_popover(Popover::EmojiPicker);
        session.toggle_popover(Popover::CodeBlockModal);
        assert_eq!(session.popover(), Some(Popover::CodeBlockModal));
        session.toggle_popover(Popover::CodeBlockModal);
        assert!(session.popover().is_none());
    }

    #[test]
    fn emoji_goes_to_active_block_and_closes_picker() {
        let mut session = session();
        let second = session.add_block().unwrap();
        session.update_text(second, "gm ").unwrap();
        session.toggle_popover(Popover::EmojiPicker);

        session.select_emoji("🚀").unwrap();

        assert_eq!(session.composer().block(second).unwrap().text(), "gm 🚀");
        assert!(session.composer().blocks()[0].text().is_empty());
        assert!(session.popover().is_none());
    }

    #[test]
    fn code_block_closes_modal() {
        let mut session = session();
        session.toggle_popover(Popover::CodeBlockModal);
        session.insert_code_block("fn main() {}", "Rust").unwrap();
        assert!(session.popover().is_none());
        let code = &session.composer().blocks()[0].code_blocks()[0];
        assert_eq!(code.language, "rust");
    }

    #[test]
    fn reply_policy_closes_menu() {
        let mut session = session();
        session.toggle_popover(Popover::ReplyMenu);
        session.choose_reply_policy(ReplyPolicy::Verified);
        assert_eq!(session.composer().reply_policy(), ReplyPolicy::Verified);
        assert!(session.popover().is_none());
    }

    #[test]
    fn deleting_block_releases_its_media() {
        let (mut session, previews) = session_with_previews();
        let second = session.add_block().unwrap();
        session
            .attach_files(&[SelectedFile::new("a.png", "image/png", 1)])
            .unwrap();
        assert_eq!(session.composer().block(second).unwrap().media().len(), 1);

        session.delete_block(second).unwrap();

        assert_eq!(*previews.revoked.lock().unwrap(), 1);
        assert_eq!(session.composer().blocks().len(), 1);
    }

    #[test]
    fn media_editor_round_trip() {
        let mut session = session();
        let block = first_block(&session);
        let report = session
            .attach_files(&[SelectedFile::new("a.png", "image/png", 1)])
            .unwrap();
        let media = report.attached[0];

        session.open_media_editor(block, media).unwrap();
        assert!(session.media_editor().is_some());
        session
            .save_media_edit(MediaTransform::default(), "alt text", &[SensitivityTag::Graphic])
            .unwrap();

        assert!(session.media_editor().is_none());
        let item = &session.composer().blocks()[0].media()[0];
        assert_eq!(item.alt, "alt text");
        assert!(item.is_sensitive());
    }

    #[test]
    fn cancel_media_edit_keeps_item() {
        let mut session = session();
        let block = first_block(&session);
        let report = session
            .attach_files(&[SelectedFile::new("a.png", "image/png", 1)])
            .unwrap();
        session.open_media_editor(block, report.attached[0]).unwrap();

        session.cancel_media_edit();

        assert!(session.media_editor().is_none());
        assert!(!session.composer().blocks()[0].media()[0].has_alt());
        assert!(matches!(
            session.save_media_edit(MediaTransform::default(), "", &[]),
            Err(ApplicationError::InvalidOperation(_))
        ));
    }

    #[test]
    fn begin_submit_refuses_empty_post() {
        let mut session = session();
        assert!(matches!(
            session.begin_submit(),
            Err(ApplicationError::InvalidOperation(_))
        ));
        assert_eq!(session.phase(), ComposerPhase::Idle);
    }

    #[test]
    fn begin_submit_refuses_double_submit() {
        let mut session = session();
        let block = first_block(&session);
        session.update_text(block, "hello").unwrap();
        session.begin_submit().unwrap();
        assert!(session.is_posting());
        assert!(session.begin_submit().is_err());
    }

    #[test]
    fn click_outside_ignored_while_posting() {
        let mut session = session();
        let block = first_block(&session);
        session.update_text(block, "hello").unwrap();
        session.focus(block).unwrap();
        session.begin_submit().unwrap();

        session.click_outside();

        assert_eq!(session.phase(), ComposerPhase::Posting);
    }

    #[tokio::test]
    async fn end_to_end_over_limit_then_post() {
        let (mut session, _) = session_with_previews();
        let block = first_block(&session);
        session.focus(block).unwrap();

        session.update_text(block, "x".repeat(300)).unwrap();
        let metrics = session.metrics();
        assert!(metrics.is_over_limit);
        assert!(!metrics.can_post);

        session.update_text(block, "x".repeat(250)).unwrap();
        assert!(session.metrics().can_post);

        let pending = session.begin_submit().unwrap();
        assert_eq!(session.phase(), ComposerPhase::Posting);

        let gateway = RecordingGateway::default();
        let outcome = pending.send(&gateway, SHORT).await;
        session.finish_submit(&outcome);

        assert!(matches!(outcome, SubmitOutcome::Posted));
        assert_eq!(session.phase(), ComposerPhase::Idle);
        assert_eq!(session.composer().blocks().len(), 1);
        assert!(!session.composer().has_content());
        assert_eq!(gateway.received.lock().await[0].blocks[0].char_count(), 250);
    }

    #[tokio::test]
    async fn snapshot_is_isolated_from_later_edits() {
        let mut session = session();
        let block = first_block(&session);
        session.update_text(block, "one").unwrap();
        let second = session.add_block().unwrap();
        session.update_text(second, "two").unwrap();
        session.choose_reply_policy(ReplyPolicy::Mentioned);
        let before = session.composer().blocks().to_vec();

        let pending = session.begin_submit().unwrap();
        session.update_text(block, "edited while posting").unwrap();
        session.add_block().unwrap();
        session.choose_reply_policy(ReplyPolicy::Everyone);

        let gateway = RecordingGateway::default();
        pending.send(&gateway, SHORT).await;

        let received = gateway.received.lock().await;
        assert_eq!(received[0].blocks, before);
        assert_eq!(received[0].reply_policy, ReplyPolicy::Mentioned);
    }

    #[tokio::test]
    async fn failed_submission_keeps_content() {
        let mut session = session();
        let block = first_block(&session);
        session.update_text(block, "keep me").unwrap();
        let mut gateway = MockPostSubmissionPort::new();
        gateway
            .expect_submit()
            .times(1)
            .returning(|_| Err(ApplicationError::Submission("503".into())));

        let outcome = session.submit(&gateway, SHORT).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(session.phase(), ComposerPhase::Active);
        assert_eq!(session.composer().blocks()[0].text(), "keep me");
        assert!(session.last_error().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn hanging_gateway_stalls() {
        let mut session = session();
        let block = first_block(&session);
        session.update_text(block, "slow").unwrap();

        let outcome = session.submit(&HangingGateway, SHORT).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::TimedOut));
        assert_eq!(session.phase(), ComposerPhase::Stalled);
        assert_eq!(session.composer().blocks()[0].text(), "slow");

        session.click_outside();
        assert_eq!(session.phase(), ComposerPhase::Stalled);

        let mut gateway = MockPostSubmissionPort::new();
        gateway.expect_submit().returning(|_| Ok(()));
        session.submit(&gateway, SHORT).await.unwrap();
        assert_eq!(session.phase(), ComposerPhase::Idle);
    }

    #[tokio::test]
    async fn posted_reset_releases_media() {
        let (mut session, previews) = session_with_previews();
        session
            .attach_files(&[
                SelectedFile::new("a.png", "image/png", 1),
                SelectedFile::new("b.mp4", "video/mp4", 1),
            ])
            .unwrap();
        let mut gateway = MockPostSubmissionPort::new();
        gateway
            .expect_submit()
            .withf(|payload| payload.media_count() == 2)
            .returning(|_| Ok(()));

        session.submit(&gateway, SHORT).await.unwrap();

        assert_eq!(*previews.revoked.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn shared_session_is_editable_while_posting() {
        let shared = session().into_shared();
        let block = shared.lock().composer().blocks()[0].id();
        shared.lock().update_text(block, "shared").unwrap();

        let gateway = RecordingGateway::default();
        let outcome = submit_shared(&shared, &gateway, SHORT).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Posted));
        assert_eq!(shared.lock().phase(), ComposerPhase::Idle);
        assert_eq!(gateway.received.lock().await[0].blocks[0].text(), "shared");
    }

    #[test]
    fn restore_draft_replaces_content() {
        let mut session = session();
        let restored = RestoredDraft {
            draft_id: domain::DraftId::new(),
            blocks: vec![domain::ComposerBlock::with_text("from draft")],
            reply_policy: ReplyPolicy::Following,
            sentiment: Some(Sentiment::Bullish),
            dropped_media: 0,
        };

        session.restore_draft(restored);

        assert_eq!(session.phase(), ComposerPhase::Active);
        assert_eq!(session.composer().blocks()[0].text(), "from draft");
        assert_eq!(session.composer().sentiment(), Some(Sentiment::Bullish));
    }
}
