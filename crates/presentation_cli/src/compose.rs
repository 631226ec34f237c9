//! Composer wiring for the CLI
//!
//! Builds the services from configuration and turns command-line input into
//! composer sessions.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, bail};
use application::{
    ComposerSession, DraftRestore, DraftService, MediaService, SubmitOutcome, ports::SelectedFile,
    submit_shared,
};
use domain::{BlockId, CharacterBudget, ComposerDraft, DraftId, ReplyPolicy, Sentiment};
use infrastructure::{
    AppConfig, LocalKeyValueStore, LocalStorageDraftStore, ObjectUrlRegistry, OutboxPostGateway,
    spawn_autosave_task,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::watch,
};
use tracing::{debug, info, warn};

/// Everything needed to build one post from the command line
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
    /// Text of each block, in order
    pub blocks: Vec<String>,
    /// Files attached to the last block
    pub media: Vec<SelectedFile>,
    pub reply_policy: ReplyPolicy,
    pub sentiment: Option<Sentiment>,
}

/// Result of a successful post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReport {
    pub blocks: usize,
    pub media: usize,
}

/// Result of posting a stored draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftPostReport {
    /// The draft carries media and the loss was not confirmed
    NeedsConfirmation { media_count: usize },
    /// The draft was restored and posted
    Posted { report: PostReport, dropped_media: usize },
}

/// Budget of one block as shown by `check`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCheck {
    pub index: usize,
    pub budget: CharacterBudget,
}

/// Summary of an interactive writing session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub posted: usize,
    pub saved_draft: Option<DraftId>,
}

/// Services shared by every command
pub struct ComposerRuntime {
    config: AppConfig,
    previews: Arc<ObjectUrlRegistry>,
    drafts: Arc<DraftService>,
    gateway: OutboxPostGateway,
}

impl std::fmt::Debug for ComposerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposerRuntime")
            .field("storage_path", &self.config.drafts.storage_path)
            .field("outbox_path", &self.config.submission.outbox_path)
            .finish_non_exhaustive()
    }
}

impl ComposerRuntime {
    /// Open storage and build the services described by `config`
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = LocalKeyValueStore::open(
            &config.drafts.storage_path,
            config.drafts.quota_bytes,
        )
        .with_context(|| {
            format!(
                "failed to open draft storage at {}",
                config.drafts.storage_path.display()
            )
        })?;
        let draft_store =
            LocalStorageDraftStore::new(Arc::new(store), config.drafts.storage_key.clone());
        let drafts = DraftService::with_max_drafts(Arc::new(draft_store), config.drafts.max_drafts);
        let gateway = OutboxPostGateway::new(config.submission.outbox_path.clone());

        debug!(
            storage = %config.drafts.storage_path.display(),
            outbox = %config.submission.outbox_path.display(),
            "Composer runtime ready"
        );

        Ok(Self {
            config,
            previews: Arc::new(ObjectUrlRegistry::new()),
            drafts: Arc::new(drafts),
            gateway,
        })
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub const fn gateway(&self) -> &OutboxPostGateway {
        &self.gateway
    }

    /// Live preview references, for checking that sessions clean up
    #[cfg(test)]
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    fn timeout(&self) -> Duration {
        self.config.submission.timeout()
    }

    /// A fresh, empty session
    pub fn new_session(&self) -> ComposerSession {
        ComposerSession::new(
            self.config.composer.to_limits(),
            MediaService::new(Arc::<ObjectUrlRegistry>::clone(&self.previews)),
        )
    }

    /// Build a session holding the requested blocks and selections
    pub fn compose(&self, request: &ComposeRequest) -> anyhow::Result<ComposerSession> {
        let mut session = self.new_session();
        let first = first_block(&session)?;

        for (index, text) in request.blocks.iter().enumerate() {
            let block = if index == 0 {
                first
            } else {
                session.add_block()?
            };
            session.update_text(block, text.as_str())?;
        }

        if !request.media.is_empty() {
            let report = session.attach_files(&request.media)?;
            if report.overflow > 0 {
                warn!(overflow = report.overflow, "Some files did not fit in the block");
            }
            for name in &report.rejected {
                warn!(file = %name, "File rejected");
            }
        }

        session.choose_reply_policy(request.reply_policy);
        session.set_sentiment(request.sentiment);
        Ok(session)
    }

    /// Character budget of every requested block
    pub fn check(&self, request: &ComposeRequest) -> anyhow::Result<Vec<BlockCheck>> {
        let mut session = self.compose(request)?;
        let composer = session.composer();
        let checks = composer
            .blocks()
            .iter()
            .enumerate()
            .map(|(index, block)| {
                composer
                    .block_budget(block.id())
                    .map(|budget| BlockCheck { index, budget })
            })
            .collect::<Result<Vec<_>, _>>()?;
        session.reset();
        Ok(checks)
    }

    /// Publish the requested post to the outbox
    pub async fn post(&self, request: &ComposeRequest) -> anyhow::Result<PostReport> {
        let session = self.compose(request)?;
        self.submit(session).await
    }

    /// Store the requested post as a draft
    pub async fn save_draft(&self, request: &ComposeRequest) -> anyhow::Result<Option<DraftId>> {
        let mut session = self.compose(request)?;
        let saved = self.drafts.save_now(session.composer()).await;
        session.reset();
        Ok(saved?)
    }

    pub async fn list_drafts(&self) -> anyhow::Result<Vec<ComposerDraft>> {
        Ok(self.drafts.list().await?)
    }

    pub async fn show_draft(&self, id: DraftId) -> anyhow::Result<ComposerDraft> {
        Ok(self.drafts.get(id).await?)
    }

    pub async fn delete_draft(&self, id: DraftId) -> anyhow::Result<()> {
        Ok(self.drafts.delete(id).await?)
    }

    /// Restore a draft and publish it
    pub async fn post_draft(
        &self,
        id: DraftId,
        confirm_media_loss: bool,
    ) -> anyhow::Result<DraftPostReport> {
        match self.drafts.open(id, confirm_media_loss).await? {
            DraftRestore::NeedsConfirmation { media_count } => {
                Ok(DraftPostReport::NeedsConfirmation { media_count })
            },
            DraftRestore::Restored(restored) => {
                let dropped_media = restored.dropped_media;
                let mut session = self.new_session();
                session.restore_draft(restored);
                let report = self.submit(session).await?;
                Ok(DraftPostReport::Posted {
                    report,
                    dropped_media,
                })
            },
        }
    }

    async fn submit(&self, mut session: ComposerSession) -> anyhow::Result<PostReport> {
        let metrics = session.metrics();
        if !metrics.can_post {
            session.reset();
            bail!("post is empty or a block is over the character limit");
        }
        let report = PostReport {
            blocks: metrics.block_count,
            media: session
                .composer()
                .blocks()
                .iter()
                .map(|b| b.media().len())
                .sum(),
        };

        match session.submit(&self.gateway, self.timeout()).await? {
            SubmitOutcome::Posted => Ok(report),
            SubmitOutcome::Failed(e) => {
                session.reset();
                Err(e.into())
            },
            SubmitOutcome::TimedOut => {
                session.reset();
                bail!("submission timed out after {:?}", self.timeout())
            },
        }
    }

    /// Line-based writing session with background autosave
    ///
    /// Each line is appended to the focused block. `/new` starts a block,
    /// `/post` publishes, `/save` stores a draft and `/quit` stops. Content
    /// left at the end is saved as a draft.
    pub async fn write<R>(&self, reader: R) -> anyhow::Result<WriteSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let session = self.new_session().into_shared();
        let (stop_autosave, shutdown) = watch::channel(false);
        let autosave = spawn_autosave_task(
            Arc::clone(&session),
            Arc::clone(&self.drafts),
            Some(self.config.drafts.autosave_interval()),
            shutdown,
        );
        let mut summary = WriteSummary::default();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            match line.trim() {
                "/quit" => break,
                "/new" => {
                    if let Err(e) = session.lock().add_block() {
                        warn!(error = %e, "Cannot add block");
                    }
                },
                "/save" => {
                    let snapshot = session.lock().snapshot();
                    summary.saved_draft = self.drafts.save_now(&snapshot).await?;
                },
                "/post" => match submit_shared(&session, &self.gateway, self.timeout()).await {
                    Ok(SubmitOutcome::Posted) => summary.posted += 1,
                    Ok(SubmitOutcome::Failed(e)) => warn!(error = %e, "Post failed"),
                    Ok(SubmitOutcome::TimedOut) => warn!("Post timed out"),
                    Err(e) => warn!(error = %e, "Post refused"),
                },
                _ => append_line(&mut session.lock(), &line)?,
            }
        }

        // Let a tick that is mid-write finish so the final save lands last
        if stop_autosave.send(true).is_err() {
            warn!("Autosave task already gone");
        }
        if let Err(e) = autosave.await {
            warn!(error = %e, "Autosave task ended abnormally");
        }

        let snapshot = session.lock().snapshot();
        if snapshot.has_content() {
            summary.saved_draft = self.drafts.save_now(&snapshot).await?;
            info!("Unposted content saved as draft");
        }
        session.lock().reset();
        Ok(summary)
    }
}

fn first_block(session: &ComposerSession) -> anyhow::Result<BlockId> {
    session
        .composer()
        .blocks()
        .first()
        .map(domain::ComposerBlock::id)
        .context("composer has no blocks")
}

fn append_line(session: &mut ComposerSession, line: &str) -> anyhow::Result<()> {
    let block = match session.composer().active_block() {
        Some(block) => block,
        None => first_block(session)?,
    };
    let current = session
        .composer()
        .block(block)
        .map(|b| b.text().to_string())
        .unwrap_or_default();
    let text = if current.is_empty() {
        line.to_string()
    } else {
        format!("{current}\n{line}")
    };
    session.update_text(block, text)?;
    Ok(())
}

/// Parse `NAME:MIME[:SIZE]` into a selected file
pub fn parse_media(value: &str) -> Result<SelectedFile, String> {
    let mut parts = value.splitn(3, ':');
    let name = parts.next().filter(|s| !s.is_empty());
    let mime = parts.next().filter(|s| !s.is_empty());
    let (Some(name), Some(mime)) = (name, mime) else {
        return Err(format!("Invalid media: {value}. Use NAME:MIME[:SIZE]"));
    };
    let size = match parts.next() {
        Some(size) => size
            .parse::<u64>()
            .map_err(|e| format!("Invalid media size in {value}: {e}"))?,
        None => 0,
    };
    Ok(SelectedFile::new(name, mime, size))
}

/// Parse a draft id given on the command line
pub fn parse_draft_id(value: &str) -> Result<DraftId, String> {
    DraftId::parse(value).map_err(|e| format!("Invalid draft id: {e}"))
}
