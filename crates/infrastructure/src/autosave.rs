//! Draft autosave task
//!
//! Periodically snapshots a shared composer session into the draft history.

use std::{sync::Arc, time::Duration};

use application::{AutosaveOutcome, DraftService, SharedSession};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Default autosave interval
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(10);

/// Shortest interval the task accepts
const MIN_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn a background task that autosaves the session at a fixed interval.
///
/// The session lock is only held while the composer is cloned, never while
/// the draft is written. A failed write drops that tick.
///
/// Sending `true` on the shutdown channel stops the task after any tick in
/// progress has finished writing, so awaiting the returned `JoinHandle`
/// guarantees no autosave lands afterwards. Aborting the handle instead can
/// leave a blocking write running in the background.
///
/// # Arguments
///
/// * `session` - The shared composer session to snapshot
/// * `drafts` - Draft service that owns the history
/// * `autosave_interval` - How often to save (defaults to 10 seconds if None)
/// * `shutdown` - Stop signal
///
/// # Example
///
/// ```ignore
/// let (stop, shutdown) = tokio::sync::watch::channel(false);
/// let autosave = spawn_autosave_task(session.clone(), drafts, None, shutdown);
///
/// // On shutdown:
/// stop.send(true)?;
/// autosave.await?;
/// ```
pub fn spawn_autosave_task(
    session: SharedSession,
    drafts: Arc<DraftService>,
    autosave_interval: Option<Duration>,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let interval = autosave_interval
        .unwrap_or(DEFAULT_AUTOSAVE_INTERVAL)
        .max(MIN_AUTOSAVE_INTERVAL);

    info!(interval_secs = interval.as_secs(), "Starting draft autosave task");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Don't save immediately on startup
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {},
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Draft autosave task stopping");
                        break;
                    }
                    continue;
                },
            }

            let snapshot = session.lock().snapshot();

            match drafts.autosave(&snapshot).await {
                AutosaveOutcome::Saved(id) => debug!(draft_id = %id, "Autosaved draft"),
                AutosaveOutcome::Skipped => debug!("Composer empty, autosave skipped"),
                AutosaveOutcome::Failed => warn!("Autosave tick dropped"),
            }
        }
    })
}
