//! Progress events emitted during a sync, consumed by the CLI or any GUI.
//!
//! Events flow over an unbounded mpsc channel so the orchestrator never
//! blocks on a slow consumer; send failures are deliberately ignored
//! (a front end that dropped its receiver just stops seeing progress).

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use greenlight_sync_core::AssetKind;

/// Maximum time to drain remaining events after the task completes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Removal,
    Download,
    Gamelist,
}

/// Progress events for one sync run.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Fetching the remote catalog (or reading the day-cache).
    FetchingCatalog,
    /// Catalog in hand.
    CatalogFetched { total: usize, from_cache: bool },
    /// Diff against local state computed.
    PlanComputed {
        add: usize,
        update: usize,
        remove: usize,
    },
    /// A stale game's files and record were removed.
    GameRemoved { id: String, title: String },
    /// A game was handed to a worker.
    GameStarted {
        index: usize,
        id: String,
        title: String,
    },
    /// One asset finished downloading.
    AssetDownloaded {
        index: usize,
        id: String,
        kind: AssetKind,
    },
    /// The launch script was written.
    ScriptWritten { index: usize, id: String },
    /// All requested assets and the script succeeded.
    GameCompleted {
        index: usize,
        id: String,
        title: String,
    },
    /// The game was kept, but some asset kinds failed.
    GamePartial {
        index: usize,
        id: String,
        title: String,
        failed_kinds: Vec<AssetKind>,
    },
    /// The game could not be synced at all (non-fatal for the run).
    GameFailed {
        index: usize,
        id: String,
        title: String,
        reason: String,
    },
    /// A single-threaded stage finished.
    StageCompleted { stage: SyncStage, count: usize },
    /// The run is over; no further events follow.
    Done,
}

/// Drive an async task while processing events from its channel.
///
/// Runs `task` to completion, calling `on_event` for each event received.
/// After the task finishes, remaining events are drained until the channel
/// closes (the orchestrator drops its sender on return) or a timeout
/// expires in case a sender leaked.
pub async fn drive_with_events<F, E, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut result = None;

    loop {
        tokio::select! {
            r = &mut task, if result.is_none() => {
                result = Some(r);
                break;
            }
            event = event_rx.recv() => {
                match event {
                    Some(e) => on_event(e),
                    // Channel closed before the task finished (unusual but safe)
                    None => break,
                }
            }
        }
    }

    if result.is_some() {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, event_rx.recv()).await {
                Ok(Some(e)) => on_event(e),
                Ok(None) => break,
                Err(_) => {
                    log::warn!(
                        "event drain timed out after {}s (senders likely leaked)",
                        DRAIN_TIMEOUT.as_secs()
                    );
                    break;
                }
            }
        }
    }

    match result {
        Some(r) => r,
        None => task.await,
    }
}
