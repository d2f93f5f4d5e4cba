// ─── Progress & Cancellation ───
// The workflow emits discrete events over a channel; whatever front end is
// attached consumes them on its own schedule. Nothing in core ever calls
// back into a UI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Byte-level payload emitted while a single file streams to disk.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadProgress {
    pub url: String,
    pub bytes_downloaded: u64,
    pub total_bytes: Option<u64>,
    pub file_name: String,
}

/// Discrete workflow milestones. `fraction` is the share of the mod batch
/// finished after the event, in `0.0..=1.0`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    LoaderInstallStarted,
    LoaderInstalled,
    ModStarted {
        slug: String,
        index: usize,
        total: usize,
    },
    ModDownloaded {
        slug: String,
        fraction: f32,
    },
    ModUnavailable {
        slug: String,
        fraction: f32,
    },
    Download(DownloadProgress),
    RollbackStarted,
    ProfileWritten,
}

/// Cloneable sender half handed to the workflow; `disabled()` makes every
/// emit a no-op for headless callers.
#[derive(Clone)]
pub struct ProgressReporter {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // A hung-up receiver is not the workflow's problem.
            let _ = tx.send(event);
        }
    }
}

/// Cooperative cancellation flag checked between workflow steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_delivers_events_in_order() {
        let (reporter, mut rx) = ProgressReporter::channel();
        reporter.emit(ProgressEvent::LoaderInstallStarted);
        reporter.emit(ProgressEvent::ModStarted {
            slug: "sodium".to_string(),
            index: 0,
            total: 3,
        });

        assert!(matches!(
            rx.try_recv(),
            Ok(ProgressEvent::LoaderInstallStarted)
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(ProgressEvent::ModStarted { index: 0, .. })
        ));
    }

    #[test]
    fn disabled_reporter_swallows_events() {
        ProgressReporter::disabled().emit(ProgressEvent::LoaderInstalled);
    }

    #[test]
    fn cancel_token_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
