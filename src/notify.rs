//! Observability handle passed to the orchestrator, executor and cleanup.
//! Notifications describe what happened; they never change control flow, so
//! callers log a failed `notify` and carry on.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    DirectoryCreated { path: PathBuf },
    Moved { from: PathBuf, to: PathBuf },
    Skipped { path: PathBuf },
    Rejected { path: PathBuf, reason: String },
    CleanupAborted { dir: PathBuf, remaining: Vec<PathBuf> },
    CleanedUp { dir: PathBuf },
}

pub trait Notifier {
    fn notify(&self, event: &TransferEvent) -> Result<()>;
}

/// Emits every event as a structured tracing record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &TransferEvent) -> Result<()> {
        match event {
            TransferEvent::DirectoryCreated { path } => {
                debug!(path = %path.display(), "Created directory")
            }
            TransferEvent::Moved { from, to } => {
                info!(src = %from.display(), dest = %to.display(), "Moved file")
            }
            TransferEvent::Skipped { path } => {
                info!(path = %path.display(), "Already in place, skipped")
            }
            TransferEvent::Rejected { path, reason } => {
                warn!(path = %path.display(), reason = %reason, "Move rejected")
            }
            TransferEvent::CleanupAborted { dir, remaining } => warn!(
                dir = %dir.display(),
                remaining = remaining.len(),
                "Audio files remain in source directory; not deleting it"
            ),
            TransferEvent::CleanedUp { dir } => {
                info!(dir = %dir.display(), "Removed source directory")
            }
        }
        Ok(())
    }
}

/// Send `event`, logging (not propagating) a notifier failure.
pub(crate) fn emit(notifier: &dyn Notifier, event: TransferEvent) {
    if let Err(e) = notifier.notify(&event) {
        warn!(error = %e, "Notifier failed");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records events; optionally fails every call.
    #[derive(Default)]
    pub struct CollectingNotifier {
        pub events: RefCell<Vec<TransferEvent>>,
        pub fail: bool,
    }

    impl CollectingNotifier {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn take(&self) -> Vec<TransferEvent> {
            self.events.take()
        }
    }

    impl Notifier for CollectingNotifier {
        fn notify(&self, event: &TransferEvent) -> Result<()> {
            self.events.borrow_mut().push(event.clone());
            if self.fail {
                anyhow::bail!("notifier offline");
            }
            Ok(())
        }
    }
}
