use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;
use tracing::warn;

/// A long-running listener supervised by [`Runner`](super::Runner).
#[async_trait]
pub trait Runnable: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Serve until the listener is closed. On an unrecoverable error, raise
    /// `signal` and return. Returning without raising means a clean stop.
    async fn serve(&self, signal: Signal);

    /// Ask `serve` to stop, draining in-flight work for a bounded time.
    /// Must be safe to call whether or not `serve` is still running.
    async fn graceful_shutdown(&self);
}

/// Why a runnable stopped serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub runnable: String,
    pub reason: String,
}

impl Failure {
    pub fn new(runnable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            runnable: runnable.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.runnable, self.reason)
    }
}

/// Handle a runnable uses to report a fatal error. Raising consumes it, so
/// each `serve` call reports at most once.
pub struct Signal {
    runnable: String,
    tx: mpsc::Sender<Failure>,
}

impl Signal {
    pub(super) fn new(runnable: impl Into<String>, tx: mpsc::Sender<Failure>) -> Self {
        Self {
            runnable: runnable.into(),
            tx,
        }
    }

    pub fn raise(self, reason: impl Into<String>) {
        let failure = Failure::new(self.runnable, reason);
        if let Err(e) = self.tx.try_send(failure) {
            warn!("Dropped failure signal: {e}");
        }
    }
}
