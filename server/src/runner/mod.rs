//! Process supervisor for the network listeners.
//!
//! The [`Runner`] starts every registered [`Runnable`] on its own task and
//! waits for the first one to raise its [`Signal`]. It then calls
//! `graceful_shutdown` on all of them and returns once every `serve` has
//! returned.

mod interrupt;
mod runnable;


pub use interrupt::InterruptListener;
pub use runnable::{Failure, Runnable, Signal};

use futures::FutureExt;
use futures::future::join_all;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time;
use tracing::{error, info, warn};

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

/// Outcome of [`Runner::run`].
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Every failure raised before the runner stopped, in arrival order.
    /// The first entry is the one that triggered shutdown.
    pub failures: Vec<Failure>,
}

impl RunReport {
    pub fn trigger(&self) -> Option<&Failure> {
        self.failures.first()
    }
}

pub struct Runner {
    runnables: Vec<Arc<dyn Runnable>>,
    shutdown_timeout: Duration,
    state: watch::Sender<RunnerState>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        let (state, _) = watch::channel(RunnerState::Idle);
        Self {
            runnables: Vec::new(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            state,
        }
    }

    /// Upper bound for each `graceful_shutdown` call, and again for the serve
    /// loops to return afterwards. Loops still running after that are aborted.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn add(&mut self, runnable: Arc<dyn Runnable>) {
        self.runnables.push(runnable);
    }

    pub fn subscribe(&self) -> watch::Receiver<RunnerState> {
        self.state.subscribe()
    }

    fn transition(&self, next: RunnerState) {
        let previous = self.state.send_replace(next);
        info!(from = ?previous, to = ?next, "Runner state changed");
    }

    /// Serve every runnable until one of them raises its signal, then shut
    /// all of them down. Returns once every serve loop has returned.
    pub async fn run(self) -> RunReport {
        if self.runnables.is_empty() {
            info!("No runnables registered. Stopping application");
            self.transition(RunnerState::Stopped);
            return RunReport::default();
        }

        let (tx, mut rx) = mpsc::channel(self.runnables.len());
        let mut serving = JoinSet::new();

        self.transition(RunnerState::Running);
        for runnable in &self.runnables {
            let runnable = Arc::clone(runnable);
            let signal = Signal::new(runnable.name(), tx.clone());
            let panic_tx = tx.clone();

            serving.spawn(async move {
                info!(runnable = %runnable.name(), "Starting runnable");
                let served = AssertUnwindSafe(runnable.serve(signal))
                    .catch_unwind()
                    .await;
                if served.is_err() {
                    error!(runnable = %runnable.name(), "Runnable panicked while serving");
                    let _ = panic_tx.try_send(Failure::new(runnable.name(), "serve panicked"));
                }
            });
        }
        drop(tx);

        // `None` means every serve loop returned without raising
        let trigger = rx.recv().await;
        match &trigger {
            Some(failure) => info!(
                runnable = %failure.runnable,
                reason = %failure.reason,
                "Received signal. Preparing for shutdown"
            ),
            None => info!("All runnables stopped serving. Preparing for shutdown"),
        }

        self.transition(RunnerState::ShuttingDown);
        self.shutdown_all().await;
        self.wait_for_serve_loops(&mut serving).await;

        let mut failures: Vec<Failure> = trigger.into_iter().collect();
        while let Ok(failure) = rx.try_recv() {
            warn!(
                runnable = %failure.runnable,
                reason = %failure.reason,
                "Runnable also failed during shutdown"
            );
            failures.push(failure);
        }

        self.transition(RunnerState::Stopped);
        RunReport { failures }
    }

    async fn shutdown_all(&self) {
        let timeout = self.shutdown_timeout;
        join_all(self.runnables.iter().map(|runnable| async move {
            info!(runnable = %runnable.name(), "Shutting down runnable");
            if time::timeout(timeout, runnable.graceful_shutdown())
                .await
                .is_err()
            {
                warn!(
                    runnable = %runnable.name(),
                    "Graceful shutdown did not finish within {:?}", timeout
                );
            }
        }))
        .await;
    }

    async fn wait_for_serve_loops(&self, serving: &mut JoinSet<()>) {
        let joined = time::timeout(self.shutdown_timeout, async {
            while let Some(result) = serving.join_next().await {
                if let Err(e) = result {
                    error!("Runnable task failed: {e}");
                }
            }
        })
        .await;

        if joined.is_err() {
            warn!(
                remaining = serving.len(),
                "Aborting runnables that did not stop serving"
            );
            serving.shutdown().await;
        }
    }
}
