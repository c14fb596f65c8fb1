use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::{error, info};

use super::runnable::{Runnable, Signal};

/// Turns Ctrl-C into a runner signal so an interrupt shuts every listener
/// down the same way a listener failure does.
#[derive(Default)]
pub struct InterruptListener {
    stop: Notify,
}

impl InterruptListener {
    pub const NAME: &'static str = "interrupt";

    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Runnable for InterruptListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn serve(&self, signal: Signal) {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Received interrupt");
                    signal.raise("interrupted");
                }
                Err(e) => {
                    error!("Unable to listen for interrupt: {e}");
                    self.stop.notified().await;
                }
            },
            () = self.stop.notified() => {}
        }
    }

    async fn graceful_shutdown(&self) {
        self.stop.notify_one();
    }
}
