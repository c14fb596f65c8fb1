use anyhow::Result;
use server::http::{self, AppState, HttpServer};
use server::runner::{InterruptListener, Runner};
use server::service::{Adding, Listing};
use server::settings::AppConfig;
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use tracing::{Level, error, info};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Ki");

    let property_file = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("KI_PROPERTY_FILE").ok())
        .map(PathBuf::from);
    let config = AppConfig::load(property_file.as_deref())?;

    let repository = config.repository.build().await?;
    let state = AppState {
        adding: Arc::new(Adding::new(repository.clone())),
        listing: Arc::new(Listing::new(repository)),
    };

    let mut runner = Runner::new().with_shutdown_timeout(config.shutdown_timeout);
    runner.add(Arc::new(
        HttpServer::new(config.bind_address, http::router(state))
            .with_shutdown_timeout(config.shutdown_timeout),
    ));
    runner.add(Arc::new(InterruptListener::new()));

    let report = runner.run().await;

    let failed: Vec<_> = report
        .failures
        .iter()
        .filter(|f| f.runnable != InterruptListener::NAME)
        .collect();
    if failed.is_empty() {
        info!("Ki stopped");
        return Ok(ExitCode::SUCCESS);
    }

    for failure in failed {
        error!(runnable = %failure.runnable, reason = %failure.reason, "Stopped after failure");
    }
    Ok(ExitCode::FAILURE)
}
