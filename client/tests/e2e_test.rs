#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(tail_expr_drop_order)]

use anyhow::Result;
use ki_client::KiClient;
use server::http::{self, AppState, HttpServer};
use server::repository::RepositoryConfig;
use server::runner::Runner;
use server::service::{Adding, Listing};
use shared_types::Properties;
use std::sync::Arc;
use std::time::Duration;

struct TestServer {
    server: Arc<HttpServer>,
    running: tokio::task::JoinHandle<server::runner::RunReport>,
    base_url: String,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let repo = RepositoryConfig::memory().build().await?;
        let app = http::router(AppState {
            adding: Arc::new(Adding::new(repo.clone())),
            listing: Arc::new(Listing::new(repo)),
        });

        let server = Arc::new(
            HttpServer::new("127.0.0.1:0".parse()?, app)
                .with_shutdown_timeout(Duration::from_secs(2)),
        );
        let mut runner = Runner::new().with_shutdown_timeout(Duration::from_secs(5));
        runner.add(server.clone());
        let running = tokio::spawn(runner.run());

        let addr = server
            .local_addr()
            .await
            .ok_or_else(|| anyhow::anyhow!("server never started listening"))?;

        Ok(Self {
            server,
            running,
            base_url: format!("http://{addr}"),
        })
    }

    async fn stop(self) -> Result<()> {
        use server::runner::Runnable;

        self.server.graceful_shutdown().await;
        let report = self.running.await?;
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        Ok(())
    }
}

#[tokio::test]
async fn test_e2e_group_and_config_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;
    let client = KiClient::new(&server.base_url)?;

    assert!(client.health_check().await?);

    let group = client.create_group("myapp").await?;
    assert!(group.configs.is_empty());
    assert!(client.create_group("myapp").await.is_err());

    let properties = Properties::from_json(r#"{"pool": {"min": 1, "max": 8}}"#)?;
    let stored = client
        .put_config("myapp", "database", "Database", 1, &properties)
        .await?;
    assert_eq!(stored.properties, properties);

    client
        .put_config("myapp", "database", "Database", 2, &properties)
        .await?;
    client
        .put_config("myapp", "cache", "Cache", 1, &Properties::default())
        .await?;

    let group = client.get_group("myapp").await?;
    assert_eq!(group.configs, vec!["database", "cache"]);

    let config = client.get_config("myapp", "database").await?;
    assert_eq!(config.version, 2);
    assert_eq!(config.properties.as_str(), properties.as_str());

    let cache = client.get_config("myapp", "cache").await?;
    assert!(cache.properties.is_null());

    server.stop().await
}

#[tokio::test]
async fn test_e2e_missing_resources() -> Result<()> {
    let server = TestServer::start().await?;
    let client = KiClient::new(&server.base_url)?;

    let err = client.get_group("nope").await.unwrap_err();
    assert!(err.to_string().contains("Group not found"));

    let err = client
        .put_config("nope", "c1", "", 0, &Properties::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Group not found"));

    // A failed config store must not create the group
    assert!(client.get_group("nope").await.is_err());

    client.create_group("present").await?;
    let err = client.get_config("present", "c1").await.unwrap_err();
    assert!(err.to_string().contains("Config not found: present/c1"));

    server.stop().await
}
