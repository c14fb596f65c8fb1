use async_trait::async_trait;
use shared_types::{Config, Group};
use std::sync::Arc;

use crate::repository::{Repository, Result};

/// Write side of the store, as seen by transport handlers
#[async_trait]
pub trait AddingService: Send + Sync {
    /// Create an empty group.
    async fn add_group(&self, id: &str) -> Result<()>;
    async fn add_config(&self, config: Config) -> Result<()>;
}

pub struct Adding {
    repo: Arc<dyn Repository>,
}

impl Adding {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AddingService for Adding {
    async fn add_group(&self, id: &str) -> Result<()> {
        self.repo.store_group(Group::new(id)).await
    }

    async fn add_config(&self, config: Config) -> Result<()> {
        self.repo.store_config(config).await
    }
}
