use async_trait::async_trait;
use shared_types::{Config, Group};
use std::sync::Arc;

use crate::repository::{Repository, Result};

/// Read side of the store, as seen by transport handlers
#[async_trait]
pub trait ListingService: Send + Sync {
    async fn get_group(&self, id: &str) -> Result<Group>;
    async fn get_config(&self, group_id: &str, id: &str) -> Result<Config>;
}

pub struct Listing {
    repo: Arc<dyn Repository>,
}

impl Listing {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ListingService for Listing {
    async fn get_group(&self, id: &str) -> Result<Group> {
        self.repo.retrieve_group(id).await
    }

    async fn get_config(&self, group_id: &str, id: &str) -> Result<Config> {
        self.repo.retrieve_config(group_id, id).await
    }
}
