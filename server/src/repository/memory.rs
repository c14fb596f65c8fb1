use async_trait::async_trait;
use shared_types::{Config, Group};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::error::{RepositoryError, Result};
use super::id;
use super::traits::Repository;

#[derive(Default)]
struct Tables {
    groups: HashMap<String, Group>,
    /// Keyed by (group id, config id)
    configs: HashMap<(String, String), Config>,
}

/// Map-backed repository. A single lock covers both maps so a config store
/// and its membership update are observed together.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn store_group(&self, group: Group) -> Result<()> {
        id::validate(&group.id)?;
        let mut tables = self.tables.write().await;

        if tables.groups.contains_key(&group.id) {
            return Err(RepositoryError::GroupConflict(group.id));
        }

        tables.groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn retrieve_group(&self, id: &str) -> Result<Group> {
        let tables = self.tables.read().await;

        tables
            .groups
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::GroupNotFound(id.to_string()))
    }

    async fn store_config(&self, config: Config) -> Result<()> {
        let mut tables = self.tables.write().await;

        let group = tables
            .groups
            .get_mut(&config.group)
            .ok_or_else(|| RepositoryError::GroupNotFound(config.group.clone()))?;
        id::validate(&config.id)?;
        group.add_config(&config.id);

        tables
            .configs
            .insert((config.group.clone(), config.id.clone()), config);
        Ok(())
    }

    async fn retrieve_config(&self, group_id: &str, id: &str) -> Result<Config> {
        let tables = self.tables.read().await;

        if !tables.groups.contains_key(group_id) {
            return Err(RepositoryError::GroupNotFound(group_id.to_string()));
        }

        tables
            .configs
            .get(&(group_id.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| RepositoryError::ConfigNotFound {
                group: group_id.to_string(),
                id: id.to_string(),
            })
    }
}
