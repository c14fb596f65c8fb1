use async_trait::async_trait;
use shared_types::{Config, Group};

use super::error::Result;

/// Persistence for groups and the configs stored in them.
///
/// Every implementation must behave the same way:
/// - `store_group` never overwrites; an existing id is a `GroupConflict`.
/// - `store_config` requires the owning group to exist and adds the config id
///   to the group's list at most once.
/// - `retrieve_config` checks the group before the config, so a missing group
///   is always reported as `GroupNotFound`.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn store_group(&self, group: Group) -> Result<()>;
    async fn retrieve_group(&self, id: &str) -> Result<Group>;
    async fn store_config(&self, config: Config) -> Result<()>;
    async fn retrieve_config(&self, group_id: &str, id: &str) -> Result<Config>;
}
