use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared_types::{Config, Group};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};
use uuid::Uuid;

use super::error::{RepositoryError, Result};
use super::id;
use super::traits::Repository;

const GROUPS_DIR: &str = "groups";
const CONFIGS_DIR: &str = "configs";

/// Repository that keeps one JSON file per entity under a root directory:
///
/// ```text
/// <root>/groups/<group>.json
/// <root>/configs/<group>/<config>.json
/// ```
///
/// Group files and config directories live under separate roots, so no group
/// id can name the same path as another group's file.
///
/// Every file is written to a temp file, synced, then moved into place, so a
/// reader never sees a partial document. Storing a config touches two files,
/// the config and then its group, and the pair is not atomic: a crash between
/// the two leaves the config on disk without being listed in the group.
/// [`LocalRepository::reconcile`] repairs that state.
///
/// There is no locking between processes or tasks. Concurrent stores of
/// configs into the same group can lose a membership update, which
/// `reconcile` also repairs.
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn groups_dir(&self) -> PathBuf {
        self.root.join(GROUPS_DIR)
    }

    fn group_path(&self, id: &str) -> PathBuf {
        self.groups_dir().join(format!("{id}.json"))
    }

    fn group_dir(&self, id: &str) -> PathBuf {
        self.root.join(CONFIGS_DIR).join(id)
    }

    fn config_path(&self, group_id: &str, id: &str) -> PathBuf {
        self.group_dir(group_id).join(format!("{id}.json"))
    }

    /// Add configs found on disk but missing from their group's list.
    ///
    /// Missing ids are appended in sorted order. Returns how many ids were
    /// added across all groups.
    pub async fn reconcile(&self) -> Result<usize> {
        let mut entries = match fs::read_dir(self.groups_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut added = 0;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(group_id) = json_stem(&path) else {
                continue;
            };
            let Some(mut group) = read_json::<Group>(&path).await? else {
                continue;
            };

            let mut missing = self.stored_config_ids(&group_id).await?;
            missing.retain(|id| !group.contains(id));
            if missing.is_empty() {
                continue;
            }
            missing.sort();

            for id in &missing {
                group.add_config(id);
            }
            write_atomic(&path, &serde_json::to_vec_pretty(&group)?).await?;

            warn!(group = %group.id, configs = ?missing, "Restored missing group membership");
            added += missing.len();
        }

        Ok(added)
    }

    async fn stored_config_ids(&self, group_id: &str) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(self.group_dir(group_id)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(id) = json_stem(&entry.path()) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl Repository for LocalRepository {
    async fn store_group(&self, group: Group) -> Result<()> {
        id::validate(&group.id)?;
        fs::create_dir_all(self.groups_dir()).await?;

        let json = serde_json::to_vec_pretty(&group)?;
        if !create_exclusive(&self.group_path(&group.id), &json).await? {
            return Err(RepositoryError::GroupConflict(group.id));
        }

        Ok(())
    }

    async fn retrieve_group(&self, id: &str) -> Result<Group> {
        // An id that could never be stored names no group
        if !id::is_valid(id) {
            return Err(RepositoryError::GroupNotFound(id.to_string()));
        }

        read_json(&self.group_path(id))
            .await?
            .ok_or_else(|| RepositoryError::GroupNotFound(id.to_string()))
    }

    async fn store_config(&self, config: Config) -> Result<()> {
        let mut group = self.retrieve_group(&config.group).await?;
        id::validate(&config.id)?;

        fs::create_dir_all(self.group_dir(&group.id)).await?;
        let json = serde_json::to_vec_pretty(&config)?;
        write_atomic(&self.config_path(&group.id, &config.id), &json).await?;

        if group.add_config(&config.id) {
            let json = serde_json::to_vec_pretty(&group)?;
            if let Err(e) = write_atomic(&self.group_path(&group.id), &json).await {
                error!(
                    group = %group.id,
                    config = %config.id,
                    error = %e,
                    "Config persisted but group membership was not updated"
                );
                return Err(e);
            }
        }

        Ok(())
    }

    async fn retrieve_config(&self, group_id: &str, id: &str) -> Result<Config> {
        self.retrieve_group(group_id).await?;
        let not_found = || RepositoryError::ConfigNotFound {
            group: group_id.to_string(),
            id: id.to_string(),
        };
        if !id::is_valid(id) {
            return Err(not_found());
        }

        read_json(&self.config_path(group_id, id))
            .await?
            .ok_or_else(not_found)
    }
}

fn json_stem(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    id::is_valid(stem).then(|| stem.to_string())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Temp files live next to their target so the final rename or link stays on
/// one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

async fn write_temp(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let temp = temp_path(path);
    let written = async {
        let mut file = fs::File::create(&temp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp).await;
        return Err(e.into());
    }
    Ok(temp)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp = write_temp(path, bytes).await?;
    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Atomically create `path` with the given contents.
/// Returns `false` without touching the file if it already exists.
async fn create_exclusive(path: &Path, bytes: &[u8]) -> Result<bool> {
    let temp = write_temp(path, bytes).await?;
    let linked = fs::hard_link(&temp, path).await;
    let _ = fs::remove_file(&temp).await;

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}
