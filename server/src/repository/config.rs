use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::error::Result;
use super::local::LocalRepository;
use super::memory::MemoryRepository;
use super::traits::Repository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepositoryConfig {
    Memory,
    Local { path: PathBuf },
}

impl RepositoryConfig {
    pub fn memory() -> Self {
        Self::Memory
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    /// Open the configured backend. The local backend repairs any group
    /// membership left incomplete by an interrupted write before it is used.
    pub async fn build(&self) -> Result<Arc<dyn Repository>> {
        match self {
            Self::Memory => {
                info!("Using in memory storage");
                Ok(Arc::new(MemoryRepository::new()))
            }
            Self::Local { path } => {
                info!("Using local storage at {}", path.display());
                let repo = LocalRepository::new(path);
                let repaired = repo.reconcile().await?;
                if repaired > 0 {
                    info!(repaired, "Reconciled group membership");
                }
                Ok(Arc::new(repo))
            }
        }
    }
}
