mod adding;
mod listing;

pub use adding::{Adding, AddingService};
pub use listing::{Listing, ListingService};

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::repository::{MemoryRepository, Repository, RepositoryError};
    use shared_types::{Config, Group};
    use std::sync::Arc;

    fn services() -> (Adding, Listing, Arc<dyn Repository>) {
        let repo: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
        (
            Adding::new(Arc::clone(&repo)),
            Listing::new(Arc::clone(&repo)),
            repo,
        )
    }

    #[tokio::test]
    async fn test_add_group_creates_empty_group() {
        let (adding, listing, _repo) = services();

        adding.add_group("g1").await.unwrap();

        assert_eq!(listing.get_group("g1").await.unwrap(), Group::new("g1"));
    }

    #[tokio::test]
    async fn test_add_group_conflict_passes_through() {
        let (adding, _listing, _repo) = services();

        adding.add_group("g1").await.unwrap();
        let result = adding.add_group("g1").await;

        assert!(matches!(result, Err(RepositoryError::GroupConflict(_))));
    }

    #[tokio::test]
    async fn test_add_and_get_config() {
        let (adding, listing, repo) = services();

        adding.add_group("g1").await.unwrap();
        let config = Config::new("g1", "c1").with_version(4);
        adding.add_config(config.clone()).await.unwrap();

        assert_eq!(listing.get_config("g1", "c1").await.unwrap(), config);
        assert_eq!(repo.retrieve_group("g1").await.unwrap().configs, vec!["c1"]);
    }

    #[tokio::test]
    async fn test_get_config_in_missing_group() {
        let (_adding, listing, _repo) = services();

        let result = listing.get_config("missing", "c1").await;

        assert!(matches!(result, Err(RepositoryError::GroupNotFound(_))));
    }
}
