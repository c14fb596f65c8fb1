use crate::service::{AddingService, ListingService};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub adding: Arc<dyn AddingService>,
    pub listing: Arc<dyn ListingService>,
}
