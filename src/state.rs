//! Shared application state for all routes.

use crate::store::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    /// Upper bound accepted for `per_page` on listings.
    pub max_per_page: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, max_per_page: u32) -> Self {
        AppState { store, max_per_page }
    }
}
