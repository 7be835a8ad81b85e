use crate::store::ItemStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(store: impl ItemStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
