use std::sync::Arc;

use fc_cache::CacheManager;
use fc_core::PreferenceStore;

pub struct AppState {
    pub feeds: Arc<CacheManager>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl AppState {
    pub fn new(feeds: Arc<CacheManager>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { feeds, preferences }
    }
}
