use std::sync::Arc;

use fc_core::{Error, PreferenceStore, Result};

pub mod backends;

pub use backends::*;

/// Builds the preference store named on the command line.
pub async fn create_store(kind: &str) -> Result<Arc<dyn PreferenceStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryPreferenceStore::new())),
        other => Err(Error::Config(format!("unknown preference store: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_store;
}
