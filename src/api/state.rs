//! Application state - Dependency injection container.
//!
//! Handlers reach every service through the container held here.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{BlobStore, Database};
use crate::services::{ServiceContainer, Services};

#[derive(Clone)]
pub struct AppState {
    /// Service container; mocked in handler tests
    pub services: Arc<dyn ServiceContainer>,
    /// Database connection, used by the health check
    pub database: Arc<Database>,
    /// Upper bound for request bodies, uploads included
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire every service onto the database, storing uploads under the media root.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let max_upload_bytes = config.max_upload_bytes;
        let services = Services::from_connection(database.get_connection(), config);
        Self::new(Arc::new(services), database, max_upload_bytes)
    }

    /// Same as `from_config` with an explicit blob store.
    pub fn with_blob_store(database: Arc<Database>, config: Config, blobs: Arc<dyn BlobStore>) -> Self {
        let max_upload_bytes = config.max_upload_bytes;
        let services = Services::with_blob_store(database.get_connection(), config, blobs);
        Self::new(Arc::new(services), database, max_upload_bytes)
    }

    pub fn new(services: Arc<dyn ServiceContainer>, database: Arc<Database>, max_upload_bytes: usize) -> Self {
        Self {
            services,
            database,
            max_upload_bytes,
        }
    }
}
