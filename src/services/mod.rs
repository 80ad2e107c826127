//! Business logic services

pub mod admin;
pub mod catalog;
pub mod sessions;

use std::sync::Arc;

use crate::{config::CatalogConfig, repository::CatalogStore};

use sessions::SessionStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub admin: admin::AdminService,
    pub sessions: Arc<dyn SessionStore>,
}

impl Services {
    /// Create all services over the given catalog store and session store
    pub fn new(
        store: Arc<dyn CatalogStore>,
        sessions: Arc<dyn SessionStore>,
        catalog_config: CatalogConfig,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone(), catalog_config),
            admin: admin::AdminService::new(store),
            sessions,
        }
    }
}
