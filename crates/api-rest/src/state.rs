//! Shared application state for the REST server.

use api_shared::TokenSet;
use hms_core::listings::ListingService;
use hms_core::reporting::ReportingService;
use hms_core::store::EntityStore;
use hms_core::{AppointmentScheduler, CoreConfig};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state for the REST API server.
///
/// Contains shared state that needs to be accessible to all request
/// handlers: the database pool, resolved configuration, and the bearer
/// token table.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub cfg: Arc<CoreConfig>,
    pub tokens: Arc<TokenSet>,
}

impl AppState {
    pub fn new(pool: SqlitePool, cfg: CoreConfig, tokens: TokenSet) -> Self {
        Self {
            pool,
            cfg: Arc::new(cfg),
            tokens: Arc::new(tokens),
        }
    }

    pub fn scheduler(&self) -> AppointmentScheduler {
        AppointmentScheduler::new(self.pool.clone())
    }

    pub fn store(&self) -> EntityStore {
        EntityStore::new(self.pool.clone())
    }

    pub fn listings(&self) -> ListingService {
        ListingService::new(self.pool.clone(), (*self.cfg).clone())
    }

    pub fn reporting(&self) -> ReportingService {
        ReportingService::new(self.pool.clone())
    }
}
