use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::db::DbPool;

/// Process-wide shared state, built once in main and injected into every
/// handler. The pool is the only shared resource; nothing here is global.
pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            pool,
            config,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
