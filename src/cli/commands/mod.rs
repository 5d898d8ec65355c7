pub mod config;
pub mod db;
pub mod init;
pub mod log;
pub mod records;
pub mod serve;
pub mod sweep;
pub mod target;

use crate::config::Config;
use crate::core::service::LineService;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use std::sync::Arc;

/// Open the configured database (running pending migrations).
pub fn open_store(cfg: &Config) -> AppResult<Arc<SqliteStore>> {
    Ok(Arc::new(SqliteStore::open(&cfg.database)?))
}

/// Line service over the configured database.
pub fn open_service(cfg: &Config) -> AppResult<LineService> {
    let store = open_store(cfg)?;
    LineService::from_config(cfg, store)
}
