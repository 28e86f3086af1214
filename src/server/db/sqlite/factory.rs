use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::ensure_dir_exists;

use super::config::SqliteConfig;
use super::Sqlite;

#[derive(Default)]
pub struct SqliteFactory;

impl SqliteFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_sqlite(&self, cfg: &SqliteConfig) -> Result<Sqlite> {
        if cfg.memory {
            warn!("Using in-memory sqlite database, the records will be lost when the server stops");
            return Sqlite::memory();
        }

        let path = Path::new(&cfg.path);
        if let Some(dir) = path.parent() {
            ensure_dir_exists(dir)
                .with_context(|| format!("ensure sqlite directory: {}", dir.display()))?;
        }

        let busy_timeout = cfg.busy_timeout()?;
        info!(
            "Using sqlite database {} with busy timeout {:?}",
            cfg.path, busy_timeout
        );
        Sqlite::open(path, busy_timeout)
            .with_context(|| format!("open sqlite database '{}'", cfg.path))
    }
}
