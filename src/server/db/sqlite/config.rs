use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, parse_duration, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SqliteConfig {
    /// Keep the records in memory only, `path` is ignored.
    #[serde(default = "SqliteConfig::default_memory")]
    pub memory: bool,

    /// Default: {data_path}/curd.db
    #[serde(default = "SqliteConfig::default_path")]
    pub path: String,

    /// How long a statement waits on a locked database file before failing.
    #[serde(default = "SqliteConfig::default_busy_timeout")]
    pub busy_timeout: String,
}

impl CommonConfig for SqliteConfig {
    fn default() -> Self {
        Self {
            memory: Self::default_memory(),
            path: Self::default_path(),
            busy_timeout: Self::default_busy_timeout(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.busy_timeout()?;
        if self.memory {
            return Ok(());
        }

        self.path = expandenv("path", &self.path)?;
        if self.path.is_empty() {
            let path = ps.data_path.join("curd.db");
            self.path = format!("{}", path.display());
        }
        if Path::new(&self.path).is_dir() {
            bail!("path '{}' is a directory", self.path);
        }

        Ok(())
    }
}

impl SqliteConfig {
    fn default_memory() -> bool {
        false
    }

    fn default_path() -> String {
        String::new()
    }

    fn default_busy_timeout() -> String {
        String::from("5s")
    }

    pub fn busy_timeout(&self) -> Result<Duration> {
        parse_duration("busy_timeout", &self.busy_timeout)
    }
}
