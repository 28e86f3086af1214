use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

use super::sqlite::config::SqliteConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DbConfig {
    #[serde(default = "DbConfig::default_name")]
    pub name: DbType,

    #[serde(default = "SqliteConfig::default")]
    pub sqlite: SqliteConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub enum DbType {
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl CommonConfig for DbConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            sqlite: SqliteConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.sqlite.complete(ps).context("sqlite")?;
        Ok(())
    }
}

impl DbConfig {
    fn default_name() -> DbType {
        DbType::Sqlite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config() {
        let ps = PathSet::new_test();

        let mut cfg: DbConfig = toml::from_str("[sqlite]\nmemory = true").unwrap();
        cfg.complete(&ps).unwrap();
        assert_eq!(cfg.name, DbType::Sqlite);
        assert!(cfg.sqlite.memory);
        assert!(cfg.sqlite.path.is_empty());

        let mut cfg = DbConfig::default();
        cfg.complete(&ps).unwrap();
        assert!(cfg.sqlite.path.ends_with("curd.db"));

        assert!(toml::from_str::<DbConfig>("name = \"mysql\"").is_err());
    }
}
