use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};
use crate::logs::LogConfig;

use super::authn::config::JwtConfig;
use super::authz::config::SecurityConfig;
use super::cors::CorsConfig;
use super::db::config::DbConfig;
use super::docs::SwaggerConfig;
use super::i18n::I18nConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,

    #[serde(default = "ServerConfig::default_ssl")]
    pub ssl: bool,

    #[serde(default = "ServerConfig::default_cert_path")]
    pub cert_path: String,

    #[serde(default = "ServerConfig::default_key_path")]
    pub key_path: String,

    #[serde(default = "ServerConfig::default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    #[serde(default = "ServerConfig::default_workers")]
    pub workers: u64,

    #[serde(default = "ServerConfig::default_payload_limit_mib")]
    pub payload_limit_mib: usize,

    /// Grace period for in-flight requests after SIGINT/SIGTERM.
    #[serde(default = "ServerConfig::default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    #[serde(default = "LogConfig::default")]
    pub log: LogConfig,

    #[serde(default = "DbConfig::default")]
    pub db: DbConfig,

    #[serde(default = "JwtConfig::default")]
    pub jwt: JwtConfig,

    #[serde(default = "SecurityConfig::default")]
    pub security: SecurityConfig,

    #[serde(default = "CorsConfig::default")]
    pub cors: CorsConfig,

    #[serde(default = "I18nConfig::default")]
    pub i18n: I18nConfig,

    #[serde(default = "SwaggerConfig::default")]
    pub swagger: SwaggerConfig,
}

impl CommonConfig for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            ssl: Self::default_ssl(),
            cert_path: Self::default_cert_path(),
            key_path: Self::default_key_path(),
            keep_alive_secs: Self::default_keep_alive_secs(),
            workers: Self::default_workers(),
            payload_limit_mib: Self::default_payload_limit_mib(),
            shutdown_timeout_secs: Self::default_shutdown_timeout_secs(),
            log: LogConfig::default(),
            db: DbConfig::default(),
            jwt: JwtConfig::default(),
            security: SecurityConfig::default(),
            cors: CorsConfig::default(),
            i18n: I18nConfig::default(),
            swagger: SwaggerConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.bind = expandenv("bind", &self.bind)?;
        if self.bind.is_empty() {
            bail!("bind cannot be empty");
        }

        let pki_path = ps.config_path.join("pki");

        self.cert_path = expandenv("cert_path", &self.cert_path)?;
        if self.cert_path.is_empty() {
            let path = pki_path.join("server.crt");
            self.cert_path = format!("{}", path.display());
        }

        self.key_path = expandenv("key_path", &self.key_path)?;
        if self.key_path.is_empty() {
            let path = pki_path.join("server.key");
            self.key_path = format!("{}", path.display());
        }

        if self.payload_limit_mib < Self::MIN_PAYLOAD_LIMIT_MIB {
            bail!(
                "payload_limit_mib must be greater than or equal to {}",
                Self::MIN_PAYLOAD_LIMIT_MIB
            );
        }
        if self.payload_limit_mib > Self::MAX_PAYLOAD_LIMIT_MIB {
            bail!(
                "payload_limit_mib must be less than or equal to {}",
                Self::MAX_PAYLOAD_LIMIT_MIB
            );
        }

        self.log.complete(ps).context("log")?;
        self.db.complete(ps).context("db")?;
        self.jwt.complete(ps).context("jwt")?;
        self.security.complete(ps).context("security")?;
        self.cors.complete(ps).context("cors")?;
        self.i18n.complete(ps).context("i18n")?;
        self.swagger.complete(ps).context("swagger")?;

        Ok(())
    }
}

impl ServerConfig {
    const MAX_PAYLOAD_LIMIT_MIB: usize = 10;
    const MIN_PAYLOAD_LIMIT_MIB: usize = 1;

    pub fn default_bind() -> String {
        String::from("127.0.0.1:8080")
    }

    pub fn default_ssl() -> bool {
        false
    }

    pub fn default_cert_path() -> String {
        String::new()
    }

    pub fn default_key_path() -> String {
        String::new()
    }

    pub fn default_keep_alive_secs() -> u64 {
        0
    }

    pub fn default_workers() -> u64 {
        0
    }

    pub fn default_payload_limit_mib() -> usize {
        3
    }

    pub fn default_shutdown_timeout_secs() -> u64 {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let toml = r#"
            bind = "0.0.0.0:9000"
            shutdown_timeout_secs = 10

            [log]
            level = "debug"

            [db.sqlite]
            memory = true

            [jwt]
            secret = "test-secret"
            expired_time = "2h"

            [[security.authorized_requests]]
            urls = ["/api/v1/curd/**:*"]
            access = "HasRole"
            roles = ["ADMIN"]

            [cors]
            allow_origins = ["https://app.example.com"]

            [i18n]
            langs = ["vi"]
        "#;
        let mut cfg: ServerConfig = toml::from_str(toml).unwrap();
        let ps = PathSet::new_test();
        cfg.complete(&ps).unwrap();

        assert_eq!(cfg.bind, "0.0.0.0:9000");
        assert_eq!(cfg.shutdown_timeout_secs, 10);
        assert_eq!(cfg.payload_limit_mib, 3);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.jwt.realm, "curd");
        assert_eq!(cfg.jwt.expired_time, "2h");
        assert_eq!(cfg.security.authorized_requests.len(), 1);
        assert_eq!(cfg.cors.allow_origins, vec!["https://app.example.com"]);
        assert!(cfg.i18n.langs.contains(&String::from("en")));
        assert!(cfg.swagger.enable);

        let cert = ps.config_path.join("pki").join("server.crt");
        assert_eq!(cfg.cert_path, format!("{}", cert.display()));
    }

    #[test]
    fn test_payload_limit() {
        let ps = PathSet::new_test();

        let mut cfg = ServerConfig::default();
        cfg.jwt.secret = String::from("test-secret");
        cfg.payload_limit_mib = 0;
        assert!(cfg.complete(&ps).is_err());

        cfg.payload_limit_mib = 11;
        assert!(cfg.complete(&ps).is_err());

        cfg.payload_limit_mib = 10;
        cfg.complete(&ps).unwrap();
    }

    #[test]
    fn test_missing_secret() {
        let mut cfg = ServerConfig::default();
        assert!(cfg.complete(&PathSet::new_test()).is_err());
    }
}
