use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{bail, Context, Result};
use log::warn;
use serde::de::DeserializeOwned;

/// The environment name used when neither `ENVIRONMENT` nor `ENV` is set.
pub const DEFAULT_ENV: &str = "prod";

pub struct PathSet {
    pub config_path: PathBuf,
    pub data_path: PathBuf,

    /// Lower-cased environment name, selects `app-{env}.toml`.
    pub env: String,
}

impl PathSet {
    pub fn new(
        config_path: Option<PathBuf>,
        data_path: Option<PathBuf>,
        env: Option<String>,
    ) -> Result<Self> {
        // Check if running as root (UID == 0)
        let is_root = unsafe { libc::geteuid() == 0 };

        let config_path = if let Some(path) = config_path {
            path
        } else if let Ok(path) = env::var("CURD_CONFIG") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/etc/curd")
        } else {
            Self::home_dir()?.join(".config").join("curd")
        };

        let data_path = if let Some(path) = data_path {
            path
        } else if let Ok(path) = env::var("CURD_DATA") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/var/lib/curd")
        } else {
            Self::home_dir()?.join(".local").join("share").join("curd")
        };

        ensure_dir_exists(&config_path)
            .with_context(|| format!("ensure config directory: {}", config_path.display()))?;
        ensure_dir_exists(&data_path)
            .with_context(|| format!("ensure data directory: {}", data_path.display()))?;

        let env = match env {
            Some(env) => env,
            None => Self::extract_env(),
        };

        Ok(Self {
            config_path,
            data_path,
            env: env.to_lowercase(),
        })
    }

    /// Loads `app-{env}.toml` from the config directory, falling back to the
    /// defaults when the file does not exist.
    pub fn load_config<T, F>(&self, default_func: F) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let path = self.config_path.join(format!("app-{}.toml", self.env));
        let mut cfg: T = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)
                .with_context(|| format!("parse config toml: {}", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                default_func()
            }
            Err(err) => {
                return Err(err).context(format!("read config file: {}", path.display()));
            }
        };

        cfg.complete(self).context("validate config")?;
        Ok(cfg)
    }

    fn extract_env() -> String {
        for key in ["ENVIRONMENT", "ENV"] {
            if let Ok(env) = env::var(key) {
                if !env.is_empty() {
                    return env;
                }
            }
        }
        String::from(DEFAULT_ENV)
    }

    fn home_dir() -> Result<PathBuf> {
        let dir = env::var_os("HOME") // Unix/Linux/macOS
            .or_else(|| env::var_os("USERPROFILE")) // Windows
            .map(PathBuf::from);
        match dir {
            Some(dir) => Ok(dir),
            None => {
                bail!("could not determine home directory, please specify config path manually")
            }
        }
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let base = env::temp_dir().join("curd-test");
        Self {
            config_path: base.join("config"),
            data_path: base.join("data"),
            env: String::from("test"),
        }
    }
}

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}

/// Parses a human readable duration such as `1h` or `90s`.
pub fn parse_duration(name: &str, s: &str) -> Result<std::time::Duration> {
    humantime::parse_duration(s.trim())
        .with_context(|| format!("parse duration '{s}' for '{name}'"))
}

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("t", "1h").unwrap().as_secs(), 3600);
        assert_eq!(parse_duration("t", " 12h ").unwrap().as_secs(), 12 * 3600);
        assert_eq!(parse_duration("t", "90s").unwrap().as_secs(), 90);
        assert!(parse_duration("t", "soon").is_err());
        assert!(parse_duration("t", "").is_err());
    }

    #[test]
    fn test_expandenv() {
        assert_eq!(expandenv("t", "plain").unwrap(), "plain");
        env::set_var("CURD_TEST_EXPAND", "value");
        assert_eq!(
            expandenv("t", "${CURD_TEST_EXPAND}/x").unwrap(),
            "value/x"
        );
        assert!(expandenv("t", "$CURD_TEST_SURELY_UNSET_VAR").is_err());
    }
}
