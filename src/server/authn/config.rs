use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, parse_duration, CommonConfig, PathSet};

/// JWT related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    /// Realm reported in the `WWW-Authenticate` header of 401 responses.
    #[serde(default = "JwtConfig::default_realm")]
    pub realm: String,

    /// Signing algorithm: HS256, HS384, HS512 (shared secret) or RS256,
    /// RS384, RS512 (RSA key pair in PEM files).
    #[serde(default = "JwtConfig::default_sign_alg")]
    pub sign_alg: String,

    /// Shared secret for the HS algorithms. Supports env expansion, e.g.
    /// `"${CURD_JWT_SECRET}"`.
    #[serde(default = "JwtConfig::default_empty")]
    pub secret: String,

    /// RSA public key (PEM) used to verify tokens with the RS algorithms.
    /// Default: {config_path}/pki/token_public.pem
    #[serde(default = "JwtConfig::default_empty")]
    pub public_key_path: String,

    /// RSA private key (PEM) used to sign tokens with the RS algorithms.
    /// Default: {config_path}/pki/token_private.pem
    #[serde(default = "JwtConfig::default_empty")]
    pub private_key_path: String,

    /// Lifetime of issued tokens, e.g. `"1h"`.
    #[serde(default = "JwtConfig::default_expired_time")]
    pub expired_time: String,
}

impl CommonConfig for JwtConfig {
    fn default() -> Self {
        Self {
            realm: Self::default_realm(),
            sign_alg: Self::default_sign_alg(),
            secret: Self::default_empty(),
            public_key_path: Self::default_empty(),
            private_key_path: Self::default_empty(),
            expired_time: Self::default_expired_time(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if self.realm.is_empty() {
            bail!("realm cannot be empty");
        }

        let expiry = self.expiry()?;
        if expiry.is_zero() {
            bail!("expired_time should not be 0");
        }

        self.sign_alg = self.sign_alg.trim().to_uppercase();
        match self.algorithm()? {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                self.secret = expandenv("secret", &self.secret)?;
                if self.secret.is_empty() {
                    bail!("secret cannot be empty for algorithm {}", self.sign_alg);
                }
            }
            _ => {
                let pki_path = ps.config_path.join("pki");

                self.public_key_path = expandenv("public_key_path", &self.public_key_path)?;
                if self.public_key_path.is_empty() {
                    let path = pki_path.join("token_public.pem");
                    self.public_key_path = format!("{}", path.display());
                }

                self.private_key_path = expandenv("private_key_path", &self.private_key_path)?;
                if self.private_key_path.is_empty() {
                    let path = pki_path.join("token_private.pem");
                    self.private_key_path = format!("{}", path.display());
                }
            }
        }

        Ok(())
    }
}

impl JwtConfig {
    pub fn default_realm() -> String {
        String::from("curd")
    }

    pub fn default_sign_alg() -> String {
        String::from("HS256")
    }

    pub fn default_empty() -> String {
        String::new()
    }

    pub fn default_expired_time() -> String {
        String::from("1h")
    }

    pub fn algorithm(&self) -> Result<Algorithm> {
        let alg = Algorithm::from_str(&self.sign_alg)
            .with_context(|| format!("unknown sign_alg '{}'", self.sign_alg))?;
        match alg {
            Algorithm::HS256
            | Algorithm::HS384
            | Algorithm::HS512
            | Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512 => Ok(alg),
            _ => bail!("unsupported sign_alg '{}'", self.sign_alg),
        }
    }

    pub fn expiry(&self) -> Result<Duration> {
        parse_duration("expired_time", &self.expired_time)
    }
}
