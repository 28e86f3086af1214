use std::path::Path;
use std::{fs, io};

use anyhow::{bail, Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use log::info;

use crate::config::ensure_dir_exists;
use crate::rsa::generate_rsa_keys;
use crate::server::authn::config::JwtConfig;

use super::jwt::{JwtTokenGenerator, JwtTokenValidator};

/// Owns the signing material and hands explicit keys to the token generator
/// and validator.
pub struct TokenFactory {
    alg: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: u64,
}

impl TokenFactory {
    pub fn new(cfg: &JwtConfig) -> Result<Self> {
        let alg = cfg.algorithm()?;
        let expiry = cfg.expiry()?.as_secs();

        let (encoding_key, decoding_key) = match alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                if cfg.secret.is_empty() {
                    bail!("jwt secret is required for {:?}", alg);
                }
                let secret = cfg.secret.as_bytes();
                (
                    EncodingKey::from_secret(secret),
                    DecodingKey::from_secret(secret),
                )
            }
            _ => {
                let (public_key, private_key) = Self::read_rsa_keys(cfg)?;
                let encoding_key = EncodingKey::from_rsa_pem(&private_key)
                    .context("parse RSA private key for token signing")?;
                let decoding_key = DecodingKey::from_rsa_pem(&public_key)
                    .context("parse RSA public key for token verification")?;
                (encoding_key, decoding_key)
            }
        };

        Ok(Self {
            alg,
            encoding_key,
            decoding_key,
            expiry,
        })
    }

    pub fn build_token_generator(&self) -> JwtTokenGenerator {
        JwtTokenGenerator::new(self.alg, self.encoding_key.clone(), self.expiry)
    }

    pub fn build_token_validator(&self) -> JwtTokenValidator {
        JwtTokenValidator::new(self.alg, self.decoding_key.clone())
    }

    /// Reads the PEM pair, generating a fresh pair when the public key does
    /// not exist yet.
    fn read_rsa_keys(cfg: &JwtConfig) -> Result<(Vec<u8>, Vec<u8>)> {
        match fs::read(&cfg.public_key_path) {
            Ok(public_key) => {
                let private_key = fs::read(&cfg.private_key_path).with_context(|| {
                    format!("read token private key: {}", cfg.private_key_path)
                })?;
                Ok((public_key, private_key))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("Public key and private key for token not found, generating with rsa");
                let (public_key, private_key) = generate_rsa_keys()?;
                for path in [&cfg.public_key_path, &cfg.private_key_path] {
                    if let Some(dir) = Path::new(path).parent() {
                        ensure_dir_exists(dir)?;
                    }
                }
                fs::write(&cfg.public_key_path, &public_key)
                    .context("write token public key")?;
                fs::write(&cfg.private_key_path, &private_key)
                    .context("write token private key")?;
                Ok((public_key, private_key))
            }
            Err(err) => Err(err).context("read token public key"),
        }
    }
}
