use anyhow::{bail, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Map, Value};

use crate::server::authz::claims::{CLAIM_AUTHORITIES, CLAIM_USER_ID};
use crate::time::current_timestamp;

use super::{
    TokenGenerator, TokenResponse, TokenValidator, CLAIM_EXP, CLAIM_ID, CLAIM_ORIG_IAT,
};

pub struct JwtTokenGenerator {
    alg: Algorithm,
    key: EncodingKey,
    expiry: u64,
}

impl JwtTokenGenerator {
    pub fn new(alg: Algorithm, key: EncodingKey, expiry: u64) -> Self {
        Self { alg, key, expiry }
    }
}

impl TokenGenerator for JwtTokenGenerator {
    fn generate_token(&self, user_id: Value, authorities: Vec<String>) -> Result<TokenResponse> {
        match &user_id {
            Value::Null => bail!("user_id is required"),
            Value::String(s) if s.is_empty() => bail!("user_id is required"),
            _ => {}
        }

        let now = current_timestamp();
        let exp = now + self.expiry;

        let mut payload = Map::new();
        payload.insert(String::from(CLAIM_ID), user_id.clone());
        payload.insert(String::from(CLAIM_USER_ID), user_id.clone());
        payload.insert(String::from(CLAIM_AUTHORITIES), json!(authorities));
        payload.insert(String::from(CLAIM_EXP), json!(exp));
        payload.insert(String::from(CLAIM_ORIG_IAT), json!(now));

        match encode(&Header::new(self.alg), &payload, &self.key) {
            Ok(token) => Ok(TokenResponse {
                user_id,
                token,
                expire_at: exp,
            }),
            Err(e) => bail!("generate jwt token failed: {e}"),
        }
    }
}

pub struct JwtTokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenValidator {
    pub fn new(alg: Algorithm, key: DecodingKey) -> Self {
        let mut validation = Validation::new(alg);
        validation.leeway = 0;
        validation.set_required_spec_claims(&[CLAIM_EXP]);
        Self { key, validation }
    }
}

impl TokenValidator for JwtTokenValidator {
    fn validate_token(&self, token: &str) -> Result<Map<String, Value>> {
        match decode::<Map<String, Value>>(token, &self.key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => bail!("validate jwt token failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::authn::token::tests::run_token_tests;

    use super::*;

    const SECRET: &[u8] = b"unit-test-secret";

    fn hs256() -> (JwtTokenGenerator, JwtTokenValidator) {
        let generator =
            JwtTokenGenerator::new(Algorithm::HS256, EncodingKey::from_secret(SECRET), 3600);
        let validator = JwtTokenValidator::new(Algorithm::HS256, DecodingKey::from_secret(SECRET));
        (generator, validator)
    }

    #[test]
    fn test_jwt_token() {
        let (generator, validator) = hs256();
        run_token_tests(&generator, &validator);
    }

    #[test]
    fn test_wrong_secret() {
        let (generator, _) = hs256();
        let validator =
            JwtTokenValidator::new(Algorithm::HS256, DecodingKey::from_secret(b"other"));
        let token = generator
            .generate_token(json!("alice"), vec![])
            .unwrap();
        assert!(validator.validate_token(&token.token).is_err());
    }

    #[test]
    fn test_wrong_algorithm() {
        let generator =
            JwtTokenGenerator::new(Algorithm::HS512, EncodingKey::from_secret(SECRET), 3600);
        let (_, validator) = hs256();
        let token = generator
            .generate_token(json!("alice"), vec![])
            .unwrap();
        assert!(validator.validate_token(&token.token).is_err());
    }

    #[test]
    fn test_expired() {
        let (_, validator) = hs256();
        let now = current_timestamp();
        let payload = json!({
            "user_id": "alice",
            "authorities": [],
            "exp": now - 10,
            "orig_iat": now - 20,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(validator.validate_token(&token).is_err());

        let payload = json!({ "user_id": "alice", "authorities": [] });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(validator.validate_token(&token).is_err());
    }
}
