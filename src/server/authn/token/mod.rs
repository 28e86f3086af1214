pub mod factory;
pub mod jwt;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::types::token::TokenResponse;

/// Claim holding the identity, mirrored by `user_id`.
pub const CLAIM_ID: &str = "id";
/// Issue time of the first token in a refresh chain.
pub const CLAIM_ORIG_IAT: &str = "orig_iat";
pub const CLAIM_EXP: &str = "exp";

pub trait TokenGenerator {
    fn generate_token(&self, user_id: Value, authorities: Vec<String>) -> Result<TokenResponse>;
}

/// Verifies a token and returns its payload.
pub trait TokenValidator {
    fn validate_token(&self, token: &str) -> Result<Map<String, Value>>;
}

#[cfg(test)]
pub mod tests {
    use serde_json::json;

    use crate::server::authz::claims::{CLAIM_AUTHORITIES, CLAIM_USER_ID};

    use super::*;

    pub fn run_token_tests<TG, TV>(generator: &TG, validator: &TV)
    where
        TG: TokenGenerator,
        TV: TokenValidator,
    {
        let users = [json!("alice"), json!("bob"), json!(42), json!("admin")];
        for user in users.iter() {
            let authorities = vec![String::from("ROLE_USER"), String::from("curd:read")];
            let token = generator
                .generate_token(user.clone(), authorities.clone())
                .unwrap();
            assert_eq!(&token.user_id, user);

            let payload = validator.validate_token(&token.token).unwrap();
            assert_eq!(payload.get(CLAIM_USER_ID), Some(user));
            assert_eq!(payload.get(CLAIM_ID), Some(user));
            assert_eq!(payload.get(CLAIM_AUTHORITIES), Some(&json!(authorities)));
            assert_eq!(
                payload.get(CLAIM_EXP).and_then(Value::as_u64),
                Some(token.expire_at)
            );
            assert!(payload.contains_key(CLAIM_ORIG_IAT));
        }

        assert!(generator.generate_token(Value::Null, vec![]).is_err());
        assert!(generator.generate_token(json!(""), vec![]).is_err());
        assert!(validator.validate_token("").is_err());
        assert!(validator.validate_token("not-a-token").is_err());
    }
}
