use actix_web::HttpRequest;
use log::debug;

use super::token::TokenValidator;
use super::{Authenticator, AuthnResponse};

pub const QUERY_TOKEN: &str = "token";
pub const COOKIE_TOKEN: &str = "jwt";

/// Authenticates with a JWT looked up from the `Authorization: Bearer`
/// header, then the `token` query parameter, then the `jwt` cookie.
pub struct BearerTokenAuthenticator<T: TokenValidator> {
    validator: T,
}

impl<T: TokenValidator> BearerTokenAuthenticator<T> {
    pub fn new(validator: T) -> Self {
        Self { validator }
    }

    fn lookup_token(req: &HttpRequest) -> Option<String> {
        Self::token_from_header(req)
            .or_else(|| Self::token_from_query(req))
            .or_else(|| Self::token_from_cookie(req))
    }

    fn token_from_header(req: &HttpRequest) -> Option<String> {
        let auth = req.headers().get("Authorization")?.to_str().ok()?.trim();

        let mut iter = auth.split_whitespace();
        let bearer = iter.next()?;
        if !bearer.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = iter.next()?;
        if iter.next().is_some() {
            return None;
        }
        Some(token.to_string())
    }

    fn token_from_query(req: &HttpRequest) -> Option<String> {
        req.query_string()
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == QUERY_TOKEN)
            .map(|(_, value)| value.to_string())
            .filter(|token| !token.is_empty())
    }

    fn token_from_cookie(req: &HttpRequest) -> Option<String> {
        let cookie = req.cookie(COOKIE_TOKEN)?;
        let token = cookie.value();
        if token.is_empty() {
            return None;
        }
        Some(token.to_string())
    }
}

impl<T: TokenValidator + Sync + Send> Authenticator for BearerTokenAuthenticator<T> {
    fn authenticate_request(&self, req: &HttpRequest) -> AuthnResponse {
        let token = match Self::lookup_token(req) {
            Some(token) => token,
            None => return AuthnResponse::Unauthenticated(String::from("token not found")),
        };

        match self.validator.validate_token(&token) {
            Ok(payload) => AuthnResponse::Ok(payload),
            Err(e) => {
                debug!("Reject token: {e:#}");
                AuthnResponse::Unauthenticated(format!("{e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use anyhow::{bail, Result};
    use serde_json::{json, Map, Value};

    use super::*;

    /// Accepts tokens of the form `valid-<user>`.
    struct PrefixValidator;

    impl TokenValidator for PrefixValidator {
        fn validate_token(&self, token: &str) -> Result<Map<String, Value>> {
            match token.strip_prefix("valid-") {
                Some(user) => {
                    let mut payload = Map::new();
                    payload.insert(String::from("user_id"), json!(user));
                    Ok(payload)
                }
                None => bail!("invalid token"),
            }
        }
    }

    fn user_of(resp: AuthnResponse) -> Option<String> {
        match resp {
            AuthnResponse::Ok(payload) => payload
                .get("user_id")
                .and_then(Value::as_str)
                .map(String::from),
            AuthnResponse::Unauthenticated(_) => None,
        }
    }

    #[test]
    fn test_lookup_order() {
        let authn = BearerTokenAuthenticator::new(PrefixValidator);

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer valid-header"))
            .uri("/x?token=valid-query")
            .cookie(Cookie::new(COOKIE_TOKEN, "valid-cookie"))
            .to_http_request();
        assert_eq!(user_of(authn.authenticate_request(&req)).unwrap(), "header");

        let req = TestRequest::default()
            .uri("/x?a=1&token=valid-query")
            .cookie(Cookie::new(COOKIE_TOKEN, "valid-cookie"))
            .to_http_request();
        assert_eq!(user_of(authn.authenticate_request(&req)).unwrap(), "query");

        let req = TestRequest::default()
            .cookie(Cookie::new(COOKIE_TOKEN, "valid-cookie"))
            .to_http_request();
        assert_eq!(user_of(authn.authenticate_request(&req)).unwrap(), "cookie");

        let req = TestRequest::default()
            .insert_header(("Authorization", "bearer valid-lower"))
            .to_http_request();
        assert_eq!(user_of(authn.authenticate_request(&req)).unwrap(), "lower");
    }

    #[test]
    fn test_malformed_header_falls_through() {
        let authn = BearerTokenAuthenticator::new(PrefixValidator);
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic abc"))
            .uri("/x?token=valid-query")
            .to_http_request();
        assert_eq!(user_of(authn.authenticate_request(&req)).unwrap(), "query");
    }

    #[test]
    fn test_unauthenticated() {
        let authn = BearerTokenAuthenticator::new(PrefixValidator);

        let req = TestRequest::default().to_http_request();
        assert!(user_of(authn.authenticate_request(&req)).is_none());

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer"))
            .to_http_request();
        assert!(user_of(authn.authenticate_request(&req)).is_none());

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer forged"))
            .to_http_request();
        assert!(user_of(authn.authenticate_request(&req)).is_none());

        let req = TestRequest::default().uri("/x?token=").to_http_request();
        assert!(user_of(authn.authenticate_request(&req)).is_none());
    }
}
