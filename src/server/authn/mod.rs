pub mod bearer_token;
pub mod config;
pub mod token;

use actix_web::HttpRequest;
use serde_json::{Map, Value};

pub enum AuthnResponse {
    /// The verified token payload.
    Ok(Map<String, Value>),

    /// No usable token, carries the reason for logging.
    Unauthenticated(String),
}

pub trait Authenticator: Send + Sync {
    fn authenticate_request(&self, req: &HttpRequest) -> AuthnResponse;
}
