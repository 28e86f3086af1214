mod allow_list;
mod matcher;

pub mod claims;
pub mod config;
pub mod custom;
pub mod factory;
pub mod rule;

use thiserror::Error;

use claims::Claims;

pub use matcher::UrlPattern;

/// A custom access decision, consulted for rules with `access = "Custom"`.
///
/// Handlers are registered during startup only. They must be cheap and must
/// not block: they run inline on every request selecting a custom rule.
pub trait CustomAuthorizer: Send + Sync {
    fn authorize(&self, req: &AuthzRequest) -> bool;
}

impl<F> CustomAuthorizer for F
where
    F: Fn(&AuthzRequest) -> bool + Send + Sync,
{
    fn authorize(&self, req: &AuthzRequest) -> bool {
        self(req)
    }
}

/// Everything an access decision is made from.
#[derive(Debug, Clone)]
pub struct AuthzRequest {
    /// Concrete request path as routed, percent-decoded, e.g. `/api/v1/curd/7`.
    pub path: String,
    /// Upper-case HTTP verb.
    pub method: String,
    pub user: Claims,
}

#[derive(Error, Debug)]
pub enum AuthzError {
    /// An authorization rule names an access kind that does not exist.
    #[error("rule #{index}: invalid access type '{access}', must be one of HasPermission, HasRole, PermitAll, DenyAll or Custom")]
    Configuration { index: usize, access: String },

    /// The verified token does not carry usable claims.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// A url pattern is not a valid glob.
    #[error("invalid url pattern '{pattern}': {source}")]
    Match {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
