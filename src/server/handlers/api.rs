use actix_web::HttpRequest;
use log::{debug, info};

use crate::server::authn::{Authenticator, AuthnResponse};
use crate::server::authz::claims::Claims;
use crate::server::authz::rule::RuleAuthorizer;
use crate::server::authz::AuthzRequest;
use crate::server::response::ApiError;

/// Guards the versioned API: authenticates the token, extracts the claims
/// and asks the rule engine for a decision.
pub struct ApiHandler {
    authn: Box<dyn Authenticator>,
    authz: RuleAuthorizer,
    realm: String,
}

impl ApiHandler {
    pub fn new(authn: Box<dyn Authenticator>, authz: RuleAuthorizer, realm: String) -> Self {
        Self {
            authn,
            authz,
            realm,
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns the caller's claims when the request may proceed.
    ///
    /// Rules are matched against the decoded path the router dispatched on,
    /// not the raw URI, so `%75` and `u` select the same rule.
    pub fn guard(&self, req: &HttpRequest) -> Result<Claims, ApiError> {
        let path = req.match_info().as_str().to_string();
        let method = req.method().as_str().to_uppercase();

        let payload = match self.authn.authenticate_request(req) {
            AuthnResponse::Ok(payload) => payload,
            AuthnResponse::Unauthenticated(reason) => {
                debug!("Unauthenticated request {method} {path}: {reason}");
                return Err(ApiError::Unauthenticated);
            }
        };

        let user = match Claims::from_payload(&payload) {
            Ok(user) => user,
            Err(e) => {
                info!("Deny {method} {path}: {e}");
                return Err(ApiError::Forbidden);
            }
        };
        debug!(
            "Authorize {method} {path} for user {} with authorities {:?}",
            user.identity(),
            user.authorities
        );

        let authz_req = AuthzRequest { path, method, user };
        if !self.authz.authorize_request(&authz_req) {
            info!(
                "Deny {} {} for user {}",
                authz_req.method,
                authz_req.path,
                authz_req.user.identity()
            );
            return Err(ApiError::Forbidden);
        }

        Ok(authz_req.user)
    }
}
