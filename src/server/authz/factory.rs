use anyhow::{Context, Result};
use log::{info, warn};

use super::allow_list::AllowListAuthorizer;
use super::config::SecurityConfig;
use super::custom::CustomRegistry;
use super::rule::{RuleAuthorizer, RuleTable};
use super::CustomAuthorizer;

#[derive(Default)]
pub struct AuthzFactory {
    custom: CustomRegistry,
}

impl AuthzFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an authorizer for rules with `access = "Custom"`. Authorizers are
    /// tried in the order they are registered.
    pub fn register_custom(&mut self, authorizer: Box<dyn CustomAuthorizer>) {
        self.custom.register(authorizer);
    }

    pub fn build_authorizer(mut self, cfg: &SecurityConfig) -> Result<RuleAuthorizer> {
        let rules = RuleTable::compile(&cfg.authorized_requests).context("compile rules")?;
        if rules.is_empty() {
            warn!("No authorization rules configured, every api request will be denied");
        } else {
            info!("Loaded {} authorization rules", rules.len());
        }

        if !cfg.custom_allow_users.is_empty() {
            info!(
                "Custom allow list authorizer enabled with {} identities",
                cfg.custom_allow_users.len()
            );
            let allow_list = AllowListAuthorizer::new(cfg.custom_allow_users.clone());
            self.custom.register(Box::new(allow_list));
        }

        if self.custom.is_empty() {
            info!("No custom authorizer registered, rules with Custom access deny every request");
        } else {
            info!("Registered {} custom authorizers", self.custom.len());
        }

        Ok(RuleAuthorizer::new(rules, self.custom))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::server::authz::claims::Claims;
    use crate::server::authz::config::RuleConfig;
    use crate::server::authz::AuthzRequest;

    use super::*;

    fn request(user_id: &str) -> AuthzRequest {
        AuthzRequest {
            path: String::from("/api/v1/curd"),
            method: String::from("DELETE"),
            user: Claims {
                user_id: json!(user_id),
                authorities: Default::default(),
            },
        }
    }

    fn custom_config() -> SecurityConfig {
        SecurityConfig {
            authorized_requests: vec![RuleConfig {
                urls: vec![String::from("/api/v1/**:DELETE")],
                access: String::from("Custom"),
                roles: vec![],
                permissions: vec![],
            }],
            custom_allow_users: Default::default(),
        }
    }

    #[test]
    fn test_factory() {
        let authz = AuthzFactory::new().build_authorizer(&custom_config()).unwrap();
        assert_eq!(authz.rules().len(), 1);
        assert!(!authz.authorize_request(&request("alice")));

        let mut cfg = custom_config();
        cfg.custom_allow_users.insert(String::from("alice"));
        let authz = AuthzFactory::new().build_authorizer(&cfg).unwrap();
        assert!(authz.authorize_request(&request("alice")));
        assert!(!authz.authorize_request(&request("bob")));
    }

    #[test]
    fn test_registered_before_allow_list() {
        let mut cfg = custom_config();
        cfg.custom_allow_users.insert(String::from("alice"));

        let mut factory = AuthzFactory::new();
        factory.register_custom(Box::new(|req: &AuthzRequest| req.user.identity() == "bob"));
        let authz = factory.build_authorizer(&cfg).unwrap();
        assert!(authz.authorize_request(&request("alice")));
        assert!(authz.authorize_request(&request("bob")));
        assert!(!authz.authorize_request(&request("carol")));
    }

    #[test]
    fn test_factory_rejects_bad_rules() {
        let mut cfg = custom_config();
        cfg.authorized_requests[0].access = String::from("Maybe");
        assert!(AuthzFactory::new().build_authorizer(&cfg).is_err());
    }
}
