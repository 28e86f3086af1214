use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use log::debug;

use super::config::RuleConfig;
use super::custom::CustomRegistry;
use super::{AuthzError, AuthzRequest, UrlPattern};

/// The access kind of a rule. Closed: unknown kinds are rejected when the
/// rule table is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    HasPermission,
    HasRole,
    PermitAll,
    DenyAll,
    Custom,
}

impl FromStr for Access {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HasPermission" => Ok(Access::HasPermission),
            "HasRole" => Ok(Access::HasRole),
            "PermitAll" => Ok(Access::PermitAll),
            "DenyAll" => Ok(Access::DenyAll),
            "Custom" => Ok(Access::Custom),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Access::HasPermission => "HasPermission",
            Access::HasRole => "HasRole",
            Access::PermitAll => "PermitAll",
            Access::DenyAll => "DenyAll",
            Access::Custom => "Custom",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationRule {
    pub url_patterns: Vec<UrlPattern>,
    pub access: Access,
    pub roles: HashSet<String>,
    pub permissions: HashSet<String>,
}

impl AuthorizationRule {
    /// Returns the first of this rule's patterns matching both path and
    /// method.
    fn find_match(&self, path: &str, method: &str) -> Option<&UrlPattern> {
        self.url_patterns
            .iter()
            .find(|pattern| pattern.matches(path, method))
    }
}

/// The compiled, immutable rule list, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<AuthorizationRule>,
}

impl RuleTable {
    pub fn compile(cfgs: &[RuleConfig]) -> Result<Self, AuthzError> {
        let mut rules = Vec::with_capacity(cfgs.len());
        for (index, cfg) in cfgs.iter().enumerate() {
            let access = match cfg.access.parse::<Access>() {
                Ok(access) => access,
                Err(()) => {
                    return Err(AuthzError::Configuration {
                        index,
                        access: cfg.access.clone(),
                    })
                }
            };

            let url_patterns = cfg
                .urls
                .iter()
                .map(|url| UrlPattern::parse(url))
                .collect::<Result<Vec<_>, _>>()?;

            rules.push(AuthorizationRule {
                url_patterns,
                access,
                roles: cfg.roles.iter().cloned().collect(),
                permissions: cfg.permissions.iter().cloned().collect(),
            });
        }
        Ok(Self { rules })
    }

    /// Selects the first rule with a pattern matching both path and method.
    pub fn select(&self, path: &str, method: &str) -> Option<(usize, &AuthorizationRule)> {
        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(pattern) = rule.find_match(path, method) {
                debug!(
                    "Request {method} {path} selected rule #{index} ({}) by pattern '{}'",
                    rule.access,
                    pattern.as_str()
                );
                return Some((index, rule));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The access decision engine: rule table plus custom authorizers.
pub struct RuleAuthorizer {
    rules: RuleTable,
    custom: CustomRegistry,
}

impl RuleAuthorizer {
    pub fn new(rules: RuleTable, custom: CustomRegistry) -> Self {
        Self { rules, custom }
    }

    /// Decides whether the request is allowed. Requests matching no rule are
    /// denied.
    pub fn authorize_request(&self, req: &AuthzRequest) -> bool {
        let rule = match self.rules.select(&req.path, &req.method) {
            Some((_, rule)) => rule,
            None => {
                debug!("No rule matches {} {}, deny", req.method, req.path);
                return false;
            }
        };

        match rule.access {
            Access::PermitAll => true,
            Access::DenyAll => false,
            Access::HasRole => req.user.has_any(&rule.roles),
            Access::HasPermission => req.user.has_any(&rule.permissions),
            Access::Custom => self.custom.authorize_request(req),
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
}
