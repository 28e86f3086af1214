use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

use super::rule::RuleTable;

/// Authorization related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Ordered authorization rules. The first rule whose url pattern matches
    /// both path and method decides; requests matching no rule are denied.
    #[serde(default = "SecurityConfig::default_authorized_requests")]
    pub authorized_requests: Vec<RuleConfig>,

    /// Identities accepted by the built-in custom authorizer, consulted by
    /// rules with `access = "Custom"`. Empty disables it.
    #[serde(default = "SecurityConfig::default_custom_allow_users")]
    pub custom_allow_users: HashSet<String>,
}

/// One `[[security.authorized_requests]]` entry, as written in the config.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuleConfig {
    /// `<path-glob>:<method-glob>` patterns.
    #[serde(default)]
    pub urls: Vec<String>,

    /// `HasPermission`, `HasRole`, `PermitAll`, `DenyAll` or `Custom`.
    pub access: String,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub permissions: Vec<String>,
}

impl CommonConfig for SecurityConfig {
    fn default() -> Self {
        Self {
            authorized_requests: Self::default_authorized_requests(),
            custom_allow_users: Self::default_custom_allow_users(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        // Dry run, so that bad access kinds and globs stop the startup.
        RuleTable::compile(&self.authorized_requests)?;
        Ok(())
    }
}

impl SecurityConfig {
    pub fn default_authorized_requests() -> Vec<RuleConfig> {
        vec![]
    }

    pub fn default_custom_allow_users() -> HashSet<String> {
        HashSet::new()
    }
}
