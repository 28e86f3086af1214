use std::collections::HashSet;

use serde_json::{Map, Value};

use super::AuthzError;

pub const CLAIM_USER_ID: &str = "user_id";
pub const CLAIM_AUTHORITIES: &str = "authorities";

/// Identity and granted authorities taken from a verified token. Lives for
/// one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    /// Opaque identity value, `Null` when the token carries none.
    pub user_id: Value,
    pub authorities: HashSet<String>,
}

impl Claims {
    /// Extracts the claims from a verified token payload.
    ///
    /// `authorities` must be present and be an array of strings.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, AuthzError> {
        let user_id = payload.get(CLAIM_USER_ID).cloned().unwrap_or(Value::Null);

        let authorities = match payload.get(CLAIM_AUTHORITIES) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(AuthzError::InvalidClaims(format!(
                    "'{CLAIM_AUTHORITIES}' is not an array"
                )))
            }
            None => {
                return Err(AuthzError::InvalidClaims(format!(
                    "'{CLAIM_AUTHORITIES}' is missing"
                )))
            }
        };

        let mut set = HashSet::with_capacity(authorities.len());
        for item in authorities {
            match item {
                Value::String(s) => {
                    set.insert(s.clone());
                }
                _ => {
                    return Err(AuthzError::InvalidClaims(format!(
                        "'{CLAIM_AUTHORITIES}' contains a non-string value: {item}"
                    )))
                }
            }
        }

        Ok(Self {
            user_id,
            authorities: set,
        })
    }

    /// The identity rendered for logs and allow lists: strings as-is, other
    /// values as JSON.
    pub fn identity(&self) -> String {
        match self.user_id {
            Value::String(ref s) => s.clone(),
            Value::Null => String::new(),
            ref other => other.to_string(),
        }
    }

    /// Whether any of `names` is granted.
    pub fn has_any<'a, I>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        names.into_iter().any(|name| self.authorities.contains(name))
    }
}
