use std::collections::HashSet;

use super::{AuthzRequest, CustomAuthorizer};

/// Allows requests whose identity is in the allow list.
pub struct AllowListAuthorizer {
    allow_list: HashSet<String>,
}

impl AllowListAuthorizer {
    pub fn new(allow_list: HashSet<String>) -> Self {
        Self { allow_list }
    }
}

impl CustomAuthorizer for AllowListAuthorizer {
    fn authorize(&self, req: &AuthzRequest) -> bool {
        let identity = req.user.identity();
        if identity.is_empty() {
            return false;
        }
        self.allow_list.contains(&identity)
    }
}
