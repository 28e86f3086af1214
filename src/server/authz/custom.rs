use super::{AuthzRequest, CustomAuthorizer};

/// Ordered custom authorizers. Filled during startup, read-only once the
/// server is built.
#[derive(Default)]
pub struct CustomRegistry {
    authorizers: Vec<Box<dyn CustomAuthorizer>>,
}

impl CustomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, authorizer: Box<dyn CustomAuthorizer>) {
        self.authorizers.push(authorizer);
    }

    /// Tries the authorizers in registration order, the first one allowing
    /// wins. Denies when none is registered.
    pub fn authorize_request(&self, req: &AuthzRequest) -> bool {
        self.authorizers
            .iter()
            .any(|authorizer| authorizer.authorize(req))
    }

    pub fn len(&self) -> usize {
        self.authorizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorizers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::Value;

    use crate::server::authz::claims::Claims;

    use super::*;

    fn request() -> AuthzRequest {
        AuthzRequest {
            path: String::from("/x"),
            method: String::from("GET"),
            user: Claims {
                user_id: Value::Null,
                authorities: Default::default(),
            },
        }
    }

    struct Recorder {
        result: bool,
        calls: Arc<AtomicUsize>,
    }

    impl CustomAuthorizer for Recorder {
        fn authorize(&self, _req: &AuthzRequest) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
        }
    }

    fn recorder(result: bool) -> (Box<Recorder>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let recorder = Recorder {
            result,
            calls: calls.clone(),
        };
        (Box::new(recorder), calls)
    }

    #[test]
    fn test_empty_registry_denies() {
        let registry = CustomRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.authorize_request(&request()));
    }

    #[test]
    fn test_registration_order() {
        // A denies, B allows: allowed, both consulted.
        let (a, a_calls) = recorder(false);
        let (b, b_calls) = recorder(true);
        let mut registry = CustomRegistry::new();
        registry.register(a);
        registry.register(b);
        assert!(registry.authorize_request(&request()));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);

        // Both deny, in swapped order: denied.
        let (a, _) = recorder(false);
        let (b, _) = recorder(false);
        let mut registry = CustomRegistry::new();
        registry.register(b);
        registry.register(a);
        assert!(!registry.authorize_request(&request()));
    }

    #[test]
    fn test_short_circuit() {
        let (a, a_calls) = recorder(true);
        let (b, b_calls) = recorder(true);
        let mut registry = CustomRegistry::new();
        registry.register(a);
        registry.register(b);
        assert!(registry.authorize_request(&request()));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }
}
