use globset::{GlobBuilder, GlobMatcher};

use super::AuthzError;

/// Compiles a glob where `*` stays within one path segment and `**` crosses
/// segment boundaries.
fn compile(pattern: &str) -> Result<GlobMatcher, AuthzError> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| AuthzError::Match {
            pattern: String::from(pattern),
            source,
        })?;
    Ok(glob.compile_matcher())
}

/// Matches `candidate` against a glob `pattern`.
#[cfg(test)]
fn glob_match(pattern: &str, candidate: &str) -> Result<bool, AuthzError> {
    Ok(compile(pattern)?.is_match(candidate))
}

/// A compiled `<path-glob>:<method-glob>` url pattern.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    raw: String,
    path: GlobMatcher,
    method: Option<GlobMatcher>,
}

impl UrlPattern {
    /// Splits on the first `:`. A pattern without a method part is kept, but
    /// it never matches any request.
    pub fn parse(raw: &str) -> Result<Self, AuthzError> {
        let (path, method) = match raw.split_once(':') {
            Some((path, method)) => (path, Some(method)),
            None => (raw, None),
        };

        let path = compile(path)?;
        let method = match method {
            Some(method) => Some(compile(method)?),
            None => None,
        };

        Ok(Self {
            raw: String::from(raw),
            path,
            method,
        })
    }

    pub fn matches(&self, path: &str, method: &str) -> bool {
        if !self.path.is_match(path) {
            return false;
        }
        match self.method {
            Some(ref m) => m.is_match(method),
            None => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("/api/**", "/api/v1/curd").unwrap());
        assert!(glob_match("/api/*", "/api/v1").unwrap());
        assert!(!glob_match("/api/*", "/api/v1/curd").unwrap());
        assert!(glob_match("/api/v1/curd", "/api/v1/curd").unwrap());
        assert!(!glob_match("/api/v1/curd", "/api/v1/CURD").unwrap());
        assert!(glob_match("/api/*/curd", "/api/v2/curd").unwrap());
        assert!(glob_match("/api/v1/curd/*", "/api/v1/curd/12").unwrap());

        assert!(matches!(
            glob_match("/api/[v1", "/api/v1"),
            Err(AuthzError::Match { .. })
        ));
    }

    #[test]
    fn test_url_pattern() {
        let pattern = UrlPattern::parse("/api/**:GET").unwrap();
        assert!(pattern.matches("/api/v1/curd", "GET"));
        assert!(!pattern.matches("/api/v1/curd", "POST"));
        assert!(!pattern.matches("/other", "GET"));

        let pattern = UrlPattern::parse("/api/*:GET").unwrap();
        assert!(!pattern.matches("/api/v1/curd", "GET"));
        assert!(pattern.matches("/api/v1", "GET"));

        let pattern = UrlPattern::parse("/api/v1/curd:{GET,POST}").unwrap();
        assert!(pattern.matches("/api/v1/curd", "GET"));
        assert!(pattern.matches("/api/v1/curd", "POST"));
        assert!(!pattern.matches("/api/v1/curd", "DELETE"));

        let pattern = UrlPattern::parse("/x:*").unwrap();
        assert!(pattern.matches("/x", "PATCH"));
        assert_eq!(pattern.as_str(), "/x:*");
    }

    #[test]
    fn test_url_pattern_without_method() {
        let pattern = UrlPattern::parse("/api/**").unwrap();
        assert!(!pattern.matches("/api/v1/curd", "GET"));
        assert!(!pattern.matches("/api/v1/curd", ""));
    }

    #[test]
    fn test_url_pattern_invalid() {
        assert!(UrlPattern::parse("/api/{v1:GET").is_err());
        assert!(UrlPattern::parse("/api/v1:[GET").is_err());
    }
}
