use actix_cors::Cors;
use actix_web::http::header::HeaderName;
use actix_web::http::Method;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{parse_duration, CommonConfig, PathSet};

const WILDCARD: &str = "*";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    /// `"*"` allows any origin.
    #[serde(default = "CorsConfig::default_allow_origins")]
    pub allow_origins: Vec<String>,

    #[serde(default = "CorsConfig::default_allow_methods")]
    pub allow_methods: Vec<String>,

    #[serde(default = "CorsConfig::default_allow_headers")]
    pub allow_headers: Vec<String>,

    #[serde(default = "CorsConfig::default_expose_headers")]
    pub expose_headers: Vec<String>,

    #[serde(default = "CorsConfig::default_allow_credentials")]
    pub allow_credentials: bool,

    /// How long preflight results may be cached, e.g. `"12h"`.
    #[serde(default = "CorsConfig::default_max_age")]
    pub max_age: String,
}

impl CommonConfig for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Self::default_allow_origins(),
            allow_methods: Self::default_allow_methods(),
            allow_headers: Self::default_allow_headers(),
            expose_headers: Self::default_expose_headers(),
            allow_credentials: Self::default_allow_credentials(),
            max_age: Self::default_max_age(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        for method in self.allow_methods.iter_mut() {
            *method = method.trim().to_uppercase();
            if method.as_str() != WILDCARD && Method::from_bytes(method.as_bytes()).is_err() {
                bail!("invalid method '{method}' in allow_methods");
            }
        }
        for header in self.allow_headers.iter().chain(self.expose_headers.iter()) {
            if header != WILDCARD && HeaderName::from_bytes(header.as_bytes()).is_err() {
                bail!("invalid header name '{header}'");
            }
        }
        parse_duration("max_age", &self.max_age)?;
        Ok(())
    }
}

impl CorsConfig {
    fn default_allow_origins() -> Vec<String> {
        vec![String::from(WILDCARD)]
    }

    fn default_allow_methods() -> Vec<String> {
        ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn default_allow_headers() -> Vec<String> {
        ["Origin", "Content-Type", "Authorization", "Accept-Language"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn default_expose_headers() -> Vec<String> {
        vec![String::from("Content-Length")]
    }

    fn default_allow_credentials() -> bool {
        true
    }

    fn default_max_age() -> String {
        String::from("12h")
    }

    fn wildcard(values: &[String]) -> bool {
        values.iter().any(|value| value == WILDCARD)
    }

    /// Builds the middleware. Must be called on a completed config.
    pub fn build(&self) -> Cors {
        let mut cors = Cors::default();

        if Self::wildcard(&self.allow_origins) {
            cors = cors.allow_any_origin();
        } else {
            for origin in self.allow_origins.iter() {
                cors = cors.allowed_origin(origin);
            }
        }

        if Self::wildcard(&self.allow_methods) {
            cors = cors.allow_any_method();
        } else {
            cors = cors.allowed_methods(self.allow_methods.iter().map(String::as_str));
        }

        if Self::wildcard(&self.allow_headers) {
            cors = cors.allow_any_header();
        } else {
            cors = cors.allowed_headers(self.allow_headers.iter().map(String::as_str));
        }

        if Self::wildcard(&self.expose_headers) {
            cors = cors.expose_any_header();
        } else if !self.expose_headers.is_empty() {
            cors = cors.expose_headers(self.expose_headers.iter().map(String::as_str));
        }

        if self.allow_credentials {
            cors = cors.supports_credentials();
        }

        let max_age = parse_duration("max_age", &self.max_age)
            .map(|age| age.as_secs() as usize)
            .unwrap_or_default();
        cors.max_age(max_age)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header;
    use actix_web::test::{self, TestRequest};
    use actix_web::{web, App, HttpResponse};

    use super::*;

    fn completed(mut cfg: CorsConfig) -> CorsConfig {
        cfg.complete(&PathSet::new_test()).unwrap();
        cfg
    }

    #[test]
    fn test_complete() {
        let cfg = completed(CorsConfig {
            allow_methods: vec![String::from(" get "), String::from("*")],
            ..CorsConfig::default()
        });
        assert_eq!(cfg.allow_methods, vec!["GET", "*"]);

        let mut cfg = CorsConfig::default();
        cfg.allow_headers.push(String::from("bad header"));
        assert!(cfg.complete(&PathSet::new_test()).is_err());

        let mut cfg = CorsConfig::default();
        cfg.max_age = String::from("forever");
        assert!(cfg.complete(&PathSet::new_test()).is_err());
    }

    #[actix_web::test]
    async fn test_any_origin() {
        let cors = completed(CorsConfig::default()).build();
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/x", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/x")
            .insert_header((header::ORIGIN, "https://any.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://any.example.com"
        );
    }

    #[actix_web::test]
    async fn test_listed_origin() {
        let cors = completed(CorsConfig {
            allow_origins: vec![String::from("https://app.example.com")],
            ..CorsConfig::default()
        })
        .build();
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/x", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/x")
            .insert_header((header::ORIGIN, "https://app.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = TestRequest::get()
            .uri("/x")
            .insert_header((header::ORIGIN, "https://evil.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
