use anyhow::Result;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa::{Modify, OpenApi};

use crate::config::{expandenv, CommonConfig, PathSet};
use crate::types::curd::{CurdRequest, CurdResponse};
use crate::types::healthz::HealthzResponse;
use crate::types::response::{ErrorField, ErrorResponse};

use super::handlers::curd;

pub const SECURITY_SCHEME: &str = "ApiKeyAuth";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SwaggerConfig {
    #[serde(default = "SwaggerConfig::default_enable")]
    pub enable: bool,

    /// Public base URL of the service, listed as the document's server.
    #[serde(default = "SwaggerConfig::default_url")]
    pub url: String,
}

impl CommonConfig for SwaggerConfig {
    fn default() -> Self {
        Self {
            enable: Self::default_enable(),
            url: Self::default_url(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        self.url = expandenv("url", &self.url)?;
        Ok(())
    }
}

impl SwaggerConfig {
    fn default_enable() -> bool {
        true
    }

    fn default_url() -> String {
        String::new()
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Curd API", description = "Record management behind JWT authentication and rule based authorization"),
    paths(
        curd::create_curd,
        curd::list_curds,
        curd::get_curd,
        curd::update_curd,
        curd::delete_curd,
    ),
    components(schemas(
        CurdRequest,
        CurdResponse,
        ErrorResponse,
        ErrorField,
        HealthzResponse,
    )),
    modifiers(&SecurityAddon),
    tags((name = "CURD", description = "Curd records"))
)]
pub struct ApiDoc;

/// Adds the `Authorization` header scheme the API operations refer to.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            SECURITY_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "JWT as `Bearer <token>`",
            ))),
        );
    }
}

/// Builds the document served at `/swagger/doc.json`.
pub fn build_api_doc(cfg: &SwaggerConfig) -> OpenApiDoc {
    let mut doc = ApiDoc::openapi();
    doc.info.version = env!("CURD_VERSION").to_string();
    if !cfg.url.is_empty() {
        doc.servers = Some(vec![Server::new(&cfg.url)]);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc() {
        let cfg = SwaggerConfig {
            enable: true,
            url: String::from("https://curd.example.com"),
        };
        let doc = build_api_doc(&cfg);
        let json = serde_json::to_value(&doc).unwrap();

        let paths = json["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/curd"));
        assert!(paths.contains_key("/api/v1/curd/{id}"));
        assert!(json["paths"]["/api/v1/curd"]["post"].is_object());
        assert!(json["paths"]["/api/v1/curd/{id}"]["delete"].is_object());

        assert!(json["components"]["securitySchemes"][SECURITY_SCHEME].is_object());
        assert_eq!(json["servers"][0]["url"], "https://curd.example.com");
    }
}
