use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslFiletype, SslMethod};

use crate::server::authn::bearer_token::BearerTokenAuthenticator;
use crate::server::authn::token::factory::TokenFactory;
use crate::server::authz::factory::AuthzFactory;
use crate::server::authz::CustomAuthorizer;
use crate::server::db::factory::DbFactory;
use crate::server::docs::build_api_doc;
use crate::server::handlers::api::ApiHandler;
use crate::server::handlers::healthz::HealthzHandler;
use crate::server::i18n::I18n;
use crate::server::service::CurdService;

use super::config::ServerConfig;
use super::db::Database;
use super::restful::{RestfulContext, RestfulServer};

pub struct ServerFactory {
    db: Arc<Database>,
    authz_factory: AuthzFactory,
    cfg: ServerConfig,
}

impl ServerFactory {
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let db_factory = DbFactory::new();
        let db = db_factory.build_db(&cfg.db).context("init database")?;
        Ok(Self {
            cfg,
            db,
            authz_factory: AuthzFactory::new(),
        })
    }

    /// Adds a handler for rules with `access = "Custom"`. Must be called
    /// before the server is built.
    pub fn register_custom(&mut self, authorizer: Box<dyn CustomAuthorizer>) {
        self.authz_factory.register_custom(authorizer);
    }

    pub fn build_server(self) -> Result<RestfulServer> {
        let ssl = self.build_ssl()?;
        let bind = self.cfg.bind.clone();
        let cors = self.cfg.cors.clone();
        let payload_limit_mib = self.cfg.payload_limit_mib;
        let keep_alive_secs = self.cfg.keep_alive_secs;
        let workers = self.cfg.workers;
        let shutdown_timeout_secs = self.cfg.shutdown_timeout_secs;

        let ctx = self.build_context()?;

        let mut srv = RestfulServer::new(bind, ssl, ctx, cors, payload_limit_mib);
        if keep_alive_secs > 0 {
            srv.set_keep_alive_secs(keep_alive_secs);
        }
        if workers > 0 {
            srv.set_workers(workers);
        }
        srv.set_shutdown_timeout_secs(shutdown_timeout_secs);

        Ok(srv)
    }

    pub fn build_ssl(&self) -> Result<Option<SslAcceptorBuilder>> {
        if !self.cfg.ssl {
            return Ok(None);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(&self.cfg.key_path, SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(&self.cfg.cert_path)
            .context("load ssl cert file")?;

        Ok(Some(builder))
    }

    /// Builds the shared handler context. Consumes the factory since the
    /// custom authorizer registry is frozen from here on.
    pub fn build_context(self) -> Result<Arc<RestfulContext>> {
        let token_factory = TokenFactory::new(&self.cfg.jwt).context("init token")?;
        let authn = BearerTokenAuthenticator::new(token_factory.build_token_validator());

        let authz = self
            .authz_factory
            .build_authorizer(&self.cfg.security)
            .context("init authorizer")?;

        let api_handler = ApiHandler::new(Box::new(authn), authz, self.cfg.jwt.realm.clone());
        let healthz_handler = HealthzHandler::new();
        let curd_service = CurdService::new(self.db.clone());
        let i18n = I18n::load(&self.cfg.i18n).context("load i18n messages")?;

        let api_doc = if self.cfg.swagger.enable {
            Some(build_api_doc(&self.cfg.swagger))
        } else {
            info!("Swagger document is disabled");
            None
        };

        let ctx = RestfulContext {
            api_handler,
            healthz_handler,
            curd_service,
            i18n,
            api_doc,
        };
        Ok(Arc::new(ctx))
    }
}
