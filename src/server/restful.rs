use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::web::{self, Data, PayloadConfig, ServiceConfig};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use openssl::ssl::SslAcceptorBuilder;
use sd_notify::NotifyState;
use serde::Serialize;
use utoipa::openapi::OpenApi as OpenApiDoc;

use super::cors::CorsConfig;
use super::handlers::api::ApiHandler;
use super::handlers::curd;
use super::handlers::healthz::HealthzHandler;
use super::i18n::{I18n, MSG_ROUTE_NOT_FOUND};
use super::response::{ApiError, Response};
use super::service::CurdService;
use crate::types::response::CODE_NOT_FOUND;

pub struct RestfulServer {
    ssl: Option<SslAcceptorBuilder>,
    ctx: Arc<RestfulContext>,
    cors: CorsConfig,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,
    shutdown_timeout_secs: u64,

    bind: String,

    payload_limit_mib: usize,
}

/// Everything the handlers share, built once before the server starts.
pub struct RestfulContext {
    pub api_handler: ApiHandler,
    pub healthz_handler: HealthzHandler,
    pub curd_service: CurdService,
    pub i18n: I18n,

    /// Served at `/swagger/doc.json` when set.
    pub api_doc: Option<OpenApiDoc>,
}

impl RestfulContext {
    /// Renders a handler result, localizing errors by `Accept-Language`.
    pub fn respond<T: Serialize>(
        &self,
        req: &HttpRequest,
        result: Result<T, ApiError>,
    ) -> HttpResponse {
        let lang = self.select_lang(req);
        Response::from_result(result, &self.i18n, lang, self.api_handler.realm()).into()
    }

    fn select_lang(&self, req: &HttpRequest) -> &str {
        let accept = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        self.i18n.select_lang(accept)
    }
}

impl RestfulServer {
    const API_PATH: &str = "/api/v1";
    const HEALTHZ_PATH: &str = "/healthz";
    const API_DOC_PATH: &str = "/swagger/doc.json";

    pub fn new(
        bind: String,
        ssl: Option<SslAcceptorBuilder>,
        ctx: Arc<RestfulContext>,
        cors: CorsConfig,
        payload_limit_mib: usize,
    ) -> Self {
        Self {
            ssl,
            ctx,
            cors,
            keep_alive_secs: None,
            workers: None,
            shutdown_timeout_secs: 5,
            bind,
            payload_limit_mib,
        }
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub fn set_shutdown_timeout_secs(&mut self, secs: u64) {
        self.shutdown_timeout_secs = secs;
    }

    /// Registers every route and the shared context. Used by the server and
    /// by tests.
    pub fn configure(
        ctx: Arc<RestfulContext>,
        payload_limit_mib: usize,
    ) -> impl Fn(&mut ServiceConfig) {
        move |cfg: &mut ServiceConfig| {
            cfg.app_data(Data::new(ctx.clone()))
                .app_data(PayloadConfig::new(payload_limit_mib * 1024 * 1024))
                .service(
                    web::scope(Self::API_PATH)
                        .route("/curd", web::post().to(curd::create_curd))
                        .route("/curd", web::get().to(curd::list_curds))
                        .route("/curd/{id}", web::get().to(curd::get_curd))
                        .route("/curd/{id}", web::put().to(curd::update_curd))
                        .route("/curd/{id}", web::delete().to(curd::delete_curd)),
                )
                .service(
                    web::resource(Self::HEALTHZ_PATH).route(web::get().to(Self::handle_healthz)),
                )
                .service(
                    web::resource(Self::API_DOC_PATH).route(web::get().to(Self::handle_api_doc)),
                )
                .default_service(web::route().to(Self::default_handler));
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let ctx = self.ctx.clone();
        let cors = self.cors.clone();
        let payload_limit_mib = self.payload_limit_mib;
        let mut srv = HttpServer::new(move || {
            App::new()
                .wrap(cors.build())
                .wrap(Logger::default())
                .configure(Self::configure(ctx.clone(), payload_limit_mib))
        });

        if let Some(ssl) = self.ssl.take() {
            info!("Binding to https://{}", self.bind);
            srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
        } else {
            warn!("Using HTTP (without SSL). THIS IS DANGEROUS, DO NOT USE IN PRODUCTION");
            info!("Binding to http://{}", self.bind);
            srv = srv.bind(&self.bind).context("bind without ssl")?
        };

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }
        srv = srv.shutdown_timeout(self.shutdown_timeout_secs);

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting restful server");
        srv.run().await.context("run server")?;

        info!("Server stopped");
        Ok(())
    }

    async fn handle_healthz(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.healthz_handler.handle(&req).into()
    }

    async fn handle_api_doc(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        match ctx.api_doc {
            Some(ref doc) => HttpResponse::Ok().json(doc),
            None => Self::default_handler(req, ctx).await,
        }
    }

    async fn default_handler(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        let path = req.uri().path().to_string();
        let method = req.method().as_str().to_string();
        let lang = ctx.select_lang(&req);
        let msg = ctx.i18n.localize(
            lang,
            MSG_ROUTE_NOT_FOUND,
            &[("Method", &method), ("Path", &path)],
            Some("No route to {{.Method}} {{.Path}}"),
        );
        Response::error(StatusCode::NOT_FOUND, CODE_NOT_FOUND, msg).into()
    }
}
