use std::sync::Arc;

use actix_web::web::{Bytes, Data, Query};
use actix_web::{HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;

use crate::server::response::{self, ApiError};
use crate::server::restful::RestfulContext;
use crate::server::service::ServiceError;
use crate::types::curd::{CurdRequest, CurdResponse};
use crate::types::page::{PageRequest, PageResponse};
use crate::types::response::{ErrorResponse, Response};

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::BadRequest(format!("invalid json body: {e}")).into())
}

/// Ids are sqlite rowids: positive and within i64.
fn parse_id(req: &HttpRequest) -> Result<u64, ApiError> {
    let id = req.match_info().get("id").unwrap_or_default();
    match id.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value as u64),
        _ => Err(ServiceError::BadRequest(format!("invalid id '{id}'")).into()),
    }
}

/// Create new curd
#[utoipa::path(
    post,
    path = "/api/v1/curd",
    tag = "CURD",
    request_body = CurdRequest,
    responses(
        (status = 200, body = Response<CurdResponse>),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn create_curd(
    req: HttpRequest,
    body: Bytes,
    ctx: Data<Arc<RestfulContext>>,
) -> HttpResponse {
    let result = (|| -> Result<_, ApiError> {
        ctx.api_handler.guard(&req)?;
        let curd: CurdRequest = parse_body(&body)?;
        Ok(ctx.curd_service.create(curd)?)
    })();
    ctx.respond(&req, result)
}

/// List curds page by page
#[utoipa::path(
    get,
    path = "/api/v1/curd",
    tag = "CURD",
    params(PageRequest),
    responses(
        (status = 200, body = Response<PageResponse<CurdResponse>>),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn list_curds(
    req: HttpRequest,
    page: Query<PageRequest>,
    ctx: Data<Arc<RestfulContext>>,
) -> HttpResponse {
    let result = (|| -> Result<_, ApiError> {
        ctx.api_handler.guard(&req)?;
        Ok(ctx.curd_service.list(&page)?)
    })();
    ctx.respond(&req, result)
}

/// Get a curd by id
#[utoipa::path(
    get,
    path = "/api/v1/curd/{id}",
    tag = "CURD",
    params(("id" = u64, Path, description = "Curd id")),
    responses(
        (status = 200, body = Response<CurdResponse>),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn get_curd(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
    let result = (|| -> Result<_, ApiError> {
        ctx.api_handler.guard(&req)?;
        let id = parse_id(&req)?;
        Ok(ctx.curd_service.get(id)?)
    })();
    ctx.respond(&req, result)
}

/// Replace a curd
#[utoipa::path(
    put,
    path = "/api/v1/curd/{id}",
    tag = "CURD",
    params(("id" = u64, Path, description = "Curd id")),
    request_body = CurdRequest,
    responses(
        (status = 200, body = Response<CurdResponse>),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn update_curd(
    req: HttpRequest,
    body: Bytes,
    ctx: Data<Arc<RestfulContext>>,
) -> HttpResponse {
    let result = (|| -> Result<_, ApiError> {
        ctx.api_handler.guard(&req)?;
        let id = parse_id(&req)?;
        let curd: CurdRequest = parse_body(&body)?;
        Ok(ctx.curd_service.update(id, curd)?)
    })();
    ctx.respond(&req, result)
}

/// Soft delete a curd
#[utoipa::path(
    delete,
    path = "/api/v1/curd/{id}",
    tag = "CURD",
    params(("id" = u64, Path, description = "Curd id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn delete_curd(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
    let result = (|| -> Result<(), ApiError> {
        ctx.api_handler.guard(&req)?;
        let id = parse_id(&req)?;
        ctx.curd_service.delete(id)?;
        Ok(())
    })();
    match result {
        Ok(()) => response::Response::ok().into(),
        Err(err) => ctx.respond::<()>(&req, Err(err)),
    }
}
