use actix_web::http::header::{self, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use log::error;
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::types::response::{
    ErrorField, ErrorResponse, Response as DataResponse, CODE_BAD_REQUEST, CODE_FORBIDDEN,
    CODE_INTERNAL, CODE_NOT_FOUND, CODE_UNAUTHORIZED, CODE_VALIDATION,
};

use super::i18n::{
    I18n, MSG_BAD_REQUEST, MSG_FORBIDDEN, MSG_INTERNAL, MSG_NOT_FOUND, MSG_UNAUTHORIZED,
    MSG_VALIDATION,
};
use super::service::ServiceError;

/// Why an API request was not served.
#[derive(Debug)]
pub enum ApiError {
    /// No valid token. Answered with 401 and a `WWW-Authenticate` challenge.
    Unauthenticated,
    /// Authenticated, but denied by the rule engine or carrying unusable
    /// claims.
    Forbidden,
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

/// A wrapper for HTTP responses, rendering error bodies in the language of
/// the request.
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    pub fn json<T: Serialize>(data: T) -> Self {
        Self {
            http_response: HttpResponse::Ok().json(DataResponse::new(data)),
        }
    }

    pub fn ok() -> Self {
        Self {
            http_response: HttpResponse::Ok().json(DataResponse::<()> { data: None }),
        }
    }

    pub fn from_result<T: Serialize>(
        result: Result<T, ApiError>,
        i18n: &I18n,
        lang: &str,
        realm: &str,
    ) -> Self {
        match result {
            Ok(data) => Self::json(data),
            Err(err) => Self::from_error(err, i18n, lang, realm),
        }
    }

    pub fn from_error(err: ApiError, i18n: &I18n, lang: &str, realm: &str) -> Self {
        match err {
            ApiError::Unauthenticated => {
                let msg = i18n.localize(lang, MSG_UNAUTHORIZED, &[], Some("Unauthorized"));
                let mut resp = Self::error(StatusCode::UNAUTHORIZED, CODE_UNAUTHORIZED, msg);
                let challenge = format!("JWT realm={realm}");
                if let Ok(value) = HeaderValue::from_str(&challenge) {
                    resp.http_response
                        .headers_mut()
                        .insert(header::WWW_AUTHENTICATE, value);
                }
                resp
            }
            ApiError::Forbidden => {
                let msg = i18n.localize(
                    lang,
                    MSG_FORBIDDEN,
                    &[],
                    Some("You don't have permission to access this resource"),
                );
                Self::error(StatusCode::FORBIDDEN, CODE_FORBIDDEN, msg)
            }
            ApiError::Service(ServiceError::Validation(errs)) => {
                let msg = i18n.localize(lang, MSG_VALIDATION, &[], Some("Invalid input data"));
                let fields = Self::error_fields(&errs, i18n, lang);
                Self::error_with_fields(StatusCode::BAD_REQUEST, CODE_VALIDATION, msg, fields)
            }
            ApiError::Service(ServiceError::NotFound(id)) => {
                let id = id.to_string();
                let msg = i18n.localize(
                    lang,
                    MSG_NOT_FOUND,
                    &[("Id", &id)],
                    Some("Record {{.Id}} not found"),
                );
                Self::error(StatusCode::NOT_FOUND, CODE_NOT_FOUND, msg)
            }
            ApiError::Service(ServiceError::BadRequest(reason)) => {
                let msg = i18n.localize(
                    lang,
                    MSG_BAD_REQUEST,
                    &[("Reason", &reason)],
                    Some("Bad request: {{.Reason}}"),
                );
                Self::error(StatusCode::BAD_REQUEST, CODE_BAD_REQUEST, msg)
            }
            ApiError::Service(ServiceError::Database(e)) => {
                error!("Database error: {e:#}");
                let msg = i18n.localize(lang, MSG_INTERNAL, &[], Some("Internal server error"));
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, CODE_INTERNAL, msg)
            }
        }
    }

    pub fn error(status: StatusCode, code: &str, msg: String) -> Self {
        Self::error_with_fields(status, code, msg, vec![])
    }

    fn error_with_fields(
        status: StatusCode,
        code: &str,
        msg: String,
        fields: Vec<ErrorField>,
    ) -> Self {
        let resp = ErrorResponse {
            error_code: code.to_string(),
            error_msg: msg,
            error_fields: fields,
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }

    /// One entry per failed field rule, sorted by field name. Messages come
    /// from `validation.<code>` with `Field`, `Min` and `Max` as template
    /// data.
    fn error_fields(errs: &ValidationErrors, i18n: &I18n, lang: &str) -> Vec<ErrorField> {
        let mut fields = Vec::new();
        for (field, kind) in errs.errors().iter() {
            let ValidationErrorsKind::Field(items) = kind else {
                continue;
            };
            let field = field.to_string();
            for item in items.iter() {
                let param = |name: &str| {
                    item.params
                        .get(name)
                        .map(|value| value.to_string())
                        .unwrap_or_default()
                };
                let min = param("min");
                let max = param("max");
                let id = format!("validation.{}", item.code);
                let default_msg = match &item.message {
                    Some(msg) => msg.to_string(),
                    None => String::from("{{.Field}} is invalid"),
                };
                let msg = i18n.localize(
                    lang,
                    &id,
                    &[("Field", &field), ("Min", &min), ("Max", &max)],
                    Some(&default_msg),
                );
                fields.push(ErrorField {
                    field: field.clone(),
                    tag: item.code.to_string(),
                    error_msg: msg,
                });
            }
        }
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        fields
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use actix_web::body::to_bytes;
    use validator::Validate;

    use crate::types::curd::CurdRequest;

    use super::*;

    fn i18n() -> I18n {
        let mut vi = HashMap::new();
        vi.insert(
            String::from("validation.length"),
            String::from("{{.Field}} phải dài từ {{.Min}} đến {{.Max}} ký tự"),
        );
        let mut bundles = HashMap::new();
        bundles.insert(String::from("en"), HashMap::new());
        bundles.insert(String::from("vi"), vi);
        I18n::new(bundles, String::from("en"))
    }

    async fn body_of(resp: Response) -> (StatusCode, HttpResponse<()>, ErrorResponse) {
        let resp: HttpResponse = resp.into();
        let status = resp.status();
        let (head, body) = resp.into_parts();
        let bytes = to_bytes(body).await.unwrap();
        (status, head, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_unauthenticated() {
        let resp = Response::from_error(ApiError::Unauthenticated, &i18n(), "en", "curd");
        let (status, head, body) = body_of(resp).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            head.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "JWT realm=curd"
        );
        assert_eq!(body.error_code, CODE_UNAUTHORIZED);
        assert_eq!(body.error_msg, "Unauthorized");
    }

    #[actix_web::test]
    async fn test_validation_fields() {
        let errs = CurdRequest::default().validate().unwrap_err();
        let err = ApiError::Service(ServiceError::Validation(errs));
        let (status, _, body) = body_of(Response::from_error(err, &i18n(), "vi", "curd")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error_code, CODE_VALIDATION);
        assert_eq!(body.error_fields.len(), 1);
        assert_eq!(body.error_fields[0].field, "name");
        assert_eq!(body.error_fields[0].tag, "length");
        assert_eq!(
            body.error_fields[0].error_msg,
            "name phải dài từ 1 đến 100 ký tự"
        );
    }

    #[actix_web::test]
    async fn test_not_found() {
        let err = ApiError::Service(ServiceError::NotFound(7));
        let (status, _, body) = body_of(Response::from_error(err, &i18n(), "en", "curd")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error_msg, "Record 7 not found");
        assert!(body.error_fields.is_empty());
    }
}
