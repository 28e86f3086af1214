use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CODE_UNAUTHORIZED: &str = "UNAUTHORIZED";
pub const CODE_FORBIDDEN: &str = "FORBIDDEN";
pub const CODE_VALIDATION: &str = "VALIDATION_ERROR";
pub const CODE_BAD_REQUEST: &str = "BAD_REQUEST";
pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
pub const CODE_INTERNAL: &str = "INTERNAL_ERROR";

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Response<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Response<T> {
    pub fn new(data: T) -> Self {
        Self { data: Some(data) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "NOT_FOUND")]
    pub error_code: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_msg: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_fields: Vec<ErrorField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ErrorField {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_msg: String,
}
