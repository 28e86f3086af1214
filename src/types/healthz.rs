use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthzResponse {
    /// Server time, unix seconds.
    pub now: u64,
    pub time_zone: String,
    pub client_ip: Option<String>,
    pub version: Option<String>,
}
