use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub user_id: Value,
    pub token: String,

    /// Unix seconds after which the token is rejected.
    pub expire_at: u64,
}
