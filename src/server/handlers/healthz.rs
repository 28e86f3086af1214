use actix_web::HttpRequest;

use crate::server::response::Response;
use crate::time::{current_timestamp, local_time_zone};
use crate::types::healthz::HealthzResponse;

#[derive(Default)]
pub struct HealthzHandler;

impl HealthzHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, req: &HttpRequest) -> Response {
        let response = HealthzResponse {
            now: current_timestamp(),
            time_zone: local_time_zone(),
            client_ip: req.connection_info().peer_addr().map(|a| a.to_string()),
            version: Some(env!("CURD_VERSION").to_string()),
        };
        Response::json(response)
    }
}
