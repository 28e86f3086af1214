pub mod api;
pub mod curd;
pub mod healthz;
