pub mod curd;
pub mod healthz;
pub mod page;
pub mod response;
pub mod token;
