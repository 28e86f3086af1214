mod cors;
mod db;
mod docs;
mod handlers;
mod i18n;
mod response;
mod service;

pub mod authn;
pub mod authz;
pub mod config;
pub mod factory;
pub mod restful;
