//! HTTP interface (warp).

pub mod dto;
pub mod rejection;
pub mod routes;

pub use routes::{AppState, api_routes, log_request};
