//! Route business logic. Each handler consumes a request plus the shared
//! services and produces exactly one response; none of them touch the socket.

pub mod db;
pub mod hello;
pub mod loadcsv;
pub mod login;
pub mod static_files;

use tracing::warn;

use crate::http::envelope::ApiEnvelope;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Standardized 400 response.
pub fn bad_request(req: &Request, why: &str) -> Response {
    warn!("Bad request: {}", why);
    ApiEnvelope::error(400, why, "Bad Request")
        .into_response(StatusCode::BadRequest, req.keep_alive())
}
