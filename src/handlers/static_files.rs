//! Static file resolution under the configured document root.

use std::io::ErrorKind;

use tracing::{error, info, warn};

use crate::http::envelope::ApiEnvelope;
use crate::http::mime::mime_type;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::server::AppContext;

/// Joins the document root and a request target, collapsing the duplicate
/// separator at the seam.
pub fn path_cat(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    let mut result = base.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    result.push_str(path);
    result
}

/// Serves the file at doc_root + target. The dispatcher has already rejected
/// traversal segments, so the joined path stays under the root.
pub async fn serve(req: &Request, ctx: &AppContext) -> Response {
    let keep_alive = req.keep_alive();

    let mut path = path_cat(&ctx.config.doc_root, &req.path);
    if req.path.ends_with('/') {
        path.push_str("index.html");
    }

    info!("Serving file: {}", path);

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("File not found: {}", path);
            return ApiEnvelope::not_found(&req.path)
                .into_response(StatusCode::NotFound, keep_alive);
        }
        Err(e) => {
            error!("Error opening file {}: {}", path, e);
            return ApiEnvelope::internal_error(e.to_string())
                .into_response(StatusCode::InternalServerError, keep_alive);
        }
    };

    let metadata = match file.metadata().await {
        Ok(m) => m,
        Err(e) => {
            error!("Error reading metadata for {}: {}", path, e);
            return ApiEnvelope::internal_error(e.to_string())
                .into_response(StatusCode::InternalServerError, keep_alive);
        }
    };

    if metadata.is_dir() {
        warn!("File not found: {}", path);
        return ApiEnvelope::not_found(&req.path)
            .into_response(StatusCode::NotFound, keep_alive);
    }

    let len = metadata.len();
    let content_type = mime_type(&path);

    if req.method == Method::HEAD {
        info!("HEAD response sent for {}", path);
        return ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .header("Content-Length", len.to_string())
            .keep_alive(keep_alive)
            .build();
    }

    info!("GET response sent for {}", path);
    ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", content_type)
        .file(file, len)
        .keep_alive(keep_alive)
        .build()
}
