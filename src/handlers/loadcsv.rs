use std::path::PathBuf;

use tracing::{error, info};

use crate::data::load_quotes;
use crate::http::envelope::ApiEnvelope;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::server::AppContext;

pub async fn handle(req: &Request, ctx: &AppContext) -> Response {
    let file_name = req.path.strip_prefix("/loadcsv/").unwrap_or_default();
    info!("Handling /loadcsv route for file: {}", file_name);
    let keep_alive = req.keep_alive();

    let path = PathBuf::from(&ctx.config.data_dir).join(format!("{}.csv", file_name));

    // The loader does synchronous file IO; run it on the blocking pool so it
    // never occupies a session worker.
    let loaded = tokio::task::spawn_blocking(move || load_quotes(&path)).await;

    match loaded {
        Ok(Ok(quotes)) => {
            let data = match serde_json::to_value(&quotes) {
                Ok(v) => v,
                Err(e) => {
                    error!("Failed to serialize quotes: {}", e);
                    return plain_internal_error(keep_alive);
                }
            };

            let response = ApiEnvelope::success(200, data)
                .into_response(StatusCode::Ok, keep_alive);
            info!("/loadcsv response sent");
            response
        }
        Ok(Err(e)) => {
            error!("Error handling /loadcsv route: {}", e);
            plain_internal_error(keep_alive)
        }
        Err(e) => {
            error!("CSV load task failed: {}", e);
            plain_internal_error(keep_alive)
        }
    }
}

// This route has always reported failure as a plain-text body rather than
// the JSON envelope used elsewhere. Kept as-is for client compatibility.
fn plain_internal_error(keep_alive: bool) -> Response {
    ResponseBuilder::new(StatusCode::InternalServerError)
        .header("Content-Type", "text/plain")
        .body(b"Internal Server Error".to_vec())
        .keep_alive(keep_alive)
        .build()
}
