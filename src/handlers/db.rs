use serde_json::Value;
use tracing::{error, info};

use crate::http::envelope::ApiEnvelope;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::AppContext;

pub async fn handle(req: &Request, ctx: &AppContext) -> Response {
    info!("Handling /db route");
    let keep_alive = req.keep_alive();

    match ctx.data.fetch_all() {
        Ok(rows) => {
            info!("Data source returned {} records", rows.len());
            let response = ApiEnvelope::success(200, Value::Array(rows))
                .into_response(StatusCode::Ok, keep_alive);
            info!("/db response sent");
            response
        }
        Err(e) => {
            error!("Data source error: {}", e);
            ApiEnvelope::internal_error(e.to_string())
                .into_response(StatusCode::InternalServerError, keep_alive)
        }
    }
}
