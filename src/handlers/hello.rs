use serde_json::json;
use tracing::info;

use crate::http::envelope::ApiEnvelope;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::AppContext;

pub async fn handle(req: &Request, _ctx: &AppContext) -> Response {
    info!("Handling /hello route");

    let data = json!({ "message": "Hello world why" });

    let response = ApiEnvelope::success(200, data)
        .into_response(StatusCode::Ok, req.keep_alive());

    info!("/hello response sent");
    response
}
