use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::auth;
use crate::handlers::bad_request;
use crate::http::envelope::ApiEnvelope;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::AppContext;

pub async fn handle(req: &Request, ctx: &AppContext) -> Response {
    info!("Handling /login route");
    let keep_alive = req.keep_alive();

    let body: Value = match serde_json::from_slice(&req.body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid JSON in /login request: {}", e);
            return bad_request(req, "Invalid JSON format.");
        }
    };

    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    let (username, password) = match (username, password) {
        (Some(u), Some(p)) => (u, p),
        _ => {
            warn!("Missing username or password in /login request");
            return bad_request(req, "Missing username or password.");
        }
    };

    if !ctx.authenticator.authenticate(username, password) {
        warn!("Authentication failed for user: {}", username);
        return ApiEnvelope::error(401, "Invalid credentials.", "Unauthorized")
            .into_response(StatusCode::Unauthorized, keep_alive);
    }

    match auth::mint_token(username, &ctx.config) {
        Ok(token) => {
            info!("JWT token created for user: {}", username);
            let response = ApiEnvelope::success(200, json!({ "token": token }))
                .into_response(StatusCode::Ok, keep_alive);
            info!("/login response sent");
            response
        }
        Err(e) => {
            error!("Token creation failed: {}", e);
            ApiEnvelope::internal_error("Token creation failed")
                .into_response(StatusCode::InternalServerError, keep_alive)
        }
    }
}
