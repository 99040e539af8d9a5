//! Authorization gate and bearer-token handling.
//!
//! One shared gate decides, before dispatch, whether a request may proceed:
//! paths under a protected prefix require an `Authorization: Bearer <token>`
//! header carrying an HS256-signed JWT with the configured issuer. The gate
//! produces the 401/403 response itself; handlers never re-check credentials.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::http::envelope::ApiEnvelope;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::AppContext;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

/// Outcome of the authorization gate. `Denied` already carries the complete
/// 401/403 response; the dispatcher just returns it.
pub enum AuthDecision {
    Allowed,
    Denied(Response),
}

/// Pluggable credential check used by the login route. Real verification is
/// an external concern; the shipped implementation accepts everything.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

/// Stub authenticator that accepts any username/password pair.
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn authenticate(&self, _username: &str, _password: &str) -> bool {
        true
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.header("Authorization")?.strip_prefix("Bearer ")
}

/// Mints an HS256 token for the given subject with the configured issuer and
/// lifetime.
pub fn mint_token(username: &str, cfg: &Config) -> anyhow::Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock before Unix epoch")?
        .as_secs();

    let claims = Claims {
        iss: cfg.jwt_issuer.clone(),
        sub: username.to_string(),
        iat: now,
        exp: now + cfg.jwt_expiration,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )
    .context("Failed to sign token")
}

/// Verifies signature, issuer, and expiry. All failure sub-cases collapse to
/// `false`; callers do not distinguish them.
pub fn verify_token(token: &str, secret: &str, issuer: &str) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.leeway = 0;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(_) => true,
        Err(e) => {
            warn!("JWT verification failed: {}", e);
            false
        }
    }
}

/// The authorization gate, invoked once per request before route dispatch.
pub fn authorize(req: &Request, ctx: &AppContext) -> AuthDecision {
    if !ctx.config.is_protected(&req.path) {
        return AuthDecision::Allowed;
    }

    let token = match extract_bearer_token(req) {
        Some(token) => token,
        None => {
            warn!("Missing or malformed Authorization header.");
            let response = ApiEnvelope::error(
                401,
                "Missing or malformed Authorization header.",
                "Unauthorized",
            )
            .into_response(StatusCode::Unauthorized, req.keep_alive());
            return AuthDecision::Denied(response);
        }
    };

    if !verify_token(token, &ctx.config.jwt_secret, &ctx.config.jwt_issuer) {
        let response = ApiEnvelope::error(403, "Invalid or expired token.", "Forbidden")
            .into_response(StatusCode::Forbidden, req.keep_alive());
        return AuthDecision::Denied(response);
    }

    info!("JWT verification successful for request to {}", req.path);
    AuthDecision::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            doc_root: "/var/www/".to_string(),
            threads: 1,
            data_dir: "data".to_string(),
            jwt_secret: "unit-test-secret".to_string(),
            jwt_issuer: "tickerd".to_string(),
            jwt_expiration: 3600,
            protected_routes: vec!["/api".to_string(), "/db".to_string()],
        }
    }

    #[test]
    fn mint_and_verify_round_trip() {
        let cfg = test_config();
        let token = mint_token("alice", &cfg).unwrap();
        assert!(verify_token(&token, &cfg.jwt_secret, &cfg.jwt_issuer));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let cfg = test_config();
        let token = mint_token("alice", &cfg).unwrap();
        assert!(!verify_token(&token, "a-different-secret", &cfg.jwt_issuer));
    }

    #[test]
    fn wrong_issuer_fails_verification() {
        let cfg = test_config();
        let token = mint_token("alice", &cfg).unwrap();
        assert!(!verify_token(&token, &cfg.jwt_secret, "someone-else"));
    }

    #[test]
    fn garbage_token_fails_verification() {
        let cfg = test_config();
        assert!(!verify_token("not.a.jwt", &cfg.jwt_secret, &cfg.jwt_issuer));
    }

    #[test]
    fn expired_token_fails_verification() {
        let cfg = test_config();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            iss: cfg.jwt_issuer.clone(),
            sub: "alice".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        )
        .unwrap();
        assert!(!verify_token(&token, &cfg.jwt_secret, &cfg.jwt_issuer));
    }

    #[test]
    fn allow_all_accepts_anything() {
        assert!(AllowAll.authenticate("anyone", "anything"));
    }
}
