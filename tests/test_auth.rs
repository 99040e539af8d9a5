//! Authorization gate properties.

use std::sync::Arc;

use tickerd::auth::{self, AllowAll, AuthDecision};
use tickerd::config::Config;
use tickerd::data::MemoryDataSource;
use tickerd::http::request::{Method, Request, RequestBuilder};
use tickerd::http::response::StatusCode;
use tickerd::server::AppContext;

const SECRET: &str = "auth-test-secret";
const ISSUER: &str = "tickerd-tests";

fn test_ctx() -> AppContext {
    let config = Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        doc_root: "/var/www/".to_string(),
        threads: 1,
        data_dir: "data".to_string(),
        jwt_secret: SECRET.to_string(),
        jwt_issuer: ISSUER.to_string(),
        jwt_expiration: 3600,
        protected_routes: vec![
            "/api".to_string(),
            "/db".to_string(),
            "/loadcsv".to_string(),
        ],
    };
    AppContext::new(config, Arc::new(MemoryDataSource::default()), Arc::new(AllowAll))
}

fn get(path: &str) -> Request {
    RequestBuilder::new()
        .method(Method::GET)
        .path(path)
        .build()
        .unwrap()
}

fn get_with_auth(path: &str, value: &str) -> Request {
    RequestBuilder::new()
        .method(Method::GET)
        .path(path)
        .header("Authorization", value)
        .build()
        .unwrap()
}

#[test]
fn test_unprotected_path_is_always_allowed() {
    let ctx = test_ctx();

    assert!(matches!(
        auth::authorize(&get("/hello"), &ctx),
        AuthDecision::Allowed
    ));
    // Even with a garbage credential attached
    assert!(matches!(
        auth::authorize(&get_with_auth("/hello", "Bearer garbage"), &ctx),
        AuthDecision::Allowed
    ));
}

#[test]
fn test_protected_path_without_header_is_401() {
    let ctx = test_ctx();

    let AuthDecision::Denied(response) = auth::authorize(&get("/db"), &ctx) else {
        panic!("expected denial");
    };
    assert_eq!(response.status, StatusCode::Unauthorized);
}

#[test]
fn test_protected_path_with_malformed_header_is_401() {
    let ctx = test_ctx();

    // Wrong scheme prefix counts as malformed, not invalid
    let req = get_with_auth("/db", "Basic dXNlcjpwYXNz");
    let AuthDecision::Denied(response) = auth::authorize(&req, &ctx) else {
        panic!("expected denial");
    };
    assert_eq!(response.status, StatusCode::Unauthorized);
}

#[test]
fn test_protected_path_with_invalid_token_is_403() {
    let ctx = test_ctx();

    let req = get_with_auth("/db", "Bearer not.a.token");
    let AuthDecision::Denied(response) = auth::authorize(&req, &ctx) else {
        panic!("expected denial");
    };
    assert_eq!(response.status, StatusCode::Forbidden);
}

#[test]
fn test_token_signed_with_other_secret_is_403() {
    let ctx = test_ctx();

    let mut other = ctx.config.clone();
    other.jwt_secret = "some-other-secret".to_string();
    let token = auth::mint_token("mallory", &other).unwrap();

    let req = get_with_auth("/db", &format!("Bearer {}", token));
    let AuthDecision::Denied(response) = auth::authorize(&req, &ctx) else {
        panic!("expected denial");
    };
    assert_eq!(response.status, StatusCode::Forbidden);
}

#[test]
fn test_token_with_mismatched_issuer_is_403() {
    let ctx = test_ctx();

    let mut other = ctx.config.clone();
    other.jwt_issuer = "someone-else".to_string();
    let token = auth::mint_token("alice", &other).unwrap();

    let req = get_with_auth("/db", &format!("Bearer {}", token));
    let AuthDecision::Denied(response) = auth::authorize(&req, &ctx) else {
        panic!("expected denial");
    };
    assert_eq!(response.status, StatusCode::Forbidden);
}

#[test]
fn test_valid_token_is_allowed() {
    let ctx = test_ctx();

    let token = auth::mint_token("alice", &ctx.config).unwrap();
    let req = get_with_auth("/db", &format!("Bearer {}", token));

    assert!(matches!(auth::authorize(&req, &ctx), AuthDecision::Allowed));
}

#[test]
fn test_denied_response_keeps_connection_alive() {
    // Auth failures answer the client but do not tear down the transport
    let ctx = test_ctx();

    let AuthDecision::Denied(response) = auth::authorize(&get("/db"), &ctx) else {
        panic!("expected denial");
    };
    assert!(response.keep_alive);
}

#[test]
fn test_bearer_extraction() {
    let req = get_with_auth("/db", "Bearer abc.def.ghi");
    assert_eq!(auth::extract_bearer_token(&req), Some("abc.def.ghi"));

    let req = get_with_auth("/db", "bearer abc.def.ghi");
    assert_eq!(auth::extract_bearer_token(&req), None);

    let req = get("/db");
    assert_eq!(auth::extract_bearer_token(&req), None);
}
