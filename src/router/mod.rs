//! Route table and request dispatch.
//!
//! The table is built once at startup and is read-only afterwards: an ordered
//! list of (pattern, method, handler) entries, evaluated in registration
//! order with first match winning. Dispatch applies the method gate, target
//! validation, and the authorization gate before any handler runs; requests
//! that match no route fall through to static-file resolution.

use std::future::Future;
use std::pin::Pin;

use tracing::{info, warn};

use crate::auth::{self, AuthDecision};
use crate::handlers;
use crate::http::envelope::ApiEnvelope;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::server::AppContext;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// Route handlers consume the request and the shared services, and produce
/// exactly one response.
pub type HandlerFn = for<'a> fn(&'a Request, &'a AppContext) -> HandlerFuture<'a>;

fn hello_route<'a>(req: &'a Request, ctx: &'a AppContext) -> HandlerFuture<'a> {
    Box::pin(handlers::hello::handle(req, ctx))
}

fn login_route<'a>(req: &'a Request, ctx: &'a AppContext) -> HandlerFuture<'a> {
    Box::pin(handlers::login::handle(req, ctx))
}

fn db_route<'a>(req: &'a Request, ctx: &'a AppContext) -> HandlerFuture<'a> {
    Box::pin(handlers::db::handle(req, ctx))
}

fn loadcsv_route<'a>(req: &'a Request, ctx: &'a AppContext) -> HandlerFuture<'a> {
    Box::pin(handlers::loadcsv::handle(req, ctx))
}

#[derive(Debug, Clone, Copy)]
pub enum RoutePattern {
    Exact(&'static str),
    Prefix(&'static str),
}

impl RoutePattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(target) => path == *target,
            RoutePattern::Prefix(prefix) => path.starts_with(prefix),
        }
    }
}

pub struct Route {
    pub pattern: RoutePattern,
    pub methods: &'static [Method],
    pub handler: HandlerFn,
}

pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        let routes = vec![
            Route {
                pattern: RoutePattern::Exact("/hello"),
                methods: &[Method::GET, Method::HEAD],
                handler: hello_route,
            },
            Route {
                pattern: RoutePattern::Exact("/login"),
                methods: &[Method::POST],
                handler: login_route,
            },
            Route {
                pattern: RoutePattern::Exact("/db"),
                methods: &[Method::GET, Method::HEAD],
                handler: db_route,
            },
            Route {
                pattern: RoutePattern::Prefix("/loadcsv/"),
                methods: &[Method::GET, Method::HEAD],
                handler: loadcsv_route,
            },
        ];

        Self { routes }
    }

    /// Produces exactly one response for the request.
    pub async fn dispatch(&self, req: Request, ctx: &AppContext) -> Response {
        info!("Received {:?} request for {}", req.method, req.path);

        // Methods other than GET/HEAD are only allowed when a route
        // explicitly registers them for this path.
        let method_allowed = matches!(req.method, Method::GET | Method::HEAD)
            || self
                .routes
                .iter()
                .any(|r| r.methods.contains(&req.method) && r.pattern.matches(&req.path));

        if !method_allowed {
            warn!("Unsupported HTTP method: {:?}", req.method);
            return ApiEnvelope::error(400, "Unsupported HTTP method", "Bad Request")
                .into_response(StatusCode::BadRequest, req.keep_alive());
        }

        // Validate the target before auth or any filesystem access.
        if req.path.is_empty() || !req.path.starts_with('/') || req.path.contains("..") {
            warn!("Illegal request-target: {}", req.path);
            return ApiEnvelope::error(400, "Illegal request-target", "Bad Request")
                .into_response(StatusCode::BadRequest, req.keep_alive());
        }

        if let AuthDecision::Denied(response) = auth::authorize(&req, ctx) {
            return response;
        }

        for route in &self.routes {
            if route.methods.contains(&req.method) && route.pattern.matches(&req.path) {
                return (route.handler)(&req, ctx).await;
            }
        }

        // No route matched: resolve against the document root.
        handlers::static_files::serve(&req, ctx).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
