//! Server runtime: shared application context and the accepting listener.

pub mod listener;

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::data::source::DataSource;
use crate::router::Router;

/// Read-only services shared by every connection: configuration, the route
/// table, and the external collaborators. Constructed once at startup and
/// threaded through by `Arc`; all fields are write-once so concurrent reads
/// need no locking.
pub struct AppContext {
    pub config: Config,
    pub router: Router,
    pub data: Arc<dyn DataSource>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppContext {
    pub fn new(
        config: Config,
        data: Arc<dyn DataSource>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            router: Router::new(),
            data,
            authenticator,
        }
    }
}
