use anyhow::Context;
use tracing::warn;

/// Process-wide configuration, loaded once at startup from environment
/// variables and passed by shared reference into the listener and handlers.
#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub doc_root: String,
    pub threads: usize,
    pub data_dir: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    /// Path prefixes that require a valid bearer token.
    pub protected_routes: Vec<String>,
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("Invalid {} value: {}. Using default.", var, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .context("Required environment variable JWT_SECRET is missing")?;

        Ok(Self {
            server_host: env_or("SERVER_HOST", "0.0.0.0"),
            server_port: env_parse("SERVER_PORT", 8080),
            doc_root: env_or("DOC_ROOT", "/var/www/"),
            threads: env_parse("THREADS", 1),
            data_dir: env_or("DATA_DIR", "data"),
            jwt_secret,
            jwt_issuer: env_or("JWT_ISSUER", "tickerd"),
            jwt_expiration: env_parse("JWT_EXPIRATION", 3600),
            protected_routes: vec![
                "/api".to_string(),
                "/db".to_string(),
                "/loadcsv".to_string(),
            ],
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Whether a request target falls under one of the protected prefixes.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_routes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}
