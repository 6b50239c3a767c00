use std::env;
use std::path::PathBuf;

/// Development fallback, matching what the auth collaborator signs with
/// when no secret is configured.
const FALLBACK_SECRET: &str = "fallback-secret-key";

/// Gateway configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    /// Shared secret the session tokens are signed with.
    pub jwt_secret: String,
    /// Compiled frontend assets served behind the guard.
    pub static_dir: PathBuf,
    /// Origin of the dev frontend server allowed through CORS.
    pub frontend_dev_origin: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| FALLBACK_SECRET.to_string()),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("../frontend/dist")),
            frontend_dev_origin: env::var("FRONTEND_DEV_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }

    pub fn using_fallback_secret(&self) -> bool {
        self.jwt_secret == FALLBACK_SECRET
    }
}
