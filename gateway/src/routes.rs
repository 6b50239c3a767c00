use axum::{
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use shared::User;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::GatewayConfig;
use crate::guard;

/// Application state shared across handlers and the guard middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
}

/// Assemble the full router: the gateway's own token-consumption endpoints
/// under /api, the compiled frontend as the fallback, and the route guard
/// wrapped around all of it. Every other /api endpoint lives in the
/// backend service.
pub fn build_router(config: GatewayConfig) -> Router {
    let state = AppState {
        config: config.clone(),
    };

    let api_routes = Router::new()
        .route("/user/profile", get(user_profile))
        .route("/auth/logout", post(logout));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(config.static_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .with_state(state)
}

/// GET /api/user/profile
///
/// The guard has already verified the session and stamped the identity
/// headers; this handler just echoes them back as the profile.
async fn user_profile(headers: HeaderMap) -> impl IntoResponse {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    let id = read(guard::USER_ID_HEADER);
    if id.is_empty() {
        // Only reachable if the guard was bypassed; report it as a missing
        // session so the client redirects to login.
        return (StatusCode::UNAUTHORIZED, "Missing session identity").into_response();
    }

    let user = User {
        id,
        username: read(guard::USERNAME_HEADER),
        email: read(guard::USER_EMAIL_HEADER),
    };
    (StatusCode::OK, Json(user)).into_response()
}

/// POST /api/auth/logout
///
/// Consumes the session by expiring the token cookie. Issuing tokens is
/// the auth collaborator's job; ending a session is ours.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    info!("POST /api/auth/logout");
    let removal = Cookie::build((guard::SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    (jar.remove(removal), StatusCode::OK)
}
