use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use crate::auth::{self, Claims};
use crate::routes::AppState;

/// Cookie the auth collaborator stores the session token in.
pub const SESSION_COOKIE: &str = "token";

pub const LOGIN_PATH: &str = "/auth/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Identity headers forwarded to downstream handlers for authenticated API
/// requests. Header names are lowercase on the wire.
pub const USER_ID_HEADER: &str = "userid";
pub const USER_EMAIL_HEADER: &str = "useremail";
pub const USERNAME_HEADER: &str = "username";

/// How the guard treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Login and registration pages, reachable without a session.
    Public,
    /// Auth API endpoints (login, register, logout), exempt from the guard.
    AuthApi,
    /// JSON API endpoints that need a verified identity forwarded.
    ProtectedApi,
    /// Application pages that need a valid session.
    ProtectedPage,
}

pub fn classify(path: &str) -> RouteClass {
    if path == "/auth/login" || path == "/auth/register" {
        RouteClass::Public
    } else if path.starts_with("/api/auth") {
        RouteClass::AuthApi
    } else if path.starts_with("/api/") {
        RouteClass::ProtectedApi
    } else {
        RouteClass::ProtectedPage
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Let the request through untouched.
    Pass,
    /// Protected API request with a verified session: forward the identity.
    Forward(Claims),
    RedirectToLogin,
    RedirectToDashboard,
}

/// The route-guard state table. Pure: path and token in, decision out.
/// Verification failures never escape as errors; an unverifiable token is
/// simply the token-invalid state.
pub fn evaluate(path: &str, token: Option<&str>, secret: &[u8]) -> GuardDecision {
    match (classify(path), token) {
        // Auth endpoints manage sessions themselves.
        (RouteClass::AuthApi, _) => GuardDecision::Pass,
        (RouteClass::Public, None) => GuardDecision::Pass,
        // An already-authenticated user skips the login/register pages; an
        // invalid token is treated as anonymous.
        (RouteClass::Public, Some(token)) => match auth::verify_token(token, secret) {
            Ok(_) => GuardDecision::RedirectToDashboard,
            Err(_) => GuardDecision::Pass,
        },
        (RouteClass::ProtectedApi, None) | (RouteClass::ProtectedPage, None) => {
            GuardDecision::RedirectToLogin
        }
        (RouteClass::ProtectedApi, Some(token)) => match auth::verify_token(token, secret) {
            Ok(claims) => GuardDecision::Forward(claims),
            Err(_) => GuardDecision::RedirectToLogin,
        },
        (RouteClass::ProtectedPage, Some(token)) => match auth::verify_token(token, secret) {
            Ok(_) => GuardDecision::Pass,
            Err(_) => GuardDecision::RedirectToLogin,
        },
    }
}

/// Axum middleware wrapping every route: reads the session cookie, runs
/// the decision table, and either forwards the (identity-enriched) request
/// or answers with a redirect.
pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());

    match evaluate(&path, token.as_deref(), state.config.jwt_secret.as_bytes()) {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Forward(claims) => {
            debug!("forwarding authenticated request for user {}", claims.user_id);
            let headers = request.headers_mut();
            // Drop anything the client smuggled in under the identity names
            // before inserting the verified values.
            headers.remove(USER_ID_HEADER);
            headers.remove(USER_EMAIL_HEADER);
            headers.remove(USERNAME_HEADER);
            for (name, value) in [
                (USER_ID_HEADER, claims.user_id.as_str()),
                (USER_EMAIL_HEADER, claims.email.as_str()),
                (USERNAME_HEADER, claims.username.as_str()),
            ] {
                match HeaderValue::from_str(value) {
                    Ok(value) => {
                        headers.insert(name, value);
                    }
                    Err(_) => warn!("claim for {} is not a valid header value, skipping", name),
                }
            }
            next.run(request).await
        }
        GuardDecision::RedirectToLogin => Redirect::temporary(LOGIN_PATH).into_response(),
        GuardDecision::RedirectToDashboard => Redirect::temporary(DASHBOARD_PATH).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_tokens;
    use std::time::Duration;

    const SECRET: &[u8] = b"test-secret";

    fn valid_token() -> String {
        test_tokens::issue(SECRET, Duration::from_secs(3600), false)
    }

    fn expired_token() -> String {
        test_tokens::issue(SECRET, Duration::from_secs(3600), true)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("/auth/login"), RouteClass::Public);
        assert_eq!(classify("/auth/register"), RouteClass::Public);
        assert_eq!(classify("/api/auth/logout"), RouteClass::AuthApi);
        assert_eq!(classify("/api/transactions"), RouteClass::ProtectedApi);
        assert_eq!(classify("/api/analytics/monthly"), RouteClass::ProtectedApi);
        assert_eq!(classify("/dashboard"), RouteClass::ProtectedPage);
        assert_eq!(classify("/"), RouteClass::ProtectedPage);
        assert_eq!(classify("/budget"), RouteClass::ProtectedPage);
    }

    #[test]
    fn test_no_token_on_protected_routes_redirects_to_login() {
        assert_eq!(
            evaluate("/dashboard", None, SECRET),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            evaluate("/api/transactions", None, SECRET),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_no_token_on_public_routes_passes() {
        assert_eq!(evaluate("/auth/login", None, SECRET), GuardDecision::Pass);
        assert_eq!(evaluate("/auth/register", None, SECRET), GuardDecision::Pass);
    }

    #[test]
    fn test_valid_token_on_public_route_redirects_to_dashboard() {
        assert_eq!(
            evaluate("/auth/login", Some(&valid_token()), SECRET),
            GuardDecision::RedirectToDashboard
        );
    }

    #[test]
    fn test_invalid_token_on_public_route_is_anonymous() {
        assert_eq!(
            evaluate("/auth/login", Some("garbage"), SECRET),
            GuardDecision::Pass
        );
        assert_eq!(
            evaluate("/auth/login", Some(&expired_token()), SECRET),
            GuardDecision::Pass
        );
    }

    #[test]
    fn test_valid_token_on_api_route_forwards_claims() {
        match evaluate("/api/transactions", Some(&valid_token()), SECRET) {
            GuardDecision::Forward(claims) => {
                assert_eq!(claims.user_id, "user-42");
                assert_eq!(claims.email, "user@example.com");
                assert_eq!(claims.username, "tester");
            }
            other => panic!("expected Forward, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_token_on_page_passes_without_identity() {
        assert_eq!(
            evaluate("/dashboard", Some(&valid_token()), SECRET),
            GuardDecision::Pass
        );
    }

    #[test]
    fn test_invalid_token_on_protected_routes_redirects_to_login() {
        assert_eq!(
            evaluate("/dashboard", Some(&expired_token()), SECRET),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            evaluate("/api/budgets", Some("garbage"), SECRET),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_auth_api_routes_are_exempt() {
        assert_eq!(evaluate("/api/auth/logout", None, SECRET), GuardDecision::Pass);
        assert_eq!(
            evaluate("/api/auth/logout", Some("garbage"), SECRET),
            GuardDecision::Pass
        );
    }
}
