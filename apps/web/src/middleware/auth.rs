//! Session authentication extractors and cookie helpers.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use chrono::TimeDelta;
use yatube_core::ports::{AuthError, SessionClaims, SessionTokens};

use crate::config::SessionConfig;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Authenticated user identity extractor.
///
/// Taking an `Identity` argument makes a handler login-only: requests
/// without a valid session cookie never reach it and are redirected to
/// the login page instead.
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Authentication failure; responds with a redirect to the login page.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct AuthenticationError {
    pub reason: AuthError,
    /// Path and query to come back to after logging in.
    pub next: String,
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, login_url(&self.next)))
            .finish()
    }
}

/// Login URL carrying `next` in its query string.
pub fn login_url(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{LOGIN_PATH}?{query}"),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

/// Validate the session cookie against the configured token service.
fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let tokens = req
        .app_data::<web::Data<Arc<dyn SessionTokens>>>()
        .ok_or_else(|| {
            tracing::error!("SessionTokens not registered as app data");
            AuthError::BadToken("server misconfigured".to_string())
        })?;

    let cookie_name = req
        .app_data::<web::Data<SessionConfig>>()
        .map(|session| session.cookie_name.clone())
        .unwrap_or_else(|| SessionConfig::default().cookie_name);

    let cookie = req.cookie(&cookie_name).ok_or(AuthError::NoSession)?;

    tokens.verify(cookie.value()).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|reason| {
            let next = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string());
            tracing::debug!(%reason, %next, "Unauthenticated request redirected to login");
            AuthenticationError { reason, next }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    /// Username shown in the navigation bar.
    pub fn username(&self) -> Option<String> {
        self.0.as_ref().map(|identity| identity.username.clone())
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(config: &SessionConfig, token: String, lifetime: TimeDelta) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(lifetime.num_seconds()))
        .finish()
}

/// Cookie that makes the browser drop the session.
pub fn expired_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

/// Accept `next` only when it is a local absolute path.
pub fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}
