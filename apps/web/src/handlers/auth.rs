//! Account handlers - signup, login and logout.

use actix_web::{HttpResponse, http::header, web};
use std::sync::Arc;

use yatube_core::domain::User;
use yatube_core::error::RepoError;
use yatube_core::ports::{PasswordHasher, SessionTokens};
use yatube_shared::FormErrors;
use yatube_shared::dto::{LoginForm, NextQuery, SignupForm};

use crate::config::SessionConfig;
use crate::middleware::auth::{
    OptionalIdentity, expired_session_cookie, safe_next, session_cookie,
};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{self, LoginTemplate, SignupTemplate};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Issue a session cookie for `user` and redirect to `location`.
fn start_session(
    tokens: &dyn SessionTokens,
    session: &SessionConfig,
    user: &User,
    location: &str,
) -> AppResult<HttpResponse> {
    let token = tokens
        .issue(user)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(session_cookie(session, token, tokens.lifetime()))
        .finish())
}

/// GET /auth/signup/
pub async fn signup_form(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    views::render(SignupTemplate::new(
        viewer.username(),
        &SignupForm::default(),
        FormErrors::new(),
    ))
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    tokens: web::Data<Arc<dyn SessionTokens>>,
    passwords: web::Data<Arc<dyn PasswordHasher>>,
    session: web::Data<SessionConfig>,
    viewer: OptionalIdentity,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => return views::render(SignupTemplate::new(viewer.username(), &form, errors)),
    };

    let taken = || {
        let mut errors = FormErrors::new();
        errors.add("username", USERNAME_TAKEN);
        views::render(SignupTemplate::new(viewer.username(), &form, errors))
    };

    if state.users.find_by_username(&input.username).await?.is_some() {
        return taken();
    }

    let password_hash = passwords
        .hash(&input.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = match state
        .users
        .insert(User::new(input.username, input.email, password_hash))
        .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same name.
        Err(RepoError::Conflict(_)) => return taken(),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    start_session(tokens.get_ref().as_ref(), &session, &user, "/")
}

/// GET /auth/login/
pub async fn login_form(
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    let form = LoginForm {
        next: query.into_inner().next.unwrap_or_default(),
        ..LoginForm::default()
    };

    views::render(LoginTemplate::new(viewer.username(), &form, FormErrors::new()))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    tokens: web::Data<Arc<dyn SessionTokens>>,
    passwords: web::Data<Arc<dyn PasswordHasher>>,
    session: web::Data<SessionConfig>,
    viewer: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    if let Err(errors) = form.clean() {
        return views::render(LoginTemplate::new(viewer.username(), &form, errors));
    }

    let user = state.users.find_by_username(form.username.trim()).await?;

    let verified = match &user {
        Some(user) => passwords
            .verify(&form.password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        None => false,
    };

    match user {
        Some(user) if verified => {
            tracing::info!(user_id = %user.id, "User logged in");
            start_session(
                tokens.get_ref().as_ref(),
                &session,
                &user,
                safe_next(&form.next),
            )
        }
        _ => {
            tracing::info!(username = %form.username.trim(), "Login failed");
            views::render(LoginTemplate::new(
                viewer.username(),
                &form,
                LoginForm::invalid_credentials(),
            ))
        }
    }
}

/// POST /auth/logout/
pub async fn logout(session: web::Data<SessionConfig>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(expired_session_cookie(&session))
        .finish()
}
