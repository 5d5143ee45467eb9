// Account handlers
// Login, logout and signup pages backed by server-side sessions

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tracing::{info, warn};

use super::{found, render};
use crate::{
    auth::{self, CurrentUser, SESSION_COOKIE},
    error::{AppError, AppResult},
    forms::{LoginForm, LoginFormData, SignupForm, SignupFormData},
    models::NewUser,
    state::AppState,
    templates::{LoggedOutTemplate, LoginTemplate, Nav, SignupTemplate},
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// GET /auth/login/
pub async fn login_form(
    CurrentUser(user): CurrentUser,
    Query(query): Query<LoginQuery>,
) -> AppResult<Response> {
    render(LoginTemplate {
        nav: Nav::for_user(user.as_ref()),
        form: LoginForm::new(query.next),
    })
}

/// Check credentials, open a session and follow `next`
/// POST /auth/login/
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(data): Form<LoginFormData>,
) -> AppResult<Response> {
    let mut form = LoginForm::bind(data);

    let Some((username, password)) = form.credentials() else {
        return render(LoginTemplate { nav: Nav::anonymous(), form });
    };

    let user = match state.repo().get_user_by_username(username).await {
        Ok(user) => Some(user),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };

    let authenticated = match user {
        Some(user) => {
            let password = password.to_string();
            let password_hash = user.password_hash.clone();
            let valid = tokio::task::spawn_blocking(move || {
                auth::verify_password(&password, &password_hash)
            })
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password check panicked: {}", e)))??;
            valid.then_some(user)
        }
        None => None,
    };

    let Some(user) = authenticated else {
        warn!("Failed login attempt for username: {}", form.username());
        form.reject();
        return render(LoginTemplate { nav: Nav::anonymous(), form });
    };

    let session = state.repo().create_session(user.id).await?;
    info!("User {} logged in", user.username);

    let target = if auth::is_safe_redirect(form.next()) {
        form.next().to_string()
    } else {
        "/".to_string()
    };

    Ok((jar.add(auth::session_cookie(session.token)), found(&target)).into_response())
}

/// Close the session, if any
/// GET|POST /auth/logout/
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    if let Some(token) = auth::session_token(&jar) {
        state.repo().delete_session(token).await?;
        info!("Session closed");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    let page = render(LoggedOutTemplate { nav: Nav::anonymous() })?;
    Ok((jar, page).into_response())
}

/// GET /auth/signup/
pub async fn signup_form(CurrentUser(user): CurrentUser) -> AppResult<Response> {
    render(SignupTemplate::new(Nav::for_user(user.as_ref()), SignupForm::new()))
}

/// Create an account and log straight in
/// POST /auth/signup/
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(data): Form<SignupFormData>,
) -> AppResult<Response> {
    let mut form = SignupForm::bind(data);

    let Some(input) = form.cleaned().cloned() else {
        return render(SignupTemplate::new(Nav::anonymous(), form));
    };

    let password = input.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing panicked: {}", e)))??;

    let new_user = NewUser::new(input.username, password_hash)
        .with_name(input.first_name, input.last_name);

    let user = match state.repo().create_user(new_user).await {
        Ok(user) => user,
        Err(e) if e.is_conflict() => {
            form.reject_username();
            return render(SignupTemplate::new(Nav::anonymous(), form));
        }
        Err(e) => return Err(e),
    };

    let session = state.repo().create_session(user.id).await?;
    info!("Signed up new user {}", user.username);

    Ok((jar.add(auth::session_cookie(session.token)), found("/")).into_response())
}
