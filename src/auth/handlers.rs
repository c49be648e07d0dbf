use axum::{
    extract::{FromRef, Path, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{
            ForgotPasswordForm, ForgotPasswordResponse, LoginForm, PublicUser, RegisterForm,
            ResetPasswordForm, ResetPasswordResponse, SessionStatus,
        },
        extractors::{AuthUser, MaybeAuthUser},
        service::{self, is_valid_email},
        session::SessionCodec,
    },
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout).post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", post(reset_password))
        .route("/session", get(session_status))
        .route("/me", get(me))
}

/// Destination after login/registration. Anything that is not a local path
/// falls back to the dashboard.
fn sanitize_redirect(candidate: Option<&str>) -> String {
    match candidate {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/dashboard".to_string(),
    }
}

#[instrument(skip(state, jar, form))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(mut form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    form.email = form.email.trim().to_lowercase();

    if !is_valid_email(&form.email) {
        warn!("register with invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if form.password.len() < 8 {
        warn!("register password too short");
        return Err(AppError::Validation("Password too short".into()));
    }
    if form.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }

    let user =
        service::register(state.store.as_ref(), &form.email, &form.password, form.name.trim())
            .await?;

    let codec = SessionCodec::from_ref(&state);
    let cookie = codec.serialize(&codec.create(user.id));
    Ok((
        jar.add(cookie),
        Redirect::to(&sanitize_redirect(form.redirect_to.as_deref())),
    ))
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    form.email = form.email.trim().to_lowercase();

    if !is_valid_email(&form.email) {
        warn!("login with invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let Some(user) = service::login(state.store.as_ref(), &form.email, &form.password).await?
    else {
        warn!("login failed");
        return Err(AppError::InvalidCredentials);
    };

    let codec = SessionCodec::from_ref(&state);
    let cookie = codec.serialize(&codec.create(user.id));
    Ok((
        jar.add(cookie),
        Redirect::to(&sanitize_redirect(form.redirect_to.as_deref())),
    ))
}

/// Always answers with a destroyed session carrier and a redirect home, even
/// when the incoming carrier was absent or unreadable.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let codec = SessionCodec::from_ref(&state);
    (jar.add(codec.destroy()), Redirect::to("/"))
}

#[instrument(skip(state, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(mut form): Form<ForgotPasswordForm>,
) -> Result<Json<ForgotPasswordResponse>, AppError> {
    form.email = form.email.trim().to_lowercase();

    if !is_valid_email(&form.email) {
        return Err(AppError::Validation("Invalid email".into()));
    }

    let outcome = service::request_password_reset(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.config.app_url,
        &form.email,
    )
    .await?;

    Ok(Json(ForgotPasswordResponse {
        ok: true,
        preview_url: outcome.preview_url,
    }))
}

// skip_all: the raw token must never end up in a log or span.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Json<ResetPasswordResponse>, AppError> {
    if form.password.len() < 8 {
        return Err(AppError::Validation("Password too short".into()));
    }

    service::reset_password(state.store.as_ref(), &token, &form.password).await?;
    Ok(Json(ResetPasswordResponse { ok: true }))
}

/// Lightweight probe the front end uses to pick between the landing page and
/// the dashboard.
pub async fn session_status(MaybeAuthUser(user_id): MaybeAuthUser) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: user_id.is_some(),
    })
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}
