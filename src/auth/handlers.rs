use axum::{
    extract::{FromRef, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{instrument, warn};

use crate::{
    auth::{
        cookie,
        dto::{LoginRequest, LoginResponse, PublicUser, SessionResponse},
        error::AuthError,
        extractors::SessionContext,
        redirect::resolve_callback,
        service,
        session::SessionKeys,
    },
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "login with malformed email");
        return Err(AuthError::InvalidCredentials);
    }

    let identity =
        service::authenticate(state.users.as_ref(), &payload.email, &payload.password).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.mint(&identity)?;
    let redirect_to = resolve_callback(&state.config.base_url, payload.callback_url.as_deref());

    Ok((
        [(header::SET_COOKIE, cookie::session_cookie(&token, keys.max_age))],
        Json(LoginResponse {
            ok: true,
            redirect_to,
            user: PublicUser::from(&identity),
        }),
    ))
}

pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, cookie::clear_session_cookie())],
        Json(json!({ "ok": true })),
    )
}

#[instrument(skip_all)]
pub async fn session(ctx: SessionContext) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: PublicUser::from(&ctx.claims),
        expires_at: ctx.claims.exp,
    })
}

/// Placeholder login page; the production UI lives in the frontend and
/// only the guard semantics of this route matter here.
pub async fn login_page() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
  <body>
    <form method="post" action="/auth/login">
      <input name="email" type="email" placeholder="Email">
      <input name="password" type="password" placeholder="Password">
      <button type="submit">Sign in</button>
    </form>
  </body>
</html>"#,
    )
}
