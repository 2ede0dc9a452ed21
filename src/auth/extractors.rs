use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::cookie;
use crate::auth::error::AuthError;
use crate::auth::session::{SessionClaims, SessionKeys};

/// Per-request view of the authenticated session. The route guard builds
/// one per request and stashes it in the request extensions; handlers
/// outside the guarded prefixes fall back to parsing the headers here.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub claims: SessionClaims,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<SessionContext>() {
            return Ok(ctx.clone());
        }

        let token = cookie::session_token(&parts.headers).ok_or(AuthError::Unauthenticated)?;
        let keys = SessionKeys::from_ref(state);
        let claims = keys
            .verify(&token)
            .map_err(|_| AuthError::Unauthenticated)?;
        Ok(SessionContext { claims })
    }
}
