use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::service::Identity;
use crate::auth::session::SessionClaims;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Where the client wanted to go before being sent to the login
    /// page. Validated against the configured origin before use.
    pub callback_url: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl From<&Identity> for PublicUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            avatar: identity.avatar.clone(),
        }
    }
}

impl From<&SessionClaims> for PublicUser {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            name: claims.name.clone(),
            avatar: claims.avatar.clone(),
        }
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub redirect_to: String,
    pub user: PublicUser,
}

/// Current-session view returned by `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: PublicUser,
    pub expires_at: usize,
}
