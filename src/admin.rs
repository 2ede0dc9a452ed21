use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{
    dto::PublicUser,
    error::AuthError,
    extractors::SessionContext,
    repo_types::{ProfileUpdate, User},
};
use crate::state::AppState;

/// Admin entry point payload; the full dashboard is rendered by the
/// frontend, the backend only vouches for who is signed in.
#[derive(Debug, Serialize)]
pub struct AdminHome {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            bio: user.bio,
            location: user.location,
            avatar: user.avatar,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_home))
        .route("/admin/profile", get(get_profile).put(update_profile))
}

async fn admin_home(ctx: SessionContext) -> Json<AdminHome> {
    Json(AdminHome {
        user: PublicUser::from(&ctx.claims),
    })
}

#[instrument(skip_all)]
async fn get_profile(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Json<ProfileResponse>, AuthError> {
    let user = state
        .users
        .find_by_id(ctx.claims.sub)
        .await?
        .ok_or(AuthError::Unauthenticated)?;
    Ok(Json(ProfileResponse::from(user)))
}

#[instrument(skip_all)]
async fn update_profile(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(changes): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AuthError> {
    let user = state
        .users
        .update_profile(ctx.claims.sub, changes)
        .await?
        .ok_or(AuthError::Unauthenticated)?;
    Ok(Json(ProfileResponse::from(user)))
}
