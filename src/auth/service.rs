use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::password;
use crate::auth::repo::CredentialStore;
use crate::auth::repo_types::NewUser;

/// Minimal authenticated-user projection handed to the session issuer.
/// Never carries the password hash.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Verify a submitted credential pair against the store.
///
/// Unknown email, missing hash and wrong password are indistinguishable
/// to the caller. The `last_login` write is a post-success hook: if it
/// fails the login still succeeds.
pub async fn authenticate(
    store: &dyn CredentialStore,
    email: &str,
    password_plain: &str,
) -> Result<Identity, AuthError> {
    if email.is_empty() || password_plain.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let Some(user) = store.find_by_email(email).await? else {
        warn!(email, "login for unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    let Some(hash) = user.password_hash.as_deref().filter(|h| !h.is_empty()) else {
        warn!(user_id = %user.id, "login for identity without a password");
        return Err(AuthError::InvalidCredentials);
    };

    if !password::verify_password(password_plain, hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    if let Err(e) = store.record_login(user.id, OffsetDateTime::now_utc()).await {
        warn!(error = %e, user_id = %user.id, "failed to record login time");
    }

    info!(user_id = %user.id, "user authenticated");
    Ok(Identity {
        id: user.id,
        email: user.email,
        name: user.name,
        avatar: user.avatar,
    })
}

/// Create the bootstrap admin account when `SEED_ADMIN_EMAIL` /
/// `SEED_ADMIN_PASSWORD` are set and no user owns that email yet.
pub async fn ensure_seed_admin(store: &dyn CredentialStore) -> anyhow::Result<()> {
    let (Ok(email), Ok(password_plain)) = (
        std::env::var("SEED_ADMIN_EMAIL"),
        std::env::var("SEED_ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    let email = email.trim().to_lowercase();
    if store.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let hash = password::hash_password(&password_plain)?;
    let user = store
        .create(NewUser {
            email,
            password_hash: Some(hash),
            name: Some("Administrator".into()),
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "seeded admin account");
    Ok(())
}
