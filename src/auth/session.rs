use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::repo::CredentialStore;
use crate::auth::service::Identity;
use crate::config::SessionConfig;
use crate::state::AppState;

/// Signed session payload carried in the session cookie. Validity means
/// the signature checks out and `exp` has not passed; it does not imply
/// the user row still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// JWT signing/verification material plus session policy.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub max_age: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.session)
    }
}

impl SessionKeys {
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            max_age: Duration::from_secs((cfg.max_age_days as u64) * 24 * 60 * 60),
        }
    }

    /// Mint a fresh session token for a verified identity.
    pub fn mint(&self, identity: &Identity) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.max_age.as_secs() as i64);
        let claims = SessionClaims {
            sub: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            avatar: identity.avatar.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %identity.id, "session minted");
        Ok(token)
    }

    /// Re-encode refreshed claims. `iat`/`exp` pass through untouched, so
    /// expiry stays anchored to the original mint time.
    pub fn reissue(&self, claims: &SessionClaims) -> anyhow::Result<String> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session verified");
        Ok(data.claims)
    }
}

/// Re-hydrate identity fields from the store so profile edits reach the
/// next request without a re-login. A vanished user or an unreachable
/// store leaves the claims as they were; the session then simply runs
/// out at its natural expiry.
pub async fn refresh_claims(claims: SessionClaims, store: &dyn CredentialStore) -> SessionClaims {
    match store.find_by_email(&claims.email).await {
        Ok(Some(user)) => SessionClaims {
            sub: user.id,
            email: user.email,
            name: user.name,
            avatar: user.avatar,
            ..claims
        },
        Ok(None) => claims,
        Err(e) => {
            warn!(error = %e, "credential store unavailable during session refresh");
            claims
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::memory::MemoryCredentialStore;
    use crate::auth::repo_types::ProfileUpdate;

    fn test_config() -> SessionConfig {
        SessionConfig {
            secret: "unit-test-secret".into(),
            issuer: "fedcms-test".into(),
            audience: "fedcms-test-admin".into(),
            max_age_days: 30,
        }
    }

    fn keys() -> SessionKeys {
        SessionKeys::from_config(&test_config())
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "admin@federation.test".into(),
            name: Some("Admin".into()),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn mint_then_verify_preserves_identity() {
        let keys = keys();
        let ident = identity();
        let token = keys.mint(&ident).expect("mint");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, ident.id);
        assert_eq!(claims.email, ident.email);
        assert_eq!(claims.name.as_deref(), Some("Admin"));
        assert_eq!(claims.iss, "fedcms-test");
        assert_eq!(claims.aud, "fedcms-test-admin");
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn verify_rejects_foreign_signature() {
        let token = keys().mint(&identity()).expect("mint");
        let mut other_cfg = test_config();
        other_cfg.secret = "a-different-secret".into();
        let other = SessionKeys::from_config(&other_cfg);
        assert!(other.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = keys();
        let now = OffsetDateTime::now_utc();
        let stale = SessionClaims {
            sub: Uuid::new_v4(),
            email: "gone@federation.test".into(),
            name: None,
            avatar: None,
            iat: (now - TimeDuration::days(31)).unix_timestamp() as usize,
            exp: (now - TimeDuration::days(1)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = keys.reissue(&stale).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn refresh_picks_up_profile_edits() {
        let store = MemoryCredentialStore::new();
        let user = MemoryCredentialStore::user("coach@federation.test", None);
        let id = user.id;
        store.insert(user);

        let keys = keys();
        let token = keys
            .mint(&Identity {
                id,
                email: "coach@federation.test".into(),
                name: None,
                avatar: None,
            })
            .expect("mint");
        let claims = keys.verify(&token).expect("verify");

        store
            .update_profile(
                id,
                ProfileUpdate {
                    name: Some("Coach Petrov".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        let refreshed = refresh_claims(claims.clone(), &store).await;
        assert_eq!(refreshed.name.as_deref(), Some("Coach Petrov"));
        // Expiry is anchored to mint time, not refresh time.
        assert_eq!(refreshed.iat, claims.iat);
        assert_eq!(refreshed.exp, claims.exp);
    }

    #[tokio::test]
    async fn refresh_keeps_stale_claims_when_user_is_gone() {
        let store = MemoryCredentialStore::new();
        let user = MemoryCredentialStore::user("removed@federation.test", None);
        let id = user.id;
        store.insert(user);

        let keys = keys();
        let claims = keys
            .verify(
                &keys
                    .mint(&Identity {
                        id,
                        email: "removed@federation.test".into(),
                        name: Some("Before".into()),
                        avatar: None,
                    })
                    .expect("mint"),
            )
            .expect("verify");

        store.remove(id);
        let refreshed = refresh_claims(claims.clone(), &store).await;
        assert_eq!(refreshed, claims);
    }
}
