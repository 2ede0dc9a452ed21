use anyhow::Context;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub max_age_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Canonical origin of the deployment, used to reject cross-origin
    /// post-login redirect targets.
    pub base_url: Url,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let base_url = std::env::var("APP_BASE_URL")
            .context("APP_BASE_URL must be set")?
            .parse::<Url>()
            .context("APP_BASE_URL is not a valid URL")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "fedcms".into()),
            audience: std::env::var("SESSION_AUDIENCE").unwrap_or_else(|_| "fedcms-admin".into()),
            max_age_days: std::env::var("SESSION_MAX_AGE_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        Ok(Self {
            database_url,
            base_url,
            session,
        })
    }
}
