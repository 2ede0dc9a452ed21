use axum::{
    extract::{FromRef, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use time::OffsetDateTime;
use tracing::warn;

use crate::auth::cookie;
use crate::auth::extractors::SessionContext;
use crate::auth::session::{self, SessionKeys};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Path requires a valid session; without one the request bounces to
    /// the login page with the original target preserved.
    RequireSession,
    /// Login entry point; a request that already carries a valid session
    /// bounces to the admin root instead of re-authenticating.
    RedirectIfAuthenticated,
}

pub struct RouteRule {
    pub matches: fn(&str) -> bool,
    pub policy: Policy,
}

fn is_login(path: &str) -> bool {
    path == "/login"
}

fn is_admin(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

/// Protection table, evaluated top to bottom; first match wins. Paths
/// matching no rule pass through untouched.
pub const RULES: &[RouteRule] = &[
    RouteRule {
        matches: is_login,
        policy: Policy::RedirectIfAuthenticated,
    },
    RouteRule {
        matches: is_admin,
        policy: Policy::RequireSession,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No rule applies, or the matched rule is satisfied without a session.
    Pass,
    /// Protected path with a live session: attach it and continue.
    AllowWithSession,
    RedirectToLogin { callback: String },
    RedirectToAdmin,
}

pub fn evaluate(path: &str, has_session: bool) -> Decision {
    for rule in RULES {
        if !(rule.matches)(path) {
            continue;
        }
        return match (rule.policy, has_session) {
            (Policy::RedirectIfAuthenticated, true) => Decision::RedirectToAdmin,
            (Policy::RedirectIfAuthenticated, false) => Decision::Pass,
            (Policy::RequireSession, true) => Decision::AllowWithSession,
            (Policy::RequireSession, false) => Decision::RedirectToLogin {
                callback: path.to_string(),
            },
        };
    }
    Decision::Pass
}

/// Request interceptor enforcing the protection table. On protected
/// paths with a live session it also performs the implicit refresh:
/// claims are re-hydrated from the store, handed to handlers as a
/// [`SessionContext`], and the cookie is re-set only when they changed.
pub async fn guard(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let keys = SessionKeys::from_ref(&state);
    let claims = cookie::session_token(req.headers()).and_then(|t| keys.verify(&t).ok());

    match (evaluate(&path, claims.is_some()), claims) {
        (Decision::AllowWithSession, Some(claims)) => {
            let refreshed = session::refresh_claims(claims.clone(), state.users.as_ref()).await;
            let changed = refreshed != claims;
            req.extensions_mut().insert(SessionContext {
                claims: refreshed.clone(),
            });

            let mut res = next.run(req).await;
            if changed {
                set_session_cookie(&mut res, &keys, &refreshed);
            }
            res
        }
        (Decision::RedirectToLogin { callback }, _) => Redirect::temporary(&format!(
            "/login?callback_url={}",
            urlencoding::encode(&callback)
        ))
        .into_response(),
        (Decision::RedirectToAdmin, _) => Redirect::temporary("/admin").into_response(),
        _ => next.run(req).await,
    }
}

fn set_session_cookie(res: &mut Response, keys: &SessionKeys, claims: &session::SessionClaims) {
    let token = match keys.reissue(claims) {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "failed to reissue session cookie");
            return;
        }
    };
    // Cookie lifetime tracks the remaining token lifetime, not a full
    // new window.
    let remaining = (claims.exp as i64 - OffsetDateTime::now_utc().unix_timestamp()).max(0);
    let value = cookie::session_cookie(&token, std::time::Duration::from_secs(remaining as u64));
    match value.parse() {
        Ok(value) => {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "session cookie is not a valid header value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_without_session_redirects_to_login_with_callback() {
        let decision = evaluate("/admin/dashboard", false);
        assert_eq!(
            decision,
            Decision::RedirectToLogin {
                callback: "/admin/dashboard".into()
            }
        );
    }

    #[test]
    fn admin_with_session_is_allowed() {
        assert_eq!(evaluate("/admin", true), Decision::AllowWithSession);
        assert_eq!(evaluate("/admin/athletes", true), Decision::AllowWithSession);
    }

    #[test]
    fn login_with_session_redirects_to_admin() {
        assert_eq!(evaluate("/login", true), Decision::RedirectToAdmin);
    }

    #[test]
    fn login_without_session_passes() {
        assert_eq!(evaluate("/login", false), Decision::Pass);
    }

    #[test]
    fn unlisted_paths_pass_either_way() {
        assert_eq!(evaluate("/health", false), Decision::Pass);
        assert_eq!(evaluate("/health", true), Decision::Pass);
        assert_eq!(evaluate("/auth/login", false), Decision::Pass);
    }

    #[test]
    fn admin_prefix_does_not_leak_to_lookalike_paths() {
        assert_eq!(evaluate("/administrator", false), Decision::Pass);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let first = evaluate("/admin/dashboard", true);
        let second = evaluate("/admin/dashboard", true);
        assert_eq!(first, second);
        assert_eq!(first, Decision::AllowWithSession);
    }
}
