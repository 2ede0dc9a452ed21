use url::Url;

pub const DEFAULT_REDIRECT: &str = "/admin";

/// Resolve the post-login destination. An explicit callback is honored
/// only when it is a same-site relative path or an absolute URL on the
/// configured origin; anything else falls back to the admin root so the
/// login endpoint cannot be used as an open redirector.
pub fn resolve_callback(base_url: &Url, callback: Option<&str>) -> String {
    let Some(callback) = callback.map(str::trim).filter(|c| !c.is_empty()) else {
        return DEFAULT_REDIRECT.to_string();
    };

    // "//host/path" is scheme-relative, not same-site.
    if callback.starts_with('/') && !callback.starts_with("//") {
        return callback.to_string();
    }

    if let Ok(target) = Url::parse(callback) {
        if target.scheme() == base_url.scheme()
            && target.host() == base_url.host()
            && target.port_or_known_default() == base_url.port_or_known_default()
        {
            let mut path = target.path().to_string();
            if let Some(query) = target.query() {
                path.push('?');
                path.push_str(query);
            }
            return path;
        }
    }

    DEFAULT_REDIRECT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://app.example").unwrap()
    }

    #[test]
    fn missing_callback_defaults_to_admin_root() {
        assert_eq!(resolve_callback(&base(), None), "/admin");
        assert_eq!(resolve_callback(&base(), Some("")), "/admin");
    }

    #[test]
    fn relative_path_is_kept() {
        assert_eq!(
            resolve_callback(&base(), Some("/admin/athletes?page=2")),
            "/admin/athletes?page=2"
        );
    }

    #[test]
    fn same_origin_absolute_url_is_reduced_to_its_path() {
        assert_eq!(
            resolve_callback(&base(), Some("https://app.example/admin/regions")),
            "/admin/regions"
        );
    }

    #[test]
    fn cross_origin_url_is_rejected() {
        assert_eq!(
            resolve_callback(&base(), Some("https://evil.example/x")),
            "/admin"
        );
    }

    #[test]
    fn scheme_relative_url_is_rejected() {
        assert_eq!(resolve_callback(&base(), Some("//evil.example/x")), "/admin");
    }

    #[test]
    fn same_host_different_port_is_rejected() {
        assert_eq!(
            resolve_callback(&base(), Some("https://app.example:8443/admin")),
            "/admin"
        );
    }
}
