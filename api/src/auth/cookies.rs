//! Session cookie helpers. The cookie holds the raw token; the database only
//! ever sees its keyed hash.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use util::config;

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((config::session_cookie_name(), token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config::is_production())
        .path("/")
        .build()
}

/// Removal cookie for the session. Must match the path it was set with.
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((config::session_cookie_name(), ""))
        .path("/")
        .build()
}

pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(&config::session_cookie_name())
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    #[test]
    fn session_cookie_is_http_only() {
        let c = session_cookie("abc".into());
        assert_eq!(c.value(), "abc");
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.path(), Some("/"));
    }

    #[test]
    fn reads_token_from_request_cookies() {
        let mut headers = HeaderMap::new();
        let raw = format!("other=1; {}=tok123", config::session_cookie_name());
        headers.insert(COOKIE, HeaderValue::from_str(&raw).unwrap());
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(session_token(&jar).as_deref(), Some("tok123"));

        let empty = CookieJar::from_headers(&HeaderMap::new());
        assert!(session_token(&empty).is_none());
    }
}
