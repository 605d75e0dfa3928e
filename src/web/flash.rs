//! One-shot notice messages carried across a redirect in a cookie.
//!
//! The message is base64-encoded so arbitrary text survives cookie value
//! rules; it is consumed (and the cookie cleared) on the next render.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

pub const NOTICE_COOKIE: &str = "notice";

pub fn set(jar: CookieJar, message: &str) -> CookieJar {
    let cookie = Cookie::build((NOTICE_COOKIE, URL_SAFE_NO_PAD.encode(message)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Take the pending notice, if any, clearing its cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    match jar.get(NOTICE_COOKIE) {
        Some(cookie) => {
            let message = URL_SAFE_NO_PAD
                .decode(cookie.value())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            let jar = jar.remove(Cookie::build((NOTICE_COOKIE, "")).path("/").build());
            (jar, message)
        }
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_take_roundtrips() {
        let jar = CookieJar::new();
        let jar = set(jar, "Please log in to access your account.");
        let (jar, message) = take(jar);
        assert_eq!(
            message.as_deref(),
            Some("Please log in to access your account.")
        );
        // Taken means gone from the live jar value
        let (_, again) = take(jar.remove(Cookie::from(NOTICE_COOKIE)));
        assert_eq!(again, None);
    }

    #[test]
    fn empty_jar_has_no_notice() {
        let (_, message) = take(CookieJar::new());
        assert_eq!(message, None);
    }

    #[test]
    fn garbage_cookie_yields_none() {
        let jar = CookieJar::new().add(Cookie::new(NOTICE_COOKIE, "!!not-base64!!"));
        let (_, message) = take(jar);
        assert_eq!(message, None);
    }
}
