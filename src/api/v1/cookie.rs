use chrono::{DateTime, Utc};
use cookie::Cookie;
use time::OffsetDateTime;

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
const COOKIE_PATH: &str = "/";

pub fn refresh_cookie(
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Cookie<'static>, time::error::ComponentRange> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())?;
    Ok(Cookie::build((REFRESH_TOKEN_COOKIE, token.to_string()))
        .path(COOKIE_PATH)
        .http_only(true)
        .expires(expires)
        .build())
}

pub fn clear_refresh_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_TOKEN_COOKIE, ""))
        .path(COOKIE_PATH)
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn refresh_cookie_is_http_only_with_expiry() {
        let expires_at = Utc.with_ymd_and_hms(2030, 3, 4, 5, 6, 7).unwrap();
        let rendered = refresh_cookie("tok", expires_at).unwrap().to_string();

        assert!(rendered.starts_with("refresh_token=tok;"), "{}", rendered);
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Expires=Mon, 04 Mar 2030 05:06:07 GMT"), "{}", rendered);
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let rendered = clear_refresh_cookie().to_string();
        assert!(rendered.starts_with("refresh_token=;"), "{}", rendered);
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("HttpOnly"));
    }
}
