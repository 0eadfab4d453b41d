//! Conversions between [`Cookie`] records and header text.
//!
//! - [`to_set_cookie`] renders a record as an RFC 6265 `Set-Cookie` value.
//! - [`parse_set_cookie`] reads a `Set-Cookie` value back into a record. Parsing is
//!   minimal: `Expires`, `Max-Age`, `Path`, `Domain`, `Secure` and `HttpOnly` are
//!   handled, other attributes are ignored. `Max-Age` wins over `Expires` and is
//!   turned into an absolute `expires`; zero or less yields an already expired cookie.
//! - [`parse_cookie_header`] splits a request-style `a=1; b=2` string.
//! - [`validate_cookie`] checks that a record can be rendered without changing
//!   the header's meaning.
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::cookies::{Cookie, Cookies};
use crate::errors::{CookieError, Result};

/// RFC 6265 `cookie-name`: a non-empty RFC 2616 token.
pub fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'['
                        | b']' | b'?' | b'=' | b'{' | b'}'
                )
        })
}

/// RFC 6265 `cookie-value`: cookie-octets, optionally wrapped in one pair of double quotes.
pub fn is_cookie_value(value: &str) -> bool {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    inner
        .bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

/// Attribute values may not end the attribute early or break the header line.
fn is_attribute_value(value: &str) -> bool {
    !value.bytes().any(|b| b == b';' || b.is_ascii_control())
}

/// Rejects a record whose name, value, path or domain would be read back as
/// something else once rendered by [`to_set_cookie`].
pub fn validate_cookie(cookie: &Cookie) -> Result<()> {
    if !is_token(&cookie.name) {
        return Err(CookieError::InvalidCookie(format!("illegal cookie name {:?}", cookie.name)));
    }
    if !is_cookie_value(&cookie.value) {
        return Err(CookieError::InvalidCookie(format!(
            "illegal value for cookie {}",
            cookie.name
        )));
    }
    for (attribute, value) in [("path", &cookie.path), ("domain", &cookie.domain)] {
        if let Some(value) = value.as_deref().filter(|v| !is_attribute_value(v)) {
            return Err(CookieError::InvalidCookie(format!("illegal {attribute} {value:?}")));
        }
    }
    Ok(())
}

/// Renders `cookie` as a `Set-Cookie` value scoped to `domain`.
///
/// Expiry is converted from ISO 8601 to the RFC 1123 form headers use. An expiry
/// that does not parse is dropped, which leaves a session cookie.
pub fn to_set_cookie(cookie: &Cookie, domain: &str, http_only_supported: bool) -> String {
    let mut out = format!("{}={}", cookie.name, cookie.value);

    if let Some(expires) = cookie.expires.as_deref().filter(|e| !e.is_empty()) {
        match iso_to_http_date(expires) {
            Some(date) => {
                out.push_str("; expires=");
                out.push_str(&date);
            }
            None => log::info!("Cookies: unable to parse expiry date '{}', writing session cookie", expires),
        }
    }

    if !domain.is_empty() {
        out.push_str("; domain=");
        out.push_str(domain);
    }

    if let Some(path) = cookie.path.as_deref().filter(|p| !p.is_empty()) {
        out.push_str("; path=");
        out.push_str(path);
    }

    if cookie.is_secure() {
        out.push_str("; secure");
    }

    if http_only_supported && cookie.is_http_only() {
        out.push_str("; httponly");
    }

    out
}

/// Parses one `Set-Cookie` value. `default_path` is used when the header has no `Path`.
///
/// Returns `None` for a header without a `name=value` pair or with an empty name.
pub fn parse_set_cookie(header: &str, default_path: &str) -> Option<Cookie> {
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = Cookie::new(name, value.trim());
    let mut max_age = None;

    for part in parts {
        let part = part.trim();
        if let Some((k, v)) = part.split_once('=') {
            let v = v.trim();
            match k.trim().to_ascii_lowercase().as_str() {
                "path" => cookie.path = Some(v.to_string()),
                "domain" => cookie.domain = Some(v.trim_start_matches('.').to_string()),
                "expires" => cookie.expires = Some(http_date_to_iso(v).unwrap_or_else(|| v.to_string())),
                "max-age" => max_age = v.parse::<i64>().ok().or(max_age),
                "version" => cookie.version = Some(v.to_string()),
                _ => {}
            }
        } else if part.eq_ignore_ascii_case("secure") {
            cookie.secure = Some(true);
        } else if part.eq_ignore_ascii_case("httponly") {
            cookie.http_only = Some(true);
        }
    }

    if cookie.path.is_none() {
        cookie.path = Some(default_path.to_string());
    }

    if let Some(seconds) = max_age {
        let expiry = if seconds <= 0 {
            OffsetDateTime::UNIX_EPOCH
        } else {
            OffsetDateTime::now_utc().saturating_add(Duration::seconds(seconds))
        };
        cookie.expires = expiry.format(&Rfc3339).ok();
    }

    Some(cookie)
}

/// Splits a `name=value; name2=value2` string. Pairs with an empty name or value are skipped.
pub fn parse_cookie_header(header: &str) -> Cookies {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .map(|(name, value)| Cookie::new(name, value))
        .collect()
}

fn parse_iso(iso: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(iso, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(iso, &Iso8601::DEFAULT))
        .ok()
}

/// The cookie has an expiry that parses and is not after `now`.
pub fn is_expired(cookie: &Cookie, now: OffsetDateTime) -> bool {
    cookie
        .expires
        .as_deref()
        .and_then(parse_iso)
        .map_or(false, |expiry| expiry <= now)
}

/// `2030-01-01T00:00:00.000Z` to `Tue, 01 Jan 2030 00:00:00 GMT`.
pub fn iso_to_http_date(iso: &str) -> Option<String> {
    let utc = parse_iso(iso)?.to_offset(UtcOffset::UTC);
    utc.format(format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    ))
    .ok()
}

/// `Tue, 01 Jan 2030 00:00:00 GMT` to `2030-01-01T00:00:00Z`.
pub fn http_date_to_iso(date: &str) -> Option<String> {
    let parsed = PrimitiveDateTime::parse(
        date,
        format_description!(
            "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
        ),
    )
    .ok()?;
    parsed.assume_utc().format(&Rfc3339).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_attributes() {
        let cookie = Cookie::new("sid", "abc123")
            .with_path("/app")
            .with_expires("2030-01-01T00:00:00.000Z")
            .secure(true)
            .http_only(true);

        assert_eq!(
            to_set_cookie(&cookie, "example.com", true),
            "sid=abc123; expires=Tue, 01 Jan 2030 00:00:00 GMT; domain=example.com; path=/app; secure; httponly"
        );
    }

    #[test]
    fn http_only_dropped_when_unsupported() {
        let cookie = Cookie::new("a", "b").http_only(true);
        assert_eq!(to_set_cookie(&cookie, "example.com", false), "a=b; domain=example.com");
    }

    #[test]
    fn unparsable_expiry_becomes_session_cookie() {
        let cookie = Cookie::new("a", "b").with_expires("next tuesday");
        assert_eq!(to_set_cookie(&cookie, "example.com", true), "a=b; domain=example.com");
    }

    #[test]
    fn expiry_with_offset_is_converted_to_gmt() {
        assert_eq!(
            iso_to_http_date("2030-01-01T02:00:00.000+02:00").as_deref(),
            Some("Tue, 01 Jan 2030 00:00:00 GMT")
        );
    }

    #[test]
    fn parses_set_cookie() {
        let c = parse_set_cookie(
            "sid=abc; Path=/app; Domain=.example.com; Expires=Tue, 01 Jan 2030 00:00:00 GMT; Secure; HttpOnly",
            "/",
        )
        .unwrap();
        assert_eq!(c.name, "sid");
        assert_eq!(c.value, "abc");
        assert_eq!(c.path.as_deref(), Some("/app"));
        assert_eq!(c.domain.as_deref(), Some("example.com"));
        assert_eq!(c.expires.as_deref(), Some("2030-01-01T00:00:00Z"));
        assert!(c.is_secure());
        assert!(c.is_http_only());
    }

    #[test]
    fn set_cookie_without_path_uses_default() {
        let c = parse_set_cookie("a=1", "/dir").unwrap();
        assert_eq!(c.path.as_deref(), Some("/dir"));
        assert!(c.is_session());
        assert!(parse_set_cookie("novalue", "/").is_none());
        assert!(parse_set_cookie("=1", "/").is_none());
    }

    #[test]
    fn max_age_becomes_absolute_expiry() {
        let now = OffsetDateTime::now_utc();
        let c = parse_set_cookie("a=1; Max-Age=3600", "/").unwrap();
        assert!(!c.is_session());
        assert!(!is_expired(&c, now));
        assert!(is_expired(&c, now + Duration::hours(2)));

        let c = parse_set_cookie("a=1; Max-Age=junk", "/").unwrap();
        assert!(c.is_session());
    }

    #[test]
    fn max_age_wins_over_expires() {
        let now = OffsetDateTime::now_utc();
        let c = parse_set_cookie("a=1; Max-Age=0; Expires=Tue, 01 Jan 2030 00:00:00 GMT", "/").unwrap();
        assert_eq!(c.expires.as_deref(), Some("1970-01-01T00:00:00Z"));
        assert!(is_expired(&c, now));

        let c = parse_set_cookie("a=1; Expires=Tue, 01 Jan 2030 00:00:00 GMT; Max-Age=-5", "/").unwrap();
        assert!(is_expired(&c, now));
    }

    #[test]
    fn session_and_unparsable_expiry_never_expire() {
        let now = OffsetDateTime::now_utc();
        assert!(!is_expired(&Cookie::new("a", "1"), now));
        assert!(!is_expired(&Cookie::new("a", "1").with_expires("next tuesday"), now));
    }

    #[test]
    fn cookie_header_skips_empty_pairs() {
        let cookies = parse_cookie_header("a=1; b=; =3; c=three");
        assert_eq!(cookies.names().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(cookies.value("c"), Some("three"));
        assert!(parse_cookie_header("").is_empty());
    }

    #[test]
    fn cookie_names_must_be_tokens() {
        assert!(is_token("sid"));
        assert!(is_token("__Host-id"));
        assert!(!is_token(""));
        assert!(!is_token("a;b"));
        assert!(!is_token("a b"));
        assert!(!is_token("a=b"));
        assert!(!is_token("a,b"));
        assert!(!is_token("a\tb"));
        assert!(!is_token("naïve"));
    }

    #[test]
    fn cookie_values_must_be_octets() {
        assert!(is_cookie_value("abc123"));
        assert!(is_cookie_value(""));
        assert!(is_cookie_value("\"quoted\""));
        assert!(is_cookie_value("a=b/c"));
        assert!(!is_cookie_value("x; path=/admin"));
        assert!(!is_cookie_value("1\r\nX-Injected: yes"));
        assert!(!is_cookie_value("two words"));
        assert!(!is_cookie_value("a,b"));
        assert!(!is_cookie_value("\"unbalanced"));
    }

    #[test]
    fn validate_rejects_attribute_injection() {
        assert!(validate_cookie(&Cookie::new("sid", "abc").with_path("/app")).is_ok());
        for cookie in [
            Cookie::new("a;b", "1"),
            Cookie::new("sid", "x; path=/admin; domain=example.com"),
            Cookie::new("sid", "1\r\nX-Injected: yes"),
            Cookie::new("sid", "1").with_path("/; secure"),
            Cookie::new("sid", "1").with_domain("example.com\r\n"),
        ] {
            assert!(matches!(validate_cookie(&cookie), Err(CookieError::InvalidCookie(_))));
        }
    }
}
