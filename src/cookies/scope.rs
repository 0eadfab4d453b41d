//! URL validation and the small amount of host/path scoping the adapters need.
use url::{Host, Url};

use crate::errors::{CookieError, Result};

/// Parses `url`, requiring an `http`/`https` scheme and a host.
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| CookieError::InvalidUrl(format!("{url}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CookieError::InvalidUrl(url.to_string()));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(CookieError::InvalidUrl(url.to_string())),
    }
}

/// `host` is `domain` or one of its subdomains. A leading dot on `domain` is ignored.
///
/// IP hosts and single-label domains (`com`, `localhost`) only match exactly.
pub fn domain_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim_start_matches('.');
    if domain.is_empty() {
        return false;
    }
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    if is_ip_host(host) || !domain.contains('.') {
        return false;
    }
    host.len() > domain.len()
        && host.is_char_boundary(host.len() - domain.len())
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

fn is_ip_host(host: &str) -> bool {
    matches!(Host::parse(host), Ok(Host::Ipv4(_) | Host::Ipv6(_)))
}

/// Request path falls under the cookie path.
pub fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

/// Directory of the URL path, used when a `Set-Cookie` header carries no `Path`.
pub fn default_path(url: &Url) -> &str {
    url.path()
        .rsplit_once('/')
        .map_or("/", |(dir, _)| if dir.is_empty() { "/" } else { dir })
}
