//! In-memory cookie backend.
//!
//! [`MemoryCookieBackend`] implements the full [`CookieBackend`] contract
//! without any native store. It exists so application code can be tested
//! without a device, and as a stand-in on hosts that have no cookie store.
//!
//! ## Notes & limitations
//! - Cookies are bucketed by **domain** (the cookie's `domain`, or the URL host
//!   for host-only cookies). A read for `url` looks at every bucket whose domain
//!   matches the URL host, then filters on path and `secure`.
//! - A cookie replaces an existing one with the same name and path in its bucket.
//! - Writing a cookie whose expiry has already passed (`Max-Age=0`, a past
//!   `Expires`) deletes the stored cookie instead. Otherwise `expires` is stored
//!   but not enforced on reads.
//! - When several visible cookies share a name, the one with the longest domain,
//!   then the longest path, is returned.
//! - There is a single store; [`StoreKind`] is recorded and otherwise ignored.
//! - Every call is appended to a call log, see [`MemoryCookieBackend::calls`].
//!   [`MemoryCookieBackend::clear_calls`] empties it.
use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;
use url::Url;

use crate::backend::{CookieBackend, StoreKind};
use crate::cookies::header::{is_expired, parse_set_cookie, validate_cookie};
use crate::cookies::scope::{default_path, domain_matches, parse_http_url, path_matches};
use crate::cookies::{Cookie, Cookies};
use crate::errors::{CookieError, Result};

#[derive(Default)]
pub struct MemoryCookieBackend {
    /// Cookies per domain.
    entries: RwLock<BTreeMap<String, Vec<Cookie>>>,
    /// Names of the operations invoked, in order.
    calls: Mutex<Vec<&'static str>>,
    /// Store kinds received by the operations that take one, in order.
    stores: Mutex<Vec<StoreKind>>,
    /// When set, every operation fails with this message.
    failure: RwLock<Option<String>>,
}

impl MemoryCookieBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with `message`, as a broken native store would.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.write().unwrap() = None;
    }

    /// Operations invoked so far, oldest first.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn store_kinds(&self) -> Vec<StoreKind> {
        self.stores.lock().unwrap().clone()
    }

    /// Empties the call and store kind logs.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.stores.lock().unwrap().clear();
    }

    /// Total number of cookies held.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        match self.failure.read().unwrap().as_ref() {
            Some(message) => Err(anyhow::anyhow!("{op}: {message}").into()),
            None => Ok(()),
        }
    }

    fn enter_in(&self, op: &'static str, store: StoreKind) -> Result<()> {
        self.stores.lock().unwrap().push(store);
        self.enter(op)
    }

    fn store(&self, url: &Url, mut cookie: Cookie) -> bool {
        let host = url.host_str().unwrap_or_default();
        let domain = match cookie.bare_domain() {
            Some(domain) if domain_matches(host, domain) => domain.to_ascii_lowercase(),
            Some(domain) => {
                log::debug!("Memory backend: ignoring cookie for {} set from {}", domain, host);
                return false;
            }
            None => host.to_ascii_lowercase(),
        };

        cookie.domain = Some(domain.clone());
        if cookie.path.as_deref().map_or(true, str::is_empty) {
            cookie.path = Some("/".to_string());
        }

        let mut entries = self.entries.write().unwrap();
        if is_expired(&cookie, OffsetDateTime::now_utc()) {
            log::debug!("Memory backend: expired cookie {} removes stored one for {}", cookie.name, domain);
            if let Some(cookies) = entries.get_mut(&domain) {
                cookies.retain(|c| !(c.name == cookie.name && c.path == cookie.path));
                if cookies.is_empty() {
                    entries.remove(&domain);
                }
            }
            return true;
        }

        let cookies = entries.entry(domain).or_default();
        if let Some(existing) = cookies
            .iter_mut()
            .find(|c| c.name == cookie.name && c.path == cookie.path)
        {
            *existing = cookie;
        } else {
            cookies.push(cookie);
        }
        true
    }

    fn visible(&self, url: &Url) -> Cookies {
        let host = url.host_str().unwrap_or_default();
        let path = url.path();
        let is_https = url.scheme() == "https";

        let entries = self.entries.read().unwrap();
        most_specific_last(
            entries
                .iter()
                .filter(|(domain, _)| domain_matches(host, domain))
                .flat_map(|(_, cookies)| cookies.iter())
                .filter(|c| path_matches(path, c.path_or_root()))
                .filter(|c| !c.is_secure() || is_https),
        )
    }
}

/// Collects so that, among cookies sharing a name, the longest domain and then
/// the longest path wins.
fn most_specific_last<'a>(cookies: impl Iterator<Item = &'a Cookie>) -> Cookies {
    let mut cookies: Vec<&Cookie> = cookies.collect();
    cookies.sort_by_key(|c| {
        (
            c.domain.as_deref().map_or(0, str::len),
            c.path_or_root().len(),
        )
    });
    cookies.into_iter().cloned().collect()
}

#[async_trait]
impl CookieBackend for MemoryCookieBackend {
    async fn get(&self, url: &str, store: StoreKind) -> Result<Cookies> {
        self.enter_in("get", store)?;
        let url = parse_http_url(url)?;
        Ok(self.visible(&url))
    }

    async fn get_all(&self, store: StoreKind) -> Result<Cookies> {
        self.enter_in("getAll", store)?;
        let entries = self.entries.read().unwrap();
        Ok(most_specific_last(entries.values().flatten()))
    }

    async fn set(&self, url: &str, cookie: &Cookie, store: StoreKind) -> Result<bool> {
        self.enter_in("set", store)?;
        let parsed = parse_http_url(url)?;
        let host = parsed.host_str().unwrap_or_default();
        validate_cookie(cookie)?;

        if let Some(domain) = cookie.bare_domain() {
            if !domain_matches(host, domain) {
                return Err(CookieError::DomainMismatch {
                    host: host.to_string(),
                    domain: domain.to_string(),
                });
            }
        }

        Ok(self.store(&parsed, cookie.clone()))
    }

    async fn set_from_response(&self, url: &str, header: &str) -> Result<bool> {
        self.enter("setFromResponse")?;
        let url = parse_http_url(url)?;
        let cookie = parse_set_cookie(header, default_path(&url))
            .ok_or_else(|| CookieError::InvalidCookie(header.to_string()))?;
        Ok(self.store(&url, cookie))
    }

    async fn get_from_response(&self, url: &str) -> Result<Cookies> {
        self.enter("getFromResponse")?;
        let url = parse_http_url(url)?;
        Ok(self.visible(&url))
    }

    async fn clear_all(&self, store: StoreKind) -> Result<bool> {
        self.enter_in("clearAll", store)?;
        self.entries.write().unwrap().clear();
        Ok(true)
    }

    async fn clear_by_name(&self, url: &str, name: &str, store: StoreKind) -> Result<bool> {
        self.enter_in("clearByName", store)?;
        let url = parse_http_url(url)?;
        let host = url.host_str().unwrap_or_default();
        let path = url.path();

        let mut entries = self.entries.write().unwrap();
        for (_, cookies) in entries.iter_mut().filter(|(domain, _)| domain_matches(host, domain)) {
            cookies.retain(|c| !(c.name == name && path_matches(path, c.path_or_root())));
        }
        entries.retain(|_, cookies| !cookies.is_empty());
        Ok(true)
    }

    async fn flush(&self) -> Result<()> {
        self.enter("flush")
    }

    async fn remove_session_cookies(&self) -> Result<bool> {
        self.enter("removeSessionCookies")?;
        let mut entries = self.entries.write().unwrap();
        let before: usize = entries.values().map(Vec::len).sum();
        for cookies in entries.values_mut() {
            cookies.retain(|c| !c.is_session());
        }
        entries.retain(|_, cookies| !cookies.is_empty());
        let after: usize = entries.values().map(Vec::len).sum();
        Ok(before != after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/";

    #[tokio::test]
    async fn set_then_get_returns_cookie() {
        let backend = MemoryCookieBackend::new();
        let ok = backend
            .set(URL, &Cookie::new("sid", "abc123").with_path("/"), StoreKind::Http)
            .await
            .unwrap();
        assert!(ok);

        let cookies = backend.get(URL, StoreKind::Http).await.unwrap();
        assert_eq!(cookies.value("sid"), Some("abc123"));
        assert_eq!(cookies.get("sid").unwrap().domain.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn same_name_and_path_overwrites() {
        let backend = MemoryCookieBackend::new();
        backend.set(URL, &Cookie::new("a", "1"), StoreKind::Http).await.unwrap();
        backend.set(URL, &Cookie::new("a", "2"), StoreKind::Http).await.unwrap();
        assert_eq!(backend.len(), 1);
        assert_eq!(backend.get(URL, StoreKind::Http).await.unwrap().value("a"), Some("2"));
    }

    #[tokio::test]
    async fn domain_cookie_visible_on_subdomain_but_not_elsewhere() {
        let backend = MemoryCookieBackend::new();
        backend
            .set("https://www.example.com", &Cookie::new("a", "1").with_domain(".example.com"), StoreKind::Http)
            .await
            .unwrap();

        assert!(backend.get("https://api.example.com", StoreKind::Http).await.unwrap().contains("a"));
        assert!(backend.get("https://example.org", StoreKind::Http).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn host_cookie_wins_over_domain_cookie_with_same_name() {
        for _ in 0..50 {
            let backend = MemoryCookieBackend::new();
            backend
                .set("https://www.example.com", &Cookie::new("a", "host"), StoreKind::Http)
                .await
                .unwrap();
            backend
                .set("https://www.example.com", &Cookie::new("a", "domain").with_domain("example.com"), StoreKind::Http)
                .await
                .unwrap();

            let cookies = backend.get("https://www.example.com", StoreKind::Http).await.unwrap();
            assert_eq!(cookies.value("a"), Some("host"));
            assert_eq!(backend.get_all(StoreKind::Http).await.unwrap().value("a"), Some("host"));
            assert_eq!(
                backend.get("https://api.example.com", StoreKind::Http).await.unwrap().value("a"),
                Some("domain")
            );
        }
    }

    #[tokio::test]
    async fn longer_path_wins_within_a_domain() {
        let backend = MemoryCookieBackend::new();
        backend
            .set(URL, &Cookie::new("a", "app").with_path("/app"), StoreKind::Http)
            .await
            .unwrap();
        backend.set(URL, &Cookie::new("a", "root"), StoreKind::Http).await.unwrap();

        let cookies = backend.get("https://example.com/app/x", StoreKind::Http).await.unwrap();
        assert_eq!(cookies.value("a"), Some("app"));
    }

    #[tokio::test]
    async fn mismatched_domain_is_rejected() {
        let backend = MemoryCookieBackend::new();
        let err = backend
            .set(URL, &Cookie::new("a", "1").with_domain("other.org"), StoreKind::Http)
            .await
            .unwrap_err();
        assert!(matches!(err, CookieError::DomainMismatch { .. }));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn path_and_secure_filtering() {
        let backend = MemoryCookieBackend::new();
        backend
            .set(URL, &Cookie::new("app", "1").with_path("/app"), StoreKind::Http)
            .await
            .unwrap();
        backend
            .set(URL, &Cookie::new("tls", "1").secure(true), StoreKind::Http)
            .await
            .unwrap();

        let root = backend.get("https://example.com/", StoreKind::Http).await.unwrap();
        assert!(!root.contains("app"));
        assert!(root.contains("tls"));

        let plain = backend.get("http://example.com/app/page", StoreKind::Http).await.unwrap();
        assert!(plain.contains("app"));
        assert!(!plain.contains("tls"));
    }

    #[tokio::test]
    async fn set_from_response_parses_header() {
        let backend = MemoryCookieBackend::new();
        let ok = backend
            .set_from_response("https://example.com/login", "token=xyz; Path=/; HttpOnly")
            .await
            .unwrap();
        assert!(ok);

        let cookies = backend.get_from_response(URL).await.unwrap();
        let token = cookies.get("token").unwrap();
        assert_eq!(token.value, "xyz");
        assert!(token.is_http_only());

        assert!(matches!(
            backend.set_from_response(URL, "garbage").await,
            Err(CookieError::InvalidCookie(_))
        ));
    }

    #[tokio::test]
    async fn max_age_cookie_survives_session_removal() {
        let backend = MemoryCookieBackend::new();
        backend.set_from_response(URL, "a=1; Max-Age=3600").await.unwrap();

        assert!(!backend.remove_session_cookies().await.unwrap());
        assert_eq!(backend.get(URL, StoreKind::Http).await.unwrap().value("a"), Some("1"));
    }

    #[tokio::test]
    async fn zero_max_age_deletes_stored_cookie() {
        let backend = MemoryCookieBackend::new();
        backend.set_from_response(URL, "a=1").await.unwrap();
        backend.set_from_response(URL, "b=2").await.unwrap();

        assert!(backend.set_from_response(URL, "a=1; Max-Age=0").await.unwrap());
        let cookies = backend.get(URL, StoreKind::Http).await.unwrap();
        assert!(!cookies.contains("a"));
        assert!(cookies.contains("b"));

        backend
            .set(URL, &Cookie::new("b", "2").with_expires("2000-01-01T00:00:00.000Z"), StoreKind::Http)
            .await
            .unwrap();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn clear_by_name_only_removes_named_cookie() {
        let backend = MemoryCookieBackend::new();
        backend.set(URL, &Cookie::new("a", "1"), StoreKind::Http).await.unwrap();
        backend.set(URL, &Cookie::new("b", "2"), StoreKind::Http).await.unwrap();

        assert!(backend.clear_by_name(URL, "a", StoreKind::Http).await.unwrap());
        let cookies = backend.get(URL, StoreKind::Http).await.unwrap();
        assert!(!cookies.contains("a"));
        assert!(cookies.contains("b"));

        // absent name is fine
        assert!(backend.clear_by_name(URL, "missing", StoreKind::Http).await.unwrap());
    }

    #[tokio::test]
    async fn remove_session_cookies_keeps_persistent_ones() {
        let backend = MemoryCookieBackend::new();
        backend.set(URL, &Cookie::new("session", "1"), StoreKind::Http).await.unwrap();
        backend
            .set(URL, &Cookie::new("kept", "1").with_expires("2030-01-01T00:00:00.000Z"), StoreKind::Http)
            .await
            .unwrap();

        assert!(backend.remove_session_cookies().await.unwrap());
        let cookies = backend.get_all(StoreKind::Http).await.unwrap();
        assert_eq!(cookies.names().collect::<Vec<_>>(), vec!["kept"]);
        assert!(!backend.remove_session_cookies().await.unwrap());
    }

    #[tokio::test]
    async fn failure_mode_surfaces_backend_error_and_logs_calls() {
        let backend = MemoryCookieBackend::new();
        backend.fail_with("storage unavailable");

        let err = backend.get(URL, StoreKind::Http).await.unwrap_err();
        assert!(matches!(err, CookieError::Backend(_)));
        assert_eq!(err.to_string(), "get: storage unavailable");

        backend.recover();
        backend.flush().await.unwrap();
        assert_eq!(backend.calls(), vec!["get", "flush"]);
    }

    #[tokio::test]
    async fn clear_calls_empties_logs() {
        let backend = MemoryCookieBackend::new();
        backend.get(URL, StoreKind::WebKit).await.unwrap();
        backend.flush().await.unwrap();
        assert_eq!(backend.calls().len(), 2);
        assert_eq!(backend.store_kinds(), vec![StoreKind::WebKit]);

        backend.clear_calls();
        assert!(backend.calls().is_empty());
        assert!(backend.store_kinds().is_empty());

        backend.clear_all(StoreKind::Http).await.unwrap();
        assert_eq!(backend.calls(), vec!["clearAll"]);
    }
}
