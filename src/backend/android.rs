//! Android cookie backend.
//!
//! [`AndroidCookieBackend`] implements [`CookieBackend`] on top of a
//! [`WebViewCookieManager`], a thin trait over `android.webkit.CookieManager`.
//! The native side only moves strings: this adapter builds the `Set-Cookie`
//! value for writes and splits the `Cookie` string returned for reads.
//!
//! ## Platform behavior
//! - `get_all` and `clear_by_name` have no Android equivalent and fail with
//!   [`CookieError::Unsupported`].
//! - `get_from_response` returns what `get` returns: the cookies the WebView
//!   would send to `url`.
//! - Writes and `clear_all` flush the manager right after the native call.
//! - The WebKit flag is meaningless here and ignored.
//! - Reads only carry names and values; the native manager does not expose
//!   attributes of stored cookies.
use async_trait::async_trait;

use crate::backend::callback::ValueCallback;
use crate::backend::{CookieBackend, StoreKind};
use crate::config::CookieManagerConfig;
use crate::cookies::header::{parse_cookie_header, to_set_cookie, validate_cookie};
use crate::cookies::scope::{domain_matches, parse_http_url};
use crate::cookies::{Cookie, Cookies};
use crate::errors::{CookieError, Result, CLEAR_BY_NAME_NOT_SUPPORTED, GET_ALL_NOT_SUPPORTED};

/// The primitives of `android.webkit.CookieManager` this crate relies on.
///
/// Methods that complete asynchronously on the native side take a
/// [`ValueCallback`] and must answer it exactly once.
pub trait WebViewCookieManager: Send + Sync {
    fn set_accept_cookie(&self, accept: bool) -> anyhow::Result<()>;

    /// Stores a raw `Set-Cookie` value for `url`.
    fn set_cookie(&self, url: &str, value: &str, callback: ValueCallback<bool>) -> anyhow::Result<()>;

    /// The `Cookie` header the WebView would send to `url`, if any.
    fn get_cookie(&self, url: &str) -> anyhow::Result<Option<String>>;

    fn remove_all_cookies(&self, callback: ValueCallback<bool>) -> anyhow::Result<()>;

    fn remove_session_cookies(&self, callback: ValueCallback<bool>) -> anyhow::Result<()>;

    fn flush(&self) -> anyhow::Result<()>;
}

pub struct AndroidCookieBackend<M> {
    manager: M,
    accept_cookies: bool,
    http_only_supported: bool,
}

impl<M: WebViewCookieManager> AndroidCookieBackend<M> {
    pub fn new(manager: M, config: &CookieManagerConfig) -> Self {
        Self {
            manager,
            accept_cookies: config.accept_cookies,
            http_only_supported: config.http_only_supported,
        }
    }

    /// The native manager, with cookie acceptance applied.
    fn manager(&self) -> Result<&M> {
        self.manager.set_accept_cookie(self.accept_cookies)?;
        Ok(&self.manager)
    }

    /// Builds the `Set-Cookie` value for `cookie` written from `url`.
    fn set_cookie_string(&self, url: &str, cookie: &Cookie) -> Result<String> {
        let parsed = parse_http_url(url)?;
        let host = parsed.host_str().unwrap_or_default();

        validate_cookie(cookie)?;

        // Android takes the domain without the leading dot and includes subdomains anyway.
        let domain = match cookie.bare_domain() {
            Some(domain) if domain_matches(host, domain) => domain,
            Some(domain) => {
                return Err(CookieError::DomainMismatch {
                    host: host.to_string(),
                    domain: domain.to_string(),
                })
            }
            None => host,
        };

        Ok(to_set_cookie(cookie, domain, self.http_only_supported))
    }

    async fn add_cookies(&self, url: &str, value: &str) -> Result<bool> {
        let manager = self.manager()?;
        let (callback, pending) = ValueCallback::channel();
        manager.set_cookie(url, value, callback)?;
        manager.flush()?;
        pending.wait().await
    }

    fn cookies_for(&self, url: &str) -> Result<Cookies> {
        parse_http_url(url)?;
        let header = self.manager()?.get_cookie(url)?;
        Ok(header.as_deref().map(parse_cookie_header).unwrap_or_default())
    }
}

#[async_trait]
impl<M: WebViewCookieManager> CookieBackend for AndroidCookieBackend<M> {
    async fn get(&self, url: &str, _store: StoreKind) -> Result<Cookies> {
        self.cookies_for(url)
    }

    async fn get_all(&self, _store: StoreKind) -> Result<Cookies> {
        Err(CookieError::Unsupported(GET_ALL_NOT_SUPPORTED))
    }

    async fn set(&self, url: &str, cookie: &Cookie, _store: StoreKind) -> Result<bool> {
        let value = self.set_cookie_string(url, cookie)?;
        self.add_cookies(url, &value).await
    }

    async fn set_from_response(&self, url: &str, header: &str) -> Result<bool> {
        parse_http_url(url)?;
        if header.trim().is_empty() {
            return Err(CookieError::InvalidCookie("empty Set-Cookie header".into()));
        }
        self.add_cookies(url, header).await
    }

    async fn get_from_response(&self, url: &str) -> Result<Cookies> {
        self.cookies_for(url)
    }

    async fn clear_all(&self, _store: StoreKind) -> Result<bool> {
        let manager = self.manager()?;
        let (callback, pending) = ValueCallback::channel();
        manager.remove_all_cookies(callback)?;
        manager.flush()?;
        pending.wait().await
    }

    async fn clear_by_name(&self, _url: &str, _name: &str, _store: StoreKind) -> Result<bool> {
        Err(CookieError::Unsupported(CLEAR_BY_NAME_NOT_SUPPORTED))
    }

    async fn flush(&self) -> Result<()> {
        self.manager()?.flush()?;
        Ok(())
    }

    async fn remove_session_cookies(&self) -> Result<bool> {
        let (callback, pending) = ValueCallback::channel();
        self.manager()?.remove_session_cookies(callback)?;
        pending.wait().await
    }
}
