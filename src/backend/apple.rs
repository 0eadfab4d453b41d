//! iOS / macOS cookie backend.
//!
//! Apple platforms keep cookies in two places: the process-wide HTTP cookie
//! storage (`NSHTTPCookieStorage`) and, from iOS 11 on, the WebKit cookie store
//! (`WKHTTPCookieStore`) used by `WKWebView`. [`AppleCookieBackend`] routes each
//! operation to one of them based on [`StoreKind`].
//!
//! - The HTTP storage is synchronous and matches cookies to URLs itself.
//! - The WebKit store only lists, sets and deletes; it answers through
//!   completion callbacks. Reads for a URL keep the cookies whose domain
//!   matches the URL host.
//! - `flush` and `remove_session_cookies` have no Apple equivalent and do nothing.
use async_trait::async_trait;
use url::Url;

use crate::backend::callback::ValueCallback;
use crate::backend::{CookieBackend, StoreKind};
use crate::cookies::header::validate_cookie;
use crate::cookies::scope::{domain_matches, parse_http_url};
use crate::cookies::{Cookie, Cookies};
use crate::errors::{CookieError, Result};

/// The primitives of the shared HTTP cookie storage.
pub trait HttpCookieStorage: Send + Sync {
    /// Cookies the storage would send with a request to `url`.
    fn cookies_for_url(&self, url: &Url) -> anyhow::Result<Vec<Cookie>>;

    fn all_cookies(&self) -> anyhow::Result<Vec<Cookie>>;

    fn set_cookie(&self, cookie: Cookie) -> anyhow::Result<()>;

    fn delete_cookie(&self, cookie: &Cookie) -> anyhow::Result<()>;

    /// Parses a `Set-Cookie` value received from `url` into cookies, without storing them.
    fn cookies_from_response_header(&self, header: &str, url: &Url) -> anyhow::Result<Vec<Cookie>>;
}

/// The primitives of the WebKit cookie store. Each call answers its callback once.
pub trait WebKitCookieStore: Send + Sync {
    fn get_all_cookies(&self, callback: ValueCallback<Vec<Cookie>>);

    fn set_cookie(&self, cookie: Cookie, callback: ValueCallback<()>);

    fn delete_cookie(&self, cookie: Cookie, callback: ValueCallback<()>);
}

pub struct AppleCookieBackend<H> {
    http: H,
    webkit: Option<Box<dyn WebKitCookieStore>>,
}

impl<H: HttpCookieStorage> AppleCookieBackend<H> {
    /// Backend with only the shared HTTP storage. WebKit requests fail with
    /// [`CookieError::WebKitUnavailable`].
    pub fn new(http: H) -> Self {
        Self { http, webkit: None }
    }

    pub fn with_webkit<W: WebKitCookieStore + 'static>(mut self, store: W) -> Self {
        self.webkit = Some(Box::new(store));
        self
    }

    pub fn has_webkit(&self) -> bool {
        self.webkit.is_some()
    }

    fn webkit(&self) -> Result<&dyn WebKitCookieStore> {
        self.webkit.as_deref().ok_or(CookieError::WebKitUnavailable)
    }

    async fn webkit_cookies(&self) -> Result<Vec<Cookie>> {
        let (callback, pending) = ValueCallback::channel();
        self.webkit()?.get_all_cookies(callback);
        pending.wait().await
    }

    async fn webkit_set(&self, cookie: Cookie) -> Result<()> {
        let (callback, pending) = ValueCallback::channel();
        self.webkit()?.set_cookie(cookie, callback);
        pending.wait().await
    }

    async fn webkit_delete(&self, cookie: Cookie) -> Result<()> {
        let (callback, pending) = ValueCallback::channel();
        self.webkit()?.delete_cookie(cookie, callback);
        pending.wait().await
    }

    async fn all_in(&self, store: StoreKind) -> Result<Vec<Cookie>> {
        match store {
            StoreKind::Http => Ok(self.http.all_cookies()?),
            StoreKind::WebKit => self.webkit_cookies().await,
        }
    }

    async fn delete_in(&self, cookie: Cookie, store: StoreKind) -> Result<()> {
        match store {
            StoreKind::Http => Ok(self.http.delete_cookie(&cookie)?),
            StoreKind::WebKit => self.webkit_delete(cookie).await,
        }
    }
}

/// Fills in the domain and path a native cookie needs, scoped to `url`.
fn scoped_cookie(url: &Url, cookie: &Cookie) -> Result<Cookie> {
    validate_cookie(cookie)?;
    let host = url.host_str().unwrap_or_default();
    let mut scoped = cookie.clone();

    match cookie.bare_domain() {
        Some(domain) if !domain_matches(host, domain) => {
            return Err(CookieError::DomainMismatch {
                host: host.to_string(),
                domain: domain.to_string(),
            })
        }
        Some(_) => {}
        None => scoped.domain = Some(host.to_string()),
    }
    scoped.path = Some(cookie.path_or_root().to_string());

    Ok(scoped)
}

fn belongs_to(url: &Url, cookie: &Cookie) -> bool {
    let host = url.host_str().unwrap_or_default();
    cookie.bare_domain().map_or(false, |domain| domain_matches(host, domain))
}

#[async_trait]
impl<H: HttpCookieStorage> CookieBackend for AppleCookieBackend<H> {
    async fn get(&self, url: &str, store: StoreKind) -> Result<Cookies> {
        let url = parse_http_url(url)?;
        match store {
            StoreKind::Http => Ok(self.http.cookies_for_url(&url)?.into_iter().collect()),
            StoreKind::WebKit => Ok(self
                .webkit_cookies()
                .await?
                .into_iter()
                .filter(|c| belongs_to(&url, c))
                .collect()),
        }
    }

    async fn get_all(&self, store: StoreKind) -> Result<Cookies> {
        Ok(self.all_in(store).await?.into_iter().collect())
    }

    async fn set(&self, url: &str, cookie: &Cookie, store: StoreKind) -> Result<bool> {
        let url = parse_http_url(url)?;
        let cookie = scoped_cookie(&url, cookie)?;
        match store {
            StoreKind::Http => self.http.set_cookie(cookie)?,
            StoreKind::WebKit => self.webkit_set(cookie).await?,
        }
        Ok(true)
    }

    async fn set_from_response(&self, url: &str, header: &str) -> Result<bool> {
        let url = parse_http_url(url)?;
        let cookies = self.http.cookies_from_response_header(header, &url)?;
        if cookies.is_empty() {
            log::debug!("Apple backend: no cookies in Set-Cookie header for {}", url);
            return Ok(false);
        }
        for cookie in cookies {
            self.http.set_cookie(cookie)?;
        }
        Ok(true)
    }

    async fn get_from_response(&self, url: &str) -> Result<Cookies> {
        let url = parse_http_url(url)?;
        Ok(self.http.cookies_for_url(&url)?.into_iter().collect())
    }

    async fn clear_all(&self, store: StoreKind) -> Result<bool> {
        for cookie in self.all_in(store).await? {
            self.delete_in(cookie, store).await?;
        }
        Ok(true)
    }

    async fn clear_by_name(&self, url: &str, name: &str, store: StoreKind) -> Result<bool> {
        let url = parse_http_url(url)?;
        for cookie in self.all_in(store).await? {
            if cookie.name == name && belongs_to(&url, &cookie) {
                self.delete_in(cookie, store).await?;
            }
        }
        Ok(true)
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    async fn remove_session_cookies(&self) -> Result<bool> {
        Ok(false)
    }
}
