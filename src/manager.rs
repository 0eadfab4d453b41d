//! The cookie facade: [`CookieManager`].
//!
//! One stable async API over whichever native cookie backend was resolved at
//! startup. Each operation defaults its optional arguments, validates what it
//! can cheaply validate, and forwards to the identically named
//! [`CookieBackend`](crate::backend::CookieBackend) method.
//!
//! Optional `useWebKit` flags are expressed as method pairs: `get(url)` is
//! exactly `get_in(url, StoreKind::Http)`, i.e. `useWebKit = false`.
//!
//! `flush` and `remove_session_cookies` only reach the backend on platforms
//! that have those concepts (Android). Elsewhere they resolve immediately and
//! touch nothing.
//!
//! ```rust
//! use native_cookies::backend::{BackendRegistry, MemoryCookieBackend, IOS_BRIDGE};
//! use native_cookies::config::CookieManagerConfig;
//! use native_cookies::cookies::Cookie;
//! use native_cookies::manager::CookieManager;
//! use native_cookies::platform::Platform;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut registry = BackendRegistry::new();
//! registry.register(IOS_BRIDGE, MemoryCookieBackend::new());
//!
//! let config = CookieManagerConfig { platform: Some(Platform::Ios), ..Default::default() };
//! let cookies = CookieManager::from_registry(&config, &registry).unwrap();
//!
//! cookies.set("https://example.com", &Cookie::new("sid", "abc123").with_path("/")).await.unwrap();
//! let jar = cookies.get("https://example.com").await.unwrap();
//! assert_eq!(jar.value("sid"), Some("abc123"));
//! # });
//! ```
use crate::backend::{BackendHandle, BackendRegistry, StoreKind};
use crate::config::CookieManagerConfig;
use crate::cookies::header::validate_cookie;
use crate::cookies::scope::parse_http_url;
use crate::cookies::{ContractRevision, Cookie, Cookies, LegacyCookies};
use crate::errors::{CookieError, Result};
use crate::platform::Platform;
use crate::resolver::{resolve, ResolvedBackend};

/// Facade over the resolved native cookie backend.
///
/// Cheap to clone; clones share the backend.
#[derive(Debug, Clone)]
pub struct CookieManager {
    backend: ResolvedBackend,
}

impl CookieManager {
    /// Uses an already resolved backend.
    pub fn new(backend: ResolvedBackend) -> Self {
        Self { backend }
    }

    /// Resolves the backend for the configured platform from `registry`.
    ///
    /// Fails with [`CookieError::MissingBackend`] or
    /// [`CookieError::UnsupportedPlatform`]; both are fatal.
    pub fn from_registry(config: &CookieManagerConfig, registry: &BackendRegistry) -> Result<Self> {
        let backend = resolve(config.platform(), registry)?;
        Ok(Self::new(backend))
    }

    pub fn platform(&self) -> &Platform {
        self.backend.platform()
    }

    /// Read operations return full records keyed by name.
    pub fn contract_revision(&self) -> ContractRevision {
        ContractRevision::Records
    }

    fn handle(&self) -> &BackendHandle {
        self.backend.handle()
    }

    /// Cookies visible to `url`, from the default store.
    pub async fn get(&self, url: &str) -> Result<Cookies> {
        self.get_in(url, StoreKind::default()).await
    }

    pub async fn get_in(&self, url: &str, store: StoreKind) -> Result<Cookies> {
        parse_http_url(url)?;
        log::debug!("cookies: get {} ({:?})", url, store);
        self.handle().get(url, store).await
    }

    /// [`get`](Self::get) in the older `name -> value` shape.
    pub async fn get_legacy(&self, url: &str) -> Result<LegacyCookies> {
        Ok(self.get(url).await?.into_legacy())
    }

    /// Every cookie in the default store. Android backends reject this.
    pub async fn get_all(&self) -> Result<Cookies> {
        self.get_all_in(StoreKind::default()).await
    }

    pub async fn get_all_in(&self, store: StoreKind) -> Result<Cookies> {
        log::debug!("cookies: getAll ({:?})", store);
        self.handle().get_all(store).await
    }

    /// Writes `cookie` scoped to `url` in the default store.
    pub async fn set(&self, url: &str, cookie: &Cookie) -> Result<bool> {
        self.set_in(url, cookie, StoreKind::default()).await
    }

    pub async fn set_in(&self, url: &str, cookie: &Cookie, store: StoreKind) -> Result<bool> {
        parse_http_url(url)?;
        validate_cookie(cookie)?;
        log::debug!("cookies: set {} for {} ({:?})", cookie.name, url, store);
        self.handle().set(url, cookie, store).await
    }

    /// Applies a raw `Set-Cookie` header value for `url`. Parsing is left to the backend.
    pub async fn set_from_response(&self, url: &str, header: &str) -> Result<bool> {
        parse_http_url(url)?;
        if header.trim().is_empty() || http::HeaderValue::from_str(header).is_err() {
            return Err(CookieError::InvalidCookie("malformed Set-Cookie header".into()));
        }
        log::debug!("cookies: setFromResponse for {}", url);
        self.handle().set_from_response(url, header).await
    }

    /// Cookies as they would be sent when replaying a request to `url`.
    pub async fn get_from_response(&self, url: &str) -> Result<Cookies> {
        parse_http_url(url)?;
        log::debug!("cookies: getFromResponse {}", url);
        self.handle().get_from_response(url).await
    }

    /// Removes every cookie from the default store.
    pub async fn clear_all(&self) -> Result<bool> {
        self.clear_all_in(StoreKind::default()).await
    }

    pub async fn clear_all_in(&self, store: StoreKind) -> Result<bool> {
        log::debug!("cookies: clearAll ({:?})", store);
        self.handle().clear_all(store).await
    }

    /// Removes the cookie called `name` in the scope of `url`. Absent is not an error.
    pub async fn clear_by_name(&self, url: &str, name: &str) -> Result<bool> {
        self.clear_by_name_in(url, name, StoreKind::default()).await
    }

    pub async fn clear_by_name_in(&self, url: &str, name: &str, store: StoreKind) -> Result<bool> {
        parse_http_url(url)?;
        log::debug!("cookies: clearByName {} for {} ({:?})", name, url, store);
        self.handle().clear_by_name(url, name, store).await
    }

    /// Persists in-memory cookie state. A no-op where the platform has no flush step.
    pub async fn flush(&self) -> Result<()> {
        if !self.platform().supports_flush() {
            log::debug!("cookies: flush is a no-op on {}", self.platform());
            return Ok(());
        }
        self.handle().flush().await
    }

    /// Removes cookies without an expiry.
    ///
    /// Returns `None` without touching the backend on platforms that do not
    /// distinguish session cookies.
    pub async fn remove_session_cookies(&self) -> Result<Option<bool>> {
        if !self.platform().supports_session_cookie_removal() {
            log::debug!("cookies: removeSessionCookies is a no-op on {}", self.platform());
            return Ok(None);
        }
        self.handle().remove_session_cookies().await.map(Some)
    }
}
