//! Cookie backends: the [`CookieBackend`] contract, the [`BackendRegistry`] of
//! native bridges, and the platform adapters.
//!
//! A backend is whatever actually owns the cookies: the iOS/macOS shared cookie
//! storage and WebKit store, the Android `CookieManager`, or the in-memory test
//! double. Every backend exposes the same operation set with the same names as
//! the facade; the facade forwards to exactly one of them for the lifetime of
//! the process.
//!
//! # Concurrency model
//! - [`BackendHandle`] is `Arc<dyn CookieBackend>`. Methods take `&self`; a
//!   backend serializes access to its store itself, or relies on the OS to do it.
//! - Nothing here locks around backend calls or imposes a timeout.
//!
//! # Adapters
//! - [`AndroidCookieBackend`] sits on top of a [`WebViewCookieManager`].
//! - [`AppleCookieBackend`] sits on top of an [`HttpCookieStorage`] and an
//!   optional [`WebKitCookieStore`].
//! - [`MemoryCookieBackend`] keeps cookies in process memory.

pub mod android;
pub mod apple;
pub mod callback;
pub mod memory;
mod registry;

use std::sync::Arc;

use async_trait::async_trait;

use crate::cookies::{Cookie, Cookies};
use crate::errors::Result;

pub use android::{AndroidCookieBackend, WebViewCookieManager};
pub use apple::{AppleCookieBackend, HttpCookieStorage, WebKitCookieStore};
pub use callback::{Pending, ValueCallback};
pub use memory::MemoryCookieBackend;
pub use registry::{BackendRegistry, ANDROID_BRIDGE, IOS_BRIDGE, MACOS_BRIDGE};

/// A handle to a cookie backend trait object.
pub type BackendHandle = Arc<dyn CookieBackend>;

/// Which of a platform's cookie stores an operation targets.
///
/// Apple platforms have both the shared HTTP cookie storage and the WebKit
/// (`WKWebView`) store. Backends with a single store ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreKind {
    /// The shared HTTP cookie storage. Same as passing `useWebKit = false`.
    #[default]
    Http,
    /// The WebKit cookie store.
    WebKit,
}

impl StoreKind {
    pub fn from_use_webkit(use_webkit: bool) -> Self {
        if use_webkit {
            StoreKind::WebKit
        } else {
            StoreKind::Http
        }
    }

    pub fn use_webkit(self) -> bool {
        self == StoreKind::WebKit
    }
}

/// The operation set every native cookie bridge implements.
///
/// Arguments arrive already defaulted and validated by the facade. Errors are
/// returned as-is to the caller.
#[async_trait]
pub trait CookieBackend: Send + Sync {
    /// Cookies visible to `url`.
    async fn get(&self, url: &str, store: StoreKind) -> Result<Cookies>;

    /// Every cookie in the store.
    async fn get_all(&self, store: StoreKind) -> Result<Cookies>;

    /// Writes or overwrites `cookie`, scoped to `url`.
    async fn set(&self, url: &str, cookie: &Cookie, store: StoreKind) -> Result<bool>;

    /// Applies a raw `Set-Cookie` header value as if it came in a response from `url`.
    async fn set_from_response(&self, url: &str, header: &str) -> Result<bool>;

    /// Cookies as they would be sent when replaying a request to `url`.
    async fn get_from_response(&self, url: &str) -> Result<Cookies>;

    /// Removes every cookie.
    async fn clear_all(&self, store: StoreKind) -> Result<bool>;

    /// Removes the cookie called `name` in the scope of `url`. Absent is not an error.
    async fn clear_by_name(&self, url: &str, name: &str, store: StoreKind) -> Result<bool>;

    /// Writes in-memory cookie state to durable storage.
    async fn flush(&self) -> Result<()>;

    /// Removes cookies without an expiry.
    async fn remove_session_cookies(&self) -> Result<bool>;
}
