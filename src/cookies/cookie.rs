//! The serializable [`Cookie`] record.
//!
//! ```rust
//! use native_cookies::cookies::Cookie;
//!
//! let c = Cookie::new("sid", "abc123")
//!     .with_path("/")
//!     .with_domain("example.com")
//!     .with_expires("2030-01-01T00:00:00.000Z")
//!     .secure(true)
//!     .http_only(true);
//!
//! assert!(!c.is_session());
//! ```
use serde::{Deserialize, Serialize};

/// A cookie as it crosses the boundary to and from a native cookie store.
///
/// Field names follow the host-facing wire shape (`httpOnly`, `expires`).
/// `origin` and `expiration` are accepted as deprecated aliases of `domain`
/// and `expires` when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name (case-sensitive). Unique within a domain and path.
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping. Written as `/` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Domain scoping. Host-only (the URL host) when absent.
    #[serde(default, alias = "origin", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Expiry as ISO 8601 text (`yyyy-MM-ddTHH:mm:ss.SSSZ`). Session cookies have `None`.
    #[serde(default, alias = "expiration", skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = Some(http_only);
        self
    }

    /// A cookie without expiry lives only as long as the session.
    pub fn is_session(&self) -> bool {
        self.expires.as_deref().map_or(true, str::is_empty)
    }

    pub fn is_secure(&self) -> bool {
        self.secure.unwrap_or(false)
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only.unwrap_or(false)
    }

    /// Path used when writing: the explicit one, or the root.
    pub fn path_or_root(&self) -> &str {
        match self.path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => "/",
        }
    }

    /// Domain without the leading dot some callers include.
    pub fn bare_domain(&self) -> Option<&str> {
        self.domain
            .as_deref()
            .map(|d| d.trim_start_matches('.'))
            .filter(|d| !d.is_empty())
    }
}
