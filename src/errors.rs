use crate::platform::Platform;

pub const INVALID_URL_MISSING_HTTP: &str =
    "Invalid URL: It may be missing a protocol (ex. http:// or https://).";
pub const INVALID_COOKIE_VALUES: &str = "Unable to add cookie - invalid values";
pub const GET_ALL_NOT_SUPPORTED: &str = "Get all cookies not supported for Android (iOS only)";
pub const CLEAR_BY_NAME_NOT_SUPPORTED: &str = "Cannot remove a single cookie by name on Android";

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// The native bridge for the detected platform was never registered.
    #[error("native-cookies: {hint} (no cookie backend registered for {platform})")]
    MissingBackend { platform: Platform, hint: &'static str },

    #[error("native-cookies: Invalid platform '{0}'. This library only supports Android, iOS and macOS.")]
    UnsupportedPlatform(String),

    #[error("{} ({0})", INVALID_URL_MISSING_HTTP)]
    InvalidUrl(String),

    #[error("{}: {0}", INVALID_COOKIE_VALUES)]
    InvalidCookie(String),

    #[error("Cookie URL host {host} and domain {domain} mismatched. The cookie won't set correctly.")]
    DomainMismatch { host: String, domain: String },

    #[error("{0}")]
    Unsupported(&'static str),

    #[error("WebKit cookie store is not available on this platform version")]
    WebKitUnavailable,

    #[error("Native cookie backend dropped its callback without answering")]
    CallbackDropped,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl CookieError {
    /// Startup errors: the process should not serve cookie operations after one of these.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CookieError::MissingBackend { .. } | CookieError::UnsupportedPlatform(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CookieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_are_fatal() {
        let missing = CookieError::MissingBackend {
            platform: Platform::Ios,
            hint: "Add RNCookieManagerIOS.h and RNCookieManagerIOS.m to your Xcode project",
        };
        assert!(missing.is_fatal());
        assert!(missing.to_string().contains("Xcode project"));

        assert!(CookieError::UnsupportedPlatform("windows".into()).is_fatal());
        assert!(!CookieError::CallbackDropped.is_fatal());
        assert!(!CookieError::Unsupported(GET_ALL_NOT_SUPPORTED).is_fatal());
    }

    #[test]
    fn backend_errors_keep_original_detail() {
        let err: CookieError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
        assert!(!err.is_fatal());
    }
}
