use crate::platform::Platform;

/// Environment variable that overrides platform detection.
pub const PLATFORM_ENV: &str = "NATIVE_COOKIES_PLATFORM";

/// Startup configuration for the cookie manager.
#[derive(Debug, Clone)]
pub struct CookieManagerConfig {
    /// Forces a platform instead of detecting it from the build target.
    pub platform: Option<Platform>,
    /// Passed to the Android cookie manager on every access.
    pub accept_cookies: bool,
    /// Whether the native store understands `HttpOnly` (Android N and later).
    pub http_only_supported: bool,
}

impl Default for CookieManagerConfig {
    fn default() -> Self {
        Self {
            platform: None,
            accept_cookies: true,
            http_only_supported: true,
        }
    }
}

impl CookieManagerConfig {
    /// Default configuration, with the platform taken from `NATIVE_COOKIES_PLATFORM` when set.
    pub fn from_env() -> Self {
        let platform = std::env::var(PLATFORM_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .and_then(|v| v.parse().ok());

        Self {
            platform,
            ..Self::default()
        }
    }

    /// The platform to resolve against: the override if any, otherwise the detected one.
    pub fn platform(&self) -> Platform {
        self.platform.clone().unwrap_or_else(Platform::detect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_detects_platform() {
        let cfg = CookieManagerConfig::default();
        assert!(cfg.accept_cookies);
        assert!(cfg.http_only_supported);
        assert_eq!(cfg.platform(), Platform::detect());
    }

    #[test]
    fn explicit_platform_wins_over_detection() {
        let cfg = CookieManagerConfig {
            platform: Some(Platform::Android),
            ..Default::default()
        };
        assert_eq!(cfg.platform(), Platform::Android);
    }

    #[test]
    fn from_env_reads_override() {
        std::env::set_var(PLATFORM_ENV, "ios");
        let cfg = CookieManagerConfig::from_env();
        std::env::remove_var(PLATFORM_ENV);
        assert_eq!(cfg.platform, Some(Platform::Ios));
    }
}
