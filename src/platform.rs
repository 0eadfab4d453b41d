//! Host platform identification.
//!
//! The platform is read once at startup and decides which native cookie
//! bridge the [`resolver`](crate::resolver) hands to the facade.
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system the process runs on, as far as cookie backends care.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    #[serde(rename = "macos")]
    MacOs,
    /// Anything else. Never resolves to a backend.
    Other(String),
}

impl Platform {
    /// Detects the platform of the running process.
    pub fn detect() -> Self {
        std::env::consts::OS
            .parse()
            .unwrap_or_else(|_| Platform::Other(std::env::consts::OS.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::MacOs => "macos",
            Platform::Other(name) => name,
        }
    }

    /// Only the Android cookie manager has a separate flush step and a notion of
    /// session-cookie removal. Everywhere else those calls are no-ops.
    pub fn supports_flush(&self) -> bool {
        matches!(self, Platform::Android)
    }

    pub fn supports_session_cookie_removal(&self) -> bool {
        matches!(self, Platform::Android)
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "ios" => Platform::Ios,
            "android" => Platform::Android,
            "macos" | "osx" => Platform::MacOs,
            other => Platform::Other(other.to_string()),
        })
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
