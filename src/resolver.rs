//! Platform resolution: picks the one native cookie bridge the process uses.
//!
//! Resolution happens once, at startup. A missing bridge or an unsupported
//! platform is a configuration problem, reported immediately and never retried.
use std::fmt;

use crate::backend::{BackendHandle, BackendRegistry, ANDROID_BRIDGE, IOS_BRIDGE, MACOS_BRIDGE};
use crate::errors::{CookieError, Result};
use crate::platform::Platform;

const IOS_HINT: &str = "Add RNCookieManagerIOS.h and RNCookieManagerIOS.m to your Xcode project";
const ANDROID_HINT: &str =
    "Import libraries to android \"react-native link @react-native-community/cookies\"";
const MACOS_HINT: &str = "Add RNCookieManagerMacOS to your macOS target";

/// The backend chosen for this process, together with the platform it was chosen for.
#[derive(Clone)]
pub struct ResolvedBackend {
    platform: Platform,
    handle: BackendHandle,
}

impl ResolvedBackend {
    /// Pairs a backend with a platform without consulting a registry.
    /// Mostly useful to inject a test double.
    pub fn new(platform: Platform, handle: BackendHandle) -> Self {
        Self { platform, handle }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn handle(&self) -> &BackendHandle {
        &self.handle
    }
}

impl fmt::Debug for ResolvedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedBackend")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

/// Bridge name and setup hint for a supported platform.
fn bridge_for(platform: &Platform) -> Option<(&'static str, &'static str)> {
    match platform {
        Platform::Ios => Some((IOS_BRIDGE, IOS_HINT)),
        Platform::Android => Some((ANDROID_BRIDGE, ANDROID_HINT)),
        Platform::MacOs => Some((MACOS_BRIDGE, MACOS_HINT)),
        Platform::Other(_) => None,
    }
}

/// Selects the bridge registered for `platform`.
///
/// Only the bridge for `platform` is considered; bridges registered for other
/// platforms are never used as a fallback.
pub fn resolve(platform: Platform, registry: &BackendRegistry) -> Result<ResolvedBackend> {
    let Some((bridge, hint)) = bridge_for(&platform) else {
        log::error!("Cookie backend resolution failed: unsupported platform {}", platform);
        return Err(CookieError::UnsupportedPlatform(platform.to_string()));
    };

    match registry.get(bridge) {
        Some(handle) => {
            log::info!("Using native cookie bridge {} on {}", bridge, platform);
            Ok(ResolvedBackend { platform, handle })
        }
        None => {
            log::error!("Cookie backend resolution failed: {} is not registered", bridge);
            Err(CookieError::MissingBackend { platform, hint })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryCookieBackend;
    use std::sync::Arc;

    fn full_registry() -> (BackendRegistry, [BackendHandle; 3]) {
        let ios: BackendHandle = Arc::new(MemoryCookieBackend::new());
        let android: BackendHandle = Arc::new(MemoryCookieBackend::new());
        let macos: BackendHandle = Arc::new(MemoryCookieBackend::new());

        let mut registry = BackendRegistry::new();
        registry
            .register_handle(IOS_BRIDGE, ios.clone())
            .register_handle(ANDROID_BRIDGE, android.clone())
            .register_handle(MACOS_BRIDGE, macos.clone());

        (registry, [ios, android, macos])
    }

    #[test]
    fn each_platform_gets_its_own_bridge() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (registry, [ios, android, macos]) = full_registry();

        let cases = [
            (Platform::Ios, &ios),
            (Platform::Android, &android),
            (Platform::MacOs, &macos),
        ];
        for (platform, expected) in cases {
            let resolved = resolve(platform.clone(), &registry).unwrap();
            assert_eq!(resolved.platform(), &platform);
            assert!(Arc::ptr_eq(resolved.handle(), expected));
            for other in [&ios, &android, &macos] {
                if !Arc::ptr_eq(other, expected) {
                    assert!(!Arc::ptr_eq(resolved.handle(), other));
                }
            }
        }
    }

    #[test]
    fn unsupported_platform_fails() {
        let (registry, _) = full_registry();
        let err = resolve(Platform::Other("windows".into()), &registry).unwrap_err();
        assert!(matches!(err, CookieError::UnsupportedPlatform(ref p) if p == "windows"));
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_bridge_names_the_skipped_step() {
        let mut registry = BackendRegistry::new();
        registry.register(ANDROID_BRIDGE, MemoryCookieBackend::new());

        let err = resolve(Platform::Ios, &registry).unwrap_err();
        assert!(matches!(err, CookieError::MissingBackend { platform: Platform::Ios, .. }));
        assert!(err.to_string().contains("Xcode project"));

        let err = resolve(Platform::MacOs, &BackendRegistry::new()).unwrap_err();
        assert!(err.is_fatal());

        let err = resolve(Platform::Android, &BackendRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("react-native link"));
    }
}
