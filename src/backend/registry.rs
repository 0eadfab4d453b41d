use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{BackendHandle, CookieBackend};

/// Name the iOS bridge registers under.
pub const IOS_BRIDGE: &str = "RNCookieManagerIOS";
/// Name the Android bridge registers under.
pub const ANDROID_BRIDGE: &str = "RNCookieManagerAndroid";
/// Name the macOS bridge registers under.
pub const MACOS_BRIDGE: &str = "RNCookieManagerMacOS";

/// Native cookie bridges the host made available, keyed by bridge name.
///
/// The host fills this during its own startup. The resolver then looks up the
/// one bridge matching the platform; the registry itself is not consulted again.
#[derive(Default, Clone)]
pub struct BackendRegistry {
    bridges: HashMap<String, BackendHandle>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `backend` under `name`, replacing any earlier registration.
    pub fn register<B>(&mut self, name: impl Into<String>, backend: B) -> &mut Self
    where
        B: CookieBackend + 'static,
    {
        self.register_handle(name, Arc::new(backend))
    }

    pub fn register_handle(&mut self, name: impl Into<String>, handle: BackendHandle) -> &mut Self {
        let name = name.into();
        log::debug!("Registering native cookie bridge {}", name);
        self.bridges.insert(name, handle);
        self
    }

    pub fn get(&self, name: &str) -> Option<BackendHandle> {
        self.bridges.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bridges.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bridges.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("BackendRegistry").field("bridges", &names).finish()
    }
}
