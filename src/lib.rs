//! Cookie access through the host platform's native cookie store.
//!
//! [`CookieManager`] is the entry point. It is built once at startup from a
//! [`BackendRegistry`](backend::BackendRegistry) of native bridges; the
//! [`resolver`] picks the bridge for the running [`Platform`] and every
//! operation is forwarded to it.

pub mod backend;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod manager;
pub mod platform;
pub mod resolver;

pub use backend::{BackendHandle, BackendRegistry, CookieBackend, StoreKind};
pub use config::CookieManagerConfig;
pub use cookies::{Cookie, Cookies};
pub use errors::CookieError;
pub use manager::CookieManager;
pub use platform::Platform;
