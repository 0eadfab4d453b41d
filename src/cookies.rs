//! Cookies: the [`Cookie`] record and the collections returned by reads.
//!
//! Reads return [`Cookies`], a map from cookie name to the full record. Older
//! callers that expect a plain `name -> value` map go through
//! [`Cookies::into_legacy`], which yields [`LegacyCookies`]. A collection never
//! changes shape depending on the backend.

mod collection;
mod cookie;
pub(crate) mod header;
pub(crate) mod scope;

pub use collection::{ContractRevision, Cookies, LegacyCookies};
pub use cookie::Cookie;
