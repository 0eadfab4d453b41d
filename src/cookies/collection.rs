use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cookies::Cookie;

/// The two return shapes read operations have had over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractRevision {
    /// `name -> value` strings.
    Values,
    /// `name -> Cookie` records. What this crate returns.
    Records,
}

/// Legacy collection shape: cookie name to cookie value.
pub type LegacyCookies = BTreeMap<String, String>;

/// Cookies keyed by name, as returned by every read operation.
///
/// When two cookies with the same name are visible (different paths or
/// domains), the last one inserted wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cookies(BTreeMap<String, Cookie>);

impl Cookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cookie: Cookie) -> Option<Cookie> {
        self.0.insert(cookie.name.clone(), cookie)
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.0.get(name)
    }

    /// Value of the cookie called `name`, if present.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|c| c.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.0.values()
    }

    /// Adapts to the `name -> value` shape for callers on the old contract.
    pub fn into_legacy(self) -> LegacyCookies {
        self.0.into_iter().map(|(name, c)| (name, c.value)).collect()
    }
}

impl FromIterator<Cookie> for Cookies {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Self {
        let mut cookies = Cookies::new();
        for c in iter {
            cookies.insert(c);
        }
        cookies
    }
}

impl IntoIterator for Cookies {
    type Item = Cookie;
    type IntoIter = std::collections::btree_map::IntoValues<String, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}
