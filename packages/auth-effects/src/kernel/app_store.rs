//! In-memory application state: the current URL and the demo-page flag.

use std::collections::BTreeMap;
use std::sync::RwLock;

use reqwest::Url;
use tracing::debug;

use super::traits::{BaseAppStore, BaseRouter};

/// Query parameters of a URL. Later duplicates win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Parse the query string of an absolute URL or an app-relative path
    /// such as `/login?redirect=/apps`. Unparseable input yields no params.
    pub fn from_url(url: &str) -> Self {
        let Ok(base) = Url::parse("http://localhost/") else {
            return Self::default();
        };
        match base.join(url) {
            Ok(parsed) => parsed.query_pairs().into_owned().collect(),
            Err(_) => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `redirect` parameter, ignoring an empty value.
    pub fn redirect(&self) -> Option<&str> {
        self.get("redirect").filter(|r| !r.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug)]
struct StoreState {
    url: String,
    demo_page_available: bool,
}

/// Application store kept in memory.
///
/// It is also a router: navigating replaces the current URL, so the query
/// parameters seen by the next reader follow the last navigation.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new(url: impl Into<String>, demo_page_available: bool) -> Self {
        Self {
            state: RwLock::new(StoreState {
                url: url.into(),
                demo_page_available,
            }),
        }
    }

    pub fn current_url(&self) -> String {
        self.read(|s| s.url.clone())
    }

    pub fn set_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.write(move |s| s.url = url);
    }

    pub fn set_demo_page_available(&self, available: bool) {
        self.write(move |s| s.demo_page_available = available);
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut StoreState)) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("/", false)
    }
}

impl BaseAppStore for MemoryStore {
    fn query_params(&self) -> QueryParams {
        QueryParams::from_url(&self.current_url())
    }

    fn demo_page_available(&self) -> bool {
        self.read(|s| s.demo_page_available)
    }
}

impl BaseRouter for MemoryStore {
    fn navigate_by_url(&self, url: &str) {
        debug!(url, "navigating");
        self.set_url(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relative_and_absolute_urls() {
        let relative = QueryParams::from_url("/login?redirect=%2Fapps%2F7&lang=en");
        assert_eq!(relative.redirect(), Some("/apps/7"));
        assert_eq!(relative.get("lang"), Some("en"));

        let absolute = QueryParams::from_url("https://frs.example.org/login?redirect=/home");
        assert_eq!(absolute.redirect(), Some("/home"));
    }

    #[test]
    fn empty_redirect_is_absent() {
        let params = QueryParams::from_url("/login?redirect=");
        assert_eq!(params.redirect(), None);
        assert!(!params.is_empty());

        assert!(QueryParams::from_url("/login").is_empty());
    }

    #[test]
    fn navigation_updates_query_params() {
        let store = MemoryStore::new("/login?redirect=/apps", true);
        assert_eq!(store.query_params().redirect(), Some("/apps"));
        assert!(store.demo_page_available());

        store.navigate_by_url("/");
        assert_eq!(store.current_url(), "/");
        assert_eq!(store.query_params().redirect(), None);

        store.set_demo_page_available(false);
        assert!(!store.demo_page_available());
    }
}
