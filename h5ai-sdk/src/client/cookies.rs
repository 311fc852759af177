//! Cookie storage for the default transport.
//!
//! The session handshake is what makes the server hand out cookies; every later
//! listing and file request must send them back. [`CookieJar`] keeps them in a
//! [`cookie_store::CookieStore`], which applies domain and path scoping.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{cookie::CookieStore, header::HeaderValue};
use url::Url;

/// In-memory cookie jar usable as a reqwest cookie provider.
#[derive(Default, Debug)]
pub struct CookieJar {
    store: RwLock<cookie_store::CookieStore>,
}

impl CookieJar {
    /// `(name, value)` pairs that would be sent with a request to `url`.
    pub fn cookies_for(&self, url: &Url) -> Vec<(String, String)> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Drop every stored cookie.
    pub fn clear(&self) {
        *self.store.write().unwrap_or_else(PoisonError::into_inner) =
            cookie_store::CookieStore::default();
    }
}

impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let iter = cookie_headers.filter_map(|val| {
            val.to_str()
                .ok()
                .and_then(|s| cookie::Cookie::parse(s.to_owned()).ok())
        });

        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .store_response_cookies(iter, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let s = self
            .cookies_for(url)
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        if s.is_empty() {
            return None;
        }

        HeaderValue::from_str(&s).ok()
    }
}

/// Adapts a caller-supplied `dyn CookieStore` to reqwest's sized provider bound.
pub(crate) struct SharedJar(pub(crate) Arc<dyn CookieStore>);

impl CookieStore for SharedJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.0.set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.0.cookies(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_scopes_cookies() {
        let jar = CookieJar::default();
        let url = Url::parse("https://h.example/demo/").unwrap();
        let header = HeaderValue::from_static("h5ai=abc123; Path=/");
        jar.set_cookies(&mut std::iter::once(&header), &url);

        assert_eq!(
            jar.cookies(&Url::parse("https://h.example/demo/a.txt").unwrap()),
            Some(HeaderValue::from_static("h5ai=abc123"))
        );
        assert!(jar.cookies(&Url::parse("https://other.example/").unwrap()).is_none());

        jar.clear();
        assert!(jar.cookies_for(&url).is_empty());
    }

    #[test]
    fn shared_jar_delegates() {
        let inner = Arc::new(CookieJar::default());
        let shared = SharedJar(inner.clone());
        let url = Url::parse("https://h.example/").unwrap();
        let header = HeaderValue::from_static("sid=1");
        shared.set_cookies(&mut std::iter::once(&header), &url);
        assert_eq!(inner.cookies_for(&url), vec![("sid".to_string(), "1".to_string())]);
    }
}
