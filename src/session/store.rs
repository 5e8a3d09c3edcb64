//! Persistent client-side session storage: the authentication cookie and
//! the localStorage mirror of the full account.
//!
//! The browser backend requires a `hydrate` build; outside the browser the
//! accessors report nothing stored and writes are dropped, mirroring how
//! SSR stubs behave elsewhere in the crate.

/// Raw access to the two persisted session values.
///
/// Values are opaque strings at this layer; serialization and validation
/// happen in the session service so malformed content fails explicitly.
pub trait SessionStore {
    /// The serialized account cookie, if present.
    fn account_cookie(&self) -> Option<String>;
    fn set_account_cookie(&self, value: &str);
    fn clear_account_cookie(&self);

    /// The serialized full-account localStorage entry, if present.
    fn cached_full_account(&self) -> Option<String>;
    fn set_cached_full_account(&self, value: &str);
    fn clear_cached_full_account(&self);
}

impl<T: SessionStore + ?Sized> SessionStore for std::rc::Rc<T> {
    fn account_cookie(&self) -> Option<String> {
        (**self).account_cookie()
    }

    fn set_account_cookie(&self, value: &str) {
        (**self).set_account_cookie(value);
    }

    fn clear_account_cookie(&self) {
        (**self).clear_account_cookie();
    }

    fn cached_full_account(&self) -> Option<String> {
        (**self).cached_full_account()
    }

    fn set_cached_full_account(&self, value: &str) {
        (**self).set_cached_full_account(value);
    }

    fn clear_cached_full_account(&self) {
        (**self).clear_cached_full_account();
    }
}

#[cfg(feature = "hydrate")]
const COOKIE_NAME: &str = "authenticatedAccount";
#[cfg(feature = "hydrate")]
const STORAGE_KEY: &str = "fullAccount";

/// Cookie + localStorage backend for real browser sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

#[cfg(feature = "hydrate")]
impl BrowserStore {
    fn html_document() -> Option<web_sys::HtmlDocument> {
        use wasm_bindgen::JsCast;
        web_sys::window()?.document()?.dyn_into::<web_sys::HtmlDocument>().ok()
    }

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

#[cfg(feature = "hydrate")]
impl SessionStore for BrowserStore {
    fn account_cookie(&self) -> Option<String> {
        let cookies = Self::html_document()?.cookie().ok()?;
        for pair in cookies.split(';') {
            let pair = pair.trim_start();
            if let Some(encoded) = pair.strip_prefix(COOKIE_NAME).and_then(|rest| rest.strip_prefix('=')) {
                return js_sys::decode_uri_component(encoded)
                    .ok()
                    .map(|decoded| String::from(decoded));
            }
        }
        None
    }

    fn set_account_cookie(&self, value: &str) {
        if let Some(document) = Self::html_document() {
            let encoded = String::from(js_sys::encode_uri_component(value));
            let cookie = format!("{COOKIE_NAME}={encoded}; path=/");
            if document.set_cookie(&cookie).is_err() {
                log::warn!("failed to write account cookie");
            }
        }
    }

    fn clear_account_cookie(&self) {
        if let Some(document) = Self::html_document() {
            let cookie = format!("{COOKIE_NAME}=; path=/; expires=Thu, 01 Jan 1970 00:00:00 GMT");
            if document.set_cookie(&cookie).is_err() {
                log::warn!("failed to clear account cookie");
            }
        }
    }

    fn cached_full_account(&self) -> Option<String> {
        Self::local_storage()?.get_item(STORAGE_KEY).ok().flatten()
    }

    fn set_cached_full_account(&self, value: &str) {
        if let Some(storage) = Self::local_storage() {
            if storage.set_item(STORAGE_KEY, value).is_err() {
                log::warn!("failed to persist full account to localStorage");
            }
        }
    }

    fn clear_cached_full_account(&self) {
        if let Some(storage) = Self::local_storage() {
            let _ = storage.remove_item(STORAGE_KEY);
        }
    }
}

#[cfg(not(feature = "hydrate"))]
impl SessionStore for BrowserStore {
    fn account_cookie(&self) -> Option<String> {
        None
    }

    fn set_account_cookie(&self, _value: &str) {}

    fn clear_account_cookie(&self) {}

    fn cached_full_account(&self) -> Option<String> {
        None
    }

    fn set_cached_full_account(&self, _value: &str) {}

    fn clear_cached_full_account(&self) {}
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    cookie: std::cell::RefCell<Option<String>>,
    cached: std::cell::RefCell<Option<String>>,
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn account_cookie(&self) -> Option<String> {
        self.cookie.borrow().clone()
    }

    fn set_account_cookie(&self, value: &str) {
        *self.cookie.borrow_mut() = Some(value.to_owned());
    }

    fn clear_account_cookie(&self) {
        *self.cookie.borrow_mut() = None;
    }

    fn cached_full_account(&self) -> Option<String> {
        self.cached.borrow().clone()
    }

    fn set_cached_full_account(&self, value: &str) {
        *self.cached.borrow_mut() = Some(value.to_owned());
    }

    fn clear_cached_full_account(&self) {
        *self.cached.borrow_mut() = None;
    }
}
