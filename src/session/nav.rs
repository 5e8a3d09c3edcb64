//! Navigation seam for the session service.
//!
//! Session operations decide where to go (back target, generic back,
//! settings after registration); this trait performs the move so the
//! decisions stay testable outside a browser.

/// Performs SPA navigation on behalf of the session service.
pub trait Navigator {
    /// Navigate to an application path such as `/settings`.
    fn goto(&self, path: &str);

    /// Generic back-navigation (browser history).
    fn back(&self);
}

impl<T: Navigator + ?Sized> Navigator for std::rc::Rc<T> {
    fn goto(&self, path: &str) {
        (**self).goto(path);
    }

    fn back(&self) {
        (**self).back();
    }
}

/// History/location-backed navigator for real browser sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn goto(&self, path: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(window) = web_sys::window() {
                if window.location().set_href(path).is_err() {
                    log::warn!("navigation to {path} failed");
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = path;
        }
    }

    fn back(&self) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(window) = web_sys::window() {
                if let Ok(history) = window.history() {
                    let _ = history.back();
                }
            }
        }
    }
}
