//! # espace-client
//!
//! Browser-side authentication module for the studio's single-page app:
//! a login page delegating to a session service that wraps the account
//! HTTP API and the browser's cookie/localStorage session markers.
//!
//! The session service is an explicit context object provided by the app
//! shell; its HTTP, storage, and navigation seams are traits so the
//! service is fully exercised by native tests.

pub mod app;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;

/// Hydration entry point for the browser bundle.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
