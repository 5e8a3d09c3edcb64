//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! Pure in-memory state lives here, separated from the service that
//! mutates it, so the invariants (single-select display flags, the
//! consume-once back target, the request generation counter) stay
//! testable without a browser.

pub mod session;
