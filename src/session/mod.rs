//! Client-side session service: authentication state, credential
//! submission, and profile retrieval against the account API.
//!
//! DESIGN
//! ======
//! The service is an explicit context object, not an ambient global: the
//! app shell constructs one and provides it via Leptos context. It owns the
//! transient [`SessionState`] behind `Rc<RefCell<_>>` (single UI thread, no
//! locking) and reaches the outside world only through three injected
//! seams: [`AuthApi`] for HTTP, [`SessionStore`] for the cookie and the
//! localStorage mirror, and [`Navigator`] for history moves. Tests drive
//! the service with in-memory fakes through the same seams.
//!
//! ERROR HANDLING
//! ==============
//! Every operation reports through `Result<_, SessionError>`; the error's
//! `Display` text is the user-facing message. Authentication is keyed
//! solely on cookie presence — a stale or forged cookie is
//! indistinguishable from a valid one at this layer.

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

pub mod nav;
pub mod store;

use std::cell::RefCell;
use std::rc::Rc;

use crate::net::api::{AuthApi, HttpApi};
use crate::net::types::{Account, AccountFilter, FullAccount, ProfileUpdate, RegisterRequest};
use crate::state::session::{DisplayStates, Section, SessionState};
use nav::{BrowserNavigator, Navigator};
use store::{BrowserStore, SessionStore};

/// Path of the login view, target of [`SessionService::goto_login_and_back_to`].
pub const LOGIN_PATH: &str = "/monespace";
/// Path of the settings view, target of a successful registration.
pub const SETTINGS_PATH: &str = "/settings";

/// Success message for [`SessionService::login`].
pub const MSG_LOGIN_OK: &str = "Connection réussie";
/// Success message for [`SessionService::update_profile`].
pub const MSG_PROFILE_UPDATED: &str = "Profil mis à jour";
/// Success message for [`SessionService::credit_profile`].
pub const MSG_ACCOUNT_CREDITED: &str = "Compte rechargé";

/// Failure reported by a session operation. `Display` is the user-facing
/// message for that operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Email ou mot de passe invalide")]
    InvalidCredentials,
    #[error("Echec de l'enregistrement")]
    RegistrationFailed,
    #[error("Logout failure!")]
    LogoutFailed,
    #[error("Une erreur est survenue lors de la mise à jour de votre profil")]
    ProfileUpdateFailed,
    #[error("Impossible de récupérer le compte")]
    AccountFetchFailed,
    #[error("La recherche a échoué")]
    SearchFailed,
    #[error("Réponse obsolète ignorée")]
    Superseded,
}

/// The session service wired to the real browser backends.
pub type BrowserSession = SessionService<HttpApi, BrowserStore, BrowserNavigator>;

/// Session context object encapsulating authentication state, credential
/// submission, and profile retrieval.
///
/// Cloning is cheap and shares the same session state.
#[derive(Clone, Debug)]
pub struct SessionService<A, S, N> {
    api: A,
    store: S,
    nav: N,
    state: Rc<RefCell<SessionState>>,
}

impl BrowserSession {
    /// Session service backed by the browser: gloo-net HTTP, cookie and
    /// localStorage persistence, history navigation.
    pub fn browser() -> Self {
        Self::new(HttpApi, BrowserStore, BrowserNavigator)
    }
}

impl<A, S, N> SessionService<A, S, N>
where
    A: AuthApi,
    S: SessionStore,
    N: Navigator,
{
    pub fn new(api: A, store: S, nav: N) -> Self {
        Self {
            api,
            store,
            nav,
            state: Rc::new(RefCell::new(SessionState::default())),
        }
    }

    /// Whether the authentication cookie is present.
    ///
    /// Presence only: no network call, no expiry check, no validation of
    /// the cookie's content.
    pub fn is_authenticated(&self) -> bool {
        self.store.account_cookie().is_some()
    }

    /// The account stored in the authentication cookie, if present and
    /// well-formed. Malformed content is logged and treated as anonymous.
    pub fn authenticated_account(&self) -> Option<Account> {
        let raw = self.store.account_cookie()?;
        match serde_json::from_str::<Account>(&raw) {
            Ok(account) => Some(account),
            Err(err) => {
                log::warn!("malformed account cookie: {err}");
                None
            }
        }
    }

    /// Submit credentials. On success: persist the account cookie, refresh
    /// the full-account cache, then resolve pending navigation — a recorded
    /// back target wins over the generic back requested by `navigate_back`.
    ///
    /// A response superseded by a newer request writes nothing and reports
    /// [`SessionError::Superseded`].
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidCredentials`] when the server rejects the
    /// credentials or is unreachable.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        navigate_back: bool,
    ) -> Result<&'static str, SessionError> {
        let generation = self.state.borrow_mut().begin_request();
        let account = match self.api.login(email, password).await {
            Ok(account) => account,
            Err(err) => {
                log::warn!("login rejected: {err}");
                return Err(SessionError::InvalidCredentials);
            }
        };
        if !self.state.borrow().is_current(generation) {
            return Err(SessionError::Superseded);
        }

        match serde_json::to_string(&account) {
            Ok(json) => self.store.set_account_cookie(&json),
            Err(err) => {
                log::warn!("failed to serialize account cookie: {err}");
                return Err(SessionError::InvalidCredentials);
            }
        }

        // Warm the full-account cache; a failed refresh does not fail the
        // login itself.
        if let Err(err) = self.fetch_full_account(&account.email).await {
            log::warn!("full-account refresh after login failed: {err}");
        }

        let back_to = self.state.borrow_mut().take_back_target();
        if let Some(path) = back_to {
            self.nav.goto(&path);
        } else if navigate_back {
            self.nav.back();
        }
        Ok(MSG_LOGIN_OK)
    }

    /// End the session. On success: clear the cookie, the in-memory cache,
    /// and the localStorage mirror, then optionally navigate back.
    ///
    /// # Errors
    ///
    /// [`SessionError::LogoutFailed`] when the server rejects the logout;
    /// session state is left untouched so a rejected logout never looks
    /// like a successful one client-side.
    pub async fn logout(&self, navigate_back: bool) -> Result<(), SessionError> {
        if let Err(err) = self.api.logout().await {
            log::error!("Logout failure! ({err})");
            return Err(SessionError::LogoutFailed);
        }
        self.store.clear_account_cookie();
        self.store.clear_cached_full_account();
        {
            let mut state = self.state.borrow_mut();
            state.full_account = None;
            // A late full-account response must not resurrect the cache.
            state.invalidate_inflight();
        }
        if navigate_back {
            self.nav.back();
        }
        Ok(())
    }

    /// Create an account, then immediately log in with the same
    /// credentials. On that nested login's success, navigate to the
    /// settings view.
    ///
    /// # Errors
    ///
    /// [`SessionError::RegistrationFailed`] when the registration request
    /// is rejected; otherwise whatever the nested login reports.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        last_name: &str,
        first_name: &str,
    ) -> Result<&'static str, SessionError> {
        let request = RegisterRequest {
            password: password.to_owned(),
            email: email.to_owned(),
            last_name: last_name.to_owned(),
            first_name: first_name.to_owned(),
        };
        if let Err(err) = self.api.register(&request).await {
            log::warn!("registration rejected: {err}");
            return Err(SessionError::RegistrationFailed);
        }
        let message = self.login(email, password, false).await?;
        self.nav.goto(SETTINGS_PATH);
        Ok(message)
    }

    /// Submit a profile edit. With `refresh_cache`, a successful update
    /// re-fetches the full account so the cache matches the server; a
    /// failed refresh is logged and does not fail the update.
    ///
    /// # Errors
    ///
    /// [`SessionError::ProfileUpdateFailed`] when the update is rejected.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
        refresh_cache: bool,
    ) -> Result<&'static str, SessionError> {
        self.submit_update(update, refresh_cache).await?;
        Ok(MSG_PROFILE_UPDATED)
    }

    /// Credit an account balance through the shared update endpoint.
    ///
    /// # Errors
    ///
    /// [`SessionError::ProfileUpdateFailed`] when the update is rejected.
    pub async fn credit_profile(
        &self,
        account: &FullAccount,
        credit: f64,
        refresh_cache: bool,
    ) -> Result<&'static str, SessionError> {
        let update = ProfileUpdate {
            account_id: account.id,
            credit: Some(credit),
            ..ProfileUpdate::default()
        };
        self.submit_update(&update, refresh_cache).await?;
        Ok(MSG_ACCOUNT_CREDITED)
    }

    async fn submit_update(
        &self,
        update: &ProfileUpdate,
        refresh_cache: bool,
    ) -> Result<(), SessionError> {
        if let Err(err) = self.api.update_profile(update).await {
            log::warn!("profile update rejected: {err}");
            return Err(SessionError::ProfileUpdateFailed);
        }
        if refresh_cache {
            if let Err(err) = self.full_account().await {
                log::warn!("full-account refresh after update failed: {err}");
            }
        }
        Ok(())
    }

    /// Cache-first full-account accessor.
    ///
    /// Resolution order: in-memory cache, then the localStorage copy, then
    /// the authenticated cookie — each re-validated against the server by
    /// email. With none of the three, reports `Ok(None)` without a network
    /// call. Every successful fetch overwrites the cache and its
    /// localStorage mirror.
    ///
    /// # Errors
    ///
    /// [`SessionError::AccountFetchFailed`] when the fetch is rejected,
    /// [`SessionError::Superseded`] when a newer request has begun since.
    pub async fn full_account(&self) -> Result<Option<FullAccount>, SessionError> {
        let mut email = self
            .state
            .borrow()
            .full_account
            .as_ref()
            .map(|full| full.email.clone());

        if email.is_none() {
            if let Some(raw) = self.store.cached_full_account() {
                match serde_json::from_str::<FullAccount>(&raw) {
                    Ok(full) => {
                        email = Some(full.email.clone());
                        self.state.borrow_mut().full_account = Some(full);
                    }
                    Err(err) => {
                        log::warn!("evicting malformed full-account cache entry: {err}");
                        self.store.clear_cached_full_account();
                    }
                }
            }
        }

        if email.is_none() {
            email = self.authenticated_account().map(|account| account.email);
        }

        let Some(email) = email else {
            return Ok(None);
        };
        self.fetch_full_account(&email).await.map(Some)
    }

    /// Whether the current account has elevated privilege.
    ///
    /// Resolves the full account first; anonymous sessions are not staff.
    ///
    /// # Errors
    ///
    /// Propagates the [`full_account`](Self::full_account) failure modes.
    pub async fn is_staff(&self) -> Result<bool, SessionError> {
        let full = self.full_account().await?;
        Ok(full.is_some_and(|account| account.is_staff))
    }

    /// Search accounts by optional name/email filters.
    ///
    /// # Errors
    ///
    /// [`SessionError::SearchFailed`] when the query is rejected.
    pub async fn users(
        &self,
        last_name: Option<&str>,
        first_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Vec<FullAccount>, SessionError> {
        let filter = AccountFilter {
            first_name: first_name.map(str::to_owned),
            last_name: last_name.map(str::to_owned),
            email: email.map(str::to_owned),
        };
        self.api.search_accounts(&filter).await.map_err(|err| {
            log::warn!("account search failed: {err}");
            SessionError::SearchFailed
        })
    }

    /// Record `path` as the back target and navigate to the login view.
    /// The target is consumed by the next successful login.
    pub fn goto_login_and_back_to(&self, path: &str) {
        self.state.borrow_mut().back_to = Some(path.to_owned());
        self.nav.goto(LOGIN_PATH);
    }

    /// Generic back-navigation, for pages that must bounce an already
    /// signed-in visitor away.
    pub fn navigate_back(&self) {
        self.nav.back();
    }

    /// Select the visible settings section, clearing every other flag.
    pub fn set_display_section(&self, section: Section) {
        self.state.borrow_mut().display.select(section);
    }

    /// The current display-section flags. Exactly one is true.
    pub fn display_states(&self) -> DisplayStates {
        self.state.borrow().display
    }

    /// Fetch the full record for `email`, overwriting the in-memory cache
    /// and the localStorage mirror unless a newer request has begun since.
    async fn fetch_full_account(&self, email: &str) -> Result<FullAccount, SessionError> {
        let generation = self.state.borrow_mut().begin_request();
        let full = match self.api.full_account(email).await {
            Ok(full) => full,
            Err(err) => {
                log::warn!("full-account fetch failed: {err}");
                return Err(SessionError::AccountFetchFailed);
            }
        };
        {
            let mut state = self.state.borrow_mut();
            if !state.is_current(generation) {
                return Err(SessionError::Superseded);
            }
            state.full_account = Some(full.clone());
        }
        match serde_json::to_string(&full) {
            Ok(json) => self.store.set_cached_full_account(&json),
            Err(err) => log::warn!("failed to mirror full account to storage: {err}"),
        }
        Ok(full)
    }
}
