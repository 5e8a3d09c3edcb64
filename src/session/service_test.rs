use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::task::Context;

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::task::noop_waker;

use super::nav::Navigator;
use super::store::{MemoryStore, SessionStore};
use super::*;
use crate::net::api::ApiError;
use crate::net::types::{Account, AccountFilter, FullAccount, ProfileUpdate, RegisterRequest};
use crate::state::session::Section;

// =============================================================
// Fakes
// =============================================================

/// Scripted in-memory API. Each endpoint succeeds by default; failure
/// toggles and one-shot gates let tests exercise rejection and
/// request-ordering paths.
#[derive(Default)]
struct FakeApi {
    register_ok: Cell<bool>,
    login_ok: Cell<bool>,
    logout_ok: Cell<bool>,
    update_ok: Cell<bool>,
    full_ok: Cell<bool>,
    search_ok: Cell<bool>,
    staff: Cell<bool>,

    // Taken by the next login/full-account call; the response is held
    // until the paired sender fires.
    login_gate: RefCell<Option<oneshot::Receiver<()>>>,
    full_gate: RefCell<Option<oneshot::Receiver<()>>>,

    register_calls: Cell<u32>,
    login_calls: Cell<u32>,
    logout_calls: Cell<u32>,
    update_calls: Cell<u32>,
    full_calls: Cell<u32>,
    search_calls: Cell<u32>,

    last_full_email: RefCell<Option<String>>,
    last_update: RefCell<Option<ProfileUpdate>>,
    search_results: RefCell<Vec<FullAccount>>,
}

impl FakeApi {
    fn all_ok() -> Rc<Self> {
        let api = Self::default();
        api.register_ok.set(true);
        api.login_ok.set(true);
        api.logout_ok.set(true);
        api.update_ok.set(true);
        api.full_ok.set(true);
        api.search_ok.set(true);
        Rc::new(api)
    }
}

fn account(email: &str) -> Account {
    Account {
        id: 1,
        email: email.to_owned(),
        first_name: "F".to_owned(),
        last_name: "L".to_owned(),
    }
}

fn full_account(email: &str, is_staff: bool) -> FullAccount {
    FullAccount {
        id: 1,
        email: email.to_owned(),
        first_name: "F".to_owned(),
        last_name: "L".to_owned(),
        is_staff,
        credit: 10.0,
    }
}

impl AuthApi for FakeApi {
    async fn register(&self, _request: &RegisterRequest) -> Result<(), ApiError> {
        self.register_calls.set(self.register_calls.get() + 1);
        if self.register_ok.get() {
            Ok(())
        } else {
            Err(ApiError::Status(400))
        }
    }

    async fn login(&self, email: &str, _password: &str) -> Result<Account, ApiError> {
        self.login_calls.set(self.login_calls.get() + 1);
        let gate = self.login_gate.borrow_mut().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        if self.login_ok.get() {
            Ok(account(email))
        } else {
            Err(ApiError::Status(401))
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.set(self.logout_calls.get() + 1);
        if self.logout_ok.get() {
            Ok(())
        } else {
            Err(ApiError::Status(500))
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.update_calls.set(self.update_calls.get() + 1);
        *self.last_update.borrow_mut() = Some(update.clone());
        if self.update_ok.get() {
            Ok(())
        } else {
            Err(ApiError::Status(500))
        }
    }

    async fn full_account(&self, email: &str) -> Result<FullAccount, ApiError> {
        self.full_calls.set(self.full_calls.get() + 1);
        *self.last_full_email.borrow_mut() = Some(email.to_owned());
        let gate = self.full_gate.borrow_mut().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        if self.full_ok.get() {
            Ok(full_account(email, self.staff.get()))
        } else {
            Err(ApiError::Status(500))
        }
    }

    async fn search_accounts(&self, _filter: &AccountFilter) -> Result<Vec<FullAccount>, ApiError> {
        self.search_calls.set(self.search_calls.get() + 1);
        if self.search_ok.get() {
            Ok(self.search_results.borrow().clone())
        } else {
            Err(ApiError::Status(500))
        }
    }
}

/// Navigator that records every move instead of touching the browser.
#[derive(Default)]
struct RecordingNavigator {
    gotos: RefCell<Vec<String>>,
    backs: Cell<u32>,
}

impl Navigator for RecordingNavigator {
    fn goto(&self, path: &str) {
        self.gotos.borrow_mut().push(path.to_owned());
    }

    fn back(&self) {
        self.backs.set(self.backs.get() + 1);
    }
}

type TestSession = SessionService<Rc<FakeApi>, Rc<MemoryStore>, Rc<RecordingNavigator>>;

fn session() -> (TestSession, Rc<FakeApi>, Rc<MemoryStore>, Rc<RecordingNavigator>) {
    let api = FakeApi::all_ok();
    let store = Rc::new(MemoryStore::default());
    let nav = Rc::new(RecordingNavigator::default());
    let service = SessionService::new(Rc::clone(&api), Rc::clone(&store), Rc::clone(&nav));
    (service, api, store, nav)
}

fn goto_count(nav: &RecordingNavigator, path: &str) -> usize {
    nav.gotos.borrow().iter().filter(|p| *p == path).count()
}

// =============================================================
// Authentication state
// =============================================================

#[test]
fn anonymous_session_is_not_authenticated() {
    let (service, _api, _store, _nav) = session();
    assert!(!service.is_authenticated());
    assert!(service.authenticated_account().is_none());
}

#[test]
fn login_success_sets_cookie_and_account() {
    let (service, api, store, _nav) = session();
    let message = block_on(service.login("a@x.com", "pw", false)).expect("login");
    assert_eq!(message, MSG_LOGIN_OK);

    assert!(service.is_authenticated());
    let current = service.authenticated_account().expect("account");
    assert_eq!(current.email, "a@x.com");

    // Login warms the full-account cache and its localStorage mirror.
    assert_eq!(api.full_calls.get(), 1);
    assert!(store.cached_full_account().is_some());
}

#[test]
fn login_failure_writes_nothing() {
    let (service, api, store, nav) = session();
    api.login_ok.set(false);

    let err = block_on(service.login("a@x.com", "bad", true)).expect_err("rejected");
    assert_eq!(err, SessionError::InvalidCredentials);
    assert_eq!(err.to_string(), "Email ou mot de passe invalide");

    assert!(!service.is_authenticated());
    assert!(store.account_cookie().is_none());
    assert_eq!(nav.backs.get(), 0);
}

#[test]
fn malformed_cookie_is_present_but_unreadable() {
    let (service, _api, store, _nav) = session();
    store.set_account_cookie("{not json");

    // Presence is the sole authentication signal; content is not.
    assert!(service.is_authenticated());
    assert!(service.authenticated_account().is_none());
}

// =============================================================
// Logout
// =============================================================

#[test]
fn logout_success_clears_session_state() {
    let (service, api, store, _nav) = session();
    block_on(service.login("a@x.com", "pw", false)).expect("login");

    block_on(service.logout(false)).expect("logout");
    assert!(!service.is_authenticated());
    assert!(store.account_cookie().is_none());
    assert!(store.cached_full_account().is_none());

    // With no cookie and an empty cache, the full account resolves to
    // nothing without touching the network.
    let calls_before = api.full_calls.get();
    let full = block_on(service.full_account()).expect("full account");
    assert!(full.is_none());
    assert_eq!(api.full_calls.get(), calls_before);
}

#[test]
fn logout_failure_leaves_session_untouched() {
    let (service, api, store, nav) = session();
    block_on(service.login("a@x.com", "pw", false)).expect("login");
    api.logout_ok.set(false);

    let err = block_on(service.logout(true)).expect_err("rejected");
    assert_eq!(err, SessionError::LogoutFailed);

    assert!(service.is_authenticated());
    assert!(store.cached_full_account().is_some());
    assert_eq!(nav.backs.get(), 0);
}

#[test]
fn logout_navigates_back_when_requested() {
    let (service, _api, _store, nav) = session();
    block_on(service.login("a@x.com", "pw", false)).expect("login");
    block_on(service.logout(true)).expect("logout");
    assert_eq!(nav.backs.get(), 1);
}

// =============================================================
// Navigation resolution
// =============================================================

#[test]
fn goto_login_and_back_to_navigates_to_login_view() {
    let (service, _api, _store, nav) = session();
    service.goto_login_and_back_to("/cart");
    assert_eq!(nav.gotos.borrow().as_slice(), [LOGIN_PATH]);
}

#[test]
fn back_target_is_consumed_by_exactly_one_login() {
    let (service, _api, _store, nav) = session();
    service.goto_login_and_back_to("/cart");

    block_on(service.login("a@x.com", "pw", true)).expect("login");
    assert_eq!(goto_count(&nav, "/cart"), 1);
    assert_eq!(nav.backs.get(), 0);

    // The target was consumed: a second login falls back to generic back.
    block_on(service.login("a@x.com", "pw", true)).expect("login");
    assert_eq!(goto_count(&nav, "/cart"), 1);
    assert_eq!(nav.backs.get(), 1);
}

#[test]
fn login_without_back_request_stays_put() {
    let (service, _api, _store, nav) = session();
    block_on(service.login("a@x.com", "pw", false)).expect("login");
    assert!(nav.gotos.borrow().is_empty());
    assert_eq!(nav.backs.get(), 0);
}

// =============================================================
// Registration
// =============================================================

#[test]
fn register_logs_in_and_navigates_to_settings() {
    let (service, api, _store, nav) = session();
    let message = block_on(service.register("u@x", "pw", "L", "F")).expect("register");
    assert_eq!(message, MSG_LOGIN_OK);

    assert_eq!(api.register_calls.get(), 1);
    assert_eq!(api.login_calls.get(), 1);
    assert!(service.is_authenticated());
    assert_eq!(nav.gotos.borrow().last().map(String::as_str), Some(SETTINGS_PATH));
}

#[test]
fn register_failure_does_not_attempt_login() {
    let (service, api, _store, nav) = session();
    api.register_ok.set(false);

    let err = block_on(service.register("u@x", "pw", "L", "F")).expect_err("rejected");
    assert_eq!(err, SessionError::RegistrationFailed);
    assert_eq!(err.to_string(), "Echec de l'enregistrement");

    assert_eq!(api.login_calls.get(), 0);
    assert!(!service.is_authenticated());
    assert!(nav.gotos.borrow().is_empty());
}

#[test]
fn register_with_failing_login_does_not_reach_settings() {
    let (service, api, _store, nav) = session();
    api.login_ok.set(false);

    let err = block_on(service.register("u@x", "pw", "L", "F")).expect_err("rejected");
    assert_eq!(err, SessionError::InvalidCredentials);
    assert_eq!(goto_count(&nav, SETTINGS_PATH), 0);
}

// =============================================================
// Full-account resolution
// =============================================================

#[test]
fn full_account_resolves_from_cookie_when_cache_is_cold() {
    let (service, api, store, _nav) = session();
    let json = serde_json::to_string(&account("c@x.com")).expect("serialize");
    store.set_account_cookie(&json);

    let full = block_on(service.full_account()).expect("full account").expect("record");
    assert_eq!(full.email, "c@x.com");
    assert_eq!(api.last_full_email.borrow().as_deref(), Some("c@x.com"));
    assert!(store.cached_full_account().is_some());
}

#[test]
fn full_account_resolves_from_storage_copy_before_cookie() {
    let (service, api, store, _nav) = session();
    let json = serde_json::to_string(&account("cookie@x.com")).expect("serialize");
    store.set_account_cookie(&json);
    let cached = serde_json::to_string(&full_account("stored@x.com", false)).expect("serialize");
    store.set_cached_full_account(&cached);

    block_on(service.full_account()).expect("full account").expect("record");
    assert_eq!(api.last_full_email.borrow().as_deref(), Some("stored@x.com"));
}

#[test]
fn full_account_revalidates_memory_cache_against_server() {
    let (service, api, _store, _nav) = session();
    block_on(service.login("m@x.com", "pw", false)).expect("login");
    assert_eq!(api.full_calls.get(), 1);

    // The cache is never trusted verbatim: each access re-fetches by the
    // cached record's email.
    block_on(service.full_account()).expect("full account").expect("record");
    assert_eq!(api.full_calls.get(), 2);
    assert_eq!(api.last_full_email.borrow().as_deref(), Some("m@x.com"));
}

#[test]
fn full_account_anonymous_reports_none_without_network() {
    let (service, api, _store, _nav) = session();
    let full = block_on(service.full_account()).expect("full account");
    assert!(full.is_none());
    assert_eq!(api.full_calls.get(), 0);
}

#[test]
fn malformed_storage_copy_is_evicted() {
    let (service, api, store, _nav) = session();
    store.set_cached_full_account("{not json");

    let full = block_on(service.full_account()).expect("full account");
    assert!(full.is_none());
    assert!(store.cached_full_account().is_none());
    assert_eq!(api.full_calls.get(), 0);
}

#[test]
fn full_account_fetch_failure_is_observable() {
    let (service, api, store, _nav) = session();
    let json = serde_json::to_string(&account("c@x.com")).expect("serialize");
    store.set_account_cookie(&json);
    api.full_ok.set(false);

    let err = block_on(service.full_account()).expect_err("rejected");
    assert_eq!(err, SessionError::AccountFetchFailed);
}

// =============================================================
// Staff flag
// =============================================================

#[test]
fn is_staff_reflects_fetched_record() {
    let (service, api, store, _nav) = session();
    let json = serde_json::to_string(&account("s@x.com")).expect("serialize");
    store.set_account_cookie(&json);

    api.staff.set(true);
    assert!(block_on(service.is_staff()).expect("staff"));

    api.staff.set(false);
    assert!(!block_on(service.is_staff()).expect("staff"));
}

#[test]
fn is_staff_is_false_for_anonymous_sessions() {
    let (service, _api, _store, _nav) = session();
    assert!(!block_on(service.is_staff()).expect("staff"));
}

// =============================================================
// Profile updates
// =============================================================

#[test]
fn update_profile_reports_success_message() {
    let (service, api, _store, _nav) = session();
    let update = ProfileUpdate {
        account_id: 9,
        first_name: Some("F2".to_owned()),
        ..ProfileUpdate::default()
    };
    let message = block_on(service.update_profile(&update, false)).expect("update");
    assert_eq!(message, MSG_PROFILE_UPDATED);
    assert_eq!(api.update_calls.get(), 1);
    assert_eq!(api.full_calls.get(), 0);
}

#[test]
fn update_profile_failure_reports_message() {
    let (service, api, _store, _nav) = session();
    api.update_ok.set(false);

    let update = ProfileUpdate { account_id: 9, ..ProfileUpdate::default() };
    let err = block_on(service.update_profile(&update, false)).expect_err("rejected");
    assert_eq!(err, SessionError::ProfileUpdateFailed);
    assert_eq!(
        err.to_string(),
        "Une erreur est survenue lors de la mise à jour de votre profil"
    );
}

#[test]
fn update_profile_with_refresh_refetches_cache() {
    let (service, api, store, _nav) = session();
    let json = serde_json::to_string(&account("u@x.com")).expect("serialize");
    store.set_account_cookie(&json);

    let update = ProfileUpdate { account_id: 9, ..ProfileUpdate::default() };
    block_on(service.update_profile(&update, true)).expect("update");
    assert_eq!(api.full_calls.get(), 1);
    assert_eq!(api.last_full_email.borrow().as_deref(), Some("u@x.com"));
}

#[test]
fn credit_profile_sends_credit_only_update() {
    let (service, api, _store, _nav) = session();
    let target = full_account("t@x.com", false);

    let message = block_on(service.credit_profile(&target, 25.0, false)).expect("credit");
    assert_eq!(message, MSG_ACCOUNT_CREDITED);

    let update = api.last_update.borrow().clone().expect("update sent");
    assert_eq!(update.account_id, target.id);
    assert_eq!(update.credit, Some(25.0));
    assert!(update.first_name.is_none());
    assert!(update.email.is_none());
    assert!(update.password.is_none());
}

// =============================================================
// Account search
// =============================================================

#[test]
fn users_returns_search_results() {
    let (service, api, _store, _nav) = session();
    *api.search_results.borrow_mut() = vec![full_account("r@x.com", false)];

    let results = block_on(service.users(Some("L"), None, None)).expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].email, "r@x.com");
    assert_eq!(api.search_calls.get(), 1);
}

#[test]
fn users_failure_is_observable() {
    let (service, api, _store, _nav) = session();
    api.search_ok.set(false);

    let err = block_on(service.users(None, None, Some("a@x"))).expect_err("rejected");
    assert_eq!(err, SessionError::SearchFailed);
}

// =============================================================
// Display sections
// =============================================================

#[test]
fn selecting_a_section_clears_the_others() {
    let (service, _api, _store, _nav) = session();
    service.set_display_section(Section::Lessons);

    let display = service.display_states();
    assert!(!display.profile);
    assert!(display.lessons);
    assert!(!display.historic);
}

// =============================================================
// Request sequencing
// =============================================================

#[test]
fn stale_login_response_cannot_clobber_newer_session() {
    let (service, api, _store, _nav) = session();

    // First login stalls inside the API until released.
    let (release, gate) = oneshot::channel();
    *api.login_gate.borrow_mut() = Some(gate);

    let mut stale = Box::pin(service.login("stale@x.com", "pw", false));
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    assert!(stale.as_mut().poll(&mut cx).is_pending());

    // A second login starts and finishes while the first is in flight.
    block_on(service.login("fresh@x.com", "pw", false)).expect("login");

    release.send(()).expect("release gate");
    let err = block_on(stale).expect_err("stale response discarded");
    assert_eq!(err, SessionError::Superseded);

    let current = service.authenticated_account().expect("account");
    assert_eq!(current.email, "fresh@x.com");
}

#[test]
fn logout_invalidates_inflight_full_account_fetch() {
    let (service, api, store, _nav) = session();
    let json = serde_json::to_string(&account("c@x.com")).expect("serialize");
    store.set_account_cookie(&json);

    let (release, gate) = oneshot::channel();
    *api.full_gate.borrow_mut() = Some(gate);

    let mut pending = Box::pin(service.full_account());
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    assert!(pending.as_mut().poll(&mut cx).is_pending());

    block_on(service.logout(false)).expect("logout");

    release.send(()).expect("release gate");
    let err = block_on(pending).expect_err("stale fetch discarded");
    assert_eq!(err, SessionError::Superseded);

    // The cleared cache stays cleared.
    assert!(store.cached_full_account().is_none());
    let full = block_on(service.full_account()).expect("full account");
    assert!(full.is_none());
}
