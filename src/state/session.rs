#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::FullAccount;

/// In-memory session state owned by the session service.
///
/// The authenticated account itself is NOT held here: authentication is
/// keyed solely on cookie presence and re-read from the store on every
/// check. This struct carries the transient pieces — the full-account
/// cache, the pending back-navigation target, the display-section
/// selector, and the request generation counter.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub full_account: Option<FullAccount>,
    pub back_to: Option<String>,
    pub display: DisplayStates,
    generation: u64,
}

impl SessionState {
    /// Start a state-mutating request: bump the generation counter and
    /// return the generation the request should check against before
    /// applying its response.
    pub fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Whether a response captured at `generation` is still the newest
    /// request. Late responses must not clobber state set by a newer one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Invalidate every in-flight request without starting a new one.
    /// Used on logout so a late full-account response cannot resurrect
    /// a cache that was just cleared.
    pub fn invalidate_inflight(&mut self) {
        self.generation += 1;
    }

    /// Consume the pending back-navigation target, if any.
    /// Reading clears it: the target resolves exactly once.
    pub fn take_back_target(&mut self) -> Option<String> {
        self.back_to.take()
    }
}

/// Which settings section is visible. Exactly one flag is true at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayStates {
    pub profile: bool,
    pub lessons: bool,
    pub historic: bool,
}

impl Default for DisplayStates {
    fn default() -> Self {
        Self {
            profile: true,
            lessons: false,
            historic: false,
        }
    }
}

impl DisplayStates {
    /// Select `section`, clearing every other flag.
    pub fn select(&mut self, section: Section) {
        self.profile = section == Section::Profile;
        self.lessons = section == Section::Lessons;
        self.historic = section == Section::Historic;
    }
}

/// Settings sections selectable through [`DisplayStates`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Profile,
    Lessons,
    Historic,
}
