//! Session state shared between the controller and the UI shell.
//!
//! The controller owns the only [`SessionWriter`]; everybody else holds a
//! [`SessionView`], a read-only handle that can be polled or awaited.
//!
//! Writes carry a generation number. Every identity event and every forced
//! reset bumps it, and a write tagged with an older generation is dropped.
//! This keeps a slow profile fetch from resurrecting a session that was
//! signed out while the request was in flight.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::error::{BarberLinkError, Result};
use crate::models::Profile;

/// What is known about the signed-in user.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UserState {
    /// No profile loaded yet (signed out, or first fetch pending or failed)
    #[default]
    Unresolved,

    /// Profile loaded by the most recent fetch
    Resolved(Profile),

    /// A later fetch failed; `profile` is the last good copy
    Stale { profile: Profile, error: String },
}

impl UserState {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            UserState::Unresolved => None,
            UserState::Resolved(profile) | UserState::Stale { profile, .. } => Some(profile),
        }
    }

    fn profile_mut(&mut self) -> Option<&mut Profile> {
        match self {
            UserState::Unresolved => None,
            UserState::Resolved(profile) | UserState::Stale { profile, .. } => Some(profile),
        }
    }

    /// Keep the current profile, marked stale by `error`.
    fn into_stale(self, error: String) -> Self {
        match self {
            UserState::Unresolved => UserState::Unresolved,
            UserState::Resolved(profile) | UserState::Stale { profile, .. } => {
                UserState::Stale { profile, error }
            },
        }
    }
}

/// Snapshot of the authenticated session.
///
/// Invariant: a loaded profile (resolved or stale) implies a token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: UserState,
    loading: bool,
}

impl Session {
    /// State at startup, before the provider has reported anything.
    pub fn starting() -> Self {
        Self {
            token: None,
            user: UserState::Unresolved,
            loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            token: None,
            user: UserState::Unresolved,
            loading: false,
        }
    }

    /// Fully resolved session.
    pub fn authenticated(token: impl Into<String>, profile: Profile) -> Self {
        Self {
            token: Some(token.into()),
            user: UserState::Resolved(profile),
            loading: false,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Current profile, stale or not.
    pub fn user(&self) -> Option<&Profile> {
        self.user.profile()
    }

    pub fn user_state(&self) -> &UserState {
        &self.user
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// `true` when the shown profile failed to refresh.
    pub fn is_stale(&self) -> bool {
        matches!(self.user, UserState::Stale { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Anything worth announcing a sign-out for.
    pub(crate) fn is_live(&self) -> bool {
        self.token.is_some() || self.user.profile().is_some()
    }

    // ── Mutations (controller only) ───────────────────────────────────

    pub(crate) fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn resolve(&mut self, profile: Profile) {
        debug_assert!(self.token.is_some(), "profile without token");
        self.user = UserState::Resolved(profile);
        self.loading = false;
    }

    pub(crate) fn mark_stale(&mut self, error: String) {
        self.user = std::mem::take(&mut self.user).into_stale(error);
        self.loading = false;
    }

    /// Drop a profile that belongs to a different account.
    pub(crate) fn forget_other_user(&mut self, external_id: &str) {
        let belongs_to_other = self
            .user
            .profile()
            .and_then(|profile| profile.external_id.as_deref())
            .is_some_and(|id| id != external_id);
        if belongs_to_other {
            self.user = UserState::Unresolved;
        }
    }

    pub(crate) fn profile_mut(&mut self) -> Option<&mut Profile> {
        self.user.profile_mut()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::starting()
    }
}

/// Read-only handle on the session.
#[derive(Debug, Clone)]
pub struct SessionView {
    rx: watch::Receiver<Session>,
}

impl SessionView {
    /// Current snapshot.
    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return it.
    ///
    /// Returns `Cancelled` once the controller is gone.
    pub async fn changed(&mut self) -> Result<Session> {
        self.rx
            .changed()
            .await
            .map_err(|_| BarberLinkError::Cancelled)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until `predicate` holds, checking the current value first.
    pub async fn wait_until(
        &mut self,
        predicate: impl FnMut(&Session) -> bool,
    ) -> Result<Session> {
        self.rx
            .wait_for(predicate)
            .await
            .map(|session| session.clone())
            .map_err(|_| BarberLinkError::Cancelled)
    }
}

/// The single writer of the session.
pub(crate) struct SessionWriter {
    tx: watch::Sender<Session>,
    generation: AtomicU64,
}

impl SessionWriter {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(Session::starting());
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn view(&self) -> SessionView {
        SessionView {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new generation, invalidating work tagged with older ones.
    pub(crate) fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply `f` if `generation` is still current. Returns whether it ran.
    ///
    /// The check and the write happen under the channel lock, so a
    /// concurrent [`reset`](Self::reset) either lands first and wins or
    /// lands after and overwrites.
    pub(crate) fn commit(&self, generation: u64, f: impl FnOnce(&mut Session)) -> bool {
        self.tx.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            f(session);
            true
        })
    }

    /// Apply `f` regardless of generation; `f` reports whether it changed
    /// anything.
    pub(crate) fn modify(&self, f: impl FnOnce(&mut Session) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Bump the generation and reset to signed-out, running `on_reset`
    /// under the same lock. Returns the previous session.
    pub(crate) fn reset(&self, on_reset: impl FnOnce()) -> Session {
        let mut previous = Session::signed_out();
        self.tx.send_modify(|session| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            on_reset();
            previous = std::mem::replace(session, Session::signed_out());
        });
        previous
    }
}
