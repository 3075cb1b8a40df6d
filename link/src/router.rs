//! Route Guard.
//!
//! Decides where the shell should be based on the session and the route it
//! is currently showing. [`decide`] is a pure function over
//! ([`AuthState`], [`Route`]); [`RouteGuard`] wraps it to suppress repeated
//! redirects while the navigation is still in flight.
//!
//! | state                | allowed areas        | otherwise            |
//! |----------------------|----------------------|----------------------|
//! | Unknown              | -                    | Loading              |
//! | Unauthenticated      | `(auth)`             | `/(auth)/login`      |
//! | AuthenticatedStaff   | `(admin)`, `agendar` | `/(admin)/dashboard` |
//! | AuthenticatedClient  | `(tabs)`, `agendar`  | `/(tabs)`            |

use std::fmt;

use crate::session::Session;

pub const LOGIN_PATH: &str = "/(auth)/login";
pub const ADMIN_HOME_PATH: &str = "/(admin)/dashboard";
pub const CLIENT_HOME_PATH: &str = "/(tabs)";

/// Authentication state as far as routing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthState {
    Unknown,
    Unauthenticated,
    AuthenticatedStaff,
    AuthenticatedClient,
}

impl AuthState {
    pub fn from_session(session: &Session) -> Self {
        if session.is_loading() {
            return AuthState::Unknown;
        }
        match session.user() {
            None => AuthState::Unauthenticated,
            Some(profile) if profile.role.is_staff() => AuthState::AuthenticatedStaff,
            Some(_) => AuthState::AuthenticatedClient,
        }
    }
}

/// Top-level route group, taken from the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteArea {
    /// `(auth)`: login, register, password reset
    Auth,
    /// `(admin)`: staff panel
    Admin,
    /// `(tabs)`: client home
    Tabs,
    /// `agendar`: booking flow, open to every signed-in role
    Booking,
    Other,
}

impl RouteArea {
    fn from_segment(segment: Option<&str>) -> Self {
        match segment {
            Some("(auth)") => RouteArea::Auth,
            Some("(admin)") => RouteArea::Admin,
            Some("(tabs)") => RouteArea::Tabs,
            Some("agendar") => RouteArea::Booking,
            _ => RouteArea::Other,
        }
    }
}

/// A parsed route path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    segments: Vec<String>,
    area: RouteArea,
}

impl Route {
    /// Parse a path such as `/(admin)/dashboard` or `agendar/64a1?x=1`.
    ///
    /// Query strings and fragments are ignored; empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        let area = RouteArea::from_segment(segments.first().map(String::as_str));
        Self { segments, area }
    }

    pub fn login() -> Self {
        Self::parse(LOGIN_PATH)
    }

    pub fn admin_home() -> Self {
        Self::parse(ADMIN_HOME_PATH)
    }

    pub fn client_home() -> Self {
        Self::parse(CLIENT_HOME_PATH)
    }

    pub fn area(&self) -> RouteArea {
        self.area
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Normalized path, always starting with `/`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading; show a spinner
    Loading,
    /// Route is allowed
    Stay,
    /// Navigate to the given route
    Redirect(Route),
}

/// Pure routing decision.
pub fn decide(state: AuthState, route: &Route) -> GuardDecision {
    let area = route.area();
    match state {
        AuthState::Unknown => GuardDecision::Loading,
        AuthState::Unauthenticated if area != RouteArea::Auth => {
            GuardDecision::Redirect(Route::login())
        },
        AuthState::AuthenticatedStaff
            if !matches!(area, RouteArea::Admin | RouteArea::Booking) =>
        {
            GuardDecision::Redirect(Route::admin_home())
        },
        AuthState::AuthenticatedClient
            if !matches!(area, RouteArea::Tabs | RouteArea::Booking) =>
        {
            GuardDecision::Redirect(Route::client_home())
        },
        _ => GuardDecision::Stay,
    }
}

/// Stateful wrapper around [`decide`] that emits each redirect once.
///
/// The shell calls [`evaluate`](RouteGuard::evaluate) on every session or
/// route change. While a redirect to a target is pending under the same
/// state, the guard answers `Stay` instead of issuing it again. The pending
/// redirect is forgotten when the state changes or the route becomes
/// allowed.
#[derive(Debug, Default)]
pub struct RouteGuard {
    pending: Option<(AuthState, Route)>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, state: AuthState, route: &Route) -> GuardDecision {
        match decide(state, route) {
            GuardDecision::Redirect(target) => {
                if let Some((pending_state, pending_target)) = &self.pending {
                    if *pending_state == state && *pending_target == target {
                        return GuardDecision::Stay;
                    }
                }
                log::debug!("[ROUTER] {:?} at {} -> {}", state, route, target);
                self.pending = Some((state, target.clone()));
                GuardDecision::Redirect(target)
            },
            decision => {
                self.pending = None;
                decision
            },
        }
    }

    /// Convenience over [`evaluate`](Self::evaluate) for a session snapshot.
    pub fn evaluate_session(&mut self, session: &Session, route: &Route) -> GuardDecision {
        self.evaluate(AuthState::from_session(session), route)
    }

    /// Redirect issued and not yet settled, if any.
    pub fn pending_redirect(&self) -> Option<&Route> {
        self.pending.as_ref().map(|(_, route)| route)
    }
}
