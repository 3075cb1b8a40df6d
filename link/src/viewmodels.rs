//! View models for screens that only present session data.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::controller::SessionController;
use crate::error::Result;
use crate::models::Role;
use crate::session::Session;

/// Label shown under the name on the profile screen.
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "Administrador",
        Role::Staff => "Barbeiro",
        Role::Client => "Cliente",
    }
}

/// Profile tab contents.
#[derive(Debug)]
pub struct ProfileScreen {
    pub greeting: String,
    pub email: String,
    pub initials: String,
    pub role_label: &'static str,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// Shown data failed to refresh
    pub is_stale: bool,
    signing_out: AtomicBool,
}

impl ProfileScreen {
    /// `None` when there is no profile to show.
    pub fn from_session(session: &Session) -> Option<Self> {
        let profile = session.user()?;
        Some(Self {
            greeting: format!("Olá, {}", profile.name),
            email: profile.email.clone(),
            initials: profile.initials(),
            role_label: role_label(profile.role),
            phone: profile.phone.clone(),
            avatar_url: profile.avatar_url.clone(),
            is_stale: session.is_stale(),
            signing_out: AtomicBool::new(false),
        })
    }

    /// Sign-out button. Presses while a sign-out is running are ignored.
    pub async fn press_sign_out(&self, controller: &SessionController) -> Result<()> {
        if self.signing_out.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let result = controller.sign_out().await;
        self.signing_out.store(false, Ordering::SeqCst);
        result
    }
}
