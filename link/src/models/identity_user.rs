use serde::{Deserialize, Serialize};

/// Account record held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    /// Stable external id, used to look up the [`Profile`](super::Profile)
    pub uid: String,

    #[serde(default)]
    pub email: Option<String>,
}

impl IdentityUser {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }
}
