use serde::{Deserialize, Serialize};

use super::role::Role;

/// Application-level user record, as returned by the backend.
///
/// Distinct from the identity provider's account: `external_id` links the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub name: String,

    pub email: String,

    pub role: Role,

    #[serde(
        rename = "telefone",
        alias = "phone",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,

    #[serde(
        rename = "avatar",
        alias = "avatarUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<String>,

    /// Identity provider uid; empty or absent for pre-provisioned staff
    #[serde(rename = "firebase_uid", default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl Profile {
    /// First name, used in headers and greetings.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Up to two uppercase initials for avatar placeholders.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase();
        if initials.is_empty() {
            "US".to_string()
        } else {
            initials
        }
    }
}
