use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::user::AuthUser;

/// Display name used when the account has none.
pub const DEFAULT_NAME: &str = "User";

/// Avatar shown until the user uploads one.
pub const PLACEHOLDER_AVATAR: &str = "https://randomuser.me/api/portraits/lego/1.jpg";

/// Stored form of the `users/{uid}` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileDocument {
    /// Initial document for an account.
    pub fn initial(user: &AuthUser, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: user.email.clone(),
            profile_image: Some(PLACEHOLDER_AVATAR.to_string()),
            created_at: Some(Utc::now()),
        }
    }
}

/// A user's profile as shown to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub uid: String,
    pub email: Option<String>,
    pub name: String,
    pub profile_image: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Combines the stored document with the account's auth record.
    /// Missing fields fall back to the defaults.
    pub fn from_document(
        uid: impl Into<String>,
        email: Option<String>,
        doc: ProfileDocument,
    ) -> Self {
        Self {
            uid: uid.into(),
            email: email.or(doc.email),
            name: doc
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            profile_image: doc
                .profile_image
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
            created_at: doc.created_at,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;
        if let Some(email) = &self.email {
            writeln!(f, "Email:  {}", email)?;
        }
        writeln!(f, "Avatar: {}", self.profile_image)?;
        if let Some(created) = self.created_at {
            writeln!(f, "Member since: {}", created.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}
