//! Identity Toolkit accounts and secure-token refresh.

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{error_message, Credential, Firebase};
use crate::local_store::LocalStore;
use crate::models::AuthUser;
use crate::remote::{AuthService, RemoteError};

/// Used when the service omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Response of the token endpoint, which uses snake_case.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

fn lifetime(expires_in: Option<&str>) -> Duration {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Duration::seconds(secs)
}

impl AccountResponse {
    fn into_credential(self) -> Credential {
        let expires_at = Utc::now() + lifetime(self.expires_in.as_deref());
        Credential {
            user: AuthUser {
                uid: self.local_id,
                email: self.email,
                display_name: self.display_name.filter(|n| !n.is_empty()),
            },
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Maps an Identity Toolkit error message to the client SDK's error code.
///
/// Messages can carry a detail suffix, e.g.
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
pub(crate) fn map_auth_error(raw: &str) -> RemoteError {
    let reason = raw.split(':').next().unwrap_or(raw).trim();
    let code = match reason {
        "EMAIL_EXISTS" => "auth/email-already-in-use",
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            "auth/invalid-credential"
        }
        "INVALID_EMAIL" => "auth/invalid-email",
        "MISSING_PASSWORD" => "auth/missing-password",
        "WEAK_PASSWORD" => "auth/weak-password",
        "USER_DISABLED" => "auth/user-disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests",
        "OPERATION_NOT_ALLOWED" => "auth/operation-not-allowed",
        "TOKEN_EXPIRED" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => "auth/requires-recent-login",
        "INVALID_ID_TOKEN" | "USER_NOT_FOUND" | "INVALID_REFRESH_TOKEN" => {
            "auth/user-token-expired"
        }
        _ => "auth/internal-error",
    };
    RemoteError::Auth {
        code: code.to_string(),
        message: format!("Firebase: Error ({}).", code),
    }
}

impl<S: LocalStore> Firebase<S> {
    fn accounts_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.config.auth_url,
            method,
            urlencoding::encode(&self.config.api_key)
        )
    }

    /// Posts to an accounts endpoint, mapping failures to auth codes.
    async fn call_accounts(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<AccountResponse, RemoteError> {
        let response = self
            .http
            .post(self.accounts_url(method))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            tracing::debug!("accounts:{} failed: {}", method, message);
            return Err(map_auth_error(&message));
        }

        Ok(response.json().await?)
    }

    pub(super) async fn refresh(&self, current: Credential) -> Result<Credential, RemoteError> {
        let url = format!(
            "{}/token?key={}",
            self.config.token_url,
            urlencoding::encode(&self.config.api_key)
        );
        let response = self
            .http
            .post(url)
            .json(&json!({
                "grant_type": "refresh_token",
                "refresh_token": current.refresh_token,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_auth_error(&error_message(status, &text)));
        }

        let refreshed: RefreshResponse = response.json().await?;
        Ok(Credential {
            user: current.user,
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Utc::now() + lifetime(refreshed.expires_in.as_deref()),
        })
    }
}

impl<S: LocalStore> AuthService for Firebase<S> {
    fn current_user(&self) -> Option<AuthUser> {
        self.cached_credential().map(|c| c.user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, RemoteError> {
        let credential = self
            .call_accounts(
                "signUp",
                json!({"email": email, "password": password, "returnSecureToken": true}),
            )
            .await?
            .into_credential();
        let user = credential.user.clone();
        self.store_credential(Some(credential))?;
        tracing::info!("Created account {}", user.uid);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, RemoteError> {
        let credential = self
            .call_accounts(
                "signInWithPassword",
                json!({"email": email, "password": password, "returnSecureToken": true}),
            )
            .await?
            .into_credential();
        let user = credential.user.clone();
        self.store_credential(Some(credential))?;
        tracing::info!("Signed in as {}", user.uid);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        // Tokens are stateless; forgetting them ends the session.
        self.store_credential(None)
    }

    async fn update_password(&self, new_password: &str) -> Result<(), RemoteError> {
        let token = self.require_id_token().await?;
        let previous = self.cached_credential().ok_or(RemoteError::NotAuthenticated)?;

        let mut credential = self
            .call_accounts(
                "update",
                json!({"idToken": token, "password": new_password, "returnSecureToken": true}),
            )
            .await?
            .into_credential();
        // The update response omits the display name.
        if credential.user.display_name.is_none() {
            credential.user.display_name = previous.user.display_name;
        }
        self.store_credential(Some(credential))
    }
}
