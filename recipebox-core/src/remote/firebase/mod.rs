//! REST client for the hosted Firebase services.
//!
//! One [`Firebase`] value implements all four remote traits:
//!
//! - auth via the Identity Toolkit API, with ID token refresh
//! - documents via the Firestore REST API
//! - the real-time tree via the Realtime Database REST API, with live
//!   updates streamed as server-sent events
//! - blobs via the Cloud Storage for Firebase REST API
//!
//! The signed-in credential is persisted in a [`LocalStore`] under
//! [`AUTH_USER_KEY`], so a session survives process restarts.
//!
//! Every endpoint base URL can be overridden, which is how the emulator
//! suite and local test servers are targeted.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::RemoteError;
use crate::local_store::{FileStore, LocalStore};
use crate::models::AuthUser;

mod auth;
mod database;
mod firestore;
mod storage;

/// Local storage key of the persisted credential.
pub const AUTH_USER_KEY: &str = "authUser";

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Project settings and endpoint bases.
#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    /// e.g. `https://my-app-default-rtdb.firebaseio.com`
    pub database_url: String,
    /// e.g. `my-app.appspot.com`
    pub storage_bucket: String,
    pub auth_url: String,
    pub token_url: String,
    pub firestore_url: String,
    pub storage_url: String,
}

impl FirebaseConfig {
    pub fn new(
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        database_url: impl Into<String>,
        storage_bucket: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            database_url: trim_base(database_url.into()),
            storage_bucket: storage_bucket.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
        }
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = trim_base(url.into());
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = trim_base(url.into());
        self
    }

    pub fn with_firestore_url(mut self, url: impl Into<String>) -> Self {
        self.firestore_url = trim_base(url.into());
        self
    }

    pub fn with_storage_url(mut self, url: impl Into<String>) -> Self {
        self.storage_url = trim_base(url.into());
        self
    }

    /// Resource name prefix of every Firestore document.
    pub fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Signed-in account plus the tokens that authorize requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credential {
    user: AuthUser,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    fn needs_refresh(&self) -> bool {
        self.expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) <= Utc::now()
    }
}

/// Client for the hosted backend.
#[derive(Clone)]
pub struct Firebase<S: LocalStore = FileStore> {
    config: Arc<FirebaseConfig>,
    http: reqwest::Client,
    store: S,
    credential: Arc<Mutex<Option<Credential>>>,
}

impl<S: LocalStore> Firebase<S> {
    /// Creates a client, restoring any credential persisted in `store`.
    pub fn new(config: FirebaseConfig, store: S) -> Self {
        let credential = match store.get_item(AUTH_USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Credential>(&raw) {
                Ok(credential) => Some(credential),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable stored credential: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read stored credential: {}", e);
                None
            }
        };

        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            store,
            credential: Arc::new(Mutex::new(credential)),
        }
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    fn cached_credential(&self) -> Option<Credential> {
        self.credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the in-memory credential and mirrors it to local storage.
    fn store_credential(&self, credential: Option<Credential>) -> Result<(), RemoteError> {
        let persisted = match &credential {
            Some(c) => {
                let raw = serde_json::to_string(c).map_err(|e| RemoteError::Decode(e.to_string()))?;
                self.store.set_item(AUTH_USER_KEY, &raw)
            }
            None => self.store.remove_item(AUTH_USER_KEY),
        };
        *self.credential.lock().unwrap_or_else(PoisonError::into_inner) = credential;
        persisted.map_err(|e| RemoteError::Backend(e.to_string()))
    }

    /// Current ID token, refreshed when close to expiry. `None` when
    /// nobody is signed in.
    async fn id_token(&self) -> Result<Option<String>, RemoteError> {
        let Some(credential) = self.cached_credential() else {
            return Ok(None);
        };
        if !credential.needs_refresh() {
            return Ok(Some(credential.id_token));
        }

        tracing::debug!("Refreshing ID token for {}", credential.user.uid);
        let refreshed = self.refresh(credential).await?;
        let token = refreshed.id_token.clone();
        self.store_credential(Some(refreshed))?;
        Ok(Some(token))
    }

    async fn require_id_token(&self) -> Result<String, RemoteError> {
        self.id_token().await?.ok_or(RemoteError::NotAuthenticated)
    }

    /// Adds a bearer token when someone is signed in.
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        Ok(match self.id_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { message: String },
    Plain(String),
}

/// Extracts the service's error message from a response body, falling
/// back to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Detailed { message },
        })
        | Ok(ErrorEnvelope {
            error: ErrorBody::Plain(message),
        }) => message,
        Err(_) => format!("Server returned status {}", status),
    }
}

/// Passes successful responses through and turns the rest into
/// [`RemoteError::Backend`].
async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Backend(error_message(status, &body)))
}
