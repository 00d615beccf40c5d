//! Remote service facade.
//!
//! The application keeps no persistent state of its own: accounts, profile
//! and recipe documents, favorites, and images all live in a hosted backend.
//! This module defines the four services that backend provides:
//!
//! - [`AuthService`] - email/password accounts and the current user
//! - [`DocumentStore`] - JSON documents addressed by slash-separated paths
//! - [`RealtimeStore`] - a JSON tree with live subscriptions
//! - [`BlobStore`] - binary uploads with public download URLs
//!
//! Two implementations are provided: [`memory::MemoryBackend`], an in-process
//! backend, and [`firebase::Firebase`], a REST client for the hosted
//! service.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::models::AuthUser;
use crate::subscription::Subscription;

pub mod firebase;
pub mod memory;
pub mod paths;
mod tree;

pub use firebase::{Firebase, FirebaseConfig};
pub use memory::{FailOp, MemoryBackend};

/// Errors reported by the remote services.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("No document at '{0}'")]
    NotFound(String),

    /// Auth failure with a code such as `auth/invalid-credential`.
    #[error("{message}")]
    Auth { code: String, message: String },

    /// Blob storage failure with a code such as `storage/unauthorized`.
    #[error("{message}")]
    Storage { code: String, message: String },

    #[error("{0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Backend error code, when the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            RemoteError::Auth { code, .. } | RemoteError::Storage { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Http(e.to_string())
        }
    }
}

/// Hosted email/password authentication.
pub trait AuthService: Send + Sync {
    /// The signed-in user, if any. Never touches the network.
    fn current_user(&self) -> Option<AuthUser>;

    /// Creates an account and signs it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, RemoteError>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, RemoteError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Changes the signed-in user's password.
    fn update_password(
        &self,
        new_password: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Document database. Paths alternate collection and document segments,
/// e.g. `users/{uid}` or `users/{uid}/recipes/{id}`.
pub trait DocumentStore: Send + Sync {
    fn get(&self, path: &str) -> impl Future<Output = Result<Option<Value>, RemoteError>> + Send;

    /// Creates or replaces a whole document.
    fn set(&self, path: &str, data: Value) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Merges fields into an existing document. Fails with
    /// [`RemoteError::NotFound`] when the document does not exist.
    fn update(
        &self,
        path: &str,
        fields: Value,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Adds a document with a generated id and returns the id.
    fn add(
        &self,
        collection: &str,
        data: Value,
    ) -> impl Future<Output = Result<String, RemoteError>> + Send;

    /// Documents of a collection whose `field` equals `value`, as
    /// `(id, data)` pairs in the store's default order.
    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> impl Future<Output = Result<Vec<(String, Value)>, RemoteError>> + Send;
}

/// JSON tree with live subscriptions.
pub trait RealtimeStore: Send + Sync {
    fn get(&self, path: &str) -> impl Future<Output = Result<Option<Value>, RemoteError>> + Send;

    fn set(&self, path: &str, value: Value) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn remove(&self, path: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Emits the value at `path` now and after every change beneath it.
    /// `None` means nothing is stored there.
    fn subscribe(&self, path: &str) -> Subscription<Option<Value>>;
}

/// Binary object storage.
pub trait BlobStore: Send + Sync {
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Public URL of an uploaded object.
    fn download_url(&self, path: &str) -> impl Future<Output = Result<String, RemoteError>> + Send;
}
