//! In-process backend.
//!
//! Implements every remote service against shared in-memory state. Clones
//! share the same state, so one `MemoryBackend` can be handed to each
//! manager as its auth, document, real-time, and blob service.
//!
//! Operations can be made to fail with [`MemoryBackend::fail`], and write
//! counters expose whether a code path reached the backend at all.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use uuid::Uuid;

use super::paths::segments;
use super::tree;
use super::{AuthService, BlobStore, DocumentStore, RealtimeStore, RemoteError};
use crate::models::AuthUser;
use crate::subscription::{self, Publisher, Subscription};

const MIN_PASSWORD_LEN: usize = 6;

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOp {
    SignUp,
    SignIn,
    SignOut,
    UpdatePassword,
    DocumentRead,
    DocumentWrite,
    RealtimeRead,
    RealtimeWrite,
    Upload,
    DownloadUrl,
}

#[derive(Debug)]
struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Debug)]
struct Blob {
    bytes: Vec<u8>,
    content_type: String,
}

#[derive(Debug)]
struct Listener {
    path: String,
    publisher: Publisher<Option<Value>>,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    current_user: Option<AuthUser>,
    documents: BTreeMap<String, Value>,
    tree: Value,
    blobs: BTreeMap<String, Blob>,
    listeners: Vec<Listener>,
    failures: HashMap<FailOp, RemoteError>,
    document_writes: usize,
    realtime_writes: usize,
}

impl State {
    fn check(&self, op: FailOp) -> Result<(), RemoteError> {
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Pushes the current value to every listener whose path overlaps the
    /// written path, dropping listeners whose subscription is gone.
    fn notify(&mut self, written: &str) {
        let written = segments(written);
        let root = &self.tree;
        self.listeners.retain(|listener| {
            if listener.publisher.is_closed() {
                return false;
            }
            let watched = segments(&listener.path);
            if !overlaps(&watched, &written) {
                return true;
            }
            listener
                .publisher
                .publish(tree::get(root, &watched).cloned())
        });
    }
}

/// In-memory implementation of all remote services.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every future call of `op` fail with `error`.
    pub fn fail(&self, op: FailOp, error: RemoteError) {
        self.lock().failures.insert(op, error);
    }

    pub fn clear_failure(&self, op: FailOp) {
        self.lock().failures.remove(&op);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Registers an account without signing it in.
    pub fn add_account(&self, email: &str, password: &str) -> AuthUser {
        let uid = generate_id(28);
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                display_name: None,
            },
        );
        AuthUser::new(uid, Some(email.to_string()))
    }

    /// Registers an account and makes it the current user.
    pub fn signed_in_as(&self, email: &str, password: &str) -> AuthUser {
        let user = self.add_account(email, password);
        self.lock().current_user = Some(user.clone());
        user
    }

    /// Number of document writes that reached the backend.
    pub fn document_writes(&self) -> usize {
        self.lock().document_writes
    }

    /// Number of real-time writes that reached the backend.
    pub fn realtime_writes(&self) -> usize {
        self.lock().realtime_writes
    }

    /// Raw document content, bypassing failure injection.
    pub fn document(&self, path: &str) -> Option<Value> {
        self.lock().documents.get(path).cloned()
    }

    /// Stored object, bypassing failure injection.
    pub fn blob(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.lock()
            .blobs
            .get(path)
            .map(|b| (b.bytes.clone(), b.content_type.clone()))
    }

    pub fn blob_paths(&self) -> Vec<String> {
        self.lock().blobs.keys().cloned().collect()
    }

    /// Number of subscriptions still being served.
    pub fn active_listeners(&self) -> usize {
        let mut state = self.lock();
        state.listeners.retain(|l| !l.publisher.is_closed());
        state.listeners.len()
    }
}

impl AuthService for MemoryBackend {
    fn current_user(&self) -> Option<AuthUser> {
        self.lock().current_user.clone()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::SignUp)?;

        if !email.contains('@') {
            return Err(auth_error("auth/invalid-email"));
        }
        if state.accounts.contains_key(email) {
            return Err(auth_error("auth/email-already-in-use"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(weak_password());
        }

        let uid = generate_id(28);
        state.accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                display_name: None,
            },
        );
        let user = AuthUser::new(uid, Some(email.to_string()));
        state.current_user = Some(user.clone());
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::SignIn)?;

        let user = match state.accounts.get(email) {
            Some(account) if account.password == password => AuthUser {
                uid: account.uid.clone(),
                email: Some(email.to_string()),
                display_name: account.display_name.clone(),
            },
            _ => return Err(auth_error("auth/invalid-credential")),
        };
        state.current_user = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::SignOut)?;
        state.current_user = None;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::UpdatePassword)?;

        let uid = state
            .current_user
            .as_ref()
            .map(|u| u.uid.clone())
            .ok_or(RemoteError::NotAuthenticated)?;
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(weak_password());
        }

        if let Some(account) = state.accounts.values_mut().find(|a| a.uid == uid) {
            account.password = new_password.to_string();
        }
        Ok(())
    }
}

impl DocumentStore for MemoryBackend {
    async fn get(&self, path: &str) -> Result<Option<Value>, RemoteError> {
        let state = self.lock();
        state.check(FailOp::DocumentRead)?;
        Ok(state.documents.get(path).cloned())
    }

    async fn set(&self, path: &str, data: Value) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::DocumentWrite)?;
        state.documents.insert(path.to_string(), data);
        state.document_writes += 1;
        Ok(())
    }

    async fn update(&self, path: &str, fields: Value) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::DocumentWrite)?;

        let doc = state
            .documents
            .get_mut(path)
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))?;
        match (doc, fields) {
            (Value::Object(existing), Value::Object(fields)) => {
                for (key, value) in fields {
                    existing.insert(key, value);
                }
            }
            (doc, fields) => *doc = fields,
        }
        state.document_writes += 1;
        Ok(())
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::DocumentWrite)?;

        let id = generate_id(20);
        state
            .documents
            .insert(format!("{}/{}", collection, id), data);
        state.document_writes += 1;
        Ok(id)
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<(String, Value)>, RemoteError> {
        let state = self.lock();
        state.check(FailOp::DocumentRead)?;

        let prefix = format!("{}/", collection);
        Ok(state
            .documents
            .iter()
            .filter_map(|(path, data)| {
                let id = path.strip_prefix(&prefix)?;
                if id.contains('/') || data.get(field) != Some(&value) {
                    return None;
                }
                Some((id.to_string(), data.clone()))
            })
            .collect())
    }
}

impl RealtimeStore for MemoryBackend {
    async fn get(&self, path: &str) -> Result<Option<Value>, RemoteError> {
        let state = self.lock();
        state.check(FailOp::RealtimeRead)?;
        Ok(tree::get(&state.tree, &segments(path)).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::RealtimeWrite)?;
        tree::set(&mut state.tree, &segments(path), value);
        state.realtime_writes += 1;
        state.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::RealtimeWrite)?;
        tree::remove(&mut state.tree, &segments(path));
        state.realtime_writes += 1;
        state.notify(path);
        Ok(())
    }

    fn subscribe(&self, path: &str) -> Subscription<Option<Value>> {
        let (publisher, subscription) = subscription::channel();
        let mut state = self.lock();
        publisher.publish(tree::get(&state.tree, &segments(path)).cloned());
        state.listeners.push(Listener {
            path: path.to_string(),
            publisher,
        });
        subscription
    }
}

impl BlobStore for MemoryBackend {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.check(FailOp::Upload)?;
        state.blobs.insert(
            path.to_string(),
            Blob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, RemoteError> {
        let state = self.lock();
        state.check(FailOp::DownloadUrl)?;
        if !state.blobs.contains_key(path) {
            return Err(RemoteError::Storage {
                code: "storage/object-not-found".to_string(),
                message: format!("Object '{}' does not exist.", path),
            });
        }
        Ok(format!("memory://{}", path))
    }
}

fn auth_error(code: &str) -> RemoteError {
    RemoteError::Auth {
        code: code.to_string(),
        message: format!("Firebase: Error ({}).", code),
    }
}

fn weak_password() -> RemoteError {
    RemoteError::Auth {
        code: "auth/weak-password".to_string(),
        message: "Firebase: Password should be at least 6 characters (auth/weak-password)."
            .to_string(),
    }
}

fn generate_id(len: usize) -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(len);
    id
}

/// True when one path is a prefix of the other.
fn overlaps(a: &[&str], b: &[&str]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}
