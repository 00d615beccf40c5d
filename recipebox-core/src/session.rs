//! Session gate.
//!
//! Decides whether the signed-in or the signed-out experience is shown.
//!
//! # States
//!
//! 1. **Checking** - not yet decided; the initial state
//! 2. **Anonymous** - nobody is signed in
//! 3. **Authenticated** - a sign-in succeeded
//!
//! `check` settles the first state from the `loggedIn` flag in local
//! storage without contacting the backend. The flag is only a hint: a
//! session revoked server-side still reads as Authenticated until a later
//! remote call fails.

use std::sync::Arc;

use thiserror::Error;

use crate::local_store::{LocalStore, StoreError};
use crate::models::AuthUser;
use crate::remote::{AuthService, RemoteError};
use crate::validate::{validate_login, ValidationError};

/// Local storage key of the logged-in flag.
pub const LOGGED_IN_KEY: &str = "loggedIn";
const LOGGED_IN_VALUE: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Checking,
    Anonymous,
    Authenticated,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend's message, unchanged.
    #[error("{0}")]
    SignIn(RemoteError),

    #[error("Failed to sign out")]
    SignOut(#[source] RemoteError),

    #[error("Failed to update login state: {0}")]
    Store(#[from] StoreError),
}

pub struct SessionGate<A, S> {
    auth: Arc<A>,
    store: S,
    state: SessionState,
}

impl<A: AuthService, S: LocalStore> SessionGate<A, S> {
    pub fn new(auth: Arc<A>, store: S) -> Self {
        Self {
            auth,
            store,
            state: SessionState::Checking,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// The backend's current user. Authoritative, unlike the state.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user()
    }

    /// Settles the state from the local flag. An unreadable store counts
    /// as signed out.
    pub fn check(&mut self) -> SessionState {
        self.state = match self.store.get_item(LOGGED_IN_KEY) {
            Ok(Some(flag)) if flag == LOGGED_IN_VALUE => SessionState::Authenticated,
            Ok(_) => SessionState::Anonymous,
            Err(e) => {
                tracing::warn!("Could not read login flag: {}", e);
                SessionState::Anonymous
            }
        };
        tracing::debug!("Session state: {:?}", self.state);
        self.state
    }

    /// Signs in and records the flag. The state only changes once both
    /// the backend and local storage have accepted the sign-in.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthUser, SessionError> {
        validate_login(email, password)?;

        let user = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(SessionError::SignIn)?;
        self.store.set_item(LOGGED_IN_KEY, LOGGED_IN_VALUE)?;

        self.state = SessionState::Authenticated;
        tracing::info!("Signed in as {}", user.uid);
        Ok(user)
    }

    /// Signs out remotely, then clears the flag. A failed remote sign-out
    /// leaves everything as it was.
    pub async fn sign_out(&mut self) -> Result<(), SessionError> {
        self.auth.sign_out().await.map_err(SessionError::SignOut)?;
        self.store.remove_item(LOGGED_IN_KEY)?;
        self.state = SessionState::Anonymous;
        Ok(())
    }
}
