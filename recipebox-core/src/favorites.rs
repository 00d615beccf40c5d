//! Favorites synchronizer.
//!
//! A favorite is the record at `users/{uid}/favorites/{recipeId}` in the
//! real-time store; its existence is the favorited flag. The record carries
//! a snapshot of the recipe's title and image so the favorites list renders
//! without fetching each recipe.
//!
//! Toggling reads then writes without a transaction. Two toggles racing on
//! the same recipe can both observe the same state.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::models::{Favorite, FavoriteSet, FavoriteTarget, RecipeId};
use crate::remote::{paths, AuthService, RealtimeStore, RemoteError};
use crate::subscription::Subscription;

#[derive(Error, Debug)]
pub enum FavoriteError {
    #[error("Please sign in to save favorites")]
    SignInRequired,

    #[error("Failed to update favorite: {0}")]
    Update(#[source] RemoteError),

    #[error("Failed to remove favorite")]
    Remove(#[source] RemoteError),

    #[error("Failed to load favorites: {0}")]
    Load(#[source] RemoteError),
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    Favorited,
    NotFavorited,
}

impl FavoriteState {
    pub fn is_favorited(&self) -> bool {
        matches!(self, FavoriteState::Favorited)
    }
}

impl fmt::Display for FavoriteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FavoriteState::Favorited => write!(f, "Added to favorites"),
            FavoriteState::NotFavorited => write!(f, "Removed from favorites"),
        }
    }
}

pub struct FavoritesSynchronizer<A, R> {
    auth: Arc<A>,
    realtime: Arc<R>,
}

impl<A: AuthService, R: RealtimeStore> FavoritesSynchronizer<A, R> {
    pub fn new(auth: Arc<A>, realtime: Arc<R>) -> Self {
        Self { auth, realtime }
    }

    fn signed_in_uid(&self) -> Result<String, FavoriteError> {
        self.auth
            .current_user()
            .map(|u| u.uid)
            .ok_or(FavoriteError::SignInRequired)
    }

    /// Live view of a user's favorites. Emits the current set first, then a
    /// fresh set after every change.
    pub fn subscribe_favorites(&self, user_id: &str) -> Subscription<FavoriteSet> {
        self.realtime
            .subscribe(&paths::favorites(user_id))
            .map(|snapshot| FavoriteSet::from_snapshot(snapshot.as_ref()))
    }

    /// Live favorited flag of one recipe.
    pub fn watch_status(&self, user_id: &str, recipe_id: &RecipeId) -> Subscription<bool> {
        self.realtime
            .subscribe(&paths::favorite(user_id, recipe_id))
            .map(|snapshot| snapshot.is_some())
    }

    pub async fn is_favorite(
        &self,
        user_id: &str,
        recipe_id: &RecipeId,
    ) -> Result<bool, FavoriteError> {
        let record = self
            .realtime
            .get(&paths::favorite(user_id, recipe_id))
            .await
            .map_err(FavoriteError::Load)?;
        Ok(record.is_some())
    }

    /// Flips the current user's favorite on `target`. Requires a signed-in
    /// user; without one nothing is read or written.
    pub async fn toggle_favorite(
        &self,
        target: &FavoriteTarget,
    ) -> Result<FavoriteState, FavoriteError> {
        let uid = self.signed_in_uid()?;
        let path = paths::favorite(&uid, &target.id);

        let existing = self
            .realtime
            .get(&path)
            .await
            .map_err(FavoriteError::Update)?;

        if existing.is_some() {
            self.realtime
                .remove(&path)
                .await
                .map_err(FavoriteError::Update)?;
            tracing::info!("Removed favorite {}", target.id);
            return Ok(FavoriteState::NotFavorited);
        }

        let record = serde_json::to_value(Favorite::new(target))
            .map_err(|e| FavoriteError::Update(RemoteError::Decode(e.to_string())))?;
        self.realtime
            .set(&path, record)
            .await
            .map_err(FavoriteError::Update)?;
        tracing::info!("Added favorite {}", target.id);
        Ok(FavoriteState::Favorited)
    }

    /// Deletes the current user's favorite on `recipe_id`, whether or not
    /// it exists.
    pub async fn remove_favorite(&self, recipe_id: &RecipeId) -> Result<(), FavoriteError> {
        let uid = self.signed_in_uid()?;
        self.realtime
            .remove(&paths::favorite(&uid, recipe_id))
            .await
            .map_err(FavoriteError::Remove)
    }
}
