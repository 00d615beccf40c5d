//! Recipe Box Core Library
//!
//! Shared models, the remote service facade, and the synchronizers that bind
//! remote auth and storage to view state.

pub mod catalog;
pub mod convert;
pub mod favorites;
pub mod local_store;
pub mod models;
pub mod preferences;
pub mod profile;
pub mod recipes;
pub mod remote;
pub mod session;
pub mod subscription;
pub mod validate;

pub use catalog::{CatalogClient, CatalogError};
pub use convert::{convert, to_grams, Conversion, WeightUnit};
pub use favorites::{FavoriteError, FavoriteState, FavoritesSynchronizer};
pub use local_store::{FileStore, LocalStore, MemoryStore, StoreError};
pub use models::{
    AuthUser, Difficulty, Favorite, FavoriteSet, FavoriteTarget, NewRecipe, Profile, Recipe,
    RecipeDetail, RecipeId, RecipeImage, RecipeSummary,
};
pub use preferences::{AppContext, Preferences, Typeface};
pub use profile::{ProfileError, ProfileManager, ProfileView};
pub use recipes::{RecipeError, RecipeRecordManager};
pub use remote::{AuthService, BlobStore, DocumentStore, RealtimeStore, RemoteError};
pub use session::{SessionError, SessionGate, SessionState};
pub use subscription::Subscription;
pub use validate::{RegistrationForm, ValidationError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
