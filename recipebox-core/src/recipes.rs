//! Recipe record manager.
//!
//! User-authored recipes live in the `recipes` document collection. Each
//! creation also records `{recipeId, addedAt}` in the author's
//! `users/{uid}/recipes` index. Recipes are never edited or deleted.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{Favorite, FavoriteSet, NewRecipe, Recipe, RecipeIndexEntry};
use crate::remote::{paths, BlobStore, DocumentStore, RealtimeStore, RemoteError};

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Failed to save recipe: {0}")]
    Save(#[source] RemoteError),

    #[error("Failed to load recipes: {0}")]
    Load(#[source] RemoteError),
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, RecipeError> {
    serde_json::to_value(value).map_err(|e| RecipeError::Save(RemoteError::Decode(e.to_string())))
}

pub struct RecipeRecordManager<D, B, R> {
    documents: Arc<D>,
    blobs: Arc<B>,
    realtime: Arc<R>,
}

impl<D, B, R> RecipeRecordManager<D, B, R>
where
    D: DocumentStore,
    B: BlobStore,
    R: RealtimeStore,
{
    pub fn new(documents: Arc<D>, blobs: Arc<B>, realtime: Arc<R>) -> Self {
        Self {
            documents,
            blobs,
            realtime,
        }
    }

    /// Saves a new recipe owned by `user_id` and returns its id.
    ///
    /// Blank ingredient lines are dropped. An attached image is uploaded
    /// first and its download URL stored with the recipe.
    pub async fn create_recipe(
        &self,
        user_id: &str,
        recipe: NewRecipe,
    ) -> Result<String, RecipeError> {
        if user_id.is_empty() {
            return Err(RecipeError::Save(RemoteError::NotAuthenticated));
        }

        let image = match &recipe.image {
            Some(image) => {
                let path = paths::recipe_image(Utc::now().timestamp_millis());
                self.blobs
                    .upload(&path, image.bytes.clone(), &image.content_type)
                    .await
                    .map_err(RecipeError::Save)?;
                let url = self
                    .blobs
                    .download_url(&path)
                    .await
                    .map_err(RecipeError::Save)?;
                Some(url)
            }
            None => None,
        };

        let record = Recipe {
            id: String::new(),
            ingredients: recipe.filled_ingredients(),
            title: recipe.title,
            instructions: recipe.instructions,
            cooking_time: recipe.cooking_time,
            difficulty: recipe.difficulty,
            image,
            user_id: user_id.to_string(),
            public: false,
            created_at: Some(Utc::now()),
        };

        let document = record
            .to_document()
            .map_err(|e| RecipeError::Save(RemoteError::Decode(e.to_string())))?;
        let recipe_id = self
            .documents
            .add(paths::RECIPES, document)
            .await
            .map_err(RecipeError::Save)?;

        self.documents
            .add(
                &paths::recipe_index(user_id),
                encode(&RecipeIndexEntry::new(&recipe_id))?,
            )
            .await
            .map_err(RecipeError::Save)?;

        tracing::info!("Created recipe {} for {}", recipe_id, user_id);
        Ok(recipe_id)
    }

    /// Recipes authored by `user_id`, in the store's order. Documents that
    /// fail to decode are skipped.
    pub async fn list_user_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, RecipeError> {
        let rows = self
            .documents
            .query_eq(paths::RECIPES, "userId", json!(user_id))
            .await
            .map_err(RecipeError::Load)?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, data)| match Recipe::from_document(&id, data) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    tracing::warn!("Skipping unreadable recipe {}: {}", id, e);
                    None
                }
            })
            .collect())
    }

    /// The favorite snapshots of `user_id`.
    pub async fn list_favorite_recipes(&self, user_id: &str) -> Result<Vec<Favorite>, RecipeError> {
        let snapshot = self
            .realtime
            .get(&paths::favorites(user_id))
            .await
            .map_err(RecipeError::Load)?;
        Ok(FavoriteSet::from_snapshot(snapshot.as_ref()).to_vec())
    }

    pub async fn get_recipe(&self, recipe_id: &str) -> Result<Option<Recipe>, RecipeError> {
        let Some(data) = self
            .documents
            .get(&paths::recipe(recipe_id))
            .await
            .map_err(RecipeError::Load)?
        else {
            return Ok(None);
        };

        Recipe::from_document(recipe_id, data)
            .map(Some)
            .map_err(|e| RecipeError::Load(RemoteError::Decode(e.to_string())))
    }
}
