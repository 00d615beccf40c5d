//! Storage paths shared by every backend.

use crate::models::RecipeId;

/// Collection holding every user-authored recipe.
pub const RECIPES: &str = "recipes";

/// Profile document of a user.
pub fn profile(uid: &str) -> String {
    format!("users/{}", uid)
}

/// Per-user index of authored recipes.
pub fn recipe_index(uid: &str) -> String {
    format!("users/{}/recipes", uid)
}

/// A single recipe document.
pub fn recipe(recipe_id: &str) -> String {
    format!("{}/{}", RECIPES, recipe_id)
}

/// Favorites collection of a user in the real-time store.
pub fn favorites(uid: &str) -> String {
    format!("users/{}/favorites", uid)
}

/// One favorite record.
pub fn favorite(uid: &str, recipe_id: &RecipeId) -> String {
    format!("users/{}/favorites/{}", uid, recipe_id.key())
}

/// Avatar object. The timestamp keeps successive uploads from
/// overwriting each other.
pub fn avatar(uid: &str, timestamp_millis: i64, extension: &str) -> String {
    format!(
        "profileImages/{}/profile-{}.{}",
        uid, timestamp_millis, extension
    )
}

/// Image object of a recipe.
pub fn recipe_image(timestamp_millis: i64) -> String {
    format!("recipes/{}", timestamp_millis)
}

/// Splits `a/b/c` into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
