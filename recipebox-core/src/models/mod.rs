mod catalog;
mod de;
mod favorite;
mod profile;
mod recipe;
mod recipe_id;
mod user;

pub use catalog::{ExtendedIngredient, RecipeDetail, RecipeSummary, DEFAULT_READY_IN_MINUTES};
pub use favorite::{Favorite, FavoriteSet, FavoriteTarget};
pub use profile::{Profile, ProfileDocument, DEFAULT_NAME, PLACEHOLDER_AVATAR};
pub use recipe::{
    image_content_type, Difficulty, NewRecipe, Recipe, RecipeImage, RecipeIndexEntry,
};
pub use recipe_id::RecipeId;
pub use user::AuthUser;
