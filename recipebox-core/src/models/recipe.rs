use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::de::optional_minutes;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Invalid difficulty '{}'. Valid options: easy, medium, hard",
                s
            )),
        }
    }
}

/// A user-authored recipe as stored in the `recipes` collection.
///
/// The document id is not part of the stored fields; it is filled in from
/// the document path when the recipe is read back. Plain serialization
/// includes it, [`Recipe::to_document`] leaves it out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, deserialize_with = "optional_minutes")]
    pub cooking_time: Option<u32>, // minutes
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Decodes a stored document, attaching its id.
    pub fn from_document(
        id: impl Into<String>,
        data: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let mut recipe: Recipe = serde_json::from_value(data)?;
        recipe.id = id.into();
        Ok(recipe)
    }

    /// Fields written to the `recipes` collection.
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let serde_json::Value::Object(fields) = &mut value {
            fields.remove("id");
        }
        Ok(value)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "Difficulty: {}", self.difficulty)?;

        if let Some(minutes) = self.cooking_time {
            writeln!(f, "Cooking time: {} min", minutes)?;
        }

        if let Some(image) = &self.image {
            writeln!(f, "Image: {}", image)?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        if !self.instructions.is_empty() {
            writeln!(f, "\nInstructions:\n{}", self.instructions)?;
        }

        Ok(())
    }
}

/// Image attached to a recipe or avatar upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl RecipeImage {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    /// Builds an image, guessing the content type from a file extension.
    pub fn from_extension(bytes: Vec<u8>, extension: &str) -> Self {
        Self::new(bytes, image_content_type(extension))
    }
}

/// Content type for common image file extensions.
pub fn image_content_type(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Fields of a recipe being created.
#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cooking_time: Option<u32>,
    pub difficulty: Difficulty,
    pub image: Option<RecipeImage>,
}

impl NewRecipe {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<String>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_cooking_time(mut self, minutes: u32) -> Self {
        self.cooking_time = Some(minutes);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_image(mut self, image: RecipeImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Ingredient lines that are not blank. Blank lines are dropped, the
    /// remaining lines are kept verbatim.
    pub fn filled_ingredients(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .filter(|line| !line.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// Entry in a user's `recipes` subcollection pointing at a recipe document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIndexEntry {
    pub recipe_id: String,
    pub added_at: DateTime<Utc>,
}

impl RecipeIndexEntry {
    pub fn new(recipe_id: impl Into<String>) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            added_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("easy").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::from_str("MEDIUM").unwrap(), Difficulty::Medium);
        assert_eq!(Difficulty::from_str("Hard").unwrap(), Difficulty::Hard);
        assert!(Difficulty::from_str("extreme").is_err());
    }

    #[test]
    fn test_difficulty_serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Medium).unwrap(),
            "\"Medium\""
        );
    }

    #[test]
    fn test_filled_ingredients_drops_blank_lines() {
        let recipe = NewRecipe::new("Bread").with_ingredients(vec![
            "".to_string(),
            "Flour".to_string(),
            "  ".to_string(),
        ]);
        assert_eq!(recipe.filled_ingredients(), vec!["Flour".to_string()]);
    }

    #[test]
    fn test_from_document_reads_legacy_fields() {
        let data = json!({
            "title": "Pancakes",
            "ingredients": ["Flour", "Milk"],
            "instructions": "Mix and fry.",
            "cookingTime": "20",
            "difficulty": "Easy",
            "image": null,
            "userId": "u1",
            "public": false
        });

        let recipe = Recipe::from_document("r1", data).unwrap();
        assert_eq!(recipe.id, "r1");
        assert_eq!(recipe.title, "Pancakes");
        assert_eq!(recipe.cooking_time, Some(20));
        assert_eq!(recipe.user_id, "u1");
        assert!(recipe.created_at.is_none());
    }

    #[test]
    fn test_document_omits_id_but_output_keeps_it() {
        let recipe = Recipe {
            id: "r1".to_string(),
            title: "Soup".to_string(),
            ingredients: vec!["Water".to_string()],
            instructions: String::new(),
            cooking_time: Some(15),
            difficulty: Difficulty::Hard,
            image: None,
            user_id: "u1".to_string(),
            public: false,
            created_at: None,
        };

        let document = recipe.to_document().unwrap();
        assert!(document.get("id").is_none());
        assert_eq!(document["cookingTime"], 15);
        assert_eq!(document["userId"], "u1");
        assert_eq!(document["difficulty"], "Hard");

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["id"], "r1");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["difficulty"], "Hard");
    }

    #[test]
    fn test_recipe_display() {
        let recipe = Recipe::from_document(
            "r1",
            json!({
                "title": "Toast",
                "ingredients": ["Bread"],
                "difficulty": "Easy",
                "userId": "u1"
            }),
        )
        .unwrap();

        let output = format!("{}", recipe);
        assert!(output.contains("Toast"));
        assert!(output.contains("Difficulty: Easy"));
        assert!(output.contains("  - Bread"));
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("JPG"), "image/jpeg");
        assert_eq!(image_content_type("png"), "image/png");
        assert_eq!(image_content_type("bin"), "application/octet-stream");
    }
}
