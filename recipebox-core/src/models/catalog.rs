//! Shapes returned by the third-party recipe API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Used when the search API does not report a preparation time.
pub const DEFAULT_READY_IN_MINUTES: u32 = 30;

fn default_ready_in_minutes() -> u32 {
    DEFAULT_READY_IN_MINUTES
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_ready_in_minutes")]
    pub ready_in_minutes: u32,
}

impl fmt::Display for RecipeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>8}  {} ({} min)",
            self.id, self.title, self.ready_in_minutes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedIngredient {
    /// The ingredient line as written in the source recipe.
    #[serde(default)]
    pub original: String,
}

/// Full recipe information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl RecipeDetail {
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            title: self.title.clone(),
            image: self.image.clone(),
            ready_in_minutes: self.ready_in_minutes.unwrap_or(DEFAULT_READY_IN_MINUTES),
        }
    }

    pub fn ingredient_lines(&self) -> Vec<&str> {
        self.extended_ingredients
            .iter()
            .map(|i| i.original.as_str())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl fmt::Display for RecipeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;

        let meta: Vec<String> = [
            self.ready_in_minutes.map(|m| format!("{} mins", m)),
            self.servings.map(|s| format!("Serves {}", s)),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !meta.is_empty() {
            writeln!(f, "{}", meta.join("  |  "))?;
        }

        let lines = self.ingredient_lines();
        if !lines.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for line in lines {
                writeln!(f, "  - {}", line)?;
            }
        }

        match self.instructions.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => writeln!(f, "\nInstructions:\n{}", text)?,
            _ => writeln!(f, "\nNo instructions available.")?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_defaults_ready_time() {
        let summary: RecipeSummary =
            serde_json::from_str(r#"{"id": 1, "title": "Tart", "image": "t.jpg"}"#).unwrap();
        assert_eq!(summary.ready_in_minutes, 30);
    }

    #[test]
    fn test_detail_parses_extended_ingredients() {
        let detail: RecipeDetail = serde_json::from_str(
            r#"{
                "id": 716429,
                "title": "Pasta with Garlic",
                "image": "p.jpg",
                "readyInMinutes": 45,
                "servings": 2,
                "extendedIngredients": [
                    {"id": 1, "original": "1 tbsp butter", "name": "butter"},
                    {"id": 2, "original": "2 cloves garlic"}
                ],
                "instructions": "Cook it."
            }"#,
        )
        .unwrap();

        assert_eq!(detail.ingredient_lines(), vec!["1 tbsp butter", "2 cloves garlic"]);
        assert_eq!(detail.summary().ready_in_minutes, 45);
    }

    #[test]
    fn test_detail_display_without_instructions() {
        let detail: RecipeDetail =
            serde_json::from_str(r#"{"id": 2, "title": "Salad", "instructions": null}"#).unwrap();
        let output = format!("{}", detail);
        assert!(output.contains("Salad"));
        assert!(output.contains("No instructions available."));
    }
}
