use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a recipe.
///
/// Recipes from the search API carry numeric ids while user-authored recipes
/// get generated document ids. Both forms are kept as-is so favorites written
/// by other clients stay byte-compatible, and both map to the same string
/// key when used in a storage path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Number(u64),
    Text(String),
}

impl RecipeId {
    /// Key used for the recipe in storage paths.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Numeric id, if this recipe came from the search API.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            RecipeId::Number(n) => Some(*n),
            RecipeId::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Number(n) => write!(f, "{}", n),
            RecipeId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for RecipeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Recipe id cannot be empty".to_string());
        }
        if s.contains('/') {
            return Err(format!("Invalid recipe id '{}'", s));
        }
        Ok(match s.parse::<u64>() {
            Ok(n) => RecipeId::Number(n),
            Err(_) => RecipeId::Text(s.to_string()),
        })
    }
}

impl From<u64> for RecipeId {
    fn from(id: u64) -> Self {
        RecipeId::Number(id)
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        RecipeId::Text(id.to_string())
    }
}

impl From<String> for RecipeId {
    fn from(id: String) -> Self {
        RecipeId::Text(id)
    }
}
