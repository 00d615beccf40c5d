use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::catalog::{RecipeDetail, RecipeSummary};
use super::recipe::Recipe;
use super::recipe_id::RecipeId;

/// Denormalized snapshot stored at `users/{uid}/favorites/{recipeId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: RecipeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub added_at: i64,
}

impl Favorite {
    pub fn new(target: &FavoriteTarget) -> Self {
        Self {
            id: target.id.clone(),
            title: target.title.clone(),
            image: target.image.clone(),
            added_at: Utc::now().timestamp_millis(),
        }
    }
}

/// The recipe fields copied into a favorite record.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteTarget {
    pub id: RecipeId,
    pub title: Option<String>,
    pub image: Option<String>,
}

impl FavoriteTarget {
    pub fn new(id: impl Into<RecipeId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            image: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

impl From<&RecipeSummary> for FavoriteTarget {
    fn from(summary: &RecipeSummary) -> Self {
        Self {
            id: RecipeId::Number(summary.id),
            title: Some(summary.title.clone()),
            image: summary.image.clone(),
        }
    }
}

impl From<&RecipeDetail> for FavoriteTarget {
    fn from(detail: &RecipeDetail) -> Self {
        Self {
            id: RecipeId::Number(detail.id),
            title: Some(detail.title.clone()),
            image: detail.image.clone(),
        }
    }
}

impl From<&Recipe> for FavoriteTarget {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: RecipeId::Text(recipe.id.clone()),
            title: Some(recipe.title.clone()),
            image: recipe.image.clone(),
        }
    }
}

/// Immutable snapshot of one user's favorites, keyed by recipe id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteSet {
    entries: Arc<BTreeMap<String, Favorite>>,
}

impl FavoriteSet {
    /// Builds a set from the raw value of a favorites collection.
    ///
    /// An absent collection is an empty set. Records that do not decode are
    /// skipped. Collections keyed by small sequential integers can come
    /// back as arrays; those are accepted too.
    pub fn from_snapshot(snapshot: Option<&Value>) -> Self {
        let mut entries = BTreeMap::new();

        let records: Vec<(String, &Value)> = match snapshot {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };

        for (key, value) in records {
            match decode_record(&key, value) {
                Some(favorite) => {
                    entries.insert(key, favorite);
                }
                None => tracing::warn!("Skipping malformed favorite record '{}'", key),
            }
        }

        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn contains(&self, id: &RecipeId) -> bool {
        self.entries.contains_key(&id.key())
    }

    pub fn get(&self, id: &RecipeId) -> Option<&Favorite> {
        self.entries.get(&id.key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Favorite> {
        self.entries.values()
    }

    pub fn to_vec(&self) -> Vec<Favorite> {
        self.entries.values().cloned().collect()
    }
}

fn decode_record(key: &str, value: &Value) -> Option<Favorite> {
    let mut object = value.as_object()?.clone();
    // Older records may lack the id field; the key is authoritative.
    if !object.contains_key("id") {
        let id = key
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(key));
        object.insert("id".to_string(), id);
    }
    serde_json::from_value(Value::Object(object)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_favorite_serializes_snapshot_fields() {
        let target = FavoriteTarget::new(715538u64)
            .with_title("Bruschetta")
            .with_image("https://img.example/1.jpg");
        let favorite = Favorite::new(&target);

        let value = serde_json::to_value(&favorite).unwrap();
        assert_eq!(value["id"], 715538);
        assert_eq!(value["title"], "Bruschetta");
        assert_eq!(value["image"], "https://img.example/1.jpg");
        assert!(value["addedAt"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_set_from_absent_snapshot_is_empty() {
        assert!(FavoriteSet::from_snapshot(None).is_empty());
        assert!(FavoriteSet::from_snapshot(Some(&Value::Null)).is_empty());
    }

    #[test]
    fn test_set_from_object_snapshot() {
        let snapshot = json!({
            "42": {"id": 42, "title": "Soup", "image": "a.jpg", "addedAt": 1},
            "abc": {"id": "abc", "title": "Mine", "addedAt": 2}
        });

        let set = FavoriteSet::from_snapshot(Some(&snapshot));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&RecipeId::Number(42)));
        assert!(set.contains(&RecipeId::from("abc")));
        assert_eq!(
            set.get(&RecipeId::Number(42)).unwrap().title.as_deref(),
            Some("Soup")
        );
    }

    #[test]
    fn test_set_uses_key_when_id_missing() {
        let snapshot = json!({"99": {"title": "Pie", "addedAt": 5}});
        let set = FavoriteSet::from_snapshot(Some(&snapshot));
        assert_eq!(set.get(&RecipeId::Number(99)).unwrap().id, RecipeId::Number(99));
    }

    #[test]
    fn test_set_accepts_array_snapshot() {
        let snapshot = json!([null, {"id": 1, "title": "One", "addedAt": 3}]);
        let set = FavoriteSet::from_snapshot(Some(&snapshot));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&RecipeId::Number(1)));
    }

    #[test]
    fn test_set_skips_malformed_records() {
        let snapshot = json!({"1": "not an object", "2": {"id": 2, "addedAt": 1}});
        let set = FavoriteSet::from_snapshot(Some(&snapshot));
        assert_eq!(set.len(), 1);
    }
}
