use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::CatalogError;
use crate::models::{RecipeDetail, RecipeSummary};

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com/";
/// Query used when the search box is empty.
pub const DEFAULT_QUERY: &str = "Pastry";
pub const DEFAULT_RESULTS: u32 = 10;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RecipeSummary>,
}

#[derive(Deserialize)]
struct RandomResponse {
    #[serde(default)]
    recipes: Vec<RecipeDetail>,
}

/// HTTP client for the recipe API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `endpoint` onto the base URL and appends the query, with the
    /// API key last.
    pub(crate) fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let base = self.base_url.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');

        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(std::iter::once(("apiKey", self.api_key.as_str())))
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();

        format!("{}/{}?{}", base, endpoint, query.join("&"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, CatalogError> {
        if self.api_key.is_empty() {
            return Err(CatalogError::MissingApiKey);
        }

        tracing::debug!("GET {}", url.split("apiKey=").next().unwrap_or_default());
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Searches by keyword. An empty query searches for the default.
    pub async fn search(
        &self,
        query: &str,
        number: u32,
    ) -> Result<Vec<RecipeSummary>, CatalogError> {
        let query = match query.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };
        let url = self.build_url(
            "recipes/complexSearch",
            &[("query", query.to_string()), ("number", number.to_string())],
        );

        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.results)
    }

    pub async fn information(&self, id: u64) -> Result<RecipeDetail, CatalogError> {
        let url = self.build_url(
            &format!("recipes/{}/information", id),
            &[("includeNutrition", "false".to_string())],
        );
        self.get_json(url).await
    }

    pub async fn random(&self, number: u32) -> Result<Vec<RecipeDetail>, CatalogError> {
        let url = self.build_url("recipes/random", &[("number", number.to_string())]);
        let response: RandomResponse = self.get_json(url).await?;
        Ok(response.recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    async fn information(
        Path(id): Path<u64>,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        if id == 404 {
            return (StatusCode::NOT_FOUND, Json(Value::Null));
        }
        let nutrition = params.get("includeNutrition").cloned().unwrap_or_default();
        (
            StatusCode::OK,
            Json(json!({
                "id": id,
                "title": format!("nutrition={}", nutrition),
                "readyInMinutes": 20,
                "extendedIngredients": [{"original": "1 egg"}]
            })),
        )
    }

    fn mock_api() -> Router {
        Router::new()
            .route(
                "/recipes/complexSearch",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    if params.get("apiKey").map(String::as_str) != Some("test-key") {
                        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad key"})));
                    }
                    let query = params.get("query").cloned().unwrap_or_default();
                    let number = params.get("number").cloned().unwrap_or_default();
                    (
                        StatusCode::OK,
                        Json(json!({
                            "results": [
                                {
                                    "id": 1,
                                    "title": format!("{} #{}", query, number),
                                    "image": "a.jpg"
                                },
                                {"id": 2, "title": "Croissant", "readyInMinutes": 90}
                            ],
                            "totalResults": 2
                        })),
                    )
                }),
            )
            .route(
                "/recipes/{id}/information",
                get(information),
            )
            .route(
                "/recipes/random",
                get(|| async {
                    Json(json!({"recipes": [{"id": 7, "title": "Surprise"}]}))
                }),
            )
    }

    #[test]
    fn test_build_url() {
        let client = CatalogClient::new("https://api.example.com/", "k");
        assert_eq!(
            client.build_url("recipes/random", &[("number", "3".to_string())]),
            "https://api.example.com/recipes/random?number=3&apiKey=k"
        );
    }

    #[test]
    fn test_build_url_encodes_query() {
        let client = CatalogClient::new("https://api.example.com", "k");
        assert_eq!(
            client.build_url("/recipes/complexSearch", &[("query", "apple pie".to_string())]),
            "https://api.example.com/recipes/complexSearch?query=apple%20pie&apiKey=k"
        );
    }

    #[tokio::test]
    async fn test_search() {
        let client = CatalogClient::new(serve(mock_api()).await, "test-key");

        let results = client.search("tart", 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "tart #5");
        assert_eq!(results[0].ready_in_minutes, 30);
        assert_eq!(results[1].ready_in_minutes, 90);
    }

    #[tokio::test]
    async fn test_empty_search_uses_default_query() {
        let client = CatalogClient::new(serve(mock_api()).await, "test-key");
        let results = client.search("  ", DEFAULT_RESULTS).await.unwrap();
        assert_eq!(results[0].title, "Pastry #10");
    }

    #[tokio::test]
    async fn test_information() {
        let client = CatalogClient::new(serve(mock_api()).await, "test-key");
        let detail = client.information(716429).await.unwrap();
        assert_eq!(detail.id, 716429);
        assert_eq!(detail.title, "nutrition=false");
        assert_eq!(detail.ingredient_lines(), vec!["1 egg"]);
    }

    #[tokio::test]
    async fn test_random() {
        let client = CatalogClient::new(serve(mock_api()).await, "test-key");
        let recipes = client.random(1).await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Surprise");
    }

    #[tokio::test]
    async fn test_error_status() {
        let client = CatalogClient::new(serve(mock_api()).await, "wrong-key");
        let err = client.search("tart", 1).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 401, .. }));

        let client = CatalogClient::new(serve(mock_api()).await, "test-key");
        let err = client.information(404).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = CatalogClient::new("http://127.0.0.1:9/", "");
        let err = client.random(1).await.unwrap_err();
        assert!(matches!(err, CatalogError::MissingApiKey));
    }
}
