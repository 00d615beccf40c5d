//! Recipe API error types.

use thiserror::Error;

/// Errors that can occur when calling the recipe API.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Recipe API key not configured. Set catalog.api_key or RECIPEBOX_CATALOG_API_KEY.")]
    MissingApiKey,

    /// Server answered with a non-success status
    #[error("Recipe API returned status {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },

    /// Request could not be sent or the response not read
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not the expected shape
    #[error("Failed to decode recipe API response: {0}")]
    Decode(String),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CatalogError::Decode(e.to_string())
        } else {
            CatalogError::Http(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_with_and_without_body() {
        let bare = CatalogError::Status {
            status: 402,
            body: String::new(),
        };
        assert_eq!(bare.to_string(), "Recipe API returned status 402");

        let detailed = CatalogError::Status {
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(detailed.to_string(), "Recipe API returned status 401: bad key");
    }

    #[test]
    fn test_missing_key_message() {
        assert_eq!(
            CatalogError::MissingApiKey.to_string(),
            "Recipe API key not configured. Set catalog.api_key or RECIPEBOX_CATALOG_API_KEY."
        );
    }
}
