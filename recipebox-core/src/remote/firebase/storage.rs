//! Cloud Storage for Firebase REST uploads and download URLs.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{error_message, Firebase};
use crate::local_store::LocalStore;
use crate::remote::{BlobStore, RemoteError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Maps an HTTP failure to the storage error code the client SDK reports.
fn storage_error(status: StatusCode, path: &str, body: &str) -> RemoteError {
    let (code, message) = match status {
        StatusCode::UNAUTHORIZED => (
            "storage/unauthenticated",
            "User is not authenticated, please authenticate and try again.".to_string(),
        ),
        StatusCode::PAYMENT_REQUIRED => (
            "storage/quota-exceeded",
            "Quota for bucket exceeded, please view quota on the Firebase console.".to_string(),
        ),
        StatusCode::FORBIDDEN => (
            "storage/unauthorized",
            format!("User does not have permission to access '{}'.", path),
        ),
        StatusCode::NOT_FOUND => (
            "storage/object-not-found",
            format!("Object '{}' does not exist.", path),
        ),
        StatusCode::TOO_MANY_REQUESTS => (
            "storage/retry-limit-exceeded",
            "Max retry time for operation exceeded, please try again.".to_string(),
        ),
        _ => ("storage/unknown", error_message(status, body)),
    };
    RemoteError::Storage {
        code: code.to_string(),
        message: format!("Firebase Storage: {} ({})", message, code),
    }
}

impl<S: LocalStore> Firebase<S> {
    fn objects_url(&self) -> String {
        format!(
            "{}/b/{}/o",
            self.config.storage_url,
            urlencoding::encode(&self.config.storage_bucket)
        )
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.objects_url(), urlencoding::encode(path))
    }
}

/// Builds the public URL of an object from its first download token.
fn media_url(object_url: &str, tokens: Option<&str>) -> String {
    match tokens.and_then(|t| t.split(',').next()).filter(|t| !t.is_empty()) {
        Some(token) => format!("{}?alt=media&token={}", object_url, token),
        None => format!("{}?alt=media", object_url),
    }
}

impl<S: LocalStore> BlobStore for Firebase<S> {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), RemoteError> {
        let url = format!("{}?name={}", self.objects_url(), urlencoding::encode(path));
        let request = self
            .authorize(self.http.post(url))
            .await?
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(storage_error(status, path, &body));
        }
        tracing::debug!("Uploaded '{}'", path);
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, RemoteError> {
        let object_url = self.object_url(path);
        let request = self.authorize(self.http.get(&object_url)).await?;
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(storage_error(status, path, &body));
        }

        let metadata: ObjectMetadata = response.json().await?;
        Ok(media_url(&object_url, metadata.download_tokens.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_store::MemoryStore;
    use crate::profile::avatar_message;
    use crate::remote::firebase::FirebaseConfig;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, Method, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const OBJECTS: &str = "/v0/b/bucket/o";

    #[derive(Debug, Clone)]
    struct Upload {
        query: String,
        content_type: String,
        body: Vec<u8>,
    }

    type Uploads = Arc<Mutex<Vec<Upload>>>;

    async fn storage_handler(
        State(uploads): State<Uploads>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let query = uri.query().unwrap_or_default().to_string();
        match (method.as_str(), uri.path()) {
            ("POST", OBJECTS) if query.contains("denied") => (
                StatusCode::FORBIDDEN,
                Json(json!({"error": {"code": 403, "message": "Permission denied."}})),
            )
                .into_response(),
            ("POST", OBJECTS) => {
                let content_type = headers
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                uploads.lock().unwrap().push(Upload {
                    query,
                    content_type,
                    body: body.to_vec(),
                });
                Json(json!({"name": "profileImages/u1/a.jpg"})).into_response()
            }
            ("GET", "/v0/b/bucket/o/profileImages%2Fu1%2Fa.jpg") => Json(json!({
                "name": "profileImages/u1/a.jpg",
                "downloadTokens": "tok1,tok2"
            }))
            .into_response(),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"code": 404, "message": "Not Found."}})),
            )
                .into_response(),
        }
    }

    async fn mock_storage() -> (Firebase<MemoryStore>, Uploads, String) {
        let uploads = Uploads::default();
        let app = Router::new()
            .fallback(storage_handler)
            .with_state(uploads.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = format!("http://{}/v0", addr);
        let config =
            FirebaseConfig::new("key", "proj", "http://db", "bucket").with_storage_url(&base);
        (Firebase::new(config, MemoryStore::new()), uploads, base)
    }

    #[tokio::test]
    async fn test_upload_posts_bytes_with_content_type() {
        let (firebase, uploads, _base) = mock_storage().await;

        firebase
            .upload("profileImages/u1/a.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        let uploads = uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].query, "name=profileImages%2Fu1%2Fa.jpg");
        assert_eq!(uploads[0].content_type, "image/jpeg");
        assert_eq!(uploads[0].body, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_denied_upload_maps_to_unauthorized() {
        let (firebase, uploads, _base) = mock_storage().await;

        let err = firebase
            .upload("profileImages/u1/denied.jpg", vec![0], "image/jpeg")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("storage/unauthorized"));
        assert_eq!(
            avatar_message(&err),
            "You don't have permission to upload images"
        );
        assert!(uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_url_uses_first_token() {
        let (firebase, _uploads, base) = mock_storage().await;

        let url = firebase.download_url("profileImages/u1/a.jpg").await.unwrap();
        assert_eq!(
            url,
            format!(
                "{}/b/bucket/o/profileImages%2Fu1%2Fa.jpg?alt=media&token=tok1",
                base
            )
        );
    }

    #[tokio::test]
    async fn test_download_url_of_missing_object() {
        let (firebase, _uploads, _base) = mock_storage().await;

        let err = firebase
            .download_url("profileImages/u1/gone.jpg")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("storage/object-not-found"));
        assert_eq!(
            err.to_string(),
            "Firebase Storage: Object 'profileImages/u1/gone.jpg' does not exist. (storage/object-not-found)"
        );
    }

    #[test]
    fn test_storage_error_codes() {
        let err = storage_error(StatusCode::FORBIDDEN, "profileImages/u1/a.jpg", "");
        assert_eq!(err.code(), Some("storage/unauthorized"));

        let err = storage_error(StatusCode::PAYMENT_REQUIRED, "x", "");
        assert_eq!(err.code(), Some("storage/quota-exceeded"));

        let err = storage_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "x",
            r#"{"error":{"code":500,"message":"backend down"}}"#,
        );
        assert_eq!(err.code(), Some("storage/unknown"));
        assert!(err.to_string().contains("backend down"));
    }

    #[test]
    fn test_media_url_uses_first_token() {
        assert_eq!(
            media_url("https://fs.example/v0/b/bkt/o/recipes%2F1", Some("tok1,tok2")),
            "https://fs.example/v0/b/bkt/o/recipes%2F1?alt=media&token=tok1"
        );
        assert_eq!(
            media_url("https://fs.example/v0/b/bkt/o/recipes%2F1", None),
            "https://fs.example/v0/b/bkt/o/recipes%2F1?alt=media"
        );
    }

    #[test]
    fn test_object_url_encodes_path() {
        let firebase = Firebase::new(
            super::super::FirebaseConfig::new("k", "p", "d", "my-app.appspot.com")
                .with_storage_url("http://127.0.0.1:9199/v0"),
            crate::local_store::MemoryStore::new(),
        );
        assert_eq!(
            firebase.object_url("profileImages/u1/profile-1.jpg"),
            "http://127.0.0.1:9199/v0/b/my-app.appspot.com/o/profileImages%2Fu1%2Fprofile-1.jpg"
        );
    }
}
