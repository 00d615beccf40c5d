//! Firestore REST documents.
//!
//! Firestore wraps every field in a typed value (`{"stringValue": "x"}`,
//! `{"integerValue": "3"}`, ...). Documents cross this module as plain JSON
//! objects and are converted at the boundary.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{check, Firebase};
use crate::local_store::LocalStore;
use crate::remote::{DocumentStore, RemoteError};

/// Converts plain JSON into a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encodes each member of an object.
pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Converts a Firestore typed value back into plain JSON. Timestamps,
/// references, and bytes come back as strings.
pub fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|m| m.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue"
        | "bytesValue" | "geoPointValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or_else(|_| inner.clone()),
            other => other.clone(),
        },
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

/// A document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RawDocument {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn data(&self) -> Value {
        Value::Object(decode_fields(&self.fields))
    }
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<RawDocument>,
}

fn object_fields(path: &str, data: &Value) -> Result<Map<String, Value>, RemoteError> {
    match data {
        Value::Object(map) => Ok(encode_fields(map)),
        _ => Err(RemoteError::Backend(format!(
            "Document data for '{}' must be an object",
            path
        ))),
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits `users/u1/recipes` into the parent document path and the
/// collection id.
fn split_collection(collection: &str) -> (Option<&str>, &str) {
    let trimmed = collection.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, id)) => (Some(parent), id),
        None => (None, trimmed),
    }
}

impl<S: LocalStore> Firebase<S> {
    fn documents_url(&self, path: &str) -> String {
        let root = format!("{}/{}", self.config.firestore_url, self.config.documents_root());
        if path.is_empty() {
            root
        } else {
            format!("{}/{}", root, encode_path(path))
        }
    }
}

impl<S: LocalStore> DocumentStore for Firebase<S> {
    async fn get(&self, path: &str) -> Result<Option<Value>, RemoteError> {
        let request = self.authorize(self.http.get(self.documents_url(path))).await?;
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document: RawDocument = check(response).await?.json().await?;
        Ok(Some(document.data()))
    }

    async fn set(&self, path: &str, data: Value) -> Result<(), RemoteError> {
        let fields = object_fields(path, &data)?;
        let request = self
            .authorize(self.http.patch(self.documents_url(path)))
            .await?;
        check(request.json(&json!({ "fields": fields })).send().await?).await?;
        Ok(())
    }

    async fn update(&self, path: &str, fields: Value) -> Result<(), RemoteError> {
        let encoded = object_fields(path, &fields)?;
        let mut url = format!("{}?currentDocument.exists=true", self.documents_url(path));
        for key in encoded.keys() {
            url.push_str("&updateMask.fieldPaths=");
            url.push_str(&urlencoding::encode(key));
        }

        let request = self.authorize(self.http.patch(url)).await?;
        let response = request.json(&json!({ "fields": encoded })).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(path.to_string()));
        }
        check(response).await?;
        Ok(())
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, RemoteError> {
        let fields = object_fields(collection, &data)?;
        let request = self
            .authorize(self.http.post(self.documents_url(collection)))
            .await?;
        let response = check(request.json(&json!({ "fields": fields })).send().await?).await?;
        let document: RawDocument = response.json().await?;
        Ok(document.id().to_string())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<(String, Value)>, RemoteError> {
        let (parent, collection_id) = split_collection(collection);
        let url = format!("{}:runQuery", self.documents_url(parent.unwrap_or_default()));
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection_id }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": encode_value(&value),
                    }
                }
            }
        });

        let request = self.authorize(self.http.post(url)).await?;
        let rows: Vec<QueryRow> = check(request.json(&body).send().await?).await?.json().await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(|doc| (doc.id().to_string(), doc.data()))
            .collect())
    }
}
