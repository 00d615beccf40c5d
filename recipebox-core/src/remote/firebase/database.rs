//! Realtime Database REST access and streaming.
//!
//! Reads and writes go to `{database_url}/{path}.json`. Subscriptions open
//! the same URL with `Accept: text/event-stream`; the server first sends a
//! `put` of the whole subtree and then `put`/`patch` events relative to it.
//! A local copy of the subtree is kept and emitted after every event.

use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;

use super::{check, Firebase};
use crate::local_store::LocalStore;
use crate::remote::paths::segments;
use crate::remote::tree;
use crate::remote::{RealtimeStore, RemoteError};
use crate::subscription::{self, Publisher, Subscription};

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental `text/event-stream` parser. Chunks may split lines and
/// UTF-8 sequences anywhere.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
            } else if line.starts_with(':') {
                continue;
            } else {
                let (field, value) = match line.split_once(':') {
                    Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                    None => (line, ""),
                };
                match field {
                    "event" => self.event = Some(value.to_string()),
                    "data" => self.data.push(value.to_string()),
                    _ => {}
                }
            }
        }

        events
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() && event.is_none() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    path: String,
    #[serde(default)]
    data: Value,
}

/// What a listener should do after an event.
#[derive(Debug, PartialEq)]
enum Applied {
    Changed,
    Unchanged,
    Closed(String),
}

/// Applies one database event to the local copy of the subtree.
fn apply_event(snapshot: &mut Value, event: &SseEvent) -> Result<Applied, RemoteError> {
    match event.event.as_str() {
        "put" | "patch" => {
            let payload: EventPayload = serde_json::from_str(&event.data)
                .map_err(|e| RemoteError::Decode(e.to_string()))?;
            let path = segments(&payload.path);
            if event.event == "put" {
                tree::set(snapshot, &path, payload.data);
            } else if let Value::Object(changes) = payload.data {
                tree::merge(snapshot, &path, changes);
            }
            Ok(Applied::Changed)
        }
        "cancel" => Ok(Applied::Closed(format!(
            "Listener cancelled by server: {}",
            event.data
        ))),
        "auth_revoked" => Ok(Applied::Closed("Listener credential expired".to_string())),
        _ => Ok(Applied::Unchanged),
    }
}

fn current(snapshot: &Value) -> Option<Value> {
    if snapshot.is_null() {
        None
    } else {
        Some(snapshot.clone())
    }
}

impl<S: LocalStore> Firebase<S> {
    async fn database_url(&self, path: &str) -> Result<String, RemoteError> {
        let mut url = format!("{}/{}.json", self.config.database_url, path.trim_matches('/'));
        if let Some(token) = self.id_token().await? {
            url.push_str("?auth=");
            url.push_str(&urlencoding::encode(&token));
        }
        Ok(url)
    }

    /// Streams the subtree at `path` into `publisher` until the
    /// subscription goes away or the stream ends.
    async fn listen(
        &self,
        path: &str,
        publisher: Publisher<Option<Value>>,
    ) -> Result<(), RemoteError> {
        let url = self.database_url(path).await?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let mut body = check(response).await?.bytes_stream();

        let mut parser = SseParser::new();
        let mut snapshot = Value::Null;

        loop {
            let chunk = tokio::select! {
                _ = publisher.closed() => return Ok(()),
                chunk = body.next() => chunk,
            };
            let Some(chunk) = chunk else {
                tracing::debug!("Event stream for '{}' ended", path);
                return Ok(());
            };

            for event in parser.push(&chunk?) {
                match apply_event(&mut snapshot, &event)? {
                    Applied::Changed => {
                        if !publisher.publish(current(&snapshot)) {
                            return Ok(());
                        }
                    }
                    Applied::Unchanged => {}
                    Applied::Closed(reason) => return Err(RemoteError::Backend(reason)),
                }
            }
        }
    }
}

impl<S: LocalStore + Clone + 'static> RealtimeStore for Firebase<S> {
    async fn get(&self, path: &str) -> Result<Option<Value>, RemoteError> {
        let url = self.database_url(path).await?;
        let value: Value = check(self.http.get(url).send().await?).await?.json().await?;
        Ok(current(&value))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), RemoteError> {
        let url = self.database_url(path).await?;
        check(self.http.put(url).json(&value).send().await?).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), RemoteError> {
        let url = self.database_url(path).await?;
        check(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    fn subscribe(&self, path: &str) -> Subscription<Option<Value>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Cannot subscribe to '{}' outside a tokio runtime", path);
            return Subscription::closed();
        };

        let (publisher, subscription) = subscription::channel();
        let client = self.clone();
        let path = path.to_string();
        runtime.spawn(async move {
            if let Err(e) = client.listen(&path, publisher).await {
                tracing::warn!("Subscription to '{}' stopped: {}", path, e);
            }
        });
        subscription
    }
}
