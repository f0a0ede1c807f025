//! HTTP client for the content-graph service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Display label the service attaches to every created item.
const ENTRY_TITLE: &str = "Thread Entry";

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {reason}")]
    Status { status: StatusCode, reason: String },
}

/// Identifier assigned by the service upon successful creation.
#[derive(Debug, Deserialize)]
pub struct CreatedNode {
    pub id: String,
}

/// The remote "create node" operation.
///
/// Abstract so the publisher can be exercised against an in-memory fake.
#[async_trait]
pub trait CreateNode {
    /// Creates one node on the service, optionally attached to a parent
    /// identified by a previously returned remote id.
    async fn create_node(
        &self,
        content: &str,
        parent: Option<&str>,
    ) -> Result<CreatedNode, RemoteError>;
}

#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GraphClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl CreateNode for GraphClient {
    async fn create_node(
        &self,
        content: &str,
        parent: Option<&str>,
    ) -> Result<CreatedNode, RemoteError> {
        let url = format!("{}/add", self.base_url);

        let mut body = json!({
            "data": content,
            "metadata": { "title": ENTRY_TITLE },
        });
        if let Some(parent) = parent {
            body["parent_id"] = json!(parent);
        }

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let reason = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, reason });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let client = GraphClient::new("https://yourcommonbase.com/", "key");
        assert_eq!(client.base_url, "https://yourcommonbase.com");
    }

    #[test]
    fn created_node_deserializes_extra_fields() {
        let created: CreatedNode =
            serde_json::from_str(r#"{"id": "abc123", "created_at": "2024-01-01"}"#).unwrap();
        assert_eq!(created.id, "abc123");
    }
}
