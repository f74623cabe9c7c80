use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CompletionRequest, CompletionService};
use crate::error::DeliveryError;

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// One segment of a reply. Only text segments are shown; images, tool
/// calls and anything newer are skipped.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeContent {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

impl ClaudeResponse {
    /// Text segments in order, newline-joined
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                ClaudeContent::Text { text } => Some(text.as_str()),
                ClaudeContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse a success body into the visible reply text.
pub fn reply_text(body: &str) -> Result<String, DeliveryError> {
    let response: ClaudeResponse = serde_json::from_str(body)?;
    Ok(response.text())
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the client somewhere other than the public API.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for ClaudeClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }

        let body = response.text().await?;
        reply_text(&body)
    }
}
