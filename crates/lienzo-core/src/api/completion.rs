use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Serialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

/// Client for the text-completion endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
}

impl CompletionClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
        }
    }

    /// Send a single user-role prompt and return the first choice's content.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String, ApiError> {
        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![CompletionMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!(model, "dispatching completion request");
        let response = self
            .client
            .post(COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "completion request rejected");
            return Err(ApiError::Status { status, body });
        }

        let body = response.text().await?;
        parse_completion_body(&body)
    }
}

fn parse_completion_body(body: &str) -> Result<String, ApiError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ApiError::Malformed("completion body contained no choices".to_string()))
}
