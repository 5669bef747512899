use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AnswerError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/ask";

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

#[derive(Deserialize)]
struct AskErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Anything that can turn a question into an answer.
///
/// The session only ever talks to this trait, so tests (and other
/// transports) can stand in for the HTTP service.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, AnswerError>;
}

#[derive(Clone)]
pub struct HttpAnswerClient {
    client: Client,
    endpoint: String,
}

impl HttpAnswerClient {
    /// No request timeout is set: a turn waits until the network settles.
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerService for HttpAnswerClient {
    async fn ask(&self, question: &str) -> Result<String, AnswerError> {
        info!(endpoint = %self.endpoint, "sending question");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "answer service unreachable");
                AnswerError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "answer service responded");

        if !status.is_success() {
            let message = serde_json::from_str::<AskErrorResponse>(&body)
                .ok()
                .and_then(|payload| payload.error);
            warn!(%status, error = ?message, "answer service reported failure");
            return Err(AnswerError::service(message));
        }

        let payload: AskResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "answer payload did not decode");
            AnswerError::Malformed(e.to_string())
        })?;

        Ok(payload.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(AskRequest { question: "What is 2+2?" }).unwrap();
        assert_eq!(body, serde_json::json!({ "question": "What is 2+2?" }));
    }

    #[test]
    fn error_body_field_is_optional() {
        let payload: AskErrorResponse = serde_json::from_str("{}").unwrap();
        assert!(payload.error.is_none());

        let payload: AskErrorResponse =
            serde_json::from_str(r#"{"error": "overloaded"}"#).unwrap();
        assert_eq!(payload.error.as_deref(), Some("overloaded"));
    }

    #[test]
    fn keeps_configured_endpoint() {
        let client = HttpAnswerClient::new(DEFAULT_ENDPOINT);
        assert_eq!(client.endpoint(), "http://127.0.0.1:5000/ask");
    }
}
