//! Chat completion client.
//!
//! `TextModel` is the seam between the analyzer and the provider: the
//! analyzer only builds requests and reads back text, so tests substitute a
//! canned model instead of touching the network.

use super::AnalysisError;
use crate::retry::Backoff;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// Plain text, or a list of typed parts for multimodal messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Everything the model needs for one completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// A generative text model.
pub trait TextModel: Send + Sync {
    /// Return the model's reply text for `request`.
    fn complete(&self, request: &CompletionRequest) -> Result<String, AnalysisError>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    organization: Option<String>,
    backoff: Backoff,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        organization: Option<String>,
        timeout: Duration,
        backoff: Backoff,
    ) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            organization,
            backoff,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Pull the first choice's text out of a response body.
    fn extract_content(body: &str) -> Result<String, AnalysisError> {
        let resp: CompletionResponse = serde_json::from_str(body)
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AnalysisError::EmptyResponse)
    }

    /// Provider error message from an error body, falling back to the raw text.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string())
    }
}

impl TextModel for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, AnalysisError> {
        let url = self.endpoint();
        let mut last_error = None;

        for attempt in self.backoff.attempts() {
            if attempt > 0 {
                debug!(attempt, "retrying completion request");
            }
            self.backoff.wait(attempt);

            let mut builder = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(request);
            if let Some(org) = &self.organization {
                builder = builder.header("OpenAI-Organization", org);
            }

            let resp = match builder.send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    warn!("completion request failed: {e}");
                    last_error = Some(AnalysisError::Network(e.to_string()));
                    continue;
                }
                Err(e) => return Err(AnalysisError::Network(e.to_string())),
            };

            let status = resp.status();
            let body = resp
                .text()
                .map_err(|e| AnalysisError::Network(e.to_string()))?;

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!("model provider rate limited the request");
                last_error = Some(AnalysisError::RateLimited);
                continue;
            }

            if status.is_server_error() {
                last_error = Some(AnalysisError::Api {
                    status: status.as_u16(),
                    message: Self::error_message(&body),
                });
                continue;
            }

            if !status.is_success() {
                return Err(AnalysisError::Api {
                    status: status.as_u16(),
                    message: Self::error_message(&body),
                });
            }

            return Self::extract_content(&body);
        }

        Err(last_error.unwrap_or_else(|| AnalysisError::Network("max retries exceeded".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::StubServer;

    #[test]
    fn request_serializes_to_chat_completions_shape() {
        let request = CompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![ChatMessage::user("hello")],
            max_tokens: 150,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "hello"}],
                "max_tokens": 150
            })
        );
    }

    #[test]
    fn image_parts_serialize_with_type_tags() {
        let msg = ChatMessage::user_parts(vec![
            ContentPart::Text { text: "look".into() },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/png;base64,AAAA".into(),
                },
            },
        ]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(json["content"][1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Looks fine.\n"}}]}"#;
        assert_eq!(OpenAiClient::extract_content(body).unwrap(), "  Looks fine.\n");
    }

    #[test]
    fn empty_choices_is_empty_response() {
        assert!(matches!(
            OpenAiClient::extract_content(r#"{"choices":[]}"#),
            Err(AnalysisError::EmptyResponse)
        ));
        assert!(matches!(
            OpenAiClient::extract_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[test]
    fn error_message_prefers_provider_text() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(OpenAiClient::error_message(body), "Incorrect API key provided");
        assert_eq!(OpenAiClient::error_message("bad gateway "), "bad gateway");
    }

    #[test]
    fn unreachable_endpoint_is_network_error() {
        let client = OpenAiClient::new(
            "http://127.0.0.1:1/v1",
            "sk-test",
            None,
            Duration::from_secs(2),
            Backoff::none(),
        )
        .unwrap();
        let request = CompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: 10,
        };
        assert!(matches!(
            client.complete(&request),
            Err(AnalysisError::Network(_))
        ));
    }

    const REPLY: &str = r#"{"choices":[{"message":{"role":"assistant","content":"Looks fine."}}]}"#;

    fn stub_client(server: &StubServer, max_retries: u32) -> OpenAiClient {
        OpenAiClient::new(
            &format!("{}/v1", server.base_url),
            "sk-test",
            Some("org-1".into()),
            Duration::from_secs(5),
            Backoff::new(max_retries, Duration::ZERO),
        )
        .unwrap()
    }

    fn hello() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![ChatMessage::user("hello")],
            max_tokens: 10,
        }
    }

    #[test]
    fn server_error_is_retried_until_success() {
        let server = StubServer::start(vec![(503, "overloaded"), (200, REPLY)]);
        let text = stub_client(&server, 3).complete(&hello()).unwrap();
        assert_eq!(text, "Looks fine.");
        assert_eq!(server.hits(), 2);
    }

    #[test]
    fn client_errors_are_not_retried() {
        for status in [401, 403, 404] {
            let server = StubServer::start(vec![(
                status,
                r#"{"error":{"message":"nope","type":"invalid_request_error"}}"#,
            )]);
            let err = stub_client(&server, 3).complete(&hello()).unwrap_err();
            assert!(
                matches!(err, AnalysisError::Api { status: s, ref message } if s == status && message == "nope")
            );
            assert_eq!(server.hits(), 1);
        }
    }

    #[test]
    fn persistent_rate_limit_exhausts_retries() {
        let server = StubServer::start(vec![(429, "slow down")]);
        let err = stub_client(&server, 2).complete(&hello()).unwrap_err();
        assert!(matches!(err, AnalysisError::RateLimited));
        assert_eq!(server.hits(), 3);
    }
}
