//! Trade analyzer: turns trades (or a chart image) into model commentary.

use super::client::{
    ChatMessage, CompletionRequest, ContentPart, ImageUrl, OpenAiClient, TextModel,
};
use super::prompt::{build_prompt, CHART_INSTRUCTION};
use super::AnalysisError;
use crate::domain::TradeEvent;
use crate::retry::Backoff;
use base64::Engine;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Credentials and model parameters, passed in explicitly at construction.
#[derive(Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub api_key: String,
    pub organization: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &"<redacted>")
            .field("organization", &self.organization)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

pub struct TradeAnalyzer<M: TextModel> {
    model: M,
    model_name: String,
    max_tokens: u32,
}

impl TradeAnalyzer<OpenAiClient> {
    /// Analyzer backed by the chat completions API described by `config`.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        let client = OpenAiClient::new(
            &config.base_url,
            config.api_key.clone(),
            config.organization.clone(),
            config.timeout,
            Backoff::new(config.max_retries, Duration::from_secs(1)),
        )?;
        Ok(Self::with_model(client, config))
    }
}

impl<M: TextModel> TradeAnalyzer<M> {
    pub fn with_model(model: M, config: &AnalyzerConfig) -> Self {
        Self {
            model,
            model_name: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn request(&self, message: ChatMessage) -> CompletionRequest {
        CompletionRequest {
            model: self.model_name.clone(),
            messages: vec![message],
            max_tokens: self.max_tokens,
        }
    }

    /// Ask the model to comment on `trades`. The reply is trimmed.
    pub fn analyze(&self, trades: &[TradeEvent]) -> Result<String, AnalysisError> {
        let request = self.request(ChatMessage::user(build_prompt(trades)));
        let text = self.model.complete(&request)?;
        info!(model = %self.model_name, trades = trades.len(), "trade analysis completed");
        Ok(text.trim().to_string())
    }

    /// Ask the model to describe a chart image (PNG or JPEG) read from disk.
    pub fn analyze_chart(&self, image_path: &Path) -> Result<String, AnalysisError> {
        let bytes = std::fs::read(image_path).map_err(|source| AnalysisError::Image {
            path: image_path.to_path_buf(),
            source,
        })?;
        let url = format!(
            "data:{};base64,{}",
            image_mime(image_path),
            base64::engine::general_purpose::STANDARD.encode(bytes)
        );

        let request = self.request(ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: CHART_INSTRUCTION.into(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url },
            },
        ]));
        let text = self.model.complete(&request)?;
        info!(model = %self.model_name, path = %image_path.display(), "chart analysis completed");
        Ok(text.trim().to_string())
    }
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
