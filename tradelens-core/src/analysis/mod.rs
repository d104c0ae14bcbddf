//! Natural-language commentary on simulated trades and chart images.

pub mod analyzer;
pub mod client;
pub mod prompt;

pub use analyzer::{AnalyzerConfig, TradeAnalyzer};
pub use client::{ChatMessage, CompletionRequest, ContentPart, MessageContent, OpenAiClient, TextModel};
pub use prompt::build_prompt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by model provider")]
    RateLimited,

    #[error("model returned no text")]
    EmptyResponse,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("failed to read chart image {path}: {source}")]
    Image {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
