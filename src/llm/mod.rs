//! Minimal client for the Anthropic Messages API.

pub mod client;
pub mod types;

pub use client::{ClaudeClient, CompletionModel};

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("model api error ({status}): {body}")]
    Api {
        status: StatusCode,
        body: String,
        retriable: bool,
    },

    #[error("could not decode model response: {0}")]
    Decode(String),

    #[error("model returned no text content")]
    EmptyResponse,

    #[error("invalid api key header: {0}")]
    InvalidApiKey(String),
}

impl LlmError {
    pub fn api(status: StatusCode, body: impl Into<String>) -> Self {
        // 529 is Anthropic's "overloaded"
        let retriable = status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status.as_u16() == 529;
        Self::Api {
            status,
            body: body.into(),
            retriable,
        }
    }

    pub fn should_retry(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Api { retriable, .. } => *retriable,
            Self::Decode(_) | Self::EmptyResponse | Self::InvalidApiKey(_) => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
