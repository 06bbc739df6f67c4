use reqwest::StatusCode;
use thiserror::Error;

use crate::fetcher::errors::is_retriable_status;

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("article api returned {status}: {body}")]
    Http {
        status: StatusCode,
        body: String,
        retriable: bool,
    },

    #[error("could not decode article api response: {0}")]
    Decode(String),

    #[error("article extraction failed: {0}")]
    Extraction(String),

    #[error("article has no title, metadata or content")]
    Empty,
}

impl ArticleError {
    pub fn http(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
            retriable: is_retriable_status(status),
        }
    }

    pub fn should_retry(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Http { retriable, .. } => *retriable,
            Self::Decode(_) | Self::Extraction(_) | Self::Empty => false,
        }
    }
}

impl From<reqwest::Error> for ArticleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
