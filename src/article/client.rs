use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::article::{ArticleError, ArticleResponse};
use crate::config::{Config, ConfigError, RetryPolicy};
use crate::fetcher::get_client;
use crate::jobs::retry;

/// Extraction tuning passed with every request.
const EXTRACTION_PARAMS: [(&str, &str); 4] = [
    ("word_per_minute", "300"),
    ("desc_truncate_len", "210"),
    ("desc_len_min", "180"),
    ("content_len_min", "200"),
];

/// Anything that can turn a page URL into an extracted article.
#[async_trait]
pub trait ArticleSource: Send + Sync + 'static {
    async fn parse_article(&self, article_url: &Url) -> Result<ArticleResponse, ArticleError>;
}

/// RapidAPI article extraction client.
#[derive(Clone)]
pub struct ArticleClient {
    http: Client,
    endpoint: String,
    api_key: String,
    api_host: String,
    retry: RetryPolicy,
}

impl ArticleClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_host: impl Into<String>,
    ) -> Self {
        Self {
            http: get_client().clone(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_host: api_host.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.article_api_url(),
            config.require_rapid_api_key()?,
            config.rapid_api_host(),
        )
        .with_retry(config.retry()))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, article_url: &Url) -> Result<ArticleResponse, ArticleError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("url", article_url.as_str())])
            .query(&EXTRACTION_PARAMS)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArticleError::http(status, body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ArticleError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ArticleSource for ArticleClient {
    #[instrument(skip_all, fields(url = %article_url))]
    async fn parse_article(&self, article_url: &Url) -> Result<ArticleResponse, ArticleError> {
        let article = retry(
            self.retry,
            "article extraction",
            || self.request(article_url),
            ArticleError::should_retry,
        )
        .await?;
        debug!(success = article.success, "Article api responded");
        Ok(article)
    }
}
