//! Gemini API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Response caching for identical prompts

mod wire;

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::parser::SOURCES_MARKER;

use wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Gemini text generation client.
#[derive(Clone)]
pub struct GeminiClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, String>,

    /// Model identifier.
    model: String,

    /// API base URL.
    api_base_url: String,
}

impl GeminiClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingApiKey`] when no key is configured, so
    /// an unusable client is never constructed.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let Some(key) = config.api_key.as_deref() else {
            tracing::warn!("{}", api::API_KEY_WARNING);
            return Err(ClientError::MissingApiKey);
        };

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let mut key_value = reqwest::header::HeaderValue::from_str(key)
            .map_err(|_| ClientError::bad_request("API key contains invalid header characters"))?;
        key_value.set_sensitive(true);
        headers.insert("x-goog-api-key", key_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            client,
            cache,
            model: config.model.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Model identifier requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text for `prompt`.
    ///
    /// When `grounded` is set the request enables Google Search grounding,
    /// and any web sources are appended to the returned text as a
    /// `[SOURCES:<json>]` block.
    ///
    /// # Errors
    ///
    /// Returns error on API failure or when the model returns no candidates.
    pub async fn generate(&self, prompt: &str, grounded: bool) -> ClientResult<String> {
        let cache_key = self.cache_key(prompt, grounded);
        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::debug!("Serving analysis from cache");
            return Ok(cached);
        }

        let url = format!("{}/models/{}:generateContent", self.api_base_url, self.model);
        let body = serde_json::to_string(&GenerateContentRequest::new(prompt, grounded))?;

        tracing::info!(model = %self.model, grounded, prompt_len = prompt.len(), "Calling model API");

        let response = self.client.post(&url).body(body).send().await?;
        let response = self.handle_response(response).await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&response.bytes().await?)?;

        let Some(mut text) = parsed.text() else {
            return Err(ClientError::EmptyResponse { reason: parsed.block_reason() });
        };

        let chunks = parsed.web_chunks();
        if !chunks.is_empty() {
            tracing::debug!(sources = chunks.len(), "Appending grounding sources");
            text.push_str(&format!("\n\n{SOURCES_MARKER}{}]", serde_json::to_string(&chunks)?));
        }

        self.cache.insert(cache_key, text.clone()).await;
        Ok(text)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .ok()
            .map(|e| e.error)
            .filter(|e| !e.message.is_empty())
            .map_or_else(
                || text.clone(),
                |e| if e.status.is_empty() { e.message } else { format!("{} ({})", e.message, e.status) },
            );

        tracing::warn!(status = status.as_u16(), %message, "Model API returned an error");

        match status.as_u16() {
            400 if text.contains("API_KEY_NOT_VALID") => Err(ClientError::InvalidApiKey { message }),
            401 | 403 => Err(ClientError::InvalidApiKey { message }),
            429 => Err(ClientError::rate_limited(retry_after, message)),
            400 => Err(ClientError::bad_request(message)),
            500..=599 => Err(ClientError::server(status.as_u16(), message)),
            _ => Err(ClientError::UnexpectedStatus { status: status.as_u16(), message }),
        }
    }

    /// Generate cache key.
    fn cache_key(&self, prompt: &str, grounded: bool) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(self.model.as_bytes());
        hasher.update(b"|");
        hasher.update(if grounded { b"grounded" as &[u8] } else { b"plain" });
        hasher.update(b"|");
        hasher.update(prompt.as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}
