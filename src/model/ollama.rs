//! Client for Ollama's non-streaming `/api/generate` endpoint.
//!
//! The retry budget lives here rather than in the HTTP layer: a caller sees a
//! single `complete` call that either yields the completion or the last error
//! once `max_retries` extra attempts have been spent.

use super::{GenerateParams, LlmBackend};
use crate::error::BackendError;
use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const INITIAL_BACKOFF_MS: u64 = 200;
const BACKOFF_MULTIPLIER: u64 = 2;
const MAX_BACKOFF_MS: u64 = 2_000;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: String,
}

struct Inner {
    client: Client,
    generate_url: Url,
    params: GenerateParams,
}

#[derive(Clone)]
pub struct OllamaBackend {
    inner: Arc<Inner>,
}

impl OllamaBackend {
    pub fn new(base_url: &str, params: GenerateParams, timeout: Option<Duration>) -> Result<Self> {
        let generate_url = generate_url(base_url)?;

        let mut builder = Client::builder().pool_idle_timeout(Duration::from_secs(90));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("build backend http client")?;

        Ok(Self {
            inner: Arc::new(Inner { client, generate_url, params }),
        })
    }

    pub fn generate_url(&self) -> &Url {
        &self.inner.generate_url
    }

    pub fn params(&self) -> &GenerateParams {
        &self.inner.params
    }

    async fn attempt(&self, prompt: &str) -> Result<String, BackendError> {
        let p = &self.inner.params;
        let body = GenerateRequest {
            model: &p.model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: p.temperature },
        };

        let res = self
            .inner
            .client
            .post(self.inner.generate_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(text) => text,
                Err(e) => format!("<unreadable body: {e}>"),
            };
            return Err(BackendError::Status { status, body });
        }

        let reply: GenerateReply = res.json().await?;
        Ok(reply.response)
    }
}

#[async_trait::async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let max_retries = self.inner.params.max_retries;
        let mut attempt: u32 = 0;

        loop {
            match self.attempt(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = backoff_delay(attempt);
                    debug!(
                        attempt,
                        next_attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying backend call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempts = attempt + 1, error = %e, "backend call failed");
                    return Err(e);
                }
            }
        }
    }
}

fn generate_url(base_url: &str) -> Result<Url, BackendError> {
    let invalid = |reason: String| BackendError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    // Url::join would drop a path prefix without a trailing slash, so append by hand.
    let trimmed = base_url.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/api/generate")).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let factor = BACKOFF_MULTIPLIER.saturating_pow(attempt);
    Duration::from_millis(INITIAL_BACKOFF_MS.saturating_mul(factor).min(MAX_BACKOFF_MS))
}
