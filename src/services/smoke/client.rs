use reqwest::{Client, Response};
use std::time::Duration;

use super::models::{LookupByTitleRequest, MatchNocRequest, RawResponse, SmokeStep};
use crate::config::SmokeSettings;
use crate::error::{NocMatchError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeClientConfig {
    pub base_url: String,
    /// No limit unless set
    pub timeout: Option<Duration>,
}

impl Default for SmokeClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl SmokeClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &SmokeSettings) -> Self {
        Self {
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: settings.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(NocMatchError::invalid_config("Base URL cannot be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(NocMatchError::invalid_config(format!(
                "Base URL must start with http:// or https://, got '{url}'"
            )));
        }
        Ok(())
    }
}

/// HTTP client for the matching service endpoints
#[derive(Clone)]
pub struct SmokeClient {
    config: SmokeClientConfig,
    client: Client,
}

impl SmokeClient {
    pub fn new(config: SmokeClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim().trim_end_matches('/')
    }

    pub fn url_for(&self, step: SmokeStep) -> String {
        format!("{}{}", self.base_url(), step.path())
    }

    pub async fn health(&self) -> Result<RawResponse> {
        let response = self
            .client
            .get(self.url_for(SmokeStep::Health))
            .send()
            .await?;
        into_raw(response).await
    }

    pub async fn lookup_by_title(&self, request: &LookupByTitleRequest) -> Result<RawResponse> {
        let response = self
            .client
            .post(self.url_for(SmokeStep::LookupByTitle))
            .json(request)
            .send()
            .await?;
        into_raw(response).await
    }

    pub async fn match_noc(&self, request: &MatchNocRequest) -> Result<RawResponse> {
        let response = self
            .client
            .post(self.url_for(SmokeStep::MatchNoc))
            .json(request)
            .send()
            .await?;
        into_raw(response).await
    }
}

async fn into_raw(response: Response) -> Result<RawResponse> {
    let version = format!("{:?}", response.version());
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response.text().await.map_err(NocMatchError::Http)?;

    Ok(RawResponse {
        version,
        status: status.as_u16(),
        reason: status.canonical_reason().map(str::to_string),
        headers,
        body,
    })
}
