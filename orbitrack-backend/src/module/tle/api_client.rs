///! N2YO API client for fetching two-line element sets
use async_trait::async_trait;
use orbitrack_common::SatInfo;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream API key is not configured")]
    MissingApiKey,

    #[error("HTTP error {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse upstream response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("no element set available")]
    EmptyElementSet,

    #[error("acquisition task failed: {0}")]
    Task(String),
}

/// Body of `GET /tle/{id}` as returned by the upstream API
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamElementSet {
    #[serde(default)]
    pub info: Option<SatInfo>,
    #[serde(default)]
    pub tle: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successfully fetched element set
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedElementSet {
    pub tle: String,
    pub info: Option<SatInfo>,
}

impl UpstreamElementSet {
    pub fn into_fetched(self) -> Result<FetchedElementSet, FetchError> {
        if let Some(error) = self.error {
            return Err(FetchError::Upstream(error));
        }
        match self.tle {
            Some(tle) if !tle.trim().is_empty() => Ok(FetchedElementSet {
                tle,
                info: self.info,
            }),
            _ => Err(FetchError::EmptyElementSet),
        }
    }
}

/// Where element sets come from, one identifier per call
#[async_trait]
pub trait ElementSetSource: Send + Sync {
    /// Checked once before a sweep; an error here fails the whole sweep
    fn ensure_ready(&self) -> Result<(), FetchError> {
        Ok(())
    }

    async fn fetch_element_set(&self, id: u64) -> Result<FetchedElementSet, FetchError>;
}

pub struct N2yoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl N2yoClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// The upstream expects the key appended with `&`, not `?`
    fn element_set_url(&self, id: u64, api_key: &str) -> String {
        format!("{}/tle/{}&apiKey={}", self.base_url, id, api_key)
    }
}

#[async_trait]
impl ElementSetSource for N2yoClient {
    fn ensure_ready(&self) -> Result<(), FetchError> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(()),
            _ => Err(FetchError::MissingApiKey),
        }
    }

    async fn fetch_element_set(&self, id: u64) -> Result<FetchedElementSet, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;

        let response = self
            .client
            .get(self.element_set_url(id, api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let upstream: UpstreamElementSet =
            serde_json::from_str(&body).map_err(FetchError::Decode)?;

        upstream.into_fetched()
    }
}
