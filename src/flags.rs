use std::time::Duration;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::domain::CountryCode;
use crate::error::FlashError;
use crate::store::Store;

pub const DEFAULT_URL_TEMPLATE: &str = "https://flagcdn.com/w320/{code}.png";
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Maps a country code onto the CDN URL of its flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSource {
    template: String,
}

impl FlagSource {
    pub fn new(template: impl Into<String>) -> Result<Self, FlashError> {
        let template = template.into();
        if !template.contains(CODE_PLACEHOLDER) {
            return Err(FlashError::InvalidConfig(format!(
                "flag URL template must contain {CODE_PLACEHOLDER}: {template}"
            )));
        }
        Ok(Self { template })
    }

    pub fn url_for(&self, code: &str) -> String {
        self.template
            .replace(CODE_PLACEHOLDER, &code.trim().to_ascii_lowercase())
    }
}

impl Default for FlagSource {
    fn default() -> Self {
        Self {
            template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

#[async_trait]
pub trait FlagClient: Send + Sync {
    async fn fetch(&self, code: &CountryCode) -> Result<Vec<u8>, FlashError>;
}

#[derive(Clone)]
pub struct FlagHttpClient {
    client: Client,
    source: FlagSource,
}

impl FlagHttpClient {
    pub fn new(source: FlagSource, timeout: Duration) -> Result<Self, FlashError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("flagdeck/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| FlashError::FlagHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| FlashError::FlagHttp(err.to_string()))?;
        Ok(Self { client, source })
    }

    async fn handle_status(response: reqwest::Response) -> Result<reqwest::Response, FlashError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .ok()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "flag request failed".to_string());
        Err(FlashError::FlagStatus { status, message })
    }
}

#[async_trait]
impl FlagClient for FlagHttpClient {
    async fn fetch(&self, code: &CountryCode) -> Result<Vec<u8>, FlashError> {
        let url = self.source.url_for(code.as_str());
        debug!(code = %code, url = %url, "requesting flag");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FlashError::FlagHttp(err.to_string()))?;
        let response = Self::handle_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| FlashError::FlagHttp(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug)]
pub enum FlagOutcome {
    Saved { path: Utf8PathBuf, bytes: usize },
    Failed { error: FlashError },
    TimedOut { after: Duration },
}

impl FlagOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, FlagOutcome::Saved { .. })
    }
}

/// Downloads flags into the store. Failures come back as
/// [`FlagOutcome`] values; nothing here aborts the batch.
pub struct FlagFetcher<C: FlagClient> {
    client: C,
    store: Store,
    deadline: Duration,
}

impl<C: FlagClient> FlagFetcher<C> {
    pub fn new(client: C, store: Store, deadline: Duration) -> Self {
        Self {
            client,
            store,
            deadline,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn save(&self, code: &CountryCode) -> FlagOutcome {
        let outcome = match tokio::time::timeout(self.deadline, self.try_save(code)).await {
            Ok(Ok((path, bytes))) => FlagOutcome::Saved { path, bytes },
            Ok(Err(error)) => FlagOutcome::Failed { error },
            Err(_) => FlagOutcome::TimedOut {
                after: self.deadline,
            },
        };
        match &outcome {
            FlagOutcome::Saved { .. } => {}
            FlagOutcome::Failed { error } => warn!(code = %code, "flag download failed: {error}"),
            FlagOutcome::TimedOut { after } => {
                warn!(code = %code, "flag download timed out after {after:?}")
            }
        }
        outcome
    }

    async fn try_save(&self, code: &CountryCode) -> Result<(Utf8PathBuf, usize), FlashError> {
        let bytes = self.client.fetch(code).await?;
        let path = self.store.write_flag(code, &bytes).await?;
        Ok((path, bytes.len()))
    }
}
