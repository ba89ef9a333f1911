use crate::config::Config;
use crate::error_log::ErrorLog;
use crate::retry::{with_retry, RetryConfig};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

/// Failure of a single upstream request
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Deserialize)]
struct FactsResponse {
    #[serde(default)]
    data: Vec<Option<String>>,
}

/// Send a GET request and decode its JSON body, treating non-2xx as an error
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, FetchError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }

    Ok(response.json().await?)
}

/// Pulls fact batches for one language at a time
pub struct FactFetcher {
    client: reqwest::Client,
    url: String,
    retry: RetryConfig,
}

impl FactFetcher {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            url: config.facts_url(),
            retry: RetryConfig::new(config.max_attempts, config.request_delay),
        }
    }

    /// Fetch one batch of facts for `language`
    ///
    /// Returns the first non-empty batch, or nothing if the first answer was
    /// empty or every attempt failed. Each failed attempt is recorded in `errors`.
    /// Only one batch is kept per call, whatever `target_count` asks for.
    pub async fn fetch(&self, language: &str, target_count: u64, errors: &mut ErrorLog) -> Vec<String> {
        let result = with_retry(
            &self.retry,
            &format!("Facts [{}]", language),
            move || self.fetch_batch(language, target_count),
            |_, e: &FetchError| errors.push(format!("Error fetching ISO code {}: {}", language, e)),
        )
        .await;

        match result {
            Ok(batch) if batch.is_empty() => {
                info!("[{}] Upstream has no facts to offer", language);
                batch
            }
            Ok(batch) => batch,
            Err(_) => Vec::new(),
        }
    }

    async fn fetch_batch(&self, language: &str, target_count: u64) -> Result<Vec<String>, FetchError> {
        let count = target_count.to_string();
        let request = self
            .client
            .get(&self.url)
            .query(&[("lang", language), ("count", count.as_str())]);

        let response: FactsResponse = get_json(request).await?;
        let batch: Vec<String> = response.data.into_iter().flatten().collect();

        debug!("[{}] Received {} facts", language, batch.len());
        Ok(batch)
    }
}
