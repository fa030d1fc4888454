//! HTTP gateway client
//!
//! This module handles all HTTP requests to the catalog, including:
//! - Building the HTTP client with user agent and timeouts
//! - JSON metadata queries with status and result classification
//! - Raw byte downloads for page and cover images

use crate::config::GatewayConfig;
use crate::ArchiverError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The gateway configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use mdex_archiver::config::GatewayConfig;
/// use mdex_archiver::gateway::build_http_client;
///
/// let client = build_http_client(&GatewayConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &GatewayConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Read-only client for the catalog API and its image hosts
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    api_base_url: String,
    uploads_base_url: String,
}

impl Gateway {
    /// Creates a gateway from configuration
    pub fn new(config: &GatewayConfig) -> Result<Self, ArchiverError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a gateway reusing an existing HTTP client
    pub fn with_client(client: Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            uploads_base_url: config.uploads_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL serving series covers
    pub fn uploads_base_url(&self) -> &str {
        &self.uploads_base_url
    }

    /// Builds an absolute API URL from a path such as `/chapter/{id}`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Queries a JSON endpoint of the API and deserializes the response
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Transport failure, timeout | `RemoteLookup` |
    /// | Non-2xx status | `RemoteLookup` |
    /// | `"result": "error"` in the body | `RemoteResult` |
    /// | Body does not match `T` | `MetadataShape` |
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ArchiverError> {
        let url = self.api_url(path);
        tracing::debug!("GET {}", url);

        let body: Value = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ArchiverError::RemoteLookup {
                url: url.clone(),
                source,
            })?
            .json()
            .await
            .map_err(|e| ArchiverError::MetadataShape(format!("{}: {}", url, e)))?;

        if body.get("result").and_then(Value::as_str) == Some("error") {
            return Err(ArchiverError::RemoteResult {
                url,
                message: error_message(&body),
            });
        }

        serde_json::from_value(body)
            .map_err(|e| ArchiverError::MetadataShape(format!("{}: {}", url, e)))
    }

    /// Downloads the raw body of an absolute URL
    ///
    /// Used for page and cover images; the caller decides whether a failure is retried.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Extracts a readable message from an error envelope
fn error_message(body: &Value) -> String {
    body.get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .map(|error| {
            let title = error.get("title").and_then(Value::as_str).unwrap_or("error");
            match error.get("detail").and_then(Value::as_str) {
                Some(detail) => format!("{}: {}", title, detail),
                None => title.to_string(),
            }
        })
        .unwrap_or_else(|| "unspecified error".to_string())
}
