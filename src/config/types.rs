use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for the archiver
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub output: OutputConfig,
    pub features: FeatureConfig,
    pub download: DownloadConfig,
}

/// Remote gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the metadata API
    #[serde(rename = "api-base-url")]
    pub api_base_url: String,

    /// Base URL serving series cover images
    #[serde(rename = "uploads-base-url")]
    pub uploads_base_url: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Translated language of the chapters to fetch (ISO 639-1)
    pub language: String,

    /// Fetch the compressed page set instead of the original quality one
    #[serde(rename = "data-saver")]
    pub data_saver: bool,

    /// Upper bound for a single request, in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Upper bound for establishing a connection, in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.mangadex.org".to_string(),
            uploads_base_url: "https://uploads.mangadex.org".to_string(),
            user_agent: format!("mdex-archiver/{}", env!("CARGO_PKG_VERSION")),
            language: "en".to_string(),
            data_saver: false,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for archives and covers
    pub directory: PathBuf,

    /// Path to the JSON document listing archived chapters
    #[serde(rename = "cache-path")]
    pub cache_path: PathBuf,

    /// File extension of chapter archives
    #[serde(rename = "archive-extension")]
    pub archive_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./downloads"),
            cache_path: PathBuf::from("./downloaded.json"),
            archive_extension: "cbz".to_string(),
        }
    }
}

/// Feature toggles
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Ignore the cache: download everything and record nothing
    #[serde(rename = "override")]
    pub override_cache: bool,

    /// Download the series cover image
    #[serde(rename = "download-cover")]
    pub download_cover: bool,

    /// Extract one cover per volume from the first page of a chapter
    #[serde(rename = "chapter-cover")]
    pub chapter_cover: bool,
}

/// Page download tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Pause between two attempts at the same page (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 1000,
        }
    }
}
