use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{DownloadJob, JobStatus};

/// Body of `POST /api/info`
#[derive(Debug, Clone, Serialize)]
pub struct InfoRequest<'a> {
    pub url: &'a str,
}

/// Response from `POST /api/info`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Pre-formatted duration such as `4:05` or `1:02:03`.
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub resolutions: Vec<ResolutionEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolutionEntry {
    pub res: String,
    #[serde(default)]
    pub progressive: bool,
    #[serde(default)]
    pub video_only: bool,
}

/// Body of `POST /download`
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
    pub resolution: &'a str,
}

/// Response from `POST /download`
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadStarted {
    pub id: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WireStatus {
    Finished,
    Error,
    /// `queued`, `starting`, `downloading`, ... all mean "keep polling".
    #[serde(other)]
    Pending,
}

/// Response from `GET /status/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: WireStatus,
    #[serde(default)]
    pub percent: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

impl StatusResponse {
    pub fn into_job(self, id: &str) -> DownloadJob {
        let status = match self.status {
            WireStatus::Finished => JobStatus::Finished,
            WireStatus::Error => JobStatus::Error,
            WireStatus::Pending => JobStatus::Pending,
        };

        DownloadJob {
            id: id.to_string(),
            status,
            percent: self.percent.unwrap_or(0),
            message: self.message,
            result_file: self.file,
        }
    }
}

/// Failure body shared by all endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(600);

pub const BASE_URL_ENV: &str = "VIDEO_DOWNLOADER_BASE_URL";
pub const POLL_MS_ENV: &str = "VIDEO_DOWNLOADER_POLL_MS";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub poll_interval: Duration,
}

impl ApiConfig {
    pub fn new(base_url: Url, poll_interval: Duration) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            poll_interval,
        }
    }

    /// Defaults, overridden by `VIDEO_DOWNLOADER_BASE_URL` / `VIDEO_DOWNLOADER_POLL_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(BASE_URL_ENV) {
            match Url::parse(raw.trim()) {
                Ok(url) if !url.cannot_be_a_base() => {
                    config.base_url = with_trailing_slash(url);
                }
                Ok(_) => tracing::warn!("{BASE_URL_ENV}={raw} cannot be used as a base URL, keeping default"),
                Err(e) => tracing::warn!("invalid {BASE_URL_ENV}={raw}: {e}, keeping default"),
            }
        }

        if let Some(raw) = lookup(POLL_MS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!("invalid {POLL_MS_ENV}={raw}, keeping default"),
            }
        }

        config
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
