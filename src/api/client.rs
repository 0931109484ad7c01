use bytes::Bytes;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::models::{
    ApiConfig, DownloadRequest, DownloadStarted, ErrorBody, InfoRequest, InfoResponse,
    StatusResponse,
};

const INFO_FALLBACK: &str = "Failed";
const DOWNLOAD_FALLBACK: &str = "download failed";
const STATUS_FALLBACK: &str = "status failed";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Message from the backend's `{"error": ...}` body, or the endpoint's fallback text.
    #[error("{0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.config.base_url.join(path)?)
    }

    fn status_endpoint(&self, job_id: &str) -> Result<Url> {
        let mut url = self.endpoint("status/")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidResponse("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }

    /// `POST /api/info`: title, author, duration and the available resolutions.
    pub async fn info(&self, video_url: &str) -> Result<InfoResponse> {
        let response = self
            .http
            .post(self.endpoint("api/info")?)
            .json(&InfoRequest { url: video_url })
            .send()
            .await?;

        decode(response, INFO_FALLBACK).await
    }

    /// `POST /download`: queues a job on the backend and returns its id.
    pub async fn start_download(&self, video_url: &str, resolution: &str) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint("download")?)
            .json(&DownloadRequest {
                url: video_url,
                resolution,
            })
            .send()
            .await?;

        let started: DownloadStarted = decode(response, DOWNLOAD_FALLBACK).await?;
        Ok(started.id)
    }

    /// `GET /status/{id}`
    pub async fn status(&self, job_id: &str) -> Result<StatusResponse> {
        let response = self.http.get(self.status_endpoint(job_id)?).send().await?;
        decode(response, STATUS_FALLBACK).await
    }

    /// Raw bytes of a thumbnail image, which usually lives on a third-party host.
    pub async fn thumbnail(&self, image_url: &str) -> Result<Bytes> {
        let response = self
            .http
            .get(image_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::Api(format!("Thumbnail request failed: {}", e)))?;

        Ok(response.bytes().await?)
    }
}

/// Non-2xx responses become `ApiError::Api` with the body's `error` field, or `fallback`.
async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        tracing::debug!(%status, %message, "backend returned an error");
        return Err(ApiError::Api(message));
    }

    serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
}
