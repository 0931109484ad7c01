use bytes::Bytes;

use crate::{
    api::{models::InfoResponse, ApiClient},
    domain::{AppError, ResolutionOption, VideoMetadata},
};

#[derive(Clone)]
pub struct MetadataFetcher {
    api_client: ApiClient,
}

impl MetadataFetcher {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// One request, no retries. The caller rejects blank URLs before calling this.
    pub async fn fetch_metadata(&self, video_url: String) -> Result<VideoMetadata, AppError> {
        tracing::info!(url = %video_url, "fetching video metadata");

        let info = self.api_client.info(&video_url).await.map_err(|e| {
            tracing::warn!(url = %video_url, error = %e, "metadata request failed");
            AppError::from(e)
        })?;

        let metadata = VideoMetadata::from(info);
        tracing::debug!(
            title = %metadata.title,
            resolutions = metadata.resolutions.len(),
            "metadata received"
        );
        Ok(metadata)
    }

    pub async fn fetch_thumbnail(&self, image_url: String) -> Result<Bytes, AppError> {
        self.api_client
            .thumbnail(&image_url)
            .await
            .map_err(AppError::from)
    }
}

impl From<InfoResponse> for VideoMetadata {
    fn from(info: InfoResponse) -> Self {
        let resolutions = info
            .resolutions
            .into_iter()
            .map(|entry| ResolutionOption {
                label: entry.res,
                is_progressive: entry.progressive,
                is_video_only: entry.video_only,
            })
            .collect();

        VideoMetadata {
            title: info.title.unwrap_or_default(),
            author: info.author.filter(|a| !a.is_empty()),
            thumbnail_url: info.thumbnail.filter(|t| !t.is_empty()),
            duration_text: info.length.filter(|l| !l.is_empty()),
            resolutions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use std::time::Duration;
    use url::Url;

    fn fetcher_for(server: &mockito::ServerGuard) -> MetadataFetcher {
        let base = Url::parse(&server.url()).unwrap();
        MetadataFetcher::new(ApiClient::new(ApiConfig::new(base, Duration::from_millis(1))))
    }

    #[tokio::test]
    async fn test_fetch_keeps_resolution_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/info")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"title":"Clip","author":"Someone","thumbnail":"","length":"1:02:03","resolutions":[
                    {"res":"1080p","progressive":false,"video_only":true},
                    {"res":"360p","progressive":true,"video_only":false},
                    {"res":"720p","progressive":true,"video_only":false}]}"#,
            )
            .create_async()
            .await;

        let metadata = fetcher_for(&server)
            .fetch_metadata("https://example.com/v".to_string())
            .await
            .unwrap();

        let labels: Vec<_> = metadata.resolutions.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["1080p", "360p", "720p"]);
        assert!(metadata.resolutions[0].is_video_only);
        assert_eq!(metadata.author.as_deref(), Some("Someone"));
        assert_eq!(metadata.thumbnail_url, None);
        assert_eq!(metadata.duration_text.as_deref(), Some("1:02:03"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{}/", addr)).unwrap();
        let fetcher =
            MetadataFetcher::new(ApiClient::new(ApiConfig::new(base, Duration::from_millis(1))));

        match fetcher.fetch_metadata("https://example.com/v".to_string()).await {
            Err(AppError::Request(message)) => {
                assert!(message.starts_with("HTTP request failed"), "{}", message)
            }
            other => panic!("expected a request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_is_request_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/info")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"missing url"}"#)
            .create_async()
            .await;

        let err = fetcher_for(&server)
            .fetch_metadata("x".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Request("missing url".to_string()));
    }
}
