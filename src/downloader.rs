use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::RelayError;
use crate::logging::RequestLog;
use crate::types::{DownloaderResponse, MediaResolution};

/// Client for the external downloader that turns a post link into a direct media URL.
pub struct Downloader {
    client: Client,
    base_url: Url,
    timeout: Duration,
    default_title: String,
}

impl Downloader {
    pub fn new(client: Client, base_url: Url, timeout: Duration, default_title: String) -> Self {
        Self {
            client,
            base_url,
            timeout,
            default_title,
        }
    }

    fn request_url(&self, source_url: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("url", source_url);
        url
    }

    pub async fn resolve(
        &self,
        source_url: &str,
        log: &RequestLog,
    ) -> Result<MediaResolution, RelayError> {
        let url = self.request_url(source_url);
        log.trace(format_args!("Downloader request: {}", url));

        // The deadline covers getting the response head, not reading the body.
        let response = match tokio::time::timeout(self.timeout, self.client.get(url).send()).await {
            Err(_) => return Err(RelayError::UpstreamTimeout(self.timeout)),
            Ok(Err(e)) if e.is_timeout() => return Err(RelayError::UpstreamTimeout(self.timeout)),
            Ok(Err(e)) => return Err(RelayError::UpstreamUnreachable(e.to_string())),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamHttpError(status.as_u16()));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| RelayError::UpstreamUnreachable(e.to_string()))?;

        let parsed: DownloaderResponse = serde_json::from_str(&raw)
            .map_err(|_| RelayError::UpstreamBadResponse(raw.clone()))?;

        let media_url = match (parsed.status.as_deref(), parsed.media_url) {
            (Some("success"), Some(media_url)) if !media_url.is_empty() => media_url,
            _ => return Err(RelayError::UpstreamBadResponse(raw)),
        };

        let title = parsed
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.default_title.clone());

        log.trace(format_args!("Video URL: {}, Title: {}", media_url, title));
        Ok(MediaResolution { media_url, title })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn downloader(server: &MockServer, timeout: Duration) -> Downloader {
        Downloader::new(
            Client::new(),
            Url::parse(&format!("{}/api/download", server.uri())).unwrap(),
            timeout,
            "Video".to_string(),
        )
    }

    async fn resolve(server: &MockServer) -> Result<MediaResolution, RelayError> {
        downloader(server, Duration::from_secs(5))
            .resolve("https://pin.it/abc123", &RequestLog::new(false))
            .await
    }

    #[tokio::test]
    async fn success_yields_media_url_and_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/download"))
            .and(query_param("url", "https://pin.it/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "media_url": "https://x/video.mp4",
                "title": "T"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let media = resolve(&server).await.unwrap();
        assert_eq!(media.media_url, "https://x/video.mp4");
        assert_eq!(media.title, "T");
    }

    #[tokio::test]
    async fn missing_title_falls_back_to_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "media_url": "https://x/video.mp4"
            })))
            .mount(&server)
            .await;

        assert_eq!(resolve(&server).await.unwrap().title, "Video");
    }

    #[test]
    fn source_url_is_encoded_into_query() {
        let d = Downloader::new(
            Client::new(),
            Url::parse("https://dl.example.com/Pinterest/api").unwrap(),
            Duration::from_secs(40),
            "Video".to_string(),
        );
        assert_eq!(
            d.request_url("https://pin.it/abc123").as_str(),
            "https://dl.example.com/Pinterest/api?url=https%3A%2F%2Fpin.it%2Fabc123"
        );
    }

    #[tokio::test]
    async fn non_success_status_field_is_bad_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status":"error","message":"private pin"}"#),
            )
            .mount(&server)
            .await;

        match resolve(&server).await {
            Err(RelayError::UpstreamBadResponse(raw)) => assert!(raw.contains("private pin")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_media_url_is_bad_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "media_url": ""
            })))
            .mount(&server)
            .await;

        assert!(matches!(
            resolve(&server).await,
            Err(RelayError::UpstreamBadResponse(_))
        ));
    }

    #[tokio::test]
    async fn invalid_json_is_bad_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        match resolve(&server).await {
            Err(RelayError::UpstreamBadResponse(raw)) => assert_eq!(raw, "<html>oops</html>"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert!(matches!(
            resolve(&server).await,
            Err(RelayError::UpstreamHttpError(502))
        ));
    }

    #[tokio::test]
    async fn slow_downloader_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "success", "media_url": "https://x/v.mp4" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = downloader(&server, Duration::from_millis(100))
            .resolve("https://pin.it/abc123", &RequestLog::new(false))
            .await;
        assert!(matches!(result, Err(RelayError::UpstreamTimeout(_))));
    }

    #[tokio::test]
    async fn unreachable_downloader_is_reported() {
        let d = Downloader::new(
            Client::new(),
            Url::parse("http://127.0.0.1:1/api/download").unwrap(),
            Duration::from_secs(5),
            "Video".to_string(),
        );
        let result = d.resolve("https://pin.it/abc123", &RequestLog::new(false)).await;
        assert!(matches!(result, Err(RelayError::UpstreamUnreachable(_))));
    }
}
