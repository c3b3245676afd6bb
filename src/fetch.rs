use crate::error::ScrapeError;
use futures::StreamExt;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Pages are cut off after this many bytes.
pub const BODY_LIMIT: usize = 1024 * 1024;
pub const USER_AGENT: &str = concat!("contact-scraper/", env!("CARGO_PKG_VERSION"));

// reqwest has no separate TLS handshake timeout; the handshake counts
// against both of these.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything able to hand back the HTML of a URL.
#[async_trait::async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;
}

/// Fetches pages over HTTP(S): a HEAD probe first, then a capped GET.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ScrapeError> {
        // No idle connections are kept, seeds are mostly distinct hosts.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(HttpFetcher { client })
    }

    async fn probe(&self, url: &str) -> Result<(), ScrapeError> {
        let response = self.client.head(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(ScrapeError::Unreachable {
                url: url.to_string(),
                status: response.status(),
            });
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = String::from_utf8_lossy(content_type.as_bytes());
            if !is_html(&content_type) {
                return Err(ScrapeError::UnsupportedContentType {
                    url: url.to_string(),
                    content_type: content_type.into_owned(),
                });
            }
        }

        Ok(())
    }
}

fn is_html(content_type: &str) -> bool {
    content_type
        .split(';')
        .any(|part| part.trim().eq_ignore_ascii_case("text/html"))
}

#[async_trait::async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.probe(url).await?;

        let response = self.client.get(url).send().await?;
        let mut stream = response.bytes_stream();
        let mut body = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let take = chunk.len().min(BODY_LIMIT - body.len());
            body.extend_from_slice(&chunk[..take]);
            if body.len() >= BODY_LIMIT {
                debug!("Truncated {} at {} bytes", url, BODY_LIMIT);
                break;
            }
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn html_probe(server: &MockServer, route: &str) {
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-type", "text/html; charset=utf-8"),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("charset=utf-8; TEXT/HTML"));
        assert!(!is_html("application/json"));
        assert!(!is_html("text/html5"));
    }

    #[tokio::test]
    async fn test_fetch_html() {
        let server = MockServer::start().await;
        html_probe(&server, "/page").await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>(212) 555-0199</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"<p>(212) 555-0199</p>".to_vec());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/bare"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bare"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>(212) 555-0199</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/bare", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"<p>(212) 555-0199</p>".to_vec());
    }

    #[tokio::test]
    async fn test_probe_not_ok() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let res = fetcher.fetch(&format!("{}/missing", server.uri())).await;
        assert!(matches!(
            res,
            Err(ScrapeError::Unreachable { status, .. }) if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_probe_not_html() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let res = fetcher.fetch(&format!("{}/doc.pdf", server.uri())).await;
        assert!(matches!(
            res,
            Err(ScrapeError::UnsupportedContentType { content_type, .. }) if content_type == "application/pdf"
        ));
    }

    #[tokio::test]
    async fn test_body_is_truncated() {
        let server = MockServer::start().await;
        html_probe(&server, "/big").await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; BODY_LIMIT + 4096]))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/big", server.uri()))
            .await
            .unwrap();
        assert_eq!(body.len(), BODY_LIMIT);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let fetcher = HttpFetcher::new().unwrap();
        let res = fetcher.fetch("http://127.0.0.1:1/").await;
        assert!(matches!(res, Err(ScrapeError::Transport(_))));
    }
}
