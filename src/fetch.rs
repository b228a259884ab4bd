use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderName, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::FetchConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("unexpected response status {0}")]
    Status(StatusCode),
}

/// What a successful fetch came back with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server confirmed the conditional token still matches.
    NotModified { token: Option<String> },
    Fetched {
        body: String,
        token: Option<String>,
        content_type: Option<String>,
    },
}

impl FetchOutcome {
    /// Fresh conditional token, if the response carried one.
    pub fn token(&self) -> Option<&str> {
        match self {
            FetchOutcome::NotModified { token } | FetchOutcome::Fetched { token, .. } => {
                token.as_deref()
            }
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, passing `token` as a conditional hint when given.
    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<FetchOutcome, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<FetchOutcome, FetchError> {
        (**self).fetch(url, token).await
    }
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<FetchOutcome, FetchError> {
        let mut req = self.client.get(url);
        if let Some(token) = token {
            req = req.header(IF_NONE_MATCH, token);
        }

        let resp = req.send().await?;
        let token = header(&resp, ETAG);

        if resp.status() == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified { token });
        }
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let content_type = header(&resp, CONTENT_TYPE);
        let body = resp.text().await?;
        Ok(FetchOutcome::Fetched {
            body,
            token,
            content_type,
        })
    }
}

fn header(resp: &reqwest::Response, name: HeaderName) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Serves each canned response to one connection and hands back the
    /// request head it received.
    async fn serve(responses: Vec<&'static str>) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&buf[..n]);
                }
                tx.send(String::from_utf8_lossy(&head).to_lowercase()).unwrap();
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        (format!("http://{addr}/feed"), rx)
    }

    #[tokio::test]
    async fn conditional_fetch_round_trip() {
        let (url, mut requests) = serve(vec![
            "HTTP/1.1 200 OK\r\nETag: \"v1\"\r\nContent-Type: application/rss+xml\r\nContent-Length: 2\r\nConnection: close\r\n\r\nv1",
            "HTTP/1.1 304 Not Modified\r\nETag: \"v1\"\r\nConnection: close\r\n\r\n",
        ])
        .await;
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();

        let first = fetcher.fetch(&url, None).await.unwrap();
        assert_eq!(
            first,
            FetchOutcome::Fetched {
                body: "v1".into(),
                token: Some("\"v1\"".into()),
                content_type: Some("application/rss+xml".into()),
            }
        );
        assert!(!requests.recv().await.unwrap().contains("if-none-match"));

        let second = fetcher.fetch(&url, first.token()).await.unwrap();
        assert_eq!(second, FetchOutcome::NotModified { token: Some("\"v1\"".into()) });
        assert!(requests.recv().await.unwrap().contains("if-none-match: \"v1\""));
    }

    #[tokio::test]
    async fn error_status_is_a_failure() {
        let (url, _requests) = serve(vec![
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ])
        .await;
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();

        let err = fetcher.fetch(&url, None).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)));
    }

    #[tokio::test]
    async fn missing_headers_are_none() {
        let (url, _requests) = serve(vec![
            "HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbare",
        ])
        .await;
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();

        let outcome = fetcher.fetch(&url, None).await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Fetched {
                body: "bare".into(),
                token: None,
                content_type: None,
            }
        );
    }
}
