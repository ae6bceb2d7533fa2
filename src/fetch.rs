use crate::CrawlerError;
use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::debug;

#[async_trait::async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<String, CrawlerError>;
}

/// Plain GET with a minimum delay between two consecutive requests.
/// No retries.
pub struct HttpFetcher {
    client: reqwest::Client,
    request_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    pub fn new(request_delay: Duration, timeout: Option<Duration>) -> Result<Self, CrawlerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            request_delay,
            last_request: Mutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CrawlerError> {
        let mut last_request_mutex = self.last_request.lock().await;
        let last_request = last_request_mutex.take();
        let now = Instant::now();
        if let Some(last_request) = last_request {
            let duration = now.duration_since(last_request);
            if duration < self.request_delay {
                tokio::time::sleep(self.request_delay - duration).await;
            }
        }

        debug!("Visit {}", url);
        let res = self.client.get(url).send().await;
        last_request_mutex.replace(Instant::now());

        let res = res?;
        if !res.status().is_success() {
            return Err(CrawlerError::HttpStatus {
                url: url.to_string(),
                status: res.status().as_u16(),
            });
        }
        Ok(res.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    const PAGE: &str = "<html><body>results</body></html>";

    /// Serves `PAGE` on `/results/` and a 404 everywhere else.
    async fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let (status, body) = if request.starts_with("GET /results/ ") {
                        ("200 OK", PAGE)
                    } else {
                        ("404 Not Found", "")
                    };
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_maps_status() {
        let base = serve().await;
        let delay = Duration::from_millis(300);
        let fetcher = HttpFetcher::new(delay, Some(Duration::from_secs(5))).unwrap();

        let start = Instant::now();
        let body = fetcher.fetch(&format!("{}/results/", base)).await.unwrap();
        assert_eq!(body, PAGE);

        let missing = format!("{}/missing/", base);
        let res = fetcher.fetch(&missing).await;
        assert!(start.elapsed() >= delay);
        match res {
            Err(CrawlerError::HttpStatus { url, status }) => {
                assert_eq!(status, 404);
                assert_eq!(url, missing);
            }
            other => panic!("Expected an HTTP status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_fetch_is_not_delayed() {
        let base = serve().await;
        let delay = Duration::from_secs(5);
        let fetcher = HttpFetcher::new(delay, Some(Duration::from_secs(2))).unwrap();

        let start = Instant::now();
        fetcher.fetch(&format!("{}/results/", base)).await.unwrap();
        assert!(start.elapsed() < delay);
    }
}
