use async_trait::async_trait;
use reprise::{BoxError, PageSource};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tracing::trace;

/// Fetches pages with a plain `GET` through a reqwest middleware chain.
///
/// Non-success statuses are errors, so error pages never reach the cache.
#[derive(Clone, Debug)]
pub struct ReqwestPageSource {
    client: ClientWithMiddleware,
}

impl ReqwestPageSource {
    /// Source over a default [`reqwest::Client`] with no middleware.
    pub fn new() -> Self {
        Self::from_client(reqwest::Client::new())
    }

    /// Source over an existing client, with no middleware.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client: ClientBuilder::new(client).build(),
        }
    }

    /// Source over a client that already carries its middleware chain.
    pub fn with_middleware(client: ClientWithMiddleware) -> Self {
        Self { client }
    }
}

impl Default for ReqwestPageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageSource for ReqwestPageSource {
    async fn get(&self, url: &str) -> Result<String, BoxError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        trace!(url, %status, "page response");
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }
}
