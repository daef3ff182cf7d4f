use std::sync::Arc;

use async_trait::async_trait;
use reprise_backend::BoxError;

/// Source of page bodies for [`CachedFetcher`](crate::CachedFetcher).
///
/// One call is one network round trip. Implementations return the error of
/// their HTTP client as-is; the fetcher hands it to the caller unchanged
/// inside [`FetchError::Network`](crate::FetchError::Network).
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use reprise::PageSource;
///
/// struct Static(&'static str);
///
/// #[async_trait]
/// impl PageSource for Static {
///     async fn get(&self, _url: &str) -> Result<String, reprise::BoxError> {
///         Ok(self.0.to_owned())
///     }
/// }
/// ```
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Performs one GET of `url` and returns the body text.
    async fn get(&self, url: &str) -> Result<String, BoxError>;
}

#[async_trait]
impl<P> PageSource for Arc<P>
where
    P: PageSource + ?Sized,
{
    async fn get(&self, url: &str) -> Result<String, BoxError> {
        (**self).get(url).await
    }
}

#[async_trait]
impl<P> PageSource for Box<P>
where
    P: PageSource + ?Sized,
{
    async fn get(&self, url: &str) -> Result<String, BoxError> {
        (**self).get(url).await
    }
}
