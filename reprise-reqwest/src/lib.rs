//! [`PageSource`] backed by a [`reqwest`] client.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reprise::CachedFetcher;
//! use reprise_memory::MemoryStore;
//! use reprise_reqwest::ReqwestPageSource;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = CachedFetcher::new(Arc::new(MemoryStore::new()), ReqwestPageSource::new());
//! let html = fetcher.fetch("http://example.com/").await?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```

mod source;

pub use source::ReqwestPageSource;

/// Re-export of the middleware client type accepted by [`ReqwestPageSource`].
pub use reqwest_middleware::ClientWithMiddleware;
