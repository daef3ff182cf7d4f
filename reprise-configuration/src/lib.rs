//! YAML configuration for reprise.
//!
//! ```yaml
//! store:
//!   type: Redis
//!   connection_string: "redis://127.0.0.1/"
//!   label: sessions
//! cache:
//!   namespace: demo
//! fetcher:
//!   ttl: 10s
//! ```
//!
//! Only `store` is required. Store backends are compiled in through the
//! `memory` (default) and `redis` features.

pub mod config;
pub mod error;
pub mod store;

pub use config::{CacheSection, Config, FetcherSection};
pub use error::ConfigError;
pub use store::{Memory, Redis, Store};
