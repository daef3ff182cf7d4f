//! Walkthrough of the instrumented cache and the cached fetcher.
//!
//! Runs against an in-process store by default. Set `REPRISE_REDIS_URL` to
//! use a Redis server instead; **the selected database is flushed**.
//!
//! ```sh
//! cargo run -p reprise-demos --example walkthrough -- http://example.com/
//! REPRISE_REDIS_URL=redis://127.0.0.1/15 cargo run -p reprise-demos --example walkthrough
//! ```

use reprise::{BoxError, STORE_OPERATION, replay};
use reprise_configuration::{CacheSection, Config, FetcherSection, Memory, Redis, Store};
use reprise_reqwest::ReqwestPageSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("reprise=debug")
        .init();

    let store = match std::env::var("REPRISE_REDIS_URL") {
        Ok(connection_string) => Store::Redis(Redis {
            connection_string,
            label: Some("demo".to_string()),
        }),
        Err(_) => Store::Memory(Memory {
            label: Some("demo".to_string()),
        }),
    };
    let config = Config {
        store,
        cache: CacheSection::default(),
        fetcher: FetcherSection::default(),
    };
    let store = config.into_store()?;

    println!("=== Instrumented cache ===");
    let cache = config.cache_builder(store.clone()).build().await?;

    let text = cache.store("foo").await?;
    let bytes = cache.store(b"bar".to_vec()).await?;
    let int = cache.store(123).await?;
    let float = cache.store(2.5).await?;

    println!("{text} -> {:?}", cache.get_str(&text).await?);
    println!("{bytes} -> {:?}", cache.get(&bytes).await?);
    println!("{int} -> {}", cache.get_int(&int).await?);
    println!(
        "{float} -> {:?}",
        cache
            .get_with(&float, |raw| {
                std::str::from_utf8(&raw)
                    .map_err(BoxError::from)
                    .and_then(|text| text.parse::<f64>().map_err(BoxError::from))
            })
            .await?
    );

    println!();
    println!("{}", replay(&cache, STORE_OPERATION).await?);

    println!();
    println!("=== Cached fetcher ===");
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://example.com/".to_string());
    let fetcher = config
        .fetcher_builder(store, ReqwestPageSource::new())
        .build();

    for attempt in 1..=3 {
        let html = fetcher.fetch(&url).await?;
        println!("fetch #{attempt}: {} bytes", html.len());
    }
    println!(
        "{url} requested {} times, cached for {:?}",
        fetcher.request_count(&url).await?,
        fetcher.ttl()
    );

    Ok(())
}
