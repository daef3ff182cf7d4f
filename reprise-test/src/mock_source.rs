use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reprise::{BoxError, PageSource};

/// Page source serving registered bodies, counting every GET.
///
/// Unregistered URLs answer `<html>{url}</html>`. While
/// [`set_down`](Self::set_down) is on, every GET fails with a
/// connection-refused error.
#[derive(Debug, Default)]
pub struct MockPageSource {
    pages: Mutex<HashMap<String, String>>,
    get_count: AtomicUsize,
    down: AtomicBool,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages().insert(url.into(), body.into());
        self
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    fn pages(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn get(&self, url: &str) -> Result<String, BoxError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("GET {url}: connection refused"),
            )));
        }
        Ok(self
            .pages()
            .get(url)
            .cloned()
            .unwrap_or_else(|| format!("<html>{url}</html>")))
    }
}
