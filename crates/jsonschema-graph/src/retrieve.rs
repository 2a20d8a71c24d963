use core::error::Error;
use std::collections::HashMap;
use std::sync::Mutex;

use alloc::sync::Arc;
use serde_json::Value;
use url::Url;

/// Source of schema documents.
///
/// The graph calls [`retrieve`](Self::retrieve) at most once per retrieval
/// URL. Fragments are stripped before the call.
#[async_trait::async_trait]
pub trait Retrieve: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the document cannot be fetched or is not JSON.
    async fn retrieve(&self, url: &Url) -> Result<Value, Box<dyn Error + Send + Sync>>;
}

/// Serves documents from a fixed map. Useful for tests and for bundling
/// well-known schemas.
///
/// Clones share the request counter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRetriever {
    documents: HashMap<Url, Value>,
    requests: Arc<Mutex<HashMap<Url, usize>>>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. URLs that fail to parse are a programming error in
    /// the caller and panic.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not an absolute URL.
    #[must_use]
    pub fn with(mut self, url: &str, document: Value) -> Self {
        let url = Url::parse(url).expect("InMemoryRetriever::with needs an absolute URL");
        self.documents.insert(url, document);
        self
    }

    /// How many times `url` has been requested.
    #[allow(clippy::missing_panics_doc)] // Mutex poisoning is unreachable
    pub fn requests(&self, url: &Url) -> usize {
        self.requests
            .lock()
            .expect("request log poisoned")
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl Retrieve for InMemoryRetriever {
    async fn retrieve(&self, url: &Url) -> Result<Value, Box<dyn Error + Send + Sync>> {
        *self
            .requests
            .lock()
            .expect("request log poisoned")
            .entry(url.clone())
            .or_default() += 1;
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| format!("no document for {url}").into())
    }
}
