#![doc = include_str!("../README.md")]
#![allow(unused_assignments)] // thiserror/miette derive macros trigger false positives

extern crate alloc;

use alloc::sync::Arc;
use core::error::Error;
use core::time::Duration;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use jsonschema_graph::Retrieve;
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

/// Default TTL for cached schemas (12 hours).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Where a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the in-memory cache.
    Memory,
    /// Served from the disk cache.
    Disk,
    /// Fetched over the network and written to the disk cache.
    Miss,
    /// Fetched over the network with disk caching disabled.
    Disabled,
    /// Read from a `file:` URL.
    Local,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Http {
        url: Url,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    #[error("{url} is not a local file path")]
    NotAFile { url: Url },

    #[error("cannot use scheme `{scheme}` for {url}")]
    Scheme { url: Url, scheme: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{url} is not valid JSON: {source}")]
    Json {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait for fetching content over HTTP.
#[async_trait::async_trait]
pub trait HttpClient: Clone + Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be read.
    async fn get(&self, url: &Url) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Default HTTP client using reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient(pub reqwest::Client);

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &Url) -> Result<String, Box<dyn Error + Send + Sync>> {
        let resp = self
            .0
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}

/// Disk cache settings.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// `None` disables the disk cache.
    pub dir: Option<PathBuf>,
    /// Disk entries older than this are refetched. `None` never expires.
    pub ttl: Option<Duration>,
    /// Ignore existing entries (memory and disk) but still write new ones.
    pub skip_read: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            dir: Some(default_cache_dir()),
            ttl: Some(DEFAULT_CACHE_TTL),
            skip_read: false,
        }
    }
}

/// Caching schema retriever.
#[derive(Debug, Clone)]
pub struct SchemaCache<C: HttpClient = ReqwestClient> {
    client: C,
    options: CacheOptions,
    /// Shared across all clones.
    memory: Arc<Mutex<HashMap<Url, Value>>>,
}

impl SchemaCache<ReqwestClient> {
    pub fn reqwest(options: CacheOptions) -> Self {
        Self::new(ReqwestClient::default(), options)
    }
}

impl<C: HttpClient> SchemaCache<C> {
    pub fn new(client: C, options: CacheOptions) -> Self {
        Self {
            client,
            options,
            memory: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Fetch the document at `url` (fragment ignored), using the caches when
    /// possible.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the document cannot be fetched, read or
    /// parsed, or if a fresh download cannot be written to the disk cache.
    #[tracing::instrument(skip_all, fields(url = %url, status))]
    pub async fn fetch(&self, url: &Url) -> Result<(Value, CacheStatus), FetchError> {
        let mut url = url.clone();
        url.set_fragment(None);

        match url.scheme() {
            "http" | "https" => {}
            "file" => {
                let value = read_local(&url).await?;
                tracing::Span::current().record("status", "local");
                return Ok((value, CacheStatus::Local));
            }
            scheme => {
                return Err(FetchError::Scheme {
                    scheme: scheme.to_string(),
                    url: url.clone(),
                });
            }
        }

        if !self.options.skip_read {
            if let Some(value) = self.memory_get(&url) {
                tracing::Span::current().record("status", "memory");
                return Ok((value, CacheStatus::Memory));
            }
            if let Some(value) = self.disk_get(&url).await? {
                self.memory_put(&url, &value);
                tracing::Span::current().record("status", "disk");
                return Ok((value, CacheStatus::Disk));
            }
        }

        tracing::Span::current().record("status", "network");
        let body = self
            .client
            .get(&url)
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;
        let value = parse(&url, &body)?;
        self.memory_put(&url, &value);

        let status = match &self.options.dir {
            Some(dir) => {
                write_entry(dir, &url, &body).await?;
                CacheStatus::Miss
            }
            None => CacheStatus::Disabled,
        };
        Ok((value, status))
    }

    fn memory_get(&self, url: &Url) -> Option<Value> {
        self.memory
            .lock()
            .expect("memory cache poisoned")
            .get(url)
            .cloned()
    }

    fn memory_put(&self, url: &Url, value: &Value) {
        self.memory
            .lock()
            .expect("memory cache poisoned")
            .insert(url.clone(), value.clone());
    }

    async fn disk_get(&self, url: &Url) -> Result<Option<Value>, FetchError> {
        let Some(dir) = &self.options.dir else {
            return Ok(None);
        };
        let path = entry_path(dir, url);
        if !path.exists() || self.is_expired(&path) {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })?;
        parse(url, &content).map(Some)
    }

    /// Unreadable metadata counts as fresh.
    fn is_expired(&self, path: &Path) -> bool {
        let Some(ttl) = self.options.ttl else {
            return false;
        };
        std::fs::metadata(path)
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|mtime| mtime.elapsed().ok())
            .is_some_and(|age| age > ttl)
    }
}

#[async_trait::async_trait]
impl<C: HttpClient> Retrieve for SchemaCache<C> {
    async fn retrieve(&self, url: &Url) -> Result<Value, Box<dyn Error + Send + Sync>> {
        let (value, _status) = self.fetch(url).await?;
        Ok(value)
    }
}

/// Return the default cache directory: `<system_cache>/jsonschema-graph/schemas`.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("jsonschema-graph")
        .join("schemas")
}

async fn read_local(url: &Url) -> Result<Value, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|()| FetchError::NotAFile { url: url.clone() })?;
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| FetchError::Io { path, source })?;
    parse(url, &content)
}

fn entry_path(dir: &Path, url: &Url) -> PathBuf {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let name: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    dir.join(format!("{name}.json"))
}

async fn write_entry(dir: &Path, url: &Url, body: &str) -> Result<(), FetchError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| FetchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    let path = entry_path(dir, url);
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| FetchError::Io { path, source })
}

fn parse(url: &Url, body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Json {
        url: url.clone(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct MockClient {
        responses: HashMap<String, String>,
        calls: Arc<Mutex<usize>>,
    }

    impl MockClient {
        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for MockClient {
        async fn get(&self, url: &Url) -> Result<String, Box<dyn Error + Send + Sync>> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| format!("mock: no response for {url}").into())
        }
    }

    fn mock(entries: &[(&str, &str)]) -> MockClient {
        MockClient {
            responses: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            calls: Arc::default(),
        }
    }

    fn options(dir: Option<&Path>, skip_read: bool, ttl: Option<Duration>) -> CacheOptions {
        CacheOptions {
            dir: dir.map(Path::to_path_buf),
            ttl,
            skip_read,
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn entry_path_is_stable_per_url() {
        let dir = Path::new("/cache");
        let a = entry_path(dir, &url("https://example.com/a.json"));
        assert_eq!(a, entry_path(dir, &url("https://example.com/a.json")));
        assert_ne!(a, entry_path(dir, &url("https://example.com/b.json")));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("json"));
    }

    #[tokio::test]
    async fn fetch_no_cache_dir() -> anyhow::Result<()> {
        let client = mock(&[("https://example.com/s.json", r#"{"type":"object"}"#)]);
        let cache = SchemaCache::new(client, options(None, false, None));
        let (val, status) = cache.fetch(&url("https://example.com/s.json")).await?;
        assert_eq!(val, serde_json::json!({"type": "object"}));
        assert_eq!(status, CacheStatus::Disabled);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_cold_cache_writes_entry() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let client = mock(&[("https://example.com/s.json", r#"{"type":"string"}"#)]);
        let cache = SchemaCache::new(client, options(Some(tmp.path()), false, None));
        let (val, status) = cache.fetch(&url("https://example.com/s.json")).await?;
        assert_eq!(val, serde_json::json!({"type": "string"}));
        assert_eq!(status, CacheStatus::Miss);
        assert!(entry_path(tmp.path(), &url("https://example.com/s.json")).exists());
        Ok(())
    }

    #[tokio::test]
    async fn fetch_warm_disk_cache() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let target = url("https://example.com/s.json");
        std::fs::write(entry_path(tmp.path(), &target), r#"{"type":"number"}"#)?;

        let client = mock(&[]);
        let cache = SchemaCache::new(client.clone(), options(Some(tmp.path()), false, None));
        let (val, status) = cache.fetch(&target).await?;
        assert_eq!(val, serde_json::json!({"type": "number"}));
        assert_eq!(status, CacheStatus::Disk);

        let (_, status) = cache.fetch(&target).await?;
        assert_eq!(status, CacheStatus::Memory);
        assert_eq!(client.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn fragments_share_an_entry() -> anyhow::Result<()> {
        let client = mock(&[("https://example.com/s.json", "{}")]);
        let cache = SchemaCache::new(client.clone(), options(None, false, None));
        cache.fetch(&url("https://example.com/s.json#/a")).await?;
        let (_, status) = cache.fetch(&url("https://example.com/s.json#/b")).await?;
        assert_eq!(status, CacheStatus::Memory);
        assert_eq!(client.calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn skip_read_bypasses_cache() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let target = url("https://example.com/s.json");
        std::fs::write(entry_path(tmp.path(), &target), r#"{"type":"number"}"#)?;

        let client = mock(&[("https://example.com/s.json", r#"{"type":"string"}"#)]);
        let cache = SchemaCache::new(client, options(Some(tmp.path()), true, None));
        let (val, status) = cache.fetch(&target).await?;
        assert_eq!(val, serde_json::json!({"type": "string"}));
        assert_eq!(status, CacheStatus::Miss);
        Ok(())
    }

    #[tokio::test]
    async fn expired_entry_is_refetched() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let target = url("https://example.com/s.json");
        let path = entry_path(tmp.path(), &target);
        std::fs::write(&path, r#"{"type":"number"}"#)?;
        let two_secs_ago = filetime::FileTime::from_system_time(
            std::time::SystemTime::now() - Duration::from_secs(2),
        );
        filetime::set_file_mtime(&path, two_secs_ago)?;

        let client = mock(&[("https://example.com/s.json", r#"{"type":"string"}"#)]);
        let cache = SchemaCache::new(
            client,
            options(Some(tmp.path()), false, Some(Duration::from_secs(1))),
        );
        let (val, status) = cache.fetch(&target).await?;
        assert_eq!(val, serde_json::json!({"type": "string"}));
        assert_eq!(status, CacheStatus::Miss);
        Ok(())
    }

    #[tokio::test]
    async fn fresh_entry_is_served() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let target = url("https://example.com/s.json");
        std::fs::write(entry_path(tmp.path(), &target), r#"{"type":"number"}"#)?;

        let cache = SchemaCache::new(
            mock(&[]),
            options(Some(tmp.path()), false, Some(Duration::from_secs(3600))),
        );
        let (_, status) = cache.fetch(&target).await?;
        assert_eq!(status, CacheStatus::Disk);
        Ok(())
    }

    #[tokio::test]
    async fn local_files_bypass_cache() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("local.json");
        std::fs::write(&path, r#"{"type":"boolean"}"#)?;

        let client = mock(&[]);
        let cache = SchemaCache::new(client.clone(), options(Some(tmp.path()), false, None));
        let file = Url::from_file_path(&path).unwrap();
        let (val, status) = cache.fetch(&file).await?;
        assert_eq!(val, serde_json::json!({"type": "boolean"}));
        assert_eq!(status, CacheStatus::Local);
        assert_eq!(client.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn errors() {
        let cache = SchemaCache::new(
            mock(&[("https://example.com/bad.json", "not json")]),
            options(None, false, None),
        );
        assert!(matches!(
            cache.fetch(&url("https://example.com/missing.json")).await,
            Err(FetchError::Http { .. })
        ));
        assert!(matches!(
            cache.fetch(&url("https://example.com/bad.json")).await,
            Err(FetchError::Json { .. })
        ));
        assert!(matches!(
            cache.fetch(&url("ftp://example.com/a.json")).await,
            Err(FetchError::Scheme { .. })
        ));
        assert!(matches!(
            cache.fetch(&url("file:///definitely/not/here.json")).await,
            Err(FetchError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn retrieve_trait_delegates() -> anyhow::Result<()> {
        let client = mock(&[("https://example.com/s.json", r#"{"type":"object"}"#)]);
        let cache = SchemaCache::new(client, options(None, false, None));
        let val = Retrieve::retrieve(&cache, &url("https://example.com/s.json"))
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(val, serde_json::json!({"type": "object"}));
        Ok(())
    }
}
