pub mod config_schema;
pub mod load;
pub mod names;
pub mod nodes;
pub mod resolve;

use std::path::Path;

use jsonschema_graph::{Dialect, SchemaGraph};
use jsonschema_graph_cache::{CacheOptions, DEFAULT_CACHE_TTL, SchemaCache, default_cache_dir};
use url::Url;

use crate::config::{self, Config};
use crate::options::GlobalOptions;

/// Effective settings after merging flags over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub default_dialect: Dialect,
    pub cache: CacheOptions,
}

impl Settings {
    /// Flags win over `config`, which wins over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file's `cache_ttl` is invalid.
    pub fn resolve(
        global: &GlobalOptions,
        config: &Config,
        dialect: Option<Dialect>,
    ) -> anyhow::Result<Self> {
        let ttl = match global.cache_ttl.as_deref() {
            Some(ttl) => *ttl,
            None => config.cache_ttl()?.unwrap_or(DEFAULT_CACHE_TTL),
        };
        let dir = if global.no_cache || config.no_cache {
            None
        } else {
            Some(
                global
                    .cache_dir
                    .clone()
                    .or_else(|| config.cache_dir.clone())
                    .unwrap_or_else(default_cache_dir),
            )
        };
        Ok(Self {
            default_dialect: dialect
                .or(config.default_dialect)
                .unwrap_or(Dialect::Draft2020_12),
            cache: CacheOptions {
                dir,
                ttl: Some(ttl),
                skip_read: false,
            },
        })
    }

    /// Load the config file named by `--config`, or the nearest one above the
    /// working directory, and merge `global` over it.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(global: &GlobalOptions, dialect: Option<Dialect>) -> anyhow::Result<Self> {
        let config = match &global.config {
            Some(path) => config::load_file(path)?,
            None => config::find_and_load(&std::env::current_dir()?)?.unwrap_or_default(),
        };
        Self::resolve(global, &config, dialect)
    }

    pub fn graph(&self) -> SchemaGraph<SchemaCache> {
        SchemaGraph::new(SchemaCache::reqwest(self.cache.clone()))
            .with_default_dialect(self.default_dialect)
    }
}

/// Interpret a command-line schema argument as a URL, falling back to a
/// local path.
///
/// # Errors
///
/// Returns an error if the argument is neither an absolute URL nor a path
/// that can be made absolute.
pub fn schema_location(arg: &str) -> anyhow::Result<Url> {
    // Single-letter schemes are Windows drive letters, not URLs.
    if let Ok(url) = Url::parse(arg)
        && url.scheme().len() > 1
    {
        return Ok(url);
    }
    let path = std::path::absolute(Path::new(arg))?;
    Url::from_file_path(&path)
        .map_err(|()| anyhow::anyhow!("cannot turn {} into a file URL", path.display()))
}
