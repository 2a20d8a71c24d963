use core::time::Duration;
use std::path::{Path, PathBuf};

use jsonschema_graph::Dialect;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

pub const CONFIG_FILENAME: &str = "jsonschema-graph.toml";

fn example_dialect() -> Vec<String> {
    vec!["2020-12".into(), "draft-07".into()]
}

fn example_cache_ttl() -> Vec<String> {
    vec!["12h".into(), "30m".into(), "1d".into()]
}

/// Configuration for the `jsonschema-graph` command.
///
/// The file is looked up from the working directory upward; the nearest one
/// wins. Command-line flags override every setting here.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(title = "jsonschema-graph.toml")]
pub struct Config {
    /// Dialect used for documents that do not declare a recognised `$schema`.
    ///
    /// One of `draft-04`, `draft-06`, `draft-07`, `2019-09`, `2020-12`, or a
    /// full meta-schema URL. Defaults to `2020-12`.
    #[schemars(title = "Default Dialect", with = "Option<String>", example = example_dialect())]
    #[serde(default)]
    pub default_dialect: Option<Dialect>,

    /// Directory for cached remote schemas.
    ///
    /// Relative paths are resolved against the directory containing this file.
    #[schemars(title = "Cache Directory")]
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// How long a cached schema stays fresh, in humantime syntax.
    #[schemars(title = "Cache TTL", example = example_cache_ttl())]
    #[serde(default)]
    pub cache_ttl: Option<String>,

    /// Disable the disk cache.
    #[schemars(title = "No Cache")]
    #[serde(default)]
    pub no_cache: bool,
}

impl Config {
    /// The parsed `cache_ttl`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if `cache_ttl` is not a valid duration.
    pub fn cache_ttl(&self) -> anyhow::Result<Option<Duration>> {
        self.cache_ttl
            .as_deref()
            .map(|s| {
                humantime::parse_duration(s)
                    .map_err(|e| anyhow::anyhow!("invalid cache_ttl '{s}': {e}"))
            })
            .transpose()
    }
}

/// Generate the JSON Schema for `jsonschema-graph.toml`.
///
/// # Panics
///
/// Panics if the schema cannot be serialized to JSON (should never happen).
pub fn schema() -> Value {
    serde_json::to_value(schema_for!(Config)).expect("schema serialization cannot fail")
}

/// Find the nearest config file starting from `start_dir`, walking upward.
pub fn find_config_path(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Read and parse one config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    if let Some(dir) = &config.cache_dir
        && dir.is_relative()
        && let Some(base) = path.parent()
    {
        config.cache_dir = Some(base.join(dir));
    }
    Ok(config)
}

/// Load the nearest config file above `start_dir`, if any.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn find_and_load(start_dir: &Path) -> anyhow::Result<Option<Config>> {
    find_config_path(start_dir)
        .map(|path| {
            tracing::debug!(path = %path.display(), "using config file");
            load_file(&path)
        })
        .transpose()
}
