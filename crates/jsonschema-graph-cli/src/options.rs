use std::path::PathBuf;

use bpaf::Bpaf;

/// Global options applied to all commands
#[derive(Debug, Clone, Bpaf)]
#[bpaf(generate(global_options))]
pub struct GlobalOptions {
    /// The level of logging. In order, from the most verbose to the least verbose:
    /// debug, info, warn, error. `JSONSCHEMA_GRAPH_LOG` overrides it.
    #[bpaf(
        long("log-level"),
        argument("none|debug|info|warn|error"),
        fallback(LogLevel::Warn),
        display_fallback
    )]
    pub log_level: LogLevel,

    /// Directory for cached remote schemas
    #[bpaf(long("cache-dir"), argument("DIR"))]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the disk cache
    #[bpaf(long("no-cache"), switch)]
    pub no_cache: bool,

    /// Disk cache TTL (e.g. "12h", "30m", "1d"); default 12h
    #[bpaf(long("cache-ttl"), argument("DURATION"))]
    pub cache_ttl: Option<humantime::Duration>,

    /// Use this config file instead of searching for jsonschema-graph.toml
    #[bpaf(long("config"), argument("PATH"))]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    None,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// `tracing_subscriber::EnvFilter` directive for this level.
    pub fn directive(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl core::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "expected 'none', 'debug', 'info', 'warn', or 'error', got '{s}'"
            )),
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            other => f.write_str(other.directive()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bpaf::Parser;

    fn opts() -> bpaf::OptionParser<GlobalOptions> {
        global_options().to_options()
    }

    #[test]
    fn defaults() {
        let parsed = opts().run_inner(&[]).unwrap();
        assert_eq!(parsed.log_level, LogLevel::Warn);
        assert!(parsed.cache_dir.is_none());
        assert!(!parsed.no_cache);
        assert!(parsed.cache_ttl.is_none());
        assert!(parsed.config.is_none());
    }

    #[test]
    fn log_levels() {
        for (arg, level) in [
            ("none", LogLevel::None),
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
        ] {
            let parsed = opts().run_inner(&["--log-level", arg][..]).unwrap();
            assert_eq!(parsed.log_level, level);
            assert_eq!(level.to_string(), arg);
        }
    }

    #[test]
    fn log_level_invalid() {
        assert!(opts().run_inner(&["--log-level", "trace"]).is_err());
    }

    #[test]
    fn cache_flags() {
        let parsed = opts()
            .run_inner(&["--cache-dir", "/tmp/c", "--no-cache", "--cache-ttl", "30m"])
            .unwrap();
        assert_eq!(parsed.cache_dir, Some(PathBuf::from("/tmp/c")));
        assert!(parsed.no_cache);
        let ttl: core::time::Duration = parsed.cache_ttl.unwrap().into();
        assert_eq!(ttl.as_secs(), 30 * 60);
    }

    #[test]
    fn cache_ttl_invalid() {
        assert!(opts().run_inner(&["--cache-ttl", "soon"]).is_err());
    }
}
