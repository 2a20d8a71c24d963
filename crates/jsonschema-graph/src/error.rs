use core::error::Error;

use jsonschema_dialect::Dialect;
use miette::Diagnostic;
use thiserror::Error;
use url::Url;

/// Everything that can abort loading or resolving a schema graph.
///
/// None of these are recoverable: the caller is expected to abort the whole
/// run and report the error.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("failed to fetch {url}: {source}")]
    #[diagnostic(code(graph::fetch))]
    Fetch {
        url: Url,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    #[error("unsupported URL scheme `{scheme}` in {url}")]
    #[diagnostic(
        code(graph::scheme),
        help("schemas can be loaded from http:, https: and file: URLs")
    )]
    UnsupportedScheme { url: Url, scheme: String },

    #[error("invalid {dialect} schema {url}: {message} (at #{pointer})")]
    #[diagnostic(code(graph::invalid_schema))]
    InvalidSchema {
        url: Url,
        dialect: Dialect,
        pointer: String,
        message: String,
    },

    #[error("duplicate id {url}")]
    #[diagnostic(
        code(graph::duplicate_id),
        help("two schema nodes resolve to the same canonical URL; check for repeated `$id` values")
    )]
    DuplicateId { url: Url },

    #[error("duplicate anchorId {url}")]
    #[diagnostic(
        code(graph::duplicate_anchor),
        help("the anchor already names {existing}")
    )]
    DuplicateAnchor { url: Url, existing: Url },

    #[error("root node not found: {url}")]
    #[diagnostic(code(graph::root_not_found))]
    RootNotFound { url: Url },

    #[error("node not found: {url}")]
    #[diagnostic(code(graph::node_not_found))]
    NodeNotFound { url: Url },

    #[error("invalid reference '{reference}' from {base}: {source}")]
    #[diagnostic(code(graph::invalid_reference))]
    InvalidReference {
        base: Url,
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{feature} is not implemented for {dialect}")]
    #[diagnostic(code(graph::not_implemented))]
    NotImplemented {
        dialect: Dialect,
        feature: &'static str,
    },
}
