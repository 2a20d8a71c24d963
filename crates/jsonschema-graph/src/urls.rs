use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;

use crate::GraphError;

/// Bytes escaped when a JSON Pointer or anchor name becomes a URL fragment.
/// `%` is escaped too, so a key containing a literal percent sign never
/// reads as an escape sequence.
const FRAGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `url` with any fragment removed.
pub(crate) fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// `base` with its fragment replaced by the percent-encoded `fragment`.
///
/// `fragment` is raw: an unencoded JSON Pointer or anchor name. Every node
/// and anchor URL in the graph is built here, so equal raw fragments always
/// give equal URLs.
pub(crate) fn with_fragment(base: &Url, fragment: &str) -> Url {
    let mut url = base.clone();
    url.set_fragment(Some(
        &utf8_percent_encode(fragment, FRAGMENT_ENCODE_SET).to_string(),
    ));
    url
}

/// The percent-decoded fragment of `url`, empty when it has none.
pub(crate) fn fragment(url: &Url) -> String {
    percent_decode_str(url.fragment().unwrap_or_default())
        .decode_utf8_lossy()
        .into_owned()
}

/// Lookup key for a node URL: the fragment is re-encoded the way the indexer
/// encodes it, and a missing fragment means the root node.
pub(crate) fn node_key(url: &Url) -> Url {
    with_fragment(url, &fragment(url))
}

/// Resolve `reference` against `base` (RFC 3986).
pub(crate) fn resolve(base: &Url, reference: &str) -> Result<Url, GraphError> {
    base.join(reference)
        .map_err(|source| GraphError::InvalidReference {
            base: base.clone(),
            reference: reference.to_string(),
            source,
        })
}

pub(crate) fn check_scheme(url: &Url) -> Result<(), GraphError> {
    match url.scheme() {
        "http" | "https" | "file" => Ok(()),
        scheme => Err(GraphError::UnsupportedScheme {
            url: url.clone(),
            scheme: scheme.to_string(),
        }),
    }
}
