use core::fmt::Write;

use jsonschema_graph::{Retrieve, SchemaGraph};
use url::Url;

/// Load `schema` and list every canonical node URL with its dialect.
///
/// # Errors
///
/// Returns the graph error that aborted loading.
pub async fn run<R: Retrieve>(graph: &mut SchemaGraph<R>, schema: &Url) -> anyhow::Result<String> {
    graph.load(schema).await?;
    let mut out = String::new();
    for node in graph.nodes() {
        let _ = writeln!(out, "{} ({})", node.url, node.dialect);
    }
    Ok(out)
}
