use core::fmt::Write;

use jsonschema_graph::{Retrieve, SchemaGraph};
use url::Url;

/// Load `schema` and print a suggested type name for every node.
///
/// # Errors
///
/// Returns the graph error that aborted loading.
pub async fn run<R: Retrieve>(graph: &mut SchemaGraph<R>, schema: &Url) -> anyhow::Result<String> {
    graph.load(schema).await?;
    let mut out = String::new();
    for (url, name) in graph.type_names() {
        let _ = writeln!(out, "{name} {url}");
    }
    Ok(out)
}
