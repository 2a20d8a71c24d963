use core::fmt::Write;

use jsonschema_graph::{Retrieve, SchemaGraph};
use url::Url;

/// Load `schema` and describe every root in load order.
///
/// # Errors
///
/// Returns the graph error that aborted loading.
pub async fn run<R: Retrieve>(graph: &mut SchemaGraph<R>, schema: &Url) -> anyhow::Result<String> {
    graph.load(schema).await?;
    Ok(render(graph))
}

fn render<R>(graph: &SchemaGraph<R>) -> String {
    let mut out = String::new();
    for root in graph.roots() {
        let _ = write!(out, "{} ({})", root.canonical_url, root.dialect);
        if root.retrieval_url != root.canonical_url {
            let _ = write!(out, " fetched from {}", root.retrieval_url);
        }
        if let Some(referencing) = root.referencing_url {
            let _ = write!(out, " <- {referencing}");
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{} roots, {} nodes",
        graph.root_count(),
        graph.node_count()
    );
    out
}
