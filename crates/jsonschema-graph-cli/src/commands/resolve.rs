use jsonschema_graph::{Retrieve, SchemaGraph};
use url::Url;

/// Load `schema`, then resolve the reference carried by `node`.
///
/// `node` may be relative (`#/properties/a`); it is joined against the
/// canonical URL of the loaded schema.
///
/// # Errors
///
/// Returns an error if loading or resolution fails, or if the node carries
/// no reference.
pub async fn run<R: Retrieve>(
    graph: &mut SchemaGraph<R>,
    schema: &Url,
    node: &str,
) -> anyhow::Result<String> {
    let root = graph.load(schema).await?;
    let node = root
        .join(node)
        .map_err(|e| anyhow::anyhow!("invalid node URL '{node}': {e}"))?;
    let target = graph
        .resolve_node_reference(&node)?
        .ok_or_else(|| anyhow::anyhow!("{node} has no $ref, $dynamicRef or $recursiveRef"))?;
    tracing::debug!(%node, %target, "resolved");
    Ok(format!("{target}\n"))
}
