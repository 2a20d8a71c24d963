#![allow(clippy::unwrap_used)]

use jsonschema_graph::{InMemoryRetriever, SchemaGraph};
use serde_json::{Value, json};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn tree_2020() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://example.com/tree",
        "$dynamicAnchor": "node",
        "type": "object",
        "properties": {
            "data": true,
            "children": {
                "type": "array",
                "items": {"$dynamicRef": "#node"}
            }
        }
    })
}

fn strict_tree_2020() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://example.com/strict-tree",
        "$dynamicAnchor": "node",
        "$ref": "tree",
        "unevaluatedProperties": false
    })
}

fn retriever() -> InMemoryRetriever {
    InMemoryRetriever::new()
        .with("https://example.com/tree", tree_2020())
        .with("https://example.com/strict-tree", strict_tree_2020())
}

const CHILDREN: &str = "https://example.com/tree#/properties/children/items";

#[tokio::test]
async fn dynamic_ref_alone_resolves_lexically() -> anyhow::Result<()> {
    let mut graph = SchemaGraph::new(retriever());
    graph.load(&url("https://example.com/tree")).await?;
    assert_eq!(
        graph.resolve_node_reference(&url(CHILDREN))?,
        Some(url("https://example.com/tree#"))
    );
    Ok(())
}

#[tokio::test]
async fn outermost_dynamic_anchor_wins() -> anyhow::Result<()> {
    let mut graph = SchemaGraph::new(retriever());
    graph.load(&url("https://example.com/strict-tree")).await?;

    let tree = graph.root_item(&url("https://example.com/tree"))?;
    assert_eq!(tree.referencing_url, Some(&url("https://example.com/strict-tree")));

    assert_eq!(
        graph.resolve_node_reference(&url(CHILDREN))?,
        Some(url("https://example.com/strict-tree#"))
    );
    // The static reference is untouched by dynamic scope.
    assert_eq!(
        graph.resolve_node_reference(&url("https://example.com/strict-tree"))?,
        Some(url("https://example.com/tree#"))
    );
    Ok(())
}

#[tokio::test]
async fn dynamic_anchor_is_also_a_plain_anchor() -> anyhow::Result<()> {
    let mut graph = SchemaGraph::new(retriever());
    graph.load(&url("https://example.com/strict-tree")).await?;
    assert_eq!(
        graph.resolve_reference(&url(CHILDREN), "#node")?,
        url("https://example.com/tree#")
    );
    Ok(())
}

#[tokio::test]
async fn recursive_ref_2019_09() -> anyhow::Result<()> {
    let schema = "https://json-schema.org/draft/2019-09/schema";
    let retriever = InMemoryRetriever::new()
        .with(
            "https://example.com/tree.json",
            json!({
                "$schema": schema,
                "$recursiveAnchor": true,
                "properties": {
                    "children": {"items": {"$recursiveRef": "#"}}
                }
            }),
        )
        .with(
            "https://example.com/strict.json",
            json!({
                "$schema": schema,
                "$recursiveAnchor": true,
                "$ref": "tree.json",
                "unevaluatedProperties": false
            }),
        )
        .with(
            "https://example.com/loose.json",
            json!({"$schema": schema, "$ref": "tree.json"}),
        );

    let source = url("https://example.com/tree.json#/properties/children/items");

    let mut graph = SchemaGraph::new(retriever.clone());
    graph.load(&url("https://example.com/strict.json")).await?;
    assert_eq!(
        graph.resolve_node_reference(&source)?,
        Some(url("https://example.com/strict.json#"))
    );

    // Without an outer `$recursiveAnchor` the reference stays in tree.json.
    let mut graph = SchemaGraph::new(retriever);
    graph.load(&url("https://example.com/loose.json")).await?;
    assert_eq!(
        graph.resolve_node_reference(&source)?,
        Some(url("https://example.com/tree.json#"))
    );
    Ok(())
}

#[tokio::test]
async fn dynamic_ref_to_pointer_is_static() -> anyhow::Result<()> {
    let retriever = InMemoryRetriever::new().with(
        "https://example.com/list.json",
        json!({
            "items": {"$dynamicRef": "#/$defs/item"},
            "$defs": {"item": {"type": "string"}}
        }),
    );
    let mut graph = SchemaGraph::new(retriever);
    graph.load(&url("https://example.com/list.json")).await?;
    let target = graph.resolve_dynamic_reference(
        &url("https://example.com/list.json#/items"),
        "#/$defs/item",
    )?;
    assert_eq!(target, url("https://example.com/list.json#/$defs/item"));
    Ok(())
}
