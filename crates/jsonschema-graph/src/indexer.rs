use alloc::sync::Arc;
use core::iter;
use std::collections::HashMap;

use jsonschema_dialect::{DialectStrategy, DynamicAnchor};
use serde_json::Value;
use url::Url;

use crate::graph::{NodeRecord, RootId, RootRecord};
use crate::urls::{resolve, with_fragment, without_fragment};
use crate::{GraphError, SchemaGraph};

/// Where an embedded resource sits inside one of its enclosing resources.
/// Pointer URLs through the enclosing resource are aliased onto the
/// embedded resource's own nodes.
#[derive(Debug, Clone)]
struct Mount {
    url: Url,
    pointer: String,
}

impl<R> SchemaGraph<R> {
    pub(crate) fn index_root(&mut self, root: RootId) -> Result<(), GraphError> {
        let record = &self.roots[root.0];
        debug_assert!(record.base.is_empty(), "embedded resources are indexed with their parent");
        let document = Arc::clone(&record.document);
        let strategy = self.strategy(record.dialect)?;
        tracing::debug!(url = %record.canonical_url, dialect = %record.dialect, "indexing schema");
        self.index_node(&strategy, root, &document, "", &[])
    }

    fn index_node(
        &mut self,
        strategy: &Arc<dyn DialectStrategy>,
        root: RootId,
        node: &Value,
        pointer: &str,
        mounts: &[Mount],
    ) -> Result<(), GraphError> {
        if !pointer.is_empty()
            && let Some(id) = strategy.select_id(node)
        {
            if strategy.supports_nested_ids() {
                let base = &self.roots[root.0].canonical_url;
                let url = without_fragment(&resolve(base, id)?);
                if url != *base {
                    return self.index_embedded(strategy, root, node, pointer, url, mounts);
                }
            } else if !id.starts_with('#') {
                tracing::debug!(pointer, id, "nested id does not start a resource in this dialect");
            }
        }

        let url = with_fragment(&self.roots[root.0].canonical_url, pointer);
        if self.nodes.contains_key(&url) {
            return Err(GraphError::DuplicateId { url });
        }
        for mount in mounts {
            let alias = with_fragment(&mount.url, &format!("{}{pointer}", mount.pointer));
            self.aliases.insert(alias, url.clone());
        }
        self.register_anchors(strategy, root, node, pointer, &url)?;
        self.nodes.insert(
            url,
            NodeRecord {
                root,
                pointer: pointer.to_string(),
                dialect: strategy.dialect(),
            },
        );

        for child in strategy.select_children(node, pointer) {
            self.index_node(strategy, root, child.node, &child.pointer, mounts)?;
        }
        Ok(())
    }

    /// Register the subtree at `pointer` as a root of its own under `url`.
    fn index_embedded(
        &mut self,
        parent: &Arc<dyn DialectStrategy>,
        root: RootId,
        node: &Value,
        pointer: &str,
        url: Url,
        mounts: &[Mount],
    ) -> Result<(), GraphError> {
        if self.root_ids.contains_key(&url) {
            return Err(GraphError::DuplicateId { url });
        }
        let dialect = parent.foreign_dialect(node).unwrap_or(parent.dialect());
        let strategy = self.strategy(dialect)?;
        let parent_record = &self.roots[root.0];
        let parent_url = parent_record.canonical_url.clone();
        let document = Arc::clone(&parent_record.document);
        let base = format!("{}{pointer}", parent_record.base);
        tracing::debug!(%url, parent = %parent_url, pointer, %dialect, "embedded resource");

        let id = self.push_root(RootRecord {
            document,
            base,
            canonical_url: url.clone(),
            retrieval_url: url.clone(),
            referencing: Some(root),
            dialect,
        });
        self.retrieved.insert(url, id);

        let mounts: Vec<Mount> = mounts
            .iter()
            .map(|m| Mount {
                url: m.url.clone(),
                pointer: format!("{}{pointer}", m.pointer),
            })
            .chain(iter::once(Mount {
                url: parent_url,
                pointer: pointer.to_string(),
            }))
            .collect();
        self.index_node(&strategy, id, node, "", &mounts)
    }

    fn register_anchors(
        &mut self,
        strategy: &Arc<dyn DialectStrategy>,
        root: RootId,
        node: &Value,
        pointer: &str,
        target: &Url,
    ) -> Result<(), GraphError> {
        let root_url = &self.roots[root.0].canonical_url;
        if let Some(name) = strategy.select_anchor(node) {
            insert_anchor(&mut self.anchors, with_fragment(root_url, name), target)?;
        }
        match strategy.select_dynamic_anchor(node) {
            Some(DynamicAnchor::Recursive) if !pointer.is_empty() => {
                tracing::debug!(pointer, "$recursiveAnchor below a resource root has no effect");
            }
            Some(anchor) => {
                let key = with_fragment(root_url, anchor.fragment());
                if let DynamicAnchor::Named(_) = anchor {
                    insert_anchor(&mut self.anchors, key.clone(), target)?;
                }
                insert_anchor(&mut self.dynamic_anchors, key, target)?;
            }
            None => {}
        }
        Ok(())
    }
}

fn insert_anchor(table: &mut HashMap<Url, Url>, key: Url, target: &Url) -> Result<(), GraphError> {
    match table.get(&key) {
        Some(existing) if existing != target => Err(GraphError::DuplicateAnchor {
            url: key,
            existing: existing.clone(),
        }),
        Some(_) => Ok(()),
        None => {
            table.insert(key, target.clone());
            Ok(())
        }
    }
}
