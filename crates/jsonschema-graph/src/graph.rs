use alloc::sync::Arc;
use std::collections::HashMap;

use indexmap::IndexMap;
use jsonschema_dialect::{Dialect, DialectRegistry, DialectStrategy};
use serde_json::Value;
use url::Url;

use crate::GraphError;
use crate::urls::{node_key, without_fragment};

/// Handle to a root record. Roots are never removed, so handles stay valid
/// for the lifetime of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct RootRecord {
    /// The retrieved document. Embedded resources share their enclosing
    /// document and locate themselves through `base`.
    pub(crate) document: Arc<Value>,
    /// Pointer of this resource's root node within `document`.
    pub(crate) base: String,
    pub(crate) canonical_url: Url,
    pub(crate) retrieval_url: Url,
    /// The root whose references (or whose embedding) caused this one to load.
    pub(crate) referencing: Option<RootId>,
    pub(crate) dialect: Dialect,
}

impl RootRecord {
    /// The resource's own root node.
    ///
    /// # Panics
    ///
    /// Panics if `base` does not point into `document`, which the indexer
    /// never produces.
    pub(crate) fn node(&self) -> &Value {
        self.document
            .pointer(&self.base)
            .expect("resource base points into its document")
    }
}

#[derive(Debug)]
pub(crate) struct NodeRecord {
    pub(crate) root: RootId,
    pub(crate) pointer: String,
    pub(crate) dialect: Dialect,
}

/// A schema node together with where it lives.
#[derive(Debug, Clone, Copy)]
pub struct NodeItem<'g> {
    /// Canonical node URL: the root's canonical URL plus a JSON Pointer fragment.
    pub url: &'g Url,
    pub node: &'g Value,
    pub root_url: &'g Url,
    pub pointer: &'g str,
    pub dialect: Dialect,
}

/// A loaded document, or a resource embedded in one through a nested `$id`.
#[derive(Debug, Clone, Copy)]
pub struct RootItem<'g> {
    pub node: &'g Value,
    pub canonical_url: &'g Url,
    pub retrieval_url: &'g Url,
    pub referencing_url: Option<&'g Url>,
    pub dialect: Dialect,
}

/// An indexed, multi-document JSON Schema graph.
///
/// Documents are loaded through a [`Retrieve`](crate::Retrieve)
/// implementation, walked according to their dialect and indexed by
/// canonical URL. The graph only grows: every table is append-only and a
/// canonical URL, once registered, always maps to the same node.
#[derive(Debug)]
pub struct SchemaGraph<R> {
    pub(crate) retriever: R,
    pub(crate) dialects: DialectRegistry,
    pub(crate) default_dialect: Dialect,
    pub(crate) roots: Vec<RootRecord>,
    /// Canonical root URL (no fragment) to root.
    pub(crate) root_ids: HashMap<Url, RootId>,
    /// Retrieval URL (no fragment) to root. Embedded resources are
    /// registered under their canonical URL.
    pub(crate) retrieved: HashMap<Url, RootId>,
    pub(crate) nodes: IndexMap<Url, NodeRecord>,
    /// `root#name` to the canonical URL of the node declaring the anchor.
    pub(crate) anchors: HashMap<Url, Url>,
    pub(crate) dynamic_anchors: HashMap<Url, Url>,
    /// Pointer URLs that cross into an embedded resource, mapped to the
    /// embedded node's canonical URL.
    pub(crate) aliases: HashMap<Url, Url>,
    /// References that could not be retrieved during the current load, kept
    /// until the load finishes in case an embedded resource provides them.
    pub(crate) deferred: Vec<(Url, GraphError)>,
}

impl<R> SchemaGraph<R> {
    /// An empty graph using every built-in dialect, with 2020-12 as the
    /// dialect for documents that do not declare `$schema`.
    pub fn new(retriever: R) -> Self {
        Self {
            retriever,
            dialects: DialectRegistry::default(),
            default_dialect: Dialect::Draft2020_12,
            roots: Vec::new(),
            root_ids: HashMap::new(),
            retrieved: HashMap::new(),
            nodes: IndexMap::new(),
            anchors: HashMap::new(),
            dynamic_anchors: HashMap::new(),
            aliases: HashMap::new(),
            deferred: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_default_dialect(mut self, dialect: Dialect) -> Self {
        self.default_dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_dialects(mut self, dialects: DialectRegistry) -> Self {
        self.dialects = dialects;
        self
    }

    pub fn default_dialect(&self) -> Dialect {
        self.default_dialect
    }

    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    /// Look up a node by canonical URL. A URL without a fragment names the
    /// root node of that document.
    pub fn node(&self, url: &Url) -> Option<NodeItem<'_>> {
        let (url, record) = self.nodes.get_key_value(&node_key(url))?;
        self.node_view(url, record)
    }

    /// Like [`node`](Self::node), but a missing node is an error.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if no node has this canonical URL.
    pub fn node_item(&self, url: &Url) -> Result<NodeItem<'_>, GraphError> {
        self.node(url)
            .ok_or_else(|| GraphError::NodeNotFound { url: url.clone() })
    }

    /// Look up a root by canonical URL. Any fragment is ignored.
    pub fn root(&self, url: &Url) -> Option<RootItem<'_>> {
        let id = self.root_ids.get(&without_fragment(url))?;
        Some(self.root_view(*id))
    }

    /// # Errors
    ///
    /// Returns [`GraphError::RootNotFound`] if no root has this canonical URL.
    pub fn root_item(&self, url: &Url) -> Result<RootItem<'_>, GraphError> {
        self.root(url)
            .ok_or_else(|| GraphError::RootNotFound { url: url.clone() })
    }

    /// Every node, in the order it was indexed.
    pub fn nodes(&self) -> impl Iterator<Item = NodeItem<'_>> {
        self.nodes
            .iter()
            .filter_map(|(url, record)| self.node_view(url, record))
    }

    /// Every root, in the order it was registered.
    pub fn roots(&self) -> impl Iterator<Item = RootItem<'_>> {
        (0..self.roots.len()).map(|i| self.root_view(RootId(i)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub(crate) fn strategy(&self, dialect: Dialect) -> Result<Arc<dyn DialectStrategy>, GraphError> {
        self.dialects
            .get(dialect)
            .cloned()
            .ok_or(GraphError::NotImplemented {
                dialect,
                feature: "dialect strategy",
            })
    }

    pub(crate) fn push_root(&mut self, record: RootRecord) -> RootId {
        let id = RootId(self.roots.len());
        debug_assert!(record.referencing.is_none_or(|r| r < id));
        self.root_ids.insert(record.canonical_url.clone(), id);
        self.roots.push(record);
        id
    }

    fn node_view<'g>(&'g self, url: &'g Url, record: &'g NodeRecord) -> Option<NodeItem<'g>> {
        let root = &self.roots[record.root.0];
        Some(NodeItem {
            url,
            node: root.node().pointer(&record.pointer)?,
            root_url: &root.canonical_url,
            pointer: &record.pointer,
            dialect: record.dialect,
        })
    }

    fn root_view(&self, id: RootId) -> RootItem<'_> {
        let root = &self.roots[id.0];
        RootItem {
            node: root.node(),
            canonical_url: &root.canonical_url,
            retrieval_url: &root.retrieval_url,
            referencing_url: root
                .referencing
                .map(|r| &self.roots[r.0].canonical_url),
            dialect: root.dialect,
        }
    }
}
