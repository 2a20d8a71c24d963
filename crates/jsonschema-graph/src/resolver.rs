use url::Url;

use crate::graph::NodeRecord;
use crate::urls::{fragment, node_key, resolve, with_fragment, without_fragment};
use crate::{GraphError, SchemaGraph};

impl<R> SchemaGraph<R> {
    /// Resolve a `$ref` value found on the node `source` to the canonical URL
    /// of its target.
    ///
    /// The reference is joined against the retrieval URL of the source's
    /// root, so relative references keep working when a document declares an
    /// `$id` that differs from where it was fetched. Anchors win over pointers
    /// and pointers into embedded resources are redirected to the embedded
    /// node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `source` or the target is not
    /// indexed, and [`GraphError::RootNotFound`] if the target document was
    /// never loaded.
    pub fn resolve_reference(&self, source: &Url, reference: &str) -> Result<Url, GraphError> {
        let candidate = self.lexical_target(source, reference)?;
        let target = self.anchors.get(&candidate).cloned().unwrap_or(candidate);
        self.existing(target)
    }

    /// Resolve a `$dynamicRef` (2020-12) or `$recursiveRef` (2019-09).
    ///
    /// Starts from the lexical target, then walks the referencing chain from
    /// the source's root outward. Every root on the chain that declares a
    /// matching dynamic anchor replaces the target, so the outermost
    /// declaration wins.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_reference`](Self::resolve_reference).
    pub fn resolve_dynamic_reference(&self, source: &Url, reference: &str) -> Result<Url, GraphError> {
        let record = self.record(source)?;
        let candidate = self.lexical_target(source, reference)?;
        let dynamic_fragment = fragment(&candidate);

        let mut target = self
            .dynamic_anchors
            .get(&candidate)
            .or_else(|| self.anchors.get(&candidate))
            .cloned()
            .unwrap_or(candidate);

        let mut scope = Some(record.root);
        while let Some(id) = scope {
            let root = &self.roots[id.0];
            if let Some(found) = self
                .dynamic_anchors
                .get(&with_fragment(&root.canonical_url, &dynamic_fragment))
            {
                tracing::trace!(scope = %root.canonical_url, target = %found, "dynamic anchor in scope");
                target = found.clone();
            }
            scope = root.referencing;
        }
        self.existing(target)
    }

    /// Resolve whatever reference the node at `url` carries. Dynamic
    /// references take precedence over `$ref`. Returns `None` for nodes
    /// without a reference.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_reference`](Self::resolve_reference).
    pub fn resolve_node_reference(&self, url: &Url) -> Result<Option<Url>, GraphError> {
        let item = self.node_item(url)?;
        let strategy = self.strategy(item.dialect)?;
        if let Some(reference) = strategy.select_dynamic_ref(item.node) {
            return self.resolve_dynamic_reference(item.url, reference).map(Some);
        }
        strategy
            .select_ref(item.node)
            .map(|reference| self.resolve_reference(item.url, reference))
            .transpose()
    }

    /// Join `reference` against the source's root and re-express the result
    /// under the target root's canonical URL. Anchors are not applied here.
    fn lexical_target(&self, source: &Url, reference: &str) -> Result<Url, GraphError> {
        let record = self.record(source)?;
        let root = &self.roots[record.root.0];
        let joined = resolve(&root.retrieval_url, reference)?;
        let document = without_fragment(&joined);
        let id = self
            .retrieved
            .get(&document)
            .or_else(|| self.root_ids.get(&document))
            .ok_or_else(|| GraphError::RootNotFound {
                url: document.clone(),
            })?;
        Ok(with_fragment(&self.roots[id.0].canonical_url, &fragment(&joined)))
    }

    fn record(&self, url: &Url) -> Result<&NodeRecord, GraphError> {
        self.nodes
            .get(&node_key(url))
            .ok_or_else(|| GraphError::NodeNotFound { url: url.clone() })
    }

    fn existing(&self, url: Url) -> Result<Url, GraphError> {
        if self.nodes.contains_key(&url) {
            return Ok(url);
        }
        match self.aliases.get(&url) {
            Some(target) => Ok(target.clone()),
            None => Err(GraphError::NodeNotFound { url }),
        }
    }
}
