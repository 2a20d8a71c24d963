use alloc::sync::Arc;
use core::future::Future;
use core::pin::Pin;
use std::collections::HashSet;

use indexmap::IndexSet;
use jsonschema_dialect::{Dialect, DialectRegistry, DialectStrategy};
use serde_json::Value;
use url::Url;

use crate::graph::{RootId, RootRecord};
use crate::urls::{check_scheme, resolve, without_fragment};
use crate::{GraphError, Retrieve, SchemaGraph};

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Url, GraphError>> + Send + 'a>>;

impl<R: Retrieve> SchemaGraph<R> {
    /// Load the document at `url` and, transitively, every document it
    /// references. Returns the document's canonical URL.
    ///
    /// Loading is idempotent: a retrieval URL is fetched at most once per
    /// graph, and loading it again returns the same canonical URL.
    ///
    /// # Errors
    ///
    /// Fails on the first fetch, scheme, shape, duplicate or reference error
    /// anywhere in the reachable set.
    #[tracing::instrument(skip_all, fields(url = %url))]
    pub async fn load(&mut self, url: &Url) -> Result<Url, GraphError> {
        let dialect = self.default_dialect;
        self.load_from_url(url, url, None, dialect).await
    }

    /// Load `retrieval_url`, registering it under `canonical_hint` unless the
    /// document declares its own `$id`.
    ///
    /// `referencing` records which root caused the load and forms the chain
    /// dynamic references are resolved along. `default_dialect` applies when
    /// the document has no recognised `$schema`.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_from_url<'a>(
        &'a mut self,
        canonical_hint: &'a Url,
        retrieval_url: &'a Url,
        referencing: Option<RootId>,
        default_dialect: Dialect,
    ) -> LoadFuture<'a> {
        Box::pin(async move {
            let retrieval_url = without_fragment(retrieval_url);
            if let Some(id) = self.retrieved.get(&retrieval_url) {
                tracing::trace!(url = %retrieval_url, "already loaded");
                return Ok(self.roots[id.0].canonical_url.clone());
            }
            check_scheme(&retrieval_url)?;

            tracing::debug!(url = %retrieval_url, "retrieving schema");
            let document = self
                .retriever
                .retrieve(&retrieval_url)
                .await
                .map_err(|source| GraphError::Fetch {
                    url: retrieval_url.clone(),
                    source,
                })?;

            let dialect = self.dialects.detect(&document).unwrap_or(default_dialect);
            let strategy = self.strategy(dialect)?;
            strategy
                .validate_shape(&document)
                .map_err(|e| GraphError::InvalidSchema {
                    url: retrieval_url.clone(),
                    dialect,
                    pointer: e.pointer,
                    message: e.message,
                })?;

            let canonical_url = match strategy.select_id(&document) {
                Some(id) => without_fragment(&resolve(&retrieval_url, id)?),
                None => without_fragment(canonical_hint),
            };

            let mut scan = ReferenceScan::new(&self.dialects, &retrieval_url);
            scan.visit(&strategy, &document, "", &retrieval_url, &canonical_url)?;
            let references = scan.into_external(&retrieval_url, &canonical_url);

            if let Some(&existing) = self.root_ids.get(&canonical_url) {
                if *self.roots[existing.0].node() != document {
                    tracing::warn!(
                        canonical = %canonical_url,
                        retrieval = %retrieval_url,
                        "canonical URL already loaded with different content; keeping the first"
                    );
                }
                self.retrieved.insert(retrieval_url, existing);
                return Ok(canonical_url);
            }

            let id = self.push_root(RootRecord {
                document: Arc::new(document),
                base: String::new(),
                canonical_url: canonical_url.clone(),
                retrieval_url: retrieval_url.clone(),
                referencing,
                dialect,
            });
            self.retrieved.insert(retrieval_url.clone(), id);
            tracing::info!(url = %canonical_url, %dialect, "loaded schema");

            for reference in references {
                if self.is_loaded(&reference) {
                    continue;
                }
                let result = self
                    .load_from_url(&reference, &reference, Some(id), dialect)
                    .await;
                match result {
                    // The URL may still turn up as an embedded resource of a
                    // document loaded later; settled once the load finishes.
                    Err(error) if fails_to_retrieve(&error, &reference) => {
                        tracing::debug!(url = %reference, "not retrievable, deferring");
                        self.deferred.push((reference, error));
                    }
                    result => {
                        result?;
                    }
                }
            }

            self.index_root(id)?;
            if referencing.is_none() {
                self.settle_deferred()?;
            }
            Ok(canonical_url)
        })
    }

    fn is_loaded(&self, url: &Url) -> bool {
        self.retrieved.contains_key(url) || self.root_ids.contains_key(url)
    }

    /// Fail with the first deferred retrieval error whose URL never showed up
    /// as a loaded or embedded root.
    fn settle_deferred(&mut self) -> Result<(), GraphError> {
        for (url, error) in core::mem::take(&mut self.deferred) {
            if !self.is_loaded(&url) {
                return Err(error);
            }
            tracing::debug!(%url, "deferred reference found as an embedded resource");
        }
        Ok(())
    }
}

/// Whether `error` is the failure to retrieve `url` itself, as opposed to a
/// failure somewhere below it.
fn fails_to_retrieve(error: &GraphError, url: &Url) -> bool {
    matches!(
        error,
        GraphError::Fetch { url: failed, .. } | GraphError::UnsupportedScheme { url: failed, .. }
            if failed == url
    )
}

/// Collects the documents a schema points at, following nested `$id`s and
/// embedded `$schema` switches the same way the indexer will.
struct ReferenceScan<'r> {
    dialects: &'r DialectRegistry,
    /// Retrieval URL of the scanned document, for errors.
    url: &'r Url,
    embedded: HashSet<Url>,
    references: IndexSet<Url>,
}

impl<'r> ReferenceScan<'r> {
    fn new(dialects: &'r DialectRegistry, url: &'r Url) -> Self {
        Self {
            dialects,
            url,
            embedded: HashSet::new(),
            references: IndexSet::new(),
        }
    }

    /// `ref_base` resolves references, `id_base` resolves nested ids. They
    /// differ only at the document root when the retrieval and canonical URLs
    /// disagree.
    fn visit(
        &mut self,
        strategy: &Arc<dyn DialectStrategy>,
        node: &Value,
        pointer: &str,
        ref_base: &Url,
        id_base: &Url,
    ) -> Result<(), GraphError> {
        let rebased;
        let (strategy, ref_base, id_base) = if !pointer.is_empty()
            && strategy.supports_nested_ids()
            && let Some(id) = strategy.select_id(node)
        {
            let url = without_fragment(&resolve(id_base, id)?);
            self.embedded.insert(url.clone());
            let nested = match strategy.foreign_dialect(node) {
                Some(dialect) => self.embedded_strategy(dialect, node, pointer)?,
                None => Arc::clone(strategy),
            };
            rebased = (nested, url);
            (&rebased.0, &rebased.1, &rebased.1)
        } else {
            (strategy, ref_base, id_base)
        };

        for reference in [strategy.select_ref(node), strategy.select_dynamic_ref(node)]
            .into_iter()
            .flatten()
        {
            if reference.starts_with('#') {
                continue;
            }
            self.references
                .insert(without_fragment(&resolve(ref_base, reference)?));
        }

        for child in strategy.select_children(node, pointer) {
            self.visit(strategy, child.node, &child.pointer, ref_base, id_base)?;
        }
        Ok(())
    }

    /// The strategy for an embedded resource in another dialect, after
    /// checking the resource's shape against it. The enclosing dialect's
    /// shape check stops at such resources.
    fn embedded_strategy(
        &self,
        dialect: Dialect,
        node: &Value,
        pointer: &str,
    ) -> Result<Arc<dyn DialectStrategy>, GraphError> {
        let strategy = self
            .dialects
            .get(dialect)
            .cloned()
            .ok_or(GraphError::NotImplemented {
                dialect,
                feature: "dialect strategy",
            })?;
        strategy
            .validate_shape(node)
            .map_err(|e| GraphError::InvalidSchema {
                url: self.url.clone(),
                dialect,
                pointer: format!("{pointer}{}", e.pointer),
                message: e.message,
            })?;
        Ok(strategy)
    }

    /// References that leave the document being scanned, in first-seen order.
    fn into_external(self, retrieval_url: &Url, canonical_url: &Url) -> Vec<Url> {
        let embedded = self.embedded;
        self.references
            .into_iter()
            .filter(|url| url != retrieval_url && url != canonical_url && !embedded.contains(url))
            .collect()
    }
}
