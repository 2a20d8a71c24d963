use alloc::sync::Arc;

use serde_json::Value;

use crate::draft2019_09::Draft2019_09;
use crate::draft2020_12::Draft2020_12;
use crate::draft04::Draft04;
use crate::draft06::Draft06;
use crate::draft07::Draft07;
use crate::{Dialect, DialectStrategy};

/// Ordered set of dialect strategies used to detect and dispatch documents.
///
/// Detection probes strategies in registration order and the first one whose
/// [`is_root_node`](DialectStrategy::is_root_node) accepts the document wins.
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    strategies: Vec<Arc<dyn DialectStrategy>>,
}

impl DialectRegistry {
    /// A registry with no dialects. Every lookup fails until one is registered.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Register `strategy`, replacing (in place) any strategy for the same dialect.
    pub fn register(&mut self, strategy: Arc<dyn DialectStrategy>) {
        let dialect = strategy.dialect();
        if let Some(slot) = self.strategies.iter_mut().find(|s| s.dialect() == dialect) {
            *slot = strategy;
        } else {
            self.strategies.push(strategy);
        }
    }

    /// The dialect `document` declares through `$schema`, if any registered
    /// strategy recognises it.
    pub fn detect(&self, document: &Value) -> Option<Dialect> {
        self.strategies
            .iter()
            .find(|s| s.is_root_node(document))
            .map(|s| s.dialect())
    }

    pub fn get(&self, dialect: Dialect) -> Option<&Arc<dyn DialectStrategy>> {
        self.strategies.iter().find(|s| s.dialect() == dialect)
    }

    pub fn dialects(&self) -> impl Iterator<Item = Dialect> + '_ {
        self.strategies.iter().map(|s| s.dialect())
    }
}

impl Default for DialectRegistry {
    /// All five dialects, newest first.
    fn default() -> Self {
        Self {
            strategies: vec![
                Arc::new(Draft2020_12),
                Arc::new(Draft2019_09),
                Arc::new(Draft07),
                Arc::new(Draft06),
                Arc::new(Draft04),
            ],
        }
    }
}
