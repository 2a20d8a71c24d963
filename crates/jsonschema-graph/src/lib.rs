#![doc = include_str!("../README.md")]
#![allow(unused_assignments)] // thiserror/miette derive macros trigger false positives

extern crate alloc;

mod error;
mod graph;
mod indexer;
mod loader;
mod names;
mod resolver;
mod retrieve;
mod urls;

pub use error::GraphError;
pub use graph::{NodeItem, RootId, RootItem, SchemaGraph};
pub use jsonschema_dialect::{Dialect, DialectRegistry, DialectStrategy};
pub use names::{TypeNames, suggest_name};
pub use retrieve::{InMemoryRetriever, Retrieve};
