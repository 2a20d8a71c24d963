#![doc = include_str!("../README.md")]

extern crate alloc;

mod dialect;
pub mod draft04;
pub mod draft06;
pub mod draft07;
pub mod draft2019_09;
pub mod draft2020_12;
pub mod pointer;
mod registry;
pub mod shape;
mod strategy;

pub use dialect::{Dialect, UnknownDialect};
pub use registry::DialectRegistry;
pub use shape::ShapeError;
pub use strategy::{BooleanSchemas, Child, DialectStrategy, DynamicAnchor, Vocabulary};
