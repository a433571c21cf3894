//! Input surface of the widl compiler.
//!
//! The IDL syntax itself is parsed by an external front end; what reaches
//! this pipeline is serialized groups of generic AST nodes, one group per
//! component. This crate models those nodes (`AstNode`), the on-disk group
//! format (`AstGroup`), and the flat runtime-enabled-features lookup table.

pub mod group;
pub use group::AstGroup;

pub mod node;
pub use node::{AstNode, PropertyValue};

pub mod runtime_enabled_features;
pub use runtime_enabled_features::RuntimeEnabledFeatures;
