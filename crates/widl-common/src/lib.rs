//! Common value types for the widl Web IDL compiler.
//!
//! This crate provides the foundational types shared by all widl crates:
//! - Names and build-layer tags (`Identifier`, `Component`)
//! - Source locations (`Location`, `DebugInfo`)
//! - Diagnostics (`Diagnostic`, `DiagnosticSink`, `CompileError`)

pub mod composition;
pub use composition::{Component, DebugInfo, Identifier, Location};

pub mod diagnostics;
pub use diagnostics::{CompileError, Diagnostic, DiagnosticSink};
