//! The widl compilation pipeline.
//!
//! `build_ast_groups` turns parsed AST groups into phase-0 IRs;
//! `IdlCompiler` then runs the ordered compilation phases over them and
//! produces the final `Database`.

pub mod ir_builder;
pub use ir_builder::build_ast_groups;

pub mod idl_compiler;
pub use idl_compiler::IdlCompiler;

pub mod name_styles;
