//! Command line front end for the widl compiler.

pub mod args;
pub mod driver;
