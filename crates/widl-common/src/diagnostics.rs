//! Diagnostics and fatal compilation errors.
//!
//! Two error channels exist, mirroring the failure semantics of the
//! pipeline: recoverable conditions (unresolved references) are reported
//! through a `DiagnosticSink` and compilation continues with a stub, while
//! structural errors in the source IDL (duplicate definitions, partial
//! without a base, ...) abort compilation with a `CompileError`.

use crate::composition::{Identifier, Location};
use std::fmt;

/// A recoverable, location-qualified message reported during compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, location: Option<Location>) -> Self {
        Diagnostic {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Collects diagnostics across a whole compilation so that all errors of a
/// batch surface in one run.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// A fatal condition: either inconsistent/invalid source IDL or unreadable
/// input. No variant is ever silently suppressed.
#[derive(Debug)]
pub enum CompileError {
    /// Two non-partial definitions share one identifier.
    DuplicateDefinition {
        identifier: Identifier,
        location: Location,
    },
    /// A partial definition has no non-partial base.
    PartialWithoutNonPartial {
        kind: &'static str,
        identifier: Identifier,
        locations: Vec<Location>,
    },
    /// An `includes` statement names an unknown mixin.
    MissingMixin {
        interface: Identifier,
        mixin: Identifier,
        location: Location,
    },
    /// Overloads of one group disagree on an attribute that must be
    /// consistent (`Affects`, `NoAllocDirectCall`).
    InconsistentOverloadAttribute {
        key: &'static str,
        owner: Identifier,
        group: Identifier,
    },
    /// An extended attribute key appears more than once where a single
    /// value is required.
    AmbiguousExtendedAttribute { key: String },
    /// A runtime-enabled feature is declared twice.
    DuplicateFeature { name: String },
    /// An input file could not be read.
    Io { path: String, source: std::io::Error },
    /// An input file could not be decoded.
    Decode { path: String, detail: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::DuplicateDefinition {
                identifier,
                location,
            } => write!(f, "{location}: duplicate definition of {identifier}"),
            CompileError::PartialWithoutNonPartial {
                kind,
                identifier,
                locations,
            } => {
                write!(
                    f,
                    "{kind} {identifier} is defined without a non-partial definition."
                )?;
                for location in locations {
                    write!(f, "\n  {location}")?;
                }
                Ok(())
            }
            CompileError::MissingMixin {
                interface,
                mixin,
                location,
            } => write!(
                f,
                "{location}: {interface} includes unknown mixin {mixin}"
            ),
            CompileError::InconsistentOverloadAttribute { key, owner, group } => write!(
                f,
                "overloaded operations have inconsistent extended attributes \
                 of [{key}]. {owner}.{group}"
            ),
            CompileError::AmbiguousExtendedAttribute { key } => {
                write!(f, "multiple [{key}] extended attributes where one is required")
            }
            CompileError::DuplicateFeature { name } => {
                write!(f, "runtime-enabled feature {name} is declared more than once")
            }
            CompileError::Io { path, source } => write!(f, "{path}: {source}"),
            CompileError::Decode { path, detail } => write!(f, "{path}: {detail}"),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_embeds_location() {
        let diagnostic = Diagnostic::new(
            "Unresolved reference to Unknown",
            Some(Location::new("dom/thing.idl", Some(12), None)),
        );
        assert_eq!(
            diagnostic.to_string(),
            "dom/thing.idl:12: Unresolved reference to Unknown"
        );
    }

    #[test]
    fn partial_error_lists_every_location() {
        let err = CompileError::PartialWithoutNonPartial {
            kind: "partial interface",
            identifier: Identifier::from("Gap"),
            locations: vec![
                Location::new("a.idl", Some(3), None),
                Location::new("b.idl", Some(7), None),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("a.idl:3"));
        assert!(text.contains("b.idl:7"));
    }
}
