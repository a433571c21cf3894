//! Names, component tags, and source locations.
//!
//! Every IDL fragment carries an `Identifier`, the `Component` (build layer)
//! it came from, and a `DebugInfo` accumulating the source locations of all
//! fragments merged into it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The name of a user-defined IDL construct or member.
///
/// Identifiers of user-defined types are globally unique across all kinds,
/// which is what makes identifier-keyed reference resolution possible.
/// An empty identifier marks an unnamed construct (special operations,
/// constructors); unnamed members never participate in overload grouping.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier(name.to_string())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier(name)
    }
}

impl std::ops::Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// A Blink-style layering tag (`core`, `modules`, ...) naming the build
/// layer an IDL fragment belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Component(String);

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Component(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A position in an IDL source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub filepath: String,
    pub line_number: Option<u32>,
    pub position: Option<u32>,
}

impl Location {
    pub fn new(filepath: impl Into<String>, line_number: Option<u32>, position: Option<u32>) -> Self {
        Location {
            filepath: filepath.into(),
            line_number,
            position,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(line) => write!(f, "{}:{}", self.filepath, line),
            None => f.write_str(&self.filepath),
        }
    }
}

/// Provenance of an IDL fragment.
///
/// A definition assembled from multiple fragments (a non-partial plus its
/// partials and mixins) accumulates every fragment's location; the first
/// location is the primary one used in diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    locations: Vec<Location>,
}

impl DebugInfo {
    pub fn new(location: Location) -> Self {
        DebugInfo {
            locations: vec![location],
        }
    }

    /// The primary location, i.e. where the main fragment was defined.
    pub fn location(&self) -> &Location {
        static UNKNOWN: std::sync::OnceLock<Location> = std::sync::OnceLock::new();
        self.locations
            .first()
            .unwrap_or_else(|| UNKNOWN.get_or_init(Location::default))
    }

    pub fn all_locations(&self) -> &[Location] {
        &self.locations
    }

    /// Appends the locations of a merged-in fragment, keeping order and
    /// dropping exact duplicates.
    pub fn add_locations(&mut self, locations: &[Location]) {
        for location in locations {
            if !self.locations.contains(location) {
                self.locations.push(location.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_ordering_is_lexicographic() {
        let a = Identifier::from("Audio");
        let b = Identifier::from("Window");
        assert!(a < b);
        assert_eq!(a.as_str(), "Audio");
    }

    #[test]
    fn debug_info_accumulates_unique_locations() {
        let mut info = DebugInfo::new(Location::new("a.idl", Some(1), None));
        info.add_locations(&[
            Location::new("b.idl", Some(10), None),
            Location::new("a.idl", Some(1), None),
        ]);
        assert_eq!(info.all_locations().len(), 2);
        assert_eq!(info.location().filepath, "a.idl");
    }
}
