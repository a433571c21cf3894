//! Deferred references to user-defined IDL definitions.
//!
//! References are created eagerly, while the target may not even be built
//! yet, and resolved exactly once at the end of compilation. A reference is
//! a tagged value — unresolved (identifier + creation-site debug info) or
//! resolved — with an explicit `target` accessor that asserts resolution.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use widl_common::{DebugInfo, Identifier};

/// Handle to one reference inside a `RefByIdFactory`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefId(u32);

/// The resolved side of a reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefTarget {
    /// Resolved to a user-defined definition registered in the database.
    Definition(Identifier),
    /// The identifier did not resolve; a stub definition of the same
    /// identifier was substituted so compilation could continue.
    Stub(Identifier),
}

impl RefTarget {
    pub fn identifier(&self) -> &Identifier {
        match self {
            RefTarget::Definition(identifier) | RefTarget::Stub(identifier) => identifier,
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, RefTarget::Stub(_))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RefEntry {
    identifier: Identifier,
    debug_info: DebugInfo,
    target: Option<RefTarget>,
}

/// Creates and owns every reference to a user-defined type.
///
/// The factory freezes on the first `for_each` call; creating further
/// references afterwards is a caller bug.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RefByIdFactory {
    entries: Vec<RefEntry>,
    frozen: Cell<bool>,
}

impl RefByIdFactory {
    pub fn new() -> Self {
        RefByIdFactory::default()
    }

    pub fn create(&mut self, identifier: Identifier, debug_info: DebugInfo) -> RefId {
        assert!(
            !self.frozen.get(),
            "reference creation after the factory was frozen"
        );
        let id = RefId(self.entries.len() as u32);
        self.entries.push(RefEntry {
            identifier,
            debug_info,
            target: None,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The identifier the reference was created with. Always available.
    pub fn identifier(&self, id: RefId) -> &Identifier {
        &self.entries[id.0 as usize].identifier
    }

    /// Where the reference was created. Always available.
    pub fn debug_info(&self, id: RefId) -> &DebugInfo {
        &self.entries[id.0 as usize].debug_info
    }

    pub fn is_resolved(&self, id: RefId) -> bool {
        self.entries[id.0 as usize].target.is_some()
    }

    /// The resolved target. Asserts that resolution already happened.
    pub fn target(&self, id: RefId) -> &RefTarget {
        self.entries[id.0 as usize]
            .target
            .as_ref()
            .unwrap_or_else(|| {
                panic!(
                    "reference to {} accessed before resolution",
                    self.entries[id.0 as usize].identifier
                )
            })
    }

    /// Binds the reference to its target. Permitted after freeze; that is
    /// the whole point of the freeze-then-resolve lifecycle.
    pub fn set_target(&mut self, id: RefId, target: RefTarget) {
        let entry = &mut self.entries[id.0 as usize];
        assert!(
            entry.target.is_none(),
            "reference to {} resolved twice",
            entry.identifier
        );
        entry.target = Some(target);
    }

    /// Visits every reference ever created. Freezes creation.
    pub fn for_each(&self, mut callback: impl FnMut(RefId)) {
        self.frozen.set(true);
        for index in 0..self.entries.len() {
            callback(RefId(index as u32));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use widl_common::Location;

    fn debug_info() -> DebugInfo {
        DebugInfo::new(Location::new("test.idl", Some(1), None))
    }

    #[test]
    fn for_each_freezes_creation() {
        let mut factory = RefByIdFactory::new();
        factory.create(Identifier::from("A"), debug_info());
        let mut seen = 0;
        factory.for_each(|_| seen += 1);
        assert_eq!(seen, 1);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            factory.create(Identifier::from("B"), debug_info())
        }));
        assert!(result.is_err());
    }

    #[test]
    fn target_asserts_resolution() {
        let mut factory = RefByIdFactory::new();
        let id = factory.create(Identifier::from("A"), debug_info());
        assert!(!factory.is_resolved(id));
        factory.set_target(id, RefTarget::Definition(Identifier::from("A")));
        assert_eq!(factory.target(id).identifier().as_str(), "A");
        assert!(!factory.target(id).is_stub());
    }
}
