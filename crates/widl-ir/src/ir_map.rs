//! The phased store of definition IRs.
//!
//! Each compilation step reads IRs out of the newest phase that has them,
//! transforms copies, and registers the results into a fresh phase. Older
//! phases stay intact, so any step can be inspected after the fact and a
//! lookup always sees the newest state.

use crate::callback_function::CallbackFunctionIr;
use crate::callback_interface::CallbackInterfaceIr;
use crate::composition_parts::CompositionParts;
use crate::dictionary::DictionaryIr;
use crate::enumeration::EnumerationIr;
use crate::includes::IncludesIr;
use crate::interface::InterfaceIr;
use crate::iterator::IteratorIr;
use crate::namespace::NamespaceIr;
use crate::typedef::TypedefIr;
use indexmap::IndexMap;
use widl_common::{CompileError, Identifier};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrKind {
    Interface,
    PartialInterface,
    InterfaceMixin,
    PartialInterfaceMixin,
    Namespace,
    PartialNamespace,
    Dictionary,
    PartialDictionary,
    Enumeration,
    Typedef,
    CallbackFunction,
    CallbackInterface,
    Includes,
    SyncIterator,
    AsyncIterator,
}

impl IrKind {
    /// Partial fragments and includes statements may legally share an
    /// identifier; every other kind must be unique.
    pub fn allows_duplicates(self) -> bool {
        matches!(
            self,
            IrKind::PartialInterface
                | IrKind::PartialInterfaceMixin
                | IrKind::PartialNamespace
                | IrKind::PartialDictionary
                | IrKind::Includes
        )
    }
}

#[derive(Clone, Debug)]
pub enum DefinitionIr {
    Interface(InterfaceIr),
    Namespace(NamespaceIr),
    Dictionary(DictionaryIr),
    Enumeration(EnumerationIr),
    Typedef(TypedefIr),
    CallbackFunction(CallbackFunctionIr),
    CallbackInterface(CallbackInterfaceIr),
    Includes(IncludesIr),
    SyncIterator(IteratorIr),
    AsyncIterator(IteratorIr),
}

impl DefinitionIr {
    pub fn kind(&self) -> IrKind {
        match self {
            DefinitionIr::Interface(ir) => match (ir.is_partial, ir.is_mixin) {
                (false, false) => IrKind::Interface,
                (true, false) => IrKind::PartialInterface,
                (false, true) => IrKind::InterfaceMixin,
                (true, true) => IrKind::PartialInterfaceMixin,
            },
            DefinitionIr::Namespace(ir) => {
                if ir.is_partial {
                    IrKind::PartialNamespace
                } else {
                    IrKind::Namespace
                }
            }
            DefinitionIr::Dictionary(ir) => {
                if ir.is_partial {
                    IrKind::PartialDictionary
                } else {
                    IrKind::Dictionary
                }
            }
            DefinitionIr::Enumeration(_) => IrKind::Enumeration,
            DefinitionIr::Typedef(_) => IrKind::Typedef,
            DefinitionIr::CallbackFunction(_) => IrKind::CallbackFunction,
            DefinitionIr::CallbackInterface(_) => IrKind::CallbackInterface,
            DefinitionIr::Includes(_) => IrKind::Includes,
            DefinitionIr::SyncIterator(_) => IrKind::SyncIterator,
            DefinitionIr::AsyncIterator(_) => IrKind::AsyncIterator,
        }
    }

    /// The key the IR is registered under. Includes statements key on the
    /// including interface.
    pub fn identifier(&self) -> &Identifier {
        match self {
            DefinitionIr::Interface(ir) => &ir.parts.identifier,
            DefinitionIr::Namespace(ir) => &ir.parts.identifier,
            DefinitionIr::Dictionary(ir) => &ir.parts.identifier,
            DefinitionIr::Enumeration(ir) => &ir.parts.identifier,
            DefinitionIr::Typedef(ir) => &ir.parts.identifier,
            DefinitionIr::CallbackFunction(ir) => &ir.parts.identifier,
            DefinitionIr::CallbackInterface(ir) => &ir.parts.identifier,
            DefinitionIr::Includes(ir) => &ir.interface,
            DefinitionIr::SyncIterator(ir) => &ir.parts.identifier,
            DefinitionIr::AsyncIterator(ir) => &ir.parts.identifier,
        }
    }

    pub fn parts(&self) -> Option<&CompositionParts> {
        match self {
            DefinitionIr::Interface(ir) => Some(&ir.parts),
            DefinitionIr::Namespace(ir) => Some(&ir.parts),
            DefinitionIr::Dictionary(ir) => Some(&ir.parts),
            DefinitionIr::Enumeration(ir) => Some(&ir.parts),
            DefinitionIr::Typedef(ir) => Some(&ir.parts),
            DefinitionIr::CallbackFunction(ir) => Some(&ir.parts),
            DefinitionIr::CallbackInterface(ir) => Some(&ir.parts),
            DefinitionIr::Includes(_) => None,
            DefinitionIr::SyncIterator(ir) => Some(&ir.parts),
            DefinitionIr::AsyncIterator(ir) => Some(&ir.parts),
        }
    }

    pub fn parts_mut(&mut self) -> Option<&mut CompositionParts> {
        match self {
            DefinitionIr::Interface(ir) => Some(&mut ir.parts),
            DefinitionIr::Namespace(ir) => Some(&mut ir.parts),
            DefinitionIr::Dictionary(ir) => Some(&mut ir.parts),
            DefinitionIr::Enumeration(ir) => Some(&mut ir.parts),
            DefinitionIr::Typedef(ir) => Some(&mut ir.parts),
            DefinitionIr::CallbackFunction(ir) => Some(&mut ir.parts),
            DefinitionIr::CallbackInterface(ir) => Some(&mut ir.parts),
            DefinitionIr::Includes(_) => None,
            DefinitionIr::SyncIterator(ir) => Some(&mut ir.parts),
            DefinitionIr::AsyncIterator(ir) => Some(&mut ir.parts),
        }
    }
}

type SinglePhaseMap = IndexMap<IrKind, IndexMap<Identifier, Vec<DefinitionIr>>>;

#[derive(Debug, Default)]
pub struct IrMap {
    phases: Vec<SinglePhaseMap>,
}

impl IrMap {
    pub fn new() -> Self {
        IrMap {
            phases: vec![SinglePhaseMap::default()],
        }
    }

    pub fn current_phase(&self) -> usize {
        self.phases.len() - 1
    }

    pub fn move_to_new_phase(&mut self) {
        self.phases.push(SinglePhaseMap::default());
    }

    /// Registers an IR into the current phase. Registering two IRs of a
    /// unique kind under one identifier in the same phase is an error.
    pub fn add(&mut self, ir: DefinitionIr) -> Result<(), CompileError> {
        let kind = ir.kind();
        let identifier = ir.identifier().clone();
        let phase = self.phases.last_mut().unwrap_or_else(|| unreachable!());
        let slot = phase.entry(kind).or_default().entry(identifier).or_default();
        if !slot.is_empty() && !kind.allows_duplicates() {
            return Err(CompileError::DuplicateDefinition {
                identifier: ir.identifier().clone(),
                location: ir
                    .parts()
                    .map(|parts| parts.debug_info.location().clone())
                    .unwrap_or_default(),
            });
        }
        slot.push(ir);
        Ok(())
    }

    /// Clones out every IR of the kind from the newest phase that has any.
    /// The standard step pattern: clone from the old phase, transform, and
    /// `add` into a new one.
    pub fn irs_of_kind(&self, kind: IrKind) -> Vec<DefinitionIr> {
        for phase in self.phases.iter().rev() {
            if let Some(per_identifier) = phase.get(&kind) {
                return per_identifier.values().flatten().cloned().collect();
            }
        }
        Vec::new()
    }

    /// The newest IR of the kind with the identifier, if any. Only
    /// meaningful for unique kinds.
    pub fn find_of_kind(&self, kind: IrKind, identifier: &Identifier) -> Option<&DefinitionIr> {
        for phase in self.phases.iter().rev() {
            if let Some(ir) = phase
                .get(&kind)
                .and_then(|per_identifier| per_identifier.get(identifier))
                .and_then(|irs| irs.last())
            {
                return Some(ir);
            }
        }
        None
    }

    /// The newest IR with the identifier across all unique kinds. This is
    /// what reference resolution uses, relying on identifiers of
    /// user-defined types being globally unique.
    pub fn find_by_identifier(&self, identifier: &Identifier) -> Option<&DefinitionIr> {
        for phase in self.phases.iter().rev() {
            for (kind, per_identifier) in phase {
                if kind.allows_duplicates() {
                    continue;
                }
                if let Some(ir) = per_identifier.get(identifier).and_then(|irs| irs.last()) {
                    return Some(ir);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extended_attribute::ExtendedAttributes;
    use widl_common::{Component, DebugInfo, Location};

    fn interface_ir(identifier: &str, is_partial: bool) -> DefinitionIr {
        DefinitionIr::Interface(InterfaceIr::new(
            CompositionParts::new(
                Identifier::from(identifier),
                Component::new("core"),
                DebugInfo::new(Location::new("test.idl", Some(1), None)),
                ExtendedAttributes::default(),
            ),
            is_partial,
            false,
        ))
    }

    #[test]
    fn newest_phase_wins() {
        let mut map = IrMap::new();
        map.add(interface_ir("Window", false)).unwrap();
        assert_eq!(map.irs_of_kind(IrKind::Interface).len(), 1);

        map.move_to_new_phase();
        let mut updated = interface_ir("Window", false);
        if let DefinitionIr::Interface(ir) = &mut updated {
            ir.inherited = None;
            ir.direct_subclasses.push(Identifier::from("Worker"));
        }
        map.add(updated).unwrap();

        let found = map
            .find_of_kind(IrKind::Interface, &Identifier::from("Window"))
            .unwrap();
        let DefinitionIr::Interface(ir) = found else {
            panic!("not an interface");
        };
        assert_eq!(ir.direct_subclasses.len(), 1);
    }

    #[test]
    fn duplicate_non_partial_definitions_are_rejected() {
        let mut map = IrMap::new();
        map.add(interface_ir("Window", false)).unwrap();
        let error = map.add(interface_ir("Window", false)).unwrap_err();
        assert!(matches!(error, CompileError::DuplicateDefinition { .. }));

        map.add(interface_ir("Window", true)).unwrap();
        map.add(interface_ir("Window", true)).unwrap();
        assert_eq!(map.irs_of_kind(IrKind::PartialInterface).len(), 2);
    }

    #[test]
    fn find_by_identifier_skips_partials() {
        let mut map = IrMap::new();
        map.add(interface_ir("Window", true)).unwrap();
        assert!(map.find_by_identifier(&Identifier::from("Window")).is_none());
        map.add(interface_ir("Window", false)).unwrap();
        assert!(map.find_by_identifier(&Identifier::from("Window")).is_some());
    }
}
