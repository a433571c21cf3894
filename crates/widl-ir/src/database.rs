//! The compiled, queryable database of a whole IDL corpus.
//!
//! The database owns the public form of every definition plus the two
//! arenas (types and references) that their handles index into, so one
//! serialized blob is self-contained.

use crate::callback_function::CallbackFunction;
use crate::callback_interface::CallbackInterface;
use crate::dictionary::Dictionary;
use crate::enumeration::Enumeration;
use crate::idl_type::{IdlTypeFactory, InheritanceView};
use crate::interface::Interface;
use crate::iterator::{AsyncIterator, SyncIterator};
use crate::namespace::Namespace;
use crate::observable_array::ObservableArray;
use crate::reference::{RefByIdFactory, RefId};
use crate::typedef::Typedef;
use crate::union::Union;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use widl_common::{CompileError, DebugInfo, Identifier};

/// A placeholder definition substituted for an identifier that did not
/// resolve, so that compilation of the rest of the corpus can finish.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StubUserDefinedType {
    pub identifier: Identifier,
    /// Where the unresolved references were created.
    pub debug_info: DebugInfo,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatabaseBody {
    pub interfaces: IndexMap<Identifier, Interface>,
    pub interface_mixins: IndexMap<Identifier, Interface>,
    pub namespaces: IndexMap<Identifier, Namespace>,
    pub dictionaries: IndexMap<Identifier, Dictionary>,
    pub enumerations: IndexMap<Identifier, Enumeration>,
    pub typedefs: IndexMap<Identifier, Typedef>,
    pub callback_functions: IndexMap<Identifier, CallbackFunction>,
    pub callback_interfaces: IndexMap<Identifier, CallbackInterface>,
    pub sync_iterators: IndexMap<Identifier, SyncIterator>,
    pub async_iterators: IndexMap<Identifier, AsyncIterator>,
    pub unions: IndexMap<Identifier, Union>,
    pub observable_arrays: IndexMap<Identifier, ObservableArray>,
    pub stubs: IndexMap<Identifier, StubUserDefinedType>,
}

/// A borrowed view of any definition, whatever its kind.
#[derive(Copy, Clone, Debug)]
pub enum DefinitionRef<'a> {
    Interface(&'a Interface),
    Namespace(&'a Namespace),
    Dictionary(&'a Dictionary),
    Enumeration(&'a Enumeration),
    Typedef(&'a Typedef),
    CallbackFunction(&'a CallbackFunction),
    CallbackInterface(&'a CallbackInterface),
    SyncIterator(&'a SyncIterator),
    AsyncIterator(&'a AsyncIterator),
    Union(&'a Union),
    ObservableArray(&'a ObservableArray),
    Stub(&'a StubUserDefinedType),
}

impl<'a> DefinitionRef<'a> {
    pub fn identifier(&self) -> &'a Identifier {
        match self {
            DefinitionRef::Interface(definition) => definition.identifier(),
            DefinitionRef::Namespace(definition) => definition.identifier(),
            DefinitionRef::Dictionary(definition) => definition.identifier(),
            DefinitionRef::Enumeration(definition) => definition.identifier(),
            DefinitionRef::Typedef(definition) => definition.identifier(),
            DefinitionRef::CallbackFunction(definition) => definition.identifier(),
            DefinitionRef::CallbackInterface(definition) => definition.identifier(),
            DefinitionRef::SyncIterator(definition) => definition.identifier(),
            DefinitionRef::AsyncIterator(definition) => definition.identifier(),
            DefinitionRef::Union(definition) => definition.identifier(),
            DefinitionRef::ObservableArray(definition) => definition.identifier(),
            DefinitionRef::Stub(definition) => &definition.identifier,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DefinitionRef::Interface(_) => "interface",
            DefinitionRef::Namespace(_) => "namespace",
            DefinitionRef::Dictionary(_) => "dictionary",
            DefinitionRef::Enumeration(_) => "enum",
            DefinitionRef::Typedef(_) => "typedef",
            DefinitionRef::CallbackFunction(_) => "callback function",
            DefinitionRef::CallbackInterface(_) => "callback interface",
            DefinitionRef::SyncIterator(_) => "sync iterator",
            DefinitionRef::AsyncIterator(_) => "async iterator",
            DefinitionRef::Union(_) => "union",
            DefinitionRef::ObservableArray(_) => "observable array",
            DefinitionRef::Stub(_) => "stub",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Database {
    body: DatabaseBody,
    types: IdlTypeFactory,
    refs: RefByIdFactory,
}

impl Database {
    pub fn new(body: DatabaseBody, types: IdlTypeFactory, refs: RefByIdFactory) -> Self {
        Database { body, types, refs }
    }

    pub fn types(&self) -> &IdlTypeFactory {
        &self.types
    }

    pub fn refs(&self) -> &RefByIdFactory {
        &self.refs
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.body.interfaces.values()
    }

    pub fn interface_mixins(&self) -> impl Iterator<Item = &Interface> {
        self.body.interface_mixins.values()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.body.namespaces.values()
    }

    pub fn dictionaries(&self) -> impl Iterator<Item = &Dictionary> {
        self.body.dictionaries.values()
    }

    pub fn enumerations(&self) -> impl Iterator<Item = &Enumeration> {
        self.body.enumerations.values()
    }

    pub fn typedefs(&self) -> impl Iterator<Item = &Typedef> {
        self.body.typedefs.values()
    }

    pub fn callback_functions(&self) -> impl Iterator<Item = &CallbackFunction> {
        self.body.callback_functions.values()
    }

    pub fn callback_interfaces(&self) -> impl Iterator<Item = &CallbackInterface> {
        self.body.callback_interfaces.values()
    }

    pub fn sync_iterators(&self) -> impl Iterator<Item = &SyncIterator> {
        self.body.sync_iterators.values()
    }

    pub fn async_iterators(&self) -> impl Iterator<Item = &AsyncIterator> {
        self.body.async_iterators.values()
    }

    pub fn unions(&self) -> impl Iterator<Item = &Union> {
        self.body.unions.values()
    }

    pub fn observable_arrays(&self) -> impl Iterator<Item = &ObservableArray> {
        self.body.observable_arrays.values()
    }

    pub fn stubs(&self) -> impl Iterator<Item = &StubUserDefinedType> {
        self.body.stubs.values()
    }

    pub fn interface(&self, identifier: &Identifier) -> Option<&Interface> {
        self.body.interfaces.get(identifier)
    }

    pub fn dictionary(&self, identifier: &Identifier) -> Option<&Dictionary> {
        self.body.dictionaries.get(identifier)
    }

    /// Looks an identifier up across every kind. Identifiers are globally
    /// unique, so at most one kind matches.
    pub fn find(&self, identifier: &Identifier) -> Option<DefinitionRef<'_>> {
        let body = &self.body;
        None.or_else(|| body.interfaces.get(identifier).map(DefinitionRef::Interface))
            .or_else(|| {
                body.interface_mixins
                    .get(identifier)
                    .map(DefinitionRef::Interface)
            })
            .or_else(|| body.namespaces.get(identifier).map(DefinitionRef::Namespace))
            .or_else(|| body.dictionaries.get(identifier).map(DefinitionRef::Dictionary))
            .or_else(|| body.enumerations.get(identifier).map(DefinitionRef::Enumeration))
            .or_else(|| body.typedefs.get(identifier).map(DefinitionRef::Typedef))
            .or_else(|| {
                body.callback_functions
                    .get(identifier)
                    .map(DefinitionRef::CallbackFunction)
            })
            .or_else(|| {
                body.callback_interfaces
                    .get(identifier)
                    .map(DefinitionRef::CallbackInterface)
            })
            .or_else(|| {
                body.sync_iterators
                    .get(identifier)
                    .map(DefinitionRef::SyncIterator)
            })
            .or_else(|| {
                body.async_iterators
                    .get(identifier)
                    .map(DefinitionRef::AsyncIterator)
            })
            .or_else(|| body.unions.get(identifier).map(DefinitionRef::Union))
            .or_else(|| {
                body.observable_arrays
                    .get(identifier)
                    .map(DefinitionRef::ObservableArray)
            })
            .or_else(|| body.stubs.get(identifier).map(DefinitionRef::Stub))
    }

    /// Follows a resolved reference to its definition.
    pub fn resolve(&self, id: RefId) -> DefinitionRef<'_> {
        let identifier = self.refs.target(id).identifier();
        self.find(identifier)
            .unwrap_or_else(|| panic!("reference target {identifier} is not in the database"))
    }

    /// Serializes the database, skipping the write when the file already
    /// holds identical bytes so downstream build steps see a stable mtime.
    pub fn write_to_file(&self, path: &Path) -> Result<(), CompileError> {
        let encoded = postcard::to_allocvec(self).map_err(|error| CompileError::Decode {
            path: path.display().to_string(),
            detail: error.to_string(),
        })?;
        if let Ok(existing) = std::fs::read(path)
            && existing == encoded
        {
            debug!(path = %path.display(), "database unchanged, skipping write");
            return Ok(());
        }
        std::fs::write(path, &encoded).map_err(|source| CompileError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn read_from_file(path: &Path) -> Result<Self, CompileError> {
        let bytes = std::fs::read(path).map_err(|source| CompileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        postcard::from_bytes(&bytes).map_err(|error| CompileError::Decode {
            path: path.display().to_string(),
            detail: error.to_string(),
        })
    }
}

impl InheritanceView for Database {
    fn inclusive_inherited_interfaces(&self, identifier: &Identifier) -> Vec<Identifier> {
        let mut chain = Vec::new();
        let mut current = identifier.clone();
        loop {
            if chain.contains(&current) {
                break;
            }
            chain.push(current.clone());
            let Some(interface) = self.body.interfaces.get(&current) else {
                break;
            };
            let Some(inherited) = interface.inherited() else {
                break;
            };
            current = self.refs.target(inherited).identifier().clone();
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition_parts::CompositionParts;
    use crate::extended_attribute::ExtendedAttributes;
    use crate::interface::InterfaceIr;
    use crate::reference::RefTarget;
    use widl_common::{Component, Location};

    fn parts(identifier: &str) -> CompositionParts {
        CompositionParts::new(
            Identifier::from(identifier),
            Component::new("core"),
            DebugInfo::new(Location::new("test.idl", Some(1), None)),
            ExtendedAttributes::default(),
        )
    }

    fn small_database() -> Database {
        let types = IdlTypeFactory::new();
        let mut refs = RefByIdFactory::new();

        let node_ref = refs.create(
            Identifier::from("Node"),
            DebugInfo::new(Location::new("element.idl", Some(1), None)),
        );
        refs.set_target(node_ref, RefTarget::Definition(Identifier::from("Node")));

        let mut body = DatabaseBody::default();
        body.interfaces.insert(
            Identifier::from("Node"),
            Interface::new(InterfaceIr::new(parts("Node"), false, false), &types),
        );
        let mut element_ir = InterfaceIr::new(parts("Element"), false, false);
        element_ir.inherited = Some(node_ref);
        body.interfaces.insert(
            Identifier::from("Element"),
            Interface::new(element_ir, &types),
        );
        Database::new(body, types, refs)
    }

    #[test]
    fn inherited_chain_is_inclusive() {
        let database = small_database();
        let chain = database.inclusive_inherited_interfaces(&Identifier::from("Element"));
        assert_eq!(
            chain,
            vec![Identifier::from("Element"), Identifier::from("Node")]
        );
    }

    #[test]
    fn find_spans_every_kind() {
        let database = small_database();
        let found = database.find(&Identifier::from("Node")).unwrap();
        assert_eq!(found.kind_name(), "interface");
        assert!(database.find(&Identifier::from("Missing")).is_none());
    }

    #[test]
    fn roundtrips_through_a_file() {
        let database = small_database();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web_idl_database.bin");

        database.write_to_file(&path).unwrap();
        let reloaded = Database::read_from_file(&path).unwrap();
        assert!(reloaded.interface(&Identifier::from("Element")).is_some());

        // A second write with identical contents leaves the file alone.
        let mtime = std::fs::metadata(&path).unwrap().modified().unwrap();
        database.write_to_file(&path).unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().modified().unwrap(),
            mtime
        );
    }
}
