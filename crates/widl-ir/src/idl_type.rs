//! The IDL type arena.
//!
//! Every type written in IDL source becomes one immutable node in the
//! `IdlTypeFactory` arena, addressed by a `TypeId`. Nodes never alias:
//! `sequence<long>` in two signatures is two nodes. Structural questions
//! (equality, naming, distinguishability) are factory methods so that the
//! nodes themselves stay plain data and serialize with the database.

use crate::extended_attribute::ExtendedAttributes;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::ops::ControlFlow;
use widl_common::{DebugInfo, Identifier};

/// Handle to one type node inside an `IdlTypeFactory`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

/// What kind of user-defined construct a resolved reference points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefinitionCategory {
    Interface,
    CallbackInterface,
    CallbackFunction { legacy_treat_non_object_as_null: bool },
    Dictionary,
    Enumeration,
    Namespace,
    AsyncIterator,
    SyncIterator,
    Stub,
}

/// The resolved side of a reference-kind type node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedReference {
    /// The identifier named a user-defined definition (or a stub standing
    /// in for one).
    Definition {
        identifier: Identifier,
        category: DefinitionCategory,
    },
    /// The identifier named a typedef; `aliased` is the typedef'd type.
    Typedef { identifier: Identifier, aliased: TypeId },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum IdlTypeKind {
    /// A built-in type named by keywords, e.g. `unsigned long long`.
    Simple { name: String },
    /// A type spelled as an identifier. Resolution happens once, at the
    /// end of compilation.
    Reference {
        identifier: Identifier,
        resolution: Option<ResolvedReference>,
    },
    Sequence {
        element: TypeId,
    },
    FrozenArray {
        element: TypeId,
    },
    /// `definition` is filled in when observable array definition objects
    /// are grouped, late in compilation.
    ObservableArray {
        element: TypeId,
        definition: Option<Identifier>,
    },
    Variadic {
        element: TypeId,
    },
    Record {
        key: TypeId,
        value: TypeId,
    },
    Promise {
        result: TypeId,
    },
    /// `definition` is filled in when union definition objects are
    /// grouped, late in compilation.
    Union {
        members: Vec<TypeId>,
        definition: Option<Identifier>,
    },
    Nullable {
        inner: TypeId,
    },
}

/// Per-node metadata shared by every creation method.
#[derive(Clone, Debug, Default)]
pub struct TypeOptions {
    pub is_optional: bool,
    pub extended_attributes: ExtendedAttributes,
    pub debug_info: Option<DebugInfo>,
}

/// Which wrappers `unwrap_with` strips. All `false` by default; `unwrap`
/// strips everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnwrapOptions {
    pub nullable: bool,
    pub typedef: bool,
    pub variadic: bool,
}

impl UnwrapOptions {
    pub fn all() -> Self {
        UnwrapOptions {
            nullable: true,
            typedef: true,
            variadic: true,
        }
    }
}

/// Interface inheritance, as far as distinguishability needs it.
///
/// Implemented by the database; tests supply table-driven fakes.
pub trait InheritanceView {
    /// The interface itself plus every ancestor, by identifier.
    fn inclusive_inherited_interfaces(&self, identifier: &Identifier) -> Vec<Identifier>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct IdlTypeNode {
    kind: IdlTypeKind,
    is_optional: bool,
    extended_attributes: ExtendedAttributes,
    debug_info: Option<DebugInfo>,
}

/// Creates and owns every type node.
///
/// The factory freezes on the first `for_each`/`for_each_reference` call.
/// Resolution and definition-object backlinks are still written after the
/// freeze; new nodes are not.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdlTypeFactory {
    nodes: Vec<IdlTypeNode>,
    frozen: Cell<bool>,
}

const SIMPLE_NUMERIC: &[&str] = &[
    "byte",
    "octet",
    "short",
    "unsigned short",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
    "float",
    "unrestricted float",
    "double",
    "unrestricted double",
];

const SIMPLE_STRING: &[&str] = &["DOMString", "ByteString", "USVString"];

const BUFFER_SOURCE: &[&str] = &[
    "ArrayBuffer",
    "SharedArrayBuffer",
    "DataView",
    "Int8Array",
    "Int16Array",
    "Int32Array",
    "Uint8Array",
    "Uint16Array",
    "Uint32Array",
    "Uint8ClampedArray",
    "BigInt64Array",
    "BigUint64Array",
    "Float16Array",
    "Float32Array",
    "Float64Array",
];

/// Distinguishability categories of the Web IDL overload rules.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Category {
    Undefined,
    Boolean,
    Numeric,
    Bigint,
    String,
    Object,
    Symbol,
    /// Interfaces, buffer sources, iterator objects, and stubs. Carries
    /// the identifier for the inheritance-disjointness check.
    InterfaceLike(Identifier),
    CallbackFunction { legacy_treat_non_object_as_null: bool },
    DictionaryLike,
    SequenceLike,
    /// `any` and promise types, distinguishable from nothing.
    Wildcard,
}

impl IdlTypeFactory {
    pub fn new() -> Self {
        IdlTypeFactory::default()
    }

    fn push(&mut self, kind: IdlTypeKind, options: TypeOptions) -> TypeId {
        assert!(
            !self.frozen.get(),
            "type creation after the factory was frozen"
        );
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(IdlTypeNode {
            kind,
            is_optional: options.is_optional,
            extended_attributes: options.extended_attributes,
            debug_info: options.debug_info,
        });
        id
    }

    pub fn simple_type(&mut self, name: impl Into<String>, options: TypeOptions) -> TypeId {
        self.push(IdlTypeKind::Simple { name: name.into() }, options)
    }

    pub fn reference_type(&mut self, identifier: Identifier, options: TypeOptions) -> TypeId {
        self.push(
            IdlTypeKind::Reference {
                identifier,
                resolution: None,
            },
            options,
        )
    }

    pub fn sequence_type(&mut self, element: TypeId, options: TypeOptions) -> TypeId {
        self.push(IdlTypeKind::Sequence { element }, options)
    }

    pub fn frozen_array_type(&mut self, element: TypeId, options: TypeOptions) -> TypeId {
        self.push(IdlTypeKind::FrozenArray { element }, options)
    }

    pub fn observable_array_type(&mut self, element: TypeId, options: TypeOptions) -> TypeId {
        self.push(
            IdlTypeKind::ObservableArray {
                element,
                definition: None,
            },
            options,
        )
    }

    pub fn variadic_type(&mut self, element: TypeId, options: TypeOptions) -> TypeId {
        self.push(IdlTypeKind::Variadic { element }, options)
    }

    pub fn record_type(&mut self, key: TypeId, value: TypeId, options: TypeOptions) -> TypeId {
        self.push(IdlTypeKind::Record { key, value }, options)
    }

    pub fn promise_type(&mut self, result: TypeId, options: TypeOptions) -> TypeId {
        self.push(IdlTypeKind::Promise { result }, options)
    }

    pub fn union_type(&mut self, members: Vec<TypeId>, options: TypeOptions) -> TypeId {
        assert!(members.len() >= 2, "a union type needs at least two members");
        self.push(
            IdlTypeKind::Union {
                members,
                definition: None,
            },
            options,
        )
    }

    pub fn nullable_type(&mut self, inner: TypeId, options: TypeOptions) -> TypeId {
        self.push(IdlTypeKind::Nullable { inner }, options)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: TypeId) -> &IdlTypeKind {
        &self.nodes[id.0 as usize].kind
    }

    pub fn is_optional(&self, id: TypeId) -> bool {
        self.nodes[id.0 as usize].is_optional
    }

    pub fn extended_attributes(&self, id: TypeId) -> &ExtendedAttributes {
        &self.nodes[id.0 as usize].extended_attributes
    }

    pub fn debug_info(&self, id: TypeId) -> Option<&DebugInfo> {
        self.nodes[id.0 as usize].debug_info.as_ref()
    }

    /// Visits every type node ever created. Freezes creation.
    pub fn for_each(&self, mut callback: impl FnMut(TypeId)) {
        self.frozen.set(true);
        for index in 0..self.nodes.len() {
            callback(TypeId(index as u32));
        }
    }

    /// Visits every reference-kind node. Freezes creation.
    pub fn for_each_reference(&self, mut callback: impl FnMut(TypeId)) {
        self.frozen.set(true);
        for index in 0..self.nodes.len() {
            if matches!(self.nodes[index].kind, IdlTypeKind::Reference { .. }) {
                callback(TypeId(index as u32));
            }
        }
    }

    /// Binds a reference node to what its identifier named. Runs after the
    /// freeze.
    pub fn set_reference_target(&mut self, id: TypeId, resolution: ResolvedReference) {
        match &mut self.nodes[id.0 as usize].kind {
            IdlTypeKind::Reference {
                identifier,
                resolution: slot,
            } => {
                assert!(
                    slot.is_none(),
                    "reference type {identifier} resolved twice"
                );
                *slot = Some(resolution);
            }
            _ => panic!("set_reference_target on a non-reference type"),
        }
    }

    /// Backlinks a union node to its grouped definition object.
    pub fn set_union_definition(&mut self, id: TypeId, definition: Identifier) {
        match &mut self.nodes[id.0 as usize].kind {
            IdlTypeKind::Union {
                definition: slot, ..
            } => *slot = Some(definition),
            _ => panic!("set_union_definition on a non-union type"),
        }
    }

    /// Backlinks an observable array node to its grouped definition object.
    pub fn set_observable_array_definition(&mut self, id: TypeId, definition: Identifier) {
        match &mut self.nodes[id.0 as usize].kind {
            IdlTypeKind::ObservableArray {
                definition: slot, ..
            } => *slot = Some(definition),
            _ => panic!("set_observable_array_definition on a non-observable-array type"),
        }
    }

    /// Strips nullable, typedef, and variadic wrappers.
    pub fn unwrap(&self, id: TypeId) -> TypeId {
        self.unwrap_with(id, UnwrapOptions::all())
    }

    /// Strips exactly the wrappers the options name.
    pub fn unwrap_with(&self, id: TypeId, options: UnwrapOptions) -> TypeId {
        let mut current = id;
        loop {
            match self.kind(current) {
                IdlTypeKind::Nullable { inner } if options.nullable => current = *inner,
                IdlTypeKind::Variadic { element } if options.variadic => current = *element,
                IdlTypeKind::Reference {
                    resolution: Some(ResolvedReference::Typedef { aliased, .. }),
                    ..
                } if options.typedef => current = *aliased,
                _ => return current,
            }
        }
    }

    /// The built-in name after unwrapping, if this is a simple type.
    pub fn simple_name(&self, id: TypeId) -> Option<&str> {
        match self.kind(self.unwrap(id)) {
            IdlTypeKind::Simple { name } => Some(name),
            _ => None,
        }
    }

    /// True if the type is, or contains through unions and typedefs, a
    /// nullable type. Sequence and record elements are not considered.
    pub fn does_include_nullable_type(&self, id: TypeId) -> bool {
        match self.kind(id) {
            IdlTypeKind::Nullable { .. } => true,
            IdlTypeKind::Reference {
                resolution: Some(ResolvedReference::Typedef { aliased, .. }),
                ..
            } => self.does_include_nullable_type(*aliased),
            IdlTypeKind::Union { members, .. } => members
                .iter()
                .any(|member| self.does_include_nullable_type(*member)),
            _ => false,
        }
    }

    /// Depth-first visit of the type and everything it is composed of,
    /// typedef targets included. `Break` stops the whole traversal.
    pub fn apply_to_all_composing_elements(
        &self,
        id: TypeId,
        callback: &mut impl FnMut(TypeId) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        callback(id)?;
        match self.kind(id) {
            IdlTypeKind::Simple { .. } => ControlFlow::Continue(()),
            IdlTypeKind::Reference { resolution, .. } => match resolution {
                Some(ResolvedReference::Typedef { aliased, .. }) => {
                    self.apply_to_all_composing_elements(*aliased, callback)
                }
                _ => ControlFlow::Continue(()),
            },
            IdlTypeKind::Sequence { element }
            | IdlTypeKind::FrozenArray { element }
            | IdlTypeKind::ObservableArray { element, .. }
            | IdlTypeKind::Variadic { element } => {
                self.apply_to_all_composing_elements(*element, callback)
            }
            IdlTypeKind::Record { key, value } => {
                self.apply_to_all_composing_elements(*key, callback)?;
                self.apply_to_all_composing_elements(*value, callback)
            }
            IdlTypeKind::Promise { result } => {
                self.apply_to_all_composing_elements(*result, callback)
            }
            IdlTypeKind::Union { members, .. } => {
                for member in members {
                    self.apply_to_all_composing_elements(*member, callback)?;
                }
                ControlFlow::Continue(())
            }
            IdlTypeKind::Nullable { inner } => {
                self.apply_to_all_composing_elements(*inner, callback)
            }
        }
    }

    /// Structural equality. Ignores optionality, extended attributes, and
    /// debug info; references compare by identifier; union member order is
    /// irrelevant.
    pub fn types_eq(&self, a: TypeId, b: TypeId) -> bool {
        match (self.kind(a), self.kind(b)) {
            (IdlTypeKind::Simple { name: na }, IdlTypeKind::Simple { name: nb }) => na == nb,
            (
                IdlTypeKind::Reference { identifier: ia, .. },
                IdlTypeKind::Reference { identifier: ib, .. },
            ) => ia == ib,
            (IdlTypeKind::Sequence { element: ea }, IdlTypeKind::Sequence { element: eb })
            | (IdlTypeKind::FrozenArray { element: ea }, IdlTypeKind::FrozenArray { element: eb })
            | (
                IdlTypeKind::ObservableArray { element: ea, .. },
                IdlTypeKind::ObservableArray { element: eb, .. },
            )
            | (IdlTypeKind::Variadic { element: ea }, IdlTypeKind::Variadic { element: eb }) => {
                self.types_eq(*ea, *eb)
            }
            (
                IdlTypeKind::Record { key: ka, value: va },
                IdlTypeKind::Record { key: kb, value: vb },
            ) => self.types_eq(*ka, *kb) && self.types_eq(*va, *vb),
            (IdlTypeKind::Promise { result: ra }, IdlTypeKind::Promise { result: rb }) => {
                self.types_eq(*ra, *rb)
            }
            (
                IdlTypeKind::Union { members: ma, .. },
                IdlTypeKind::Union { members: mb, .. },
            ) => {
                ma.len() == mb.len()
                    && ma.iter().all(|member_a| {
                        mb.iter().any(|member_b| self.types_eq(*member_a, *member_b))
                    })
            }
            (IdlTypeKind::Nullable { inner: ia }, IdlTypeKind::Nullable { inner: ib }) => {
                self.types_eq(*ia, *ib)
            }
            _ => false,
        }
    }

    /// The UpperCamel name used in generated-code identifiers, e.g.
    /// `sequence<unsigned long>?` is `UnsignedLongSequenceOrNull`.
    pub fn type_name(&self, id: TypeId) -> String {
        match self.kind(id) {
            IdlTypeKind::Simple { name } => upper_camel(name),
            IdlTypeKind::Reference {
                identifier,
                resolution,
            } => match resolution {
                Some(ResolvedReference::Typedef { aliased, .. }) => self.type_name(*aliased),
                _ => identifier.to_string(),
            },
            IdlTypeKind::Sequence { element } => format!("{}Sequence", self.type_name(*element)),
            IdlTypeKind::FrozenArray { element } => format!("{}Array", self.type_name(*element)),
            IdlTypeKind::ObservableArray { element, .. } => {
                format!("{}ObservableArray", self.type_name(*element))
            }
            IdlTypeKind::Variadic { element } => format!("{}Variadic", self.type_name(*element)),
            IdlTypeKind::Record { key, value } => {
                format!("{}{}Record", self.type_name(*key), self.type_name(*value))
            }
            IdlTypeKind::Promise { result } => format!("{}Promise", self.type_name(*result)),
            IdlTypeKind::Union { .. } => {
                let (names, includes_null) = self.flattened_union_member_names(id);
                let mut name = names.join("Or");
                if includes_null {
                    name.push_str("OrNull");
                }
                name
            }
            IdlTypeKind::Nullable { inner } => format!("{}OrNull", self.type_name(*inner)),
        }
    }

    /// Flattens a union through nested unions, typedefs, and nullable
    /// wrappers. Returns the leaf member types and whether null was seen.
    pub fn flattened_union_members(&self, id: TypeId) -> (Vec<TypeId>, bool) {
        let mut members = Vec::new();
        let mut includes_null = false;
        self.flatten_into(id, &mut members, &mut includes_null);
        (members, includes_null)
    }

    fn flatten_into(&self, id: TypeId, members: &mut Vec<TypeId>, includes_null: &mut bool) {
        match self.kind(id) {
            IdlTypeKind::Nullable { inner } => {
                *includes_null = true;
                self.flatten_into(*inner, members, includes_null);
            }
            IdlTypeKind::Reference {
                resolution: Some(ResolvedReference::Typedef { aliased, .. }),
                ..
            } => self.flatten_into(*aliased, members, includes_null),
            IdlTypeKind::Union {
                members: inner_members,
                ..
            } => {
                for member in inner_members {
                    self.flatten_into(*member, members, includes_null);
                }
            }
            _ => members.push(id),
        }
    }

    /// Sorted, deduplicated names of the flattened union members, plus
    /// whether the union includes null. The basis of union grouping.
    pub fn flattened_union_member_names(&self, id: TypeId) -> (Vec<String>, bool) {
        let (members, includes_null) = self.flattened_union_members(id);
        let mut names: Vec<String> = members
            .iter()
            .map(|member| self.type_name(*member))
            .collect();
        names.sort();
        names.dedup();
        (names, includes_null)
    }

    /// The Web IDL distinguishability relation on types, used to pick the
    /// distinguishing argument of an overload group.
    pub fn is_distinguishable_from(
        &self,
        a: TypeId,
        b: TypeId,
        inheritance: &dyn InheritanceView,
    ) -> bool {
        let (a_members, a_null) = self.flattened_union_members(a);
        let (b_members, b_null) = self.flattened_union_members(b);

        let a_categories: Vec<Category> =
            a_members.iter().map(|id| self.category(*id)).collect();
        let b_categories: Vec<Category> =
            b_members.iter().map(|id| self.category(*id)).collect();

        // An included nullable collides with the other side's null and with
        // its dictionary-likes, which also convert from null and undefined.
        let a_dict = a_categories
            .iter()
            .any(|category| *category == Category::DictionaryLike);
        let b_dict = b_categories
            .iter()
            .any(|category| *category == Category::DictionaryLike);
        if (a_null && (b_null || b_dict)) || (b_null && a_dict) {
            return false;
        }

        a_categories.iter().all(|ca| {
            b_categories
                .iter()
                .all(|cb| distinguishable_categories(ca, cb, inheritance))
        })
    }

    fn category(&self, id: TypeId) -> Category {
        match self.kind(id) {
            IdlTypeKind::Simple { name } => match name.as_str() {
                "undefined" | "void" => Category::Undefined,
                "boolean" => Category::Boolean,
                "bigint" => Category::Bigint,
                "object" => Category::Object,
                "symbol" => Category::Symbol,
                "any" => Category::Wildcard,
                name if SIMPLE_NUMERIC.contains(&name) => Category::Numeric,
                name if SIMPLE_STRING.contains(&name) => Category::String,
                name if BUFFER_SOURCE.contains(&name) => {
                    Category::InterfaceLike(Identifier::from(name))
                }
                name => panic!("no distinguishability category for simple type {name}"),
            },
            IdlTypeKind::Reference {
                identifier,
                resolution,
            } => match resolution {
                Some(ResolvedReference::Definition {
                    identifier,
                    category,
                }) => match category {
                    DefinitionCategory::Interface
                    | DefinitionCategory::AsyncIterator
                    | DefinitionCategory::SyncIterator
                    | DefinitionCategory::Stub => Category::InterfaceLike(identifier.clone()),
                    DefinitionCategory::CallbackInterface | DefinitionCategory::Dictionary => {
                        Category::DictionaryLike
                    }
                    DefinitionCategory::CallbackFunction {
                        legacy_treat_non_object_as_null,
                    } => Category::CallbackFunction {
                        legacy_treat_non_object_as_null: *legacy_treat_non_object_as_null,
                    },
                    DefinitionCategory::Enumeration => Category::String,
                    DefinitionCategory::Namespace => {
                        panic!("namespace {identifier} used as a type")
                    }
                },
                _ => panic!("reference to {identifier} categorized before resolution"),
            },
            IdlTypeKind::Sequence { .. }
            | IdlTypeKind::FrozenArray { .. }
            | IdlTypeKind::ObservableArray { .. } => Category::SequenceLike,
            IdlTypeKind::Record { .. } => Category::DictionaryLike,
            IdlTypeKind::Promise { .. } => Category::Wildcard,
            IdlTypeKind::Variadic { element } => self.category(*element),
            IdlTypeKind::Nullable { .. } | IdlTypeKind::Union { .. } => {
                panic!("nullable and union types are flattened before categorization")
            }
        }
    }
}

fn distinguishable_categories(
    a: &Category,
    b: &Category,
    inheritance: &dyn InheritanceView,
) -> bool {
    use Category::*;

    if matches!(a, Wildcard) || matches!(b, Wildcard) {
        return false;
    }

    match (a, b) {
        (InterfaceLike(ia), InterfaceLike(ib)) => {
            if ia == ib {
                return false;
            }
            let set_a = inheritance.inclusive_inherited_interfaces(ia);
            let set_b = inheritance.inclusive_inherited_interfaces(ib);
            set_a.iter().all(|ancestor| !set_b.contains(ancestor))
        }
        (Numeric, Bigint) | (Bigint, Numeric) => false,
        (Object, InterfaceLike(_))
        | (InterfaceLike(_), Object)
        | (Object, CallbackFunction { .. })
        | (CallbackFunction { .. }, Object)
        | (Object, DictionaryLike)
        | (DictionaryLike, Object)
        | (Object, SequenceLike)
        | (SequenceLike, Object) => false,
        (Undefined, DictionaryLike) | (DictionaryLike, Undefined) => false,
        (
            CallbackFunction {
                legacy_treat_non_object_as_null,
            },
            DictionaryLike,
        )
        | (
            DictionaryLike,
            CallbackFunction {
                legacy_treat_non_object_as_null,
            },
        ) => !legacy_treat_non_object_as_null,
        (CallbackFunction { .. }, SequenceLike) | (SequenceLike, CallbackFunction { .. }) => false,
        (DictionaryLike, SequenceLike) | (SequenceLike, DictionaryLike) => false,
        _ => a != b,
    }
}

/// `unsigned long long` to `UnsignedLongLong`; names already starting with
/// an upper-case letter keep their spelling.
fn upper_camel(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoInheritance;

    impl InheritanceView for NoInheritance {
        fn inclusive_inherited_interfaces(&self, identifier: &Identifier) -> Vec<Identifier> {
            vec![identifier.clone()]
        }
    }

    struct TableInheritance(Vec<(&'static str, Vec<&'static str>)>);

    impl InheritanceView for TableInheritance {
        fn inclusive_inherited_interfaces(&self, identifier: &Identifier) -> Vec<Identifier> {
            self.0
                .iter()
                .find(|(name, _)| *name == identifier.as_str())
                .map(|(_, set)| set.iter().map(|name| Identifier::from(*name)).collect())
                .unwrap_or_else(|| vec![identifier.clone()])
        }
    }

    fn resolved_interface(factory: &mut IdlTypeFactory, name: &str) -> TypeId {
        let id = factory.reference_type(Identifier::from(name), TypeOptions::default());
        factory.set_reference_target(
            id,
            ResolvedReference::Definition {
                identifier: Identifier::from(name),
                category: DefinitionCategory::Interface,
            },
        );
        id
    }

    #[test]
    fn type_name_composes_wrappers() {
        let mut factory = IdlTypeFactory::new();
        let ulong = factory.simple_type("unsigned long", TypeOptions::default());
        let seq = factory.sequence_type(ulong, TypeOptions::default());
        let nullable = factory.nullable_type(seq, TypeOptions::default());
        assert_eq!(factory.type_name(nullable), "UnsignedLongSequenceOrNull");

        let key = factory.simple_type("DOMString", TypeOptions::default());
        let record = factory.record_type(key, ulong, TypeOptions::default());
        assert_eq!(factory.type_name(record), "DOMStringUnsignedLongRecord");
    }

    #[test]
    fn union_name_sorts_flattened_members() {
        let mut factory = IdlTypeFactory::new();
        let double = factory.simple_type("double", TypeOptions::default());
        let string = factory.simple_type("DOMString", TypeOptions::default());
        let nullable_string = factory.nullable_type(string, TypeOptions::default());
        let union = factory.union_type(vec![nullable_string, double], TypeOptions::default());
        assert_eq!(factory.type_name(union), "DOMStringOrDoubleOrNull");
        assert!(factory.does_include_nullable_type(union));
    }

    #[test]
    fn unwrap_strips_selected_wrappers() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let nullable = factory.nullable_type(long, TypeOptions::default());
        let variadic = factory.variadic_type(nullable, TypeOptions::default());

        assert_eq!(factory.unwrap(variadic), long);
        let only_variadic = factory.unwrap_with(
            variadic,
            UnwrapOptions {
                variadic: true,
                ..UnwrapOptions::default()
            },
        );
        assert_eq!(only_variadic, nullable);
    }

    #[test]
    fn typedef_resolution_is_transparent() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let alias = factory.reference_type(Identifier::from("MyLong"), TypeOptions::default());
        factory.set_reference_target(
            alias,
            ResolvedReference::Typedef {
                identifier: Identifier::from("MyLong"),
                aliased: long,
            },
        );
        assert_eq!(factory.type_name(alias), "Long");
        assert_eq!(factory.unwrap(alias), long);
    }

    #[test]
    fn numeric_and_bigint_are_not_distinguishable() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let bigint = factory.simple_type("bigint", TypeOptions::default());
        let boolean = factory.simple_type("boolean", TypeOptions::default());
        assert!(!factory.is_distinguishable_from(long, bigint, &NoInheritance));
        assert!(factory.is_distinguishable_from(long, boolean, &NoInheritance));
    }

    #[test]
    fn related_interfaces_are_not_distinguishable() {
        let mut factory = IdlTypeFactory::new();
        let node = resolved_interface(&mut factory, "Node");
        let element = resolved_interface(&mut factory, "Element");
        let blob = resolved_interface(&mut factory, "Blob");
        let view = TableInheritance(vec![
            ("Node", vec!["Node"]),
            ("Element", vec!["Element", "Node"]),
            ("Blob", vec!["Blob"]),
        ]);
        assert!(!factory.is_distinguishable_from(node, element, &view));
        assert!(factory.is_distinguishable_from(node, blob, &view));
    }

    #[test]
    fn any_and_promise_match_everything() {
        let mut factory = IdlTypeFactory::new();
        let any = factory.simple_type("any", TypeOptions::default());
        let long = factory.simple_type("long", TypeOptions::default());
        let undefined = factory.simple_type("undefined", TypeOptions::default());
        let promise = factory.promise_type(undefined, TypeOptions::default());
        assert!(!factory.is_distinguishable_from(any, long, &NoInheritance));
        assert!(!factory.is_distinguishable_from(promise, long, &NoInheritance));
    }

    #[test]
    fn nullable_collides_with_nullable_and_dictionary_like() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let string = factory.simple_type("DOMString", TypeOptions::default());
        let nullable_long = factory.nullable_type(long, TypeOptions::default());
        let nullable_string = factory.nullable_type(string, TypeOptions::default());
        let key = factory.simple_type("DOMString", TypeOptions::default());
        let record = factory.record_type(key, long, TypeOptions::default());

        assert!(!factory.is_distinguishable_from(nullable_long, nullable_string, &NoInheritance));
        assert!(!factory.is_distinguishable_from(nullable_long, record, &NoInheritance));
        assert!(factory.is_distinguishable_from(nullable_long, string, &NoInheritance));
    }

    #[test]
    fn union_members_must_all_be_distinguishable() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let string = factory.simple_type("DOMString", TypeOptions::default());
        let boolean = factory.simple_type("boolean", TypeOptions::default());
        let union = factory.union_type(vec![long, string], TypeOptions::default());
        assert!(factory.is_distinguishable_from(union, boolean, &NoInheritance));
        assert!(!factory.is_distinguishable_from(union, string, &NoInheritance));
    }

    #[test]
    fn structural_equality_ignores_union_order() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let string = factory.simple_type("DOMString", TypeOptions::default());
        let long2 = factory.simple_type("long", TypeOptions::default());
        let string2 = factory.simple_type("DOMString", TypeOptions::default());
        let a = factory.union_type(vec![long, string], TypeOptions::default());
        let b = factory.union_type(vec![string2, long2], TypeOptions::default());
        assert!(factory.types_eq(a, b));
        assert!(!factory.types_eq(a, long));
    }

    #[test]
    fn creation_after_freeze_panics() {
        let mut factory = IdlTypeFactory::new();
        factory.simple_type("long", TypeOptions::default());
        factory.for_each(|_| {});
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            factory.simple_type("boolean", TypeOptions::default())
        }));
        assert!(result.is_err());
    }
}
