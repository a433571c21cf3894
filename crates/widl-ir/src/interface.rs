//! Interfaces, interface mixins, and their declaration members.

use crate::composition_parts::CompositionParts;
use crate::exposure::Exposure;
use crate::extended_attribute::ExtendedAttributes;
use crate::function_like::{Argument, OverloadGroupIr};
use crate::idl_type::{IdlTypeFactory, TypeId};
use crate::member::{Attribute, Constant, Constructor, Operation};
use crate::reference::RefId;
use serde::{Deserialize, Serialize};
use widl_common::{DebugInfo, Identifier};

/// `iterable<V>` or `iterable<K, V>` with its synthesized operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Iterable {
    pub key_type: Option<TypeId>,
    pub value_type: TypeId,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
    pub extended_attributes: ExtendedAttributes,
    pub exposure: Exposure,
    pub debug_info: DebugInfo,
}

impl Iterable {
    /// Pair iteration (`iterable<K, V>`) synthesizes the full iterator
    /// protocol; value iteration reuses the indexed-property machinery.
    pub fn is_pair_iterator(&self) -> bool {
        self.key_type.is_some()
    }
}

/// `async iterable<V>` or `async iterable<K, V>`, optionally with
/// constructor-style arguments.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AsyncIterable {
    pub key_type: Option<TypeId>,
    pub value_type: TypeId,
    pub arguments: Vec<Argument>,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
    pub extended_attributes: ExtendedAttributes,
    pub exposure: Exposure,
    pub debug_info: DebugInfo,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Maplike {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub is_readonly: bool,
    pub attributes: Vec<Attribute>,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
    pub extended_attributes: ExtendedAttributes,
    pub exposure: Exposure,
    pub debug_info: DebugInfo,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Setlike {
    pub value_type: TypeId,
    pub is_readonly: bool,
    pub attributes: Vec<Attribute>,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
    pub extended_attributes: ExtendedAttributes,
    pub exposure: Exposure,
    pub debug_info: DebugInfo,
}

/// A `[LegacyWindowAlias=Name]` entry, attached to the `Window` interface
/// and pointing back at the aliased construct.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LegacyWindowAlias {
    pub identifier: Identifier,
    pub original: RefId,
    pub extended_attributes: ExtendedAttributes,
    pub exposure: Exposure,
}

/// A property handler, naming the interface that declares it and the
/// index of the operation within that interface's operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAccessor {
    pub interface: Identifier,
    pub operation: usize,
}

/// Indexed and named property handlers, resolved from the special
/// operations by the type of their first argument. A handler declared on
/// an ancestor falls back through the inheritance chain and carries the
/// declaring interface's identifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexedAndNamedProperties {
    pub indexed_getter: Option<PropertyAccessor>,
    pub indexed_setter: Option<PropertyAccessor>,
    pub named_getter: Option<PropertyAccessor>,
    pub named_setter: Option<PropertyAccessor>,
    pub named_deleter: Option<PropertyAccessor>,
    /// False when `[LegacyUnenumerableNamedProperties]` appears anywhere
    /// on the inheritance chain or the named getter carries
    /// `[NotEnumerable]`.
    pub named_property_enumerable: bool,
}

impl Default for IndexedAndNamedProperties {
    fn default() -> Self {
        IndexedAndNamedProperties {
            indexed_getter: None,
            indexed_setter: None,
            named_getter: None,
            named_setter: None,
            named_deleter: None,
            named_property_enumerable: true,
        }
    }
}

impl IndexedAndNamedProperties {
    pub fn has_indexed_properties(&self) -> bool {
        self.indexed_getter.is_some() || self.indexed_setter.is_some()
    }

    pub fn has_named_properties(&self) -> bool {
        self.named_getter.is_some() || self.named_setter.is_some() || self.named_deleter.is_some()
    }

    pub fn is_named_property_enumerable(&self) -> bool {
        self.named_property_enumerable
    }

    pub fn is_empty(&self) -> bool {
        !self.has_indexed_properties() && !self.has_named_properties()
    }
}

/// The stringifier of an interface: the operation that implements it and,
/// for the `stringifier attribute` shorthand, the attribute it reads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stringifier {
    pub operation: usize,
    pub attribute: Option<Identifier>,
}

/// Mutable interface IR. Partials and mixins are separate IRs until the
/// merge phases fold them into the non-partial, non-mixin one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterfaceIr {
    pub parts: CompositionParts,
    pub is_partial: bool,
    pub is_mixin: bool,
    pub inherited: Option<RefId>,
    pub attributes: Vec<Attribute>,
    pub constants: Vec<Constant>,
    pub constructors: Vec<Constructor>,
    pub constructor_groups: Vec<OverloadGroupIr>,
    pub legacy_factory_functions: Vec<Constructor>,
    pub legacy_factory_function_groups: Vec<OverloadGroupIr>,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
    /// Constructs this global exposes, when the interface is a global.
    pub exposed_constructs: Vec<RefId>,
    pub legacy_window_aliases: Vec<LegacyWindowAlias>,
    pub iterable: Option<Iterable>,
    pub async_iterable: Option<AsyncIterable>,
    pub maplike: Option<Maplike>,
    pub setlike: Option<Setlike>,
    /// Synthesized iterator definitions, created once iteration
    /// declarations are known.
    pub sync_iterator: Option<RefId>,
    pub async_iterator: Option<RefId>,
    /// Every interface that inherits this one, directly or not.
    pub deriveds: Vec<RefId>,
    pub direct_subclasses: Vec<Identifier>,
    /// Class tags for fast downcasts; assigned per inheritance tree.
    pub tag: Option<u32>,
    pub max_subclass_tag: Option<u32>,
}

impl InterfaceIr {
    pub fn new(parts: CompositionParts, is_partial: bool, is_mixin: bool) -> Self {
        InterfaceIr {
            parts,
            is_partial,
            is_mixin,
            inherited: None,
            attributes: Vec::new(),
            constants: Vec::new(),
            constructors: Vec::new(),
            constructor_groups: Vec::new(),
            legacy_factory_functions: Vec::new(),
            legacy_factory_function_groups: Vec::new(),
            operations: Vec::new(),
            operation_groups: Vec::new(),
            exposed_constructs: Vec::new(),
            legacy_window_aliases: Vec::new(),
            iterable: None,
            async_iterable: None,
            maplike: None,
            setlike: None,
            sync_iterator: None,
            async_iterator: None,
            deriveds: Vec::new(),
            direct_subclasses: Vec::new(),
            tag: None,
            max_subclass_tag: None,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    /// Visits the parts of every member, the declaration-synthesized
    /// operations included. The propagation phases run through this.
    pub fn for_each_member_parts_mut(&mut self, mut callback: impl FnMut(&mut CompositionParts)) {
        for attribute in &mut self.attributes {
            callback(&mut attribute.parts);
        }
        for constant in &mut self.constants {
            callback(&mut constant.parts);
        }
        for constructor in &mut self.constructors {
            callback(&mut constructor.parts);
        }
        for constructor in &mut self.legacy_factory_functions {
            callback(&mut constructor.parts);
        }
        for operation in &mut self.operations {
            callback(&mut operation.parts);
        }
        if let Some(iterable) = &mut self.iterable {
            for operation in &mut iterable.operations {
                callback(&mut operation.parts);
            }
        }
        if let Some(async_iterable) = &mut self.async_iterable {
            for operation in &mut async_iterable.operations {
                callback(&mut operation.parts);
            }
        }
        if let Some(maplike) = &mut self.maplike {
            for attribute in &mut maplike.attributes {
                callback(&mut attribute.parts);
            }
            for operation in &mut maplike.operations {
                callback(&mut operation.parts);
            }
        }
        if let Some(setlike) = &mut self.setlike {
            for attribute in &mut setlike.attributes {
                callback(&mut attribute.parts);
            }
            for operation in &mut setlike.operations {
                callback(&mut operation.parts);
            }
        }
    }

    /// True if any member of the given identifier is declared directly,
    /// which suppresses optionally-defined maplike and setlike operations.
    pub fn has_member_named(&self, identifier: &str) -> bool {
        self.attributes
            .iter()
            .any(|attribute| attribute.parts.identifier.as_str() == identifier)
            || self
                .constants
                .iter()
                .any(|constant| constant.parts.identifier.as_str() == identifier)
            || self
                .operations
                .iter()
                .any(|operation| operation.parts.identifier.as_str() == identifier)
    }
}

/// A fully compiled interface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interface {
    ir: InterfaceIr,
    indexed_and_named_properties: Option<IndexedAndNamedProperties>,
    stringifier: Option<Stringifier>,
}

impl Interface {
    /// Freezes the IR, resolving special-operation bookkeeping that only
    /// makes sense once all members are merged in. Mixins get a public
    /// form too so that member ownership stays resolvable.
    pub fn new(mut ir: InterfaceIr, types: &IdlTypeFactory) -> Self {
        assert!(!ir.is_partial);

        let owner = ir.parts.identifier.clone();
        let mut properties = IndexedAndNamedProperties::default();
        let mut stringifier = None;
        for (index, operation) in ir.operations.iter_mut().enumerate() {
            if operation.is_stringifier {
                if operation.parts.identifier.is_empty() {
                    operation.parts.identifier = Identifier::from("toString");
                }
                stringifier = Some(Stringifier {
                    operation: index,
                    attribute: operation.stringifier_attribute.clone(),
                });
            }
            if !operation.is_special_operation() {
                continue;
            }
            let indexed = operation
                .arguments
                .first()
                .and_then(|argument| types.simple_name(argument.idl_type))
                .is_some_and(|name| name == "unsigned long");
            let accessor = PropertyAccessor {
                interface: owner.clone(),
                operation: index,
            };
            match (operation.is_getter, operation.is_setter, operation.is_deleter, indexed) {
                (true, _, _, true) => properties.indexed_getter = Some(accessor),
                (_, true, _, true) => properties.indexed_setter = Some(accessor),
                (true, _, _, false) => properties.named_getter = Some(accessor),
                (_, true, _, false) => properties.named_setter = Some(accessor),
                (_, _, true, _) => properties.named_deleter = Some(accessor),
                _ => {}
            }
        }

        Interface {
            ir,
            indexed_and_named_properties: (!properties.is_empty()).then_some(properties),
            stringifier,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    pub fn components(&self) -> &[widl_common::Component] {
        &self.ir.parts.components
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.ir.parts.debug_info
    }

    pub fn extended_attributes(&self) -> &ExtendedAttributes {
        &self.ir.parts.extended_attributes
    }

    pub fn exposure(&self) -> &Exposure {
        &self.ir.parts.exposure
    }

    pub fn code_generator_info(&self) -> &crate::code_generator_info::CodeGeneratorInfo {
        &self.ir.parts.code_generator_info
    }

    pub fn inherited(&self) -> Option<RefId> {
        self.ir.inherited
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.ir.attributes
    }

    pub fn constants(&self) -> &[Constant] {
        &self.ir.constants
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.ir.constructors
    }

    pub fn constructor_groups(&self) -> &[OverloadGroupIr] {
        &self.ir.constructor_groups
    }

    pub fn legacy_factory_functions(&self) -> &[Constructor] {
        &self.ir.legacy_factory_functions
    }

    pub fn legacy_factory_function_groups(&self) -> &[OverloadGroupIr] {
        &self.ir.legacy_factory_function_groups
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ir.operations
    }

    pub fn operation_groups(&self) -> &[OverloadGroupIr] {
        &self.ir.operation_groups
    }

    pub fn exposed_constructs(&self) -> &[RefId] {
        &self.ir.exposed_constructs
    }

    pub fn legacy_window_aliases(&self) -> &[LegacyWindowAlias] {
        &self.ir.legacy_window_aliases
    }

    pub fn iterable(&self) -> Option<&Iterable> {
        self.ir.iterable.as_ref()
    }

    pub fn async_iterable(&self) -> Option<&AsyncIterable> {
        self.ir.async_iterable.as_ref()
    }

    pub fn maplike(&self) -> Option<&Maplike> {
        self.ir.maplike.as_ref()
    }

    pub fn setlike(&self) -> Option<&Setlike> {
        self.ir.setlike.as_ref()
    }

    pub fn sync_iterator(&self) -> Option<RefId> {
        self.ir.sync_iterator
    }

    pub fn async_iterator(&self) -> Option<RefId> {
        self.ir.async_iterator
    }

    pub fn deriveds(&self) -> &[RefId] {
        &self.ir.deriveds
    }

    pub fn direct_subclasses(&self) -> &[Identifier] {
        &self.ir.direct_subclasses
    }

    pub fn tag(&self) -> Option<u32> {
        self.ir.tag
    }

    pub fn max_subclass_tag(&self) -> Option<u32> {
        self.ir.max_subclass_tag
    }

    pub fn indexed_and_named_properties(&self) -> Option<&IndexedAndNamedProperties> {
        self.indexed_and_named_properties.as_ref()
    }

    /// Replaces the own-operation classification with handlers resolved
    /// through the inheritance chain.
    pub fn set_indexed_and_named_properties(
        &mut self,
        properties: Option<IndexedAndNamedProperties>,
    ) {
        self.indexed_and_named_properties = properties;
    }

    pub fn stringifier(&self) -> Option<&Stringifier> {
        self.stringifier.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function_like::Optionality;
    use crate::idl_type::TypeOptions;
    use widl_common::{Component, Location};

    fn parts(identifier: &str) -> CompositionParts {
        CompositionParts::new(
            Identifier::from(identifier),
            Component::new("core"),
            DebugInfo::new(Location::new("test.idl", Some(1), None)),
            ExtendedAttributes::default(),
        )
    }

    fn special_operation(
        types: &mut IdlTypeFactory,
        argument_type: &str,
        is_getter: bool,
        is_setter: bool,
        is_deleter: bool,
    ) -> Operation {
        let arg = types.simple_type(argument_type, TypeOptions::default());
        let ret = types.simple_type("any", TypeOptions::default());
        Operation {
            parts: parts(""),
            arguments: vec![Argument {
                identifier: Identifier::from("index"),
                idl_type: arg,
                optionality: Optionality::Required,
                default_value: None,
                index: 0,
            }],
            return_type: ret,
            is_static: false,
            is_getter,
            is_setter,
            is_deleter,
            is_stringifier: false,
            is_iterator: false,
            is_async_iterator: false,
            is_optionally_defined: false,
            stringifier_attribute: None,
            owner_mixin: None,
        }
    }

    #[test]
    fn special_operations_split_by_first_argument_type() {
        let mut types = IdlTypeFactory::new();
        let mut ir = InterfaceIr::new(parts("Store"), false, false);
        ir.operations
            .push(special_operation(&mut types, "unsigned long", true, false, false));
        ir.operations
            .push(special_operation(&mut types, "DOMString", true, false, false));
        ir.operations
            .push(special_operation(&mut types, "DOMString", false, false, true));

        let interface = Interface::new(ir, &types);
        let properties = interface.indexed_and_named_properties().unwrap();
        let own = |operation| {
            Some(PropertyAccessor {
                interface: Identifier::from("Store"),
                operation,
            })
        };
        assert_eq!(properties.indexed_getter, own(0));
        assert_eq!(properties.named_getter, own(1));
        assert_eq!(properties.named_deleter, own(2));
        assert!(properties.has_indexed_properties());
        assert!(properties.is_named_property_enumerable());
    }

    #[test]
    fn unnamed_stringifier_becomes_to_string() {
        let mut types = IdlTypeFactory::new();
        let string = types.simple_type("DOMString", TypeOptions::default());
        let mut ir = InterfaceIr::new(parts("Thing"), false, false);
        ir.operations.push(Operation {
            parts: parts(""),
            arguments: Vec::new(),
            return_type: string,
            is_static: false,
            is_getter: false,
            is_setter: false,
            is_deleter: false,
            is_stringifier: true,
            is_iterator: false,
            is_async_iterator: false,
            is_optionally_defined: false,
            stringifier_attribute: None,
            owner_mixin: None,
        });

        let interface = Interface::new(ir, &types);
        let stringifier = interface.stringifier().unwrap();
        assert_eq!(
            interface.operations()[stringifier.operation]
                .parts
                .identifier
                .as_str(),
            "toString"
        );
    }
}
