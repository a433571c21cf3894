//! Members of interfaces, namespaces, callback interfaces, and
//! dictionaries.
//!
//! Members stay mutable IR throughout compilation; the definition they
//! belong to freezes them when its own IR freezes, so there are no
//! separate public wrapper types at this level.

use crate::composition_parts::CompositionParts;
use crate::function_like::{Argument, FunctionLike};
use crate::idl_type::TypeId;
use crate::literal_constant::LiteralConstant;
use crate::reference::RefId;
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attribute {
    pub parts: CompositionParts,
    pub idl_type: TypeId,
    pub is_static: bool,
    pub is_readonly: bool,
    /// `inherit` qualifier: the getter is taken from the inherited
    /// interface's attribute of the same identifier.
    pub does_inherit_getter: bool,
    /// Set when the attribute was merged in from a mixin.
    pub owner_mixin: Option<RefId>,
}

impl Attribute {
    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constant {
    pub parts: CompositionParts,
    pub idl_type: TypeId,
    pub value: LiteralConstant,
}

impl Constant {
    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operation {
    pub parts: CompositionParts,
    pub arguments: Vec<Argument>,
    pub return_type: TypeId,
    pub is_static: bool,
    pub is_getter: bool,
    pub is_setter: bool,
    pub is_deleter: bool,
    pub is_stringifier: bool,
    /// Synthesized `@@iterator` or value-iteration operation.
    pub is_iterator: bool,
    /// Synthesized `@@asyncIterator` operation.
    pub is_async_iterator: bool,
    /// Maplike `set`/`delete`/`clear` and setlike `add`/`delete`/`clear`
    /// exist only when no member of the same identifier is declared.
    pub is_optionally_defined: bool,
    /// For `stringifier attribute` shorthand, the attribute the
    /// stringifier reads.
    pub stringifier_attribute: Option<Identifier>,
    /// Set when the operation was merged in from a mixin.
    pub owner_mixin: Option<RefId>,
}

impl Operation {
    pub fn is_special_operation(&self) -> bool {
        self.is_getter || self.is_setter || self.is_deleter
    }

    /// Special operations and stringifiers may be unnamed; unnamed
    /// operations never join an overload group.
    pub fn is_unnamed(&self) -> bool {
        self.parts.identifier.is_empty()
    }
}

impl FunctionLike for Operation {
    fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    fn return_type(&self) -> TypeId {
        self.return_type
    }

    fn is_static(&self) -> bool {
        self.is_static
    }
}

/// `constructor(...)` or a `[LegacyFactoryFunction=Name(...)]` entry. The
/// identifier is empty for constructors and the factory-function name for
/// legacy factory functions; the return type is the owner interface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constructor {
    pub parts: CompositionParts,
    pub arguments: Vec<Argument>,
    pub return_type: TypeId,
}

impl FunctionLike for Constructor {
    fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    fn return_type(&self) -> TypeId {
        self.return_type
    }

    fn is_static(&self) -> bool {
        true
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DictionaryMember {
    pub parts: CompositionParts,
    pub idl_type: TypeId,
    pub default_value: Option<LiteralConstant>,
    pub is_required: bool,
}

impl DictionaryMember {
    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extended_attribute::ExtendedAttributes;
    use crate::function_like::Optionality;
    use crate::idl_type::{IdlTypeFactory, TypeOptions};
    use widl_common::{Component, DebugInfo, Location};

    fn parts(identifier: &str) -> CompositionParts {
        CompositionParts::new(
            Identifier::from(identifier),
            Component::new("core"),
            DebugInfo::new(Location::new("test.idl", Some(1), None)),
            ExtendedAttributes::default(),
        )
    }

    #[test]
    fn unnamed_special_operations_are_detected() {
        let mut factory = IdlTypeFactory::new();
        let string = factory.simple_type("DOMString", TypeOptions::default());
        let ulong = factory.simple_type("unsigned long", TypeOptions::default());
        let getter = Operation {
            parts: parts(""),
            arguments: vec![Argument {
                identifier: Identifier::from("index"),
                idl_type: ulong,
                optionality: Optionality::Required,
                default_value: None,
                index: 0,
            }],
            return_type: string,
            is_static: false,
            is_getter: true,
            is_setter: false,
            is_deleter: false,
            is_stringifier: false,
            is_iterator: false,
            is_async_iterator: false,
            is_optionally_defined: false,
            stringifier_attribute: None,
            owner_mixin: None,
        };
        assert!(getter.is_special_operation());
        assert!(getter.is_unnamed());
        assert_eq!(getter.num_of_required_arguments(), 1);
    }
}
