//! Dictionaries.

use crate::composition_parts::CompositionParts;
use crate::member::DictionaryMember;
use crate::reference::RefId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

bitflags! {
    /// How a dictionary flows across the bindings boundary. Drives which
    /// conversion routines get generated for it.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DictionaryUsage: u8 {
        /// Appears in an argument position, so it converts from a script
        /// value.
        const INPUT = 1 << 0;
        /// Appears in a return-value position, so it converts to a script
        /// value.
        const OUTPUT = 1 << 1;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DictionaryIr {
    pub parts: CompositionParts,
    pub is_partial: bool,
    pub inherited: Option<RefId>,
    pub own_members: Vec<DictionaryMember>,
    pub usage: DictionaryUsage,
}

impl DictionaryIr {
    pub fn new(parts: CompositionParts, is_partial: bool) -> Self {
        DictionaryIr {
            parts,
            is_partial,
            inherited: None,
            own_members: Vec::new(),
            usage: DictionaryUsage::empty(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    pub fn for_each_member_parts_mut(&mut self, mut callback: impl FnMut(&mut CompositionParts)) {
        for member in &mut self.own_members {
            callback(&mut member.parts);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dictionary {
    ir: DictionaryIr,
}

impl Dictionary {
    /// Freezes the IR, sorting the own members into the lexicographical
    /// order required for dictionary conversion.
    pub fn new(mut ir: DictionaryIr) -> Self {
        assert!(!ir.is_partial);
        ir.own_members
            .sort_by(|a, b| a.parts.identifier.cmp(&b.parts.identifier));
        Dictionary { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    pub fn inherited(&self) -> Option<RefId> {
        self.ir.inherited
    }

    /// Own members, sorted by identifier. Inherited members come from
    /// walking the inherited dictionary chain in the database.
    pub fn own_members(&self) -> &[DictionaryMember] {
        &self.ir.own_members
    }

    pub fn usage(&self) -> DictionaryUsage {
        self.ir.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extended_attribute::ExtendedAttributes;
    use crate::idl_type::{IdlTypeFactory, TypeOptions};
    use widl_common::{Component, DebugInfo, Location};

    fn member(types: &mut IdlTypeFactory, identifier: &str) -> DictionaryMember {
        DictionaryMember {
            parts: CompositionParts::new(
                Identifier::from(identifier),
                Component::new("core"),
                DebugInfo::new(Location::new("test.idl", Some(1), None)),
                ExtendedAttributes::default(),
            ),
            idl_type: types.simple_type("long", TypeOptions::default()),
            default_value: None,
            is_required: false,
        }
    }

    #[test]
    fn own_members_are_sorted_on_freeze() {
        let mut types = IdlTypeFactory::new();
        let mut ir = DictionaryIr::new(
            CompositionParts::new(
                Identifier::from("Options"),
                Component::new("core"),
                DebugInfo::new(Location::new("test.idl", Some(1), None)),
                ExtendedAttributes::default(),
            ),
            false,
        );
        ir.own_members.push(member(&mut types, "zoom"));
        ir.own_members.push(member(&mut types, "alpha"));

        let dictionary = Dictionary::new(ir);
        let names: Vec<&str> = dictionary
            .own_members()
            .iter()
            .map(|member| member.parts.identifier.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zoom"]);
    }
}
