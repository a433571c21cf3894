//! Grouped union definition objects.
//!
//! Every union type written in source is its own type node; all nodes that
//! flatten to the same member-name set and nullability share one definition
//! object, which is what code generators emit a class for.

use crate::idl_type::TypeId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use widl_common::{Component, Identifier};

bitflags! {
    /// How a union flows across the bindings boundary.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UnionUsage: u8 {
        const INPUT = 1 << 0;
        const OUTPUT = 1 << 1;
    }
}

/// The grouping key of a union: the sorted, deduplicated names of its
/// flattened member types plus whether null is included.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionToken {
    pub member_names: Vec<String>,
    pub includes_null: bool,
}

impl UnionToken {
    /// The synthesized definition identifier, e.g. `DOMStringOrLongOrNull`.
    pub fn to_identifier(&self) -> Identifier {
        let mut name = self.member_names.join("Or");
        if self.includes_null {
            name.push_str("OrNull");
        }
        Identifier::from(name)
    }

    /// True when `other`'s member set, null included, is a strict subset
    /// of this token's.
    pub fn contains(&self, other: &UnionToken) -> bool {
        if other.includes_null && !self.includes_null {
            return false;
        }
        if !other
            .member_names
            .iter()
            .all(|name| self.member_names.contains(name))
        {
            return false;
        }
        self.member_names.len() > other.member_names.len()
            || (self.includes_null && !other.includes_null)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Union {
    identifier: Identifier,
    token: UnionToken,
    /// One of the grouped type nodes, for structural queries.
    representative: TypeId,
    /// Every union type node that grouped here.
    instances: Vec<TypeId>,
    /// Typedefs that named this union anywhere in source.
    typedef_names: Vec<Identifier>,
    /// Registered unions whose member set is a strict subset of this
    /// one's.
    sub_unions: Vec<Identifier>,
    usage: UnionUsage,
    components: Vec<Component>,
    for_testing: bool,
}

impl Union {
    pub fn new(token: UnionToken, representative: TypeId) -> Self {
        Union {
            identifier: token.to_identifier(),
            token,
            representative,
            instances: Vec::new(),
            typedef_names: Vec::new(),
            sub_unions: Vec::new(),
            usage: UnionUsage::empty(),
            components: Vec::new(),
            for_testing: true,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn token(&self) -> &UnionToken {
        &self.token
    }

    pub fn representative(&self) -> TypeId {
        self.representative
    }

    pub fn instances(&self) -> &[TypeId] {
        &self.instances
    }

    pub fn add_instance(&mut self, id: TypeId) {
        self.instances.push(id);
    }

    pub fn typedef_names(&self) -> &[Identifier] {
        &self.typedef_names
    }

    pub fn add_typedef_name(&mut self, identifier: Identifier) {
        if !self.typedef_names.contains(&identifier) {
            self.typedef_names.push(identifier);
        }
    }

    pub fn sub_unions(&self) -> &[Identifier] {
        &self.sub_unions
    }

    pub fn add_sub_union(&mut self, identifier: Identifier) {
        if !self.sub_unions.contains(&identifier) {
            self.sub_unions.push(identifier);
        }
    }

    pub fn usage(&self) -> UnionUsage {
        self.usage
    }

    pub fn add_usage(&mut self, usage: UnionUsage) {
        self.usage |= usage;
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn add_component(&mut self, component: Component) {
        if !self.components.contains(&component) {
            self.components.push(component);
        }
    }

    pub fn for_testing(&self) -> bool {
        self.for_testing
    }

    /// A grouped definition is for-testing only if every construct that
    /// mentions it is.
    pub fn merge_for_testing(&mut self, for_testing: bool) {
        self.for_testing &= for_testing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_identifier_appends_null_suffix() {
        let token = UnionToken {
            member_names: vec!["DOMString".to_string(), "Long".to_string()],
            includes_null: true,
        };
        assert_eq!(token.to_identifier().as_str(), "DOMStringOrLongOrNull");
    }

    #[test]
    fn token_containment_is_strict_and_null_aware() {
        let token = |names: &[&str], includes_null| UnionToken {
            member_names: names.iter().map(|name| name.to_string()).collect(),
            includes_null,
        };
        let wide = token(&["DOMString", "Double", "Long"], false);
        let narrow = token(&["DOMString", "Long"], false);
        assert!(wide.contains(&narrow));
        assert!(!narrow.contains(&wide));
        assert!(!wide.contains(&wide));
        // Null counts as a member.
        assert!(token(&["DOMString", "Long"], true).contains(&narrow));
        assert!(!wide.contains(&token(&["DOMString", "Long"], true)));
    }

    #[test]
    fn for_testing_is_the_conjunction_of_all_uses() {
        use crate::idl_type::{IdlTypeFactory, TypeOptions};

        let mut types = IdlTypeFactory::new();
        let double = types.simple_type("double", TypeOptions::default());
        let long = types.simple_type("long", TypeOptions::default());
        let representative = types.union_type(vec![double, long], TypeOptions::default());
        let token = UnionToken {
            member_names: vec!["Double".to_string(), "Long".to_string()],
            includes_null: false,
        };
        let mut union = Union::new(token, representative);
        union.merge_for_testing(true);
        assert!(union.for_testing());
        union.merge_for_testing(false);
        assert!(!union.for_testing());
    }
}
