//! Arguments, overload groups, and the effective-overload-set machinery.

use crate::exposure::Exposure;
use crate::extended_attribute::ExtendedAttributes;
use crate::idl_type::{IdlTypeFactory, InheritanceView, TypeId};
use crate::literal_constant::LiteralConstant;
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Optionality {
    Required,
    Optional,
    Variadic,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Argument {
    pub identifier: Identifier,
    pub idl_type: TypeId,
    pub optionality: Optionality,
    pub default_value: Option<LiteralConstant>,
    /// Position in the argument list, 0-based.
    pub index: usize,
}

/// Common shape of operations, constructors, and legacy factory functions.
pub trait FunctionLike {
    fn identifier(&self) -> &Identifier;
    fn arguments(&self) -> &[Argument];
    fn return_type(&self) -> TypeId;
    fn is_static(&self) -> bool;

    fn num_of_required_arguments(&self) -> usize {
        self.arguments()
            .iter()
            .filter(|argument| argument.optionality == Optionality::Required)
            .count()
    }

    /// The argument counts a call site may pass.
    fn possible_argument_counts(&self) -> Vec<usize> {
        let required = self.num_of_required_arguments();
        let total = self.arguments().len();
        let variadic = self
            .arguments()
            .last()
            .is_some_and(|argument| argument.optionality == Optionality::Variadic);
        let mut counts: Vec<usize> = (required..=total).collect();
        if variadic {
            // A variadic tail accepts any larger count; one extra entry is
            // enough to make two variadic arity sets overlap.
            counts.push(total + 1);
        }
        counts
    }
}

/// One group of overloaded function-likes sharing an identifier and
/// staticness. Members index into the owner definition's member list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OverloadGroupIr {
    pub identifier: Identifier,
    pub is_static: bool,
    pub members: Vec<usize>,
    /// Aggregated across members during extended-attribute propagation.
    pub extended_attributes: ExtendedAttributes,
    /// Aggregated across members during exposure propagation.
    pub exposure: Exposure,
}

impl OverloadGroupIr {
    pub fn new(identifier: Identifier, is_static: bool) -> Self {
        OverloadGroupIr {
            identifier,
            is_static,
            ..OverloadGroupIr::default()
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One row of an effective overload set: the group member it came from and
/// the type/optionality lists of one callable shape.
#[derive(Clone, Debug)]
pub struct OverloadSetEntry {
    pub member_index: usize,
    pub type_list: Vec<TypeId>,
    pub opt_list: Vec<Optionality>,
}

/// Computes the effective overload set of a group of function-likes.
///
/// For each member this yields the full argument tuple, variadic paddings
/// up to the considered argument count, and every truncation obtained by
/// dropping a suffix of optional or variadic arguments.
pub fn effective_overload_set(
    members: &[&dyn FunctionLike],
    argument_count: Option<usize>,
) -> Vec<OverloadSetEntry> {
    let maxarg = members
        .iter()
        .map(|member| member.arguments().len())
        .max()
        .unwrap_or(0);
    let considered = argument_count.unwrap_or(maxarg).max(maxarg);

    let mut set = Vec::new();
    for (member_index, member) in members.iter().enumerate() {
        let arguments = member.arguments();
        let types: Vec<TypeId> = arguments.iter().map(|argument| argument.idl_type).collect();
        let opts: Vec<Optionality> = arguments
            .iter()
            .map(|argument| argument.optionality)
            .collect();

        set.push(OverloadSetEntry {
            member_index,
            type_list: types.clone(),
            opt_list: opts.clone(),
        });

        if let Some(last) = arguments.last()
            && last.optionality == Optionality::Variadic
        {
            for length in arguments.len() + 1..=considered {
                let mut padded_types = types.clone();
                let mut padded_opts = opts.clone();
                padded_types.resize(length, last.idl_type);
                padded_opts.resize(length, Optionality::Variadic);
                set.push(OverloadSetEntry {
                    member_index,
                    type_list: padded_types,
                    opt_list: padded_opts,
                });
            }
        }

        for length in (0..arguments.len()).rev() {
            if opts[length] == Optionality::Required {
                break;
            }
            set.push(OverloadSetEntry {
                member_index,
                type_list: types[..length].to_vec(),
                opt_list: opts[..length].to_vec(),
            });
        }
    }
    set
}

/// The lowest argument index that tells the entries apart: every pair must
/// agree on all earlier types and be distinguishable there. The caller
/// restricts the entries to one type-list length first. `None` means no
/// index works and the overloading is invalid.
pub fn distinguishing_argument_index(
    factory: &IdlTypeFactory,
    inheritance: &dyn InheritanceView,
    entries: &[OverloadSetEntry],
) -> Option<usize> {
    if entries.len() < 2 {
        return None;
    }
    let length = entries[0].type_list.len();
    debug_assert!(entries.iter().all(|entry| entry.type_list.len() == length));

    'candidate: for index in 0..length {
        for (position, a) in entries.iter().enumerate() {
            for b in &entries[position + 1..] {
                if !factory.is_distinguishable_from(
                    a.type_list[index],
                    b.type_list[index],
                    inheritance,
                ) {
                    continue 'candidate;
                }
                for earlier in 0..index {
                    if !factory.types_eq(a.type_list[earlier], b.type_list[earlier]) {
                        continue 'candidate;
                    }
                }
            }
        }
        return Some(index);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl_type::TypeOptions;

    struct TestFn {
        identifier: Identifier,
        arguments: Vec<Argument>,
        return_type: TypeId,
    }

    impl FunctionLike for TestFn {
        fn identifier(&self) -> &Identifier {
            &self.identifier
        }

        fn arguments(&self) -> &[Argument] {
            &self.arguments
        }

        fn return_type(&self) -> TypeId {
            self.return_type
        }

        fn is_static(&self) -> bool {
            false
        }
    }

    struct NoInheritance;

    impl InheritanceView for NoInheritance {
        fn inclusive_inherited_interfaces(&self, identifier: &Identifier) -> Vec<Identifier> {
            vec![identifier.clone()]
        }
    }

    fn argument(idl_type: TypeId, optionality: Optionality, index: usize) -> Argument {
        Argument {
            identifier: Identifier::from("arg"),
            idl_type,
            optionality,
            default_value: None,
            index,
        }
    }

    #[test]
    fn optional_suffixes_are_truncated() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let undefined = factory.simple_type("undefined", TypeOptions::default());
        let f = TestFn {
            identifier: Identifier::from("f"),
            arguments: vec![
                argument(long, Optionality::Required, 0),
                argument(long, Optionality::Optional, 1),
            ],
            return_type: undefined,
        };
        let set = effective_overload_set(&[&f], None);
        let lengths: Vec<usize> = set.iter().map(|entry| entry.type_list.len()).collect();
        assert_eq!(lengths, vec![2, 1]);
    }

    #[test]
    fn variadic_pads_to_the_longest_overload() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let string = factory.simple_type("DOMString", TypeOptions::default());
        let variadic_long = factory.variadic_type(long, TypeOptions::default());
        let undefined = factory.simple_type("undefined", TypeOptions::default());

        let variadic = TestFn {
            identifier: Identifier::from("f"),
            arguments: vec![argument(variadic_long, Optionality::Variadic, 0)],
            return_type: undefined,
        };
        let fixed = TestFn {
            identifier: Identifier::from("f"),
            arguments: vec![
                argument(string, Optionality::Required, 0),
                argument(string, Optionality::Required, 1),
                argument(string, Optionality::Required, 2),
            ],
            return_type: undefined,
        };
        let set = effective_overload_set(&[&variadic, &fixed], None);
        let max_len = set.iter().map(|entry| entry.type_list.len()).max().unwrap();
        assert_eq!(max_len, 3);
        // The variadic member contributes lengths 0 through 3.
        let variadic_lengths: Vec<usize> = set
            .iter()
            .filter(|entry| entry.member_index == 0)
            .map(|entry| entry.type_list.len())
            .collect();
        assert!(variadic_lengths.contains(&0));
        assert!(variadic_lengths.contains(&3));
    }

    #[test]
    fn distinguishing_index_skips_identical_prefixes() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let long2 = factory.simple_type("long", TypeOptions::default());
        let string = factory.simple_type("DOMString", TypeOptions::default());
        let boolean = factory.simple_type("boolean", TypeOptions::default());

        let entries = vec![
            OverloadSetEntry {
                member_index: 0,
                type_list: vec![long, string],
                opt_list: vec![Optionality::Required, Optionality::Required],
            },
            OverloadSetEntry {
                member_index: 1,
                type_list: vec![long2, boolean],
                opt_list: vec![Optionality::Required, Optionality::Required],
            },
        ];
        assert_eq!(
            distinguishing_argument_index(&factory, &NoInheritance, &entries),
            Some(1)
        );
    }

    #[test]
    fn indistinguishable_overloads_have_no_index() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let double = factory.simple_type("double", TypeOptions::default());

        let entries = vec![
            OverloadSetEntry {
                member_index: 0,
                type_list: vec![long],
                opt_list: vec![Optionality::Required],
            },
            OverloadSetEntry {
                member_index: 1,
                type_list: vec![double],
                opt_list: vec![Optionality::Required],
            },
        ];
        assert_eq!(
            distinguishing_argument_index(&factory, &NoInheritance, &entries),
            None
        );
    }

    #[test]
    fn variadic_arity_sets_extend_past_the_written_arguments() {
        let mut factory = IdlTypeFactory::new();
        let long = factory.simple_type("long", TypeOptions::default());
        let variadic_long = factory.variadic_type(long, TypeOptions::default());
        let undefined = factory.simple_type("undefined", TypeOptions::default());
        let f = TestFn {
            identifier: Identifier::from("f"),
            arguments: vec![
                argument(long, Optionality::Required, 0),
                argument(variadic_long, Optionality::Variadic, 1),
            ],
            return_type: undefined,
        };
        assert_eq!(f.possible_argument_counts(), vec![1, 2, 3]);
        assert_eq!(f.num_of_required_arguments(), 1);
    }
}
