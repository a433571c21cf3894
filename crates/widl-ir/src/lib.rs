//! The widl data model.
//!
//! Everything between the raw AST and the finished database lives here:
//! the extended-attribute multimap, per-construct exposure and code
//! generator metadata, the `IdlType` arena and its factory, deferred
//! references, the mutable IRs of every user-defined construct with their
//! frozen public forms, the phased `IrMap`, and the final `Database`.

pub mod composition_parts;
pub use composition_parts::CompositionParts;

pub mod extended_attribute;
pub use extended_attribute::{ExtendedAttribute, ExtendedAttributes, SyntacticForm};

pub mod exposure;
pub use exposure::{Exposure, GlobalNameAndFeature, SecureContextMode};

pub mod code_generator_info;
pub use code_generator_info::CodeGeneratorInfo;

pub mod idl_type;
pub use idl_type::{
    DefinitionCategory, IdlTypeFactory, IdlTypeKind, InheritanceView, ResolvedReference, TypeId,
    TypeOptions, UnwrapOptions,
};

pub mod reference;
pub use reference::{RefByIdFactory, RefId, RefTarget};

pub mod literal_constant;
pub use literal_constant::{LiteralConstant, LiteralValue};

pub mod function_like;
pub use function_like::{
    Argument, FunctionLike, Optionality, OverloadGroupIr, OverloadSetEntry,
    distinguishing_argument_index, effective_overload_set,
};

pub mod member;
pub use member::{Attribute, Constant, Constructor, DictionaryMember, Operation};

pub mod interface;
pub use interface::{
    AsyncIterable, IndexedAndNamedProperties, Interface, InterfaceIr, Iterable, LegacyWindowAlias,
    Maplike, PropertyAccessor, Setlike, Stringifier,
};

pub mod namespace;
pub use namespace::{Namespace, NamespaceIr};

pub mod dictionary;
pub use dictionary::{Dictionary, DictionaryIr, DictionaryUsage};

pub mod enumeration;
pub use enumeration::{Enumeration, EnumerationIr};

pub mod typedef;
pub use typedef::{Typedef, TypedefIr};

pub mod callback_function;
pub use callback_function::{CallbackFunction, CallbackFunctionIr};

pub mod callback_interface;
pub use callback_interface::{CallbackInterface, CallbackInterfaceIr};

pub mod includes;
pub use includes::IncludesIr;

pub mod iterator;
pub use iterator::{AsyncIterator, IteratorIr, SyncIterator};

pub mod union;
pub use union::{Union, UnionToken, UnionUsage};

pub mod observable_array;
pub use observable_array::ObservableArray;

pub mod ir_map;
pub use ir_map::{DefinitionIr, IrKind, IrMap};

pub mod database;
pub use database::{Database, DatabaseBody, DefinitionRef, StubUserDefinedType};
