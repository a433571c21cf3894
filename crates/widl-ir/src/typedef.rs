//! Typedefs.

use crate::composition_parts::CompositionParts;
use crate::idl_type::TypeId;
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypedefIr {
    pub parts: CompositionParts,
    pub idl_type: TypeId,
}

impl TypedefIr {
    pub fn new(parts: CompositionParts, idl_type: TypeId) -> Self {
        TypedefIr { parts, idl_type }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Typedef {
    ir: TypedefIr,
}

impl Typedef {
    pub fn new(ir: TypedefIr) -> Self {
        Typedef { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    /// The aliased type.
    pub fn idl_type(&self) -> TypeId {
        self.ir.idl_type
    }
}
