//! Callback functions.

use crate::composition_parts::CompositionParts;
use crate::function_like::{Argument, FunctionLike};
use crate::idl_type::TypeId;
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallbackFunctionIr {
    pub parts: CompositionParts,
    pub arguments: Vec<Argument>,
    pub return_type: TypeId,
}

impl CallbackFunctionIr {
    pub fn new(parts: CompositionParts, arguments: Vec<Argument>, return_type: TypeId) -> Self {
        CallbackFunctionIr {
            parts,
            arguments,
            return_type,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    pub fn legacy_treat_non_object_as_null(&self) -> bool {
        self.parts
            .extended_attributes
            .contains("LegacyTreatNonObjectAsNull")
    }
}

impl FunctionLike for CallbackFunctionIr {
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
        false
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallbackFunction {
    ir: CallbackFunctionIr,
}

impl CallbackFunction {
    pub fn new(ir: CallbackFunctionIr) -> Self {
        CallbackFunction { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.ir.arguments
    }

    pub fn return_type(&self) -> TypeId {
        self.ir.return_type
    }

    pub fn legacy_treat_non_object_as_null(&self) -> bool {
        self.ir.legacy_treat_non_object_as_null()
    }
}
