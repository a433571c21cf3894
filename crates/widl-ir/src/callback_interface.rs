//! Callback interfaces. They carry constants and regular operations but
//! no attributes, constructors, or special operations.

use crate::composition_parts::CompositionParts;
use crate::function_like::OverloadGroupIr;
use crate::member::{Constant, Operation};
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallbackInterfaceIr {
    pub parts: CompositionParts,
    pub constants: Vec<Constant>,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
}

impl CallbackInterfaceIr {
    pub fn new(parts: CompositionParts) -> Self {
        CallbackInterfaceIr {
            parts,
            constants: Vec::new(),
            operations: Vec::new(),
            operation_groups: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    pub fn for_each_member_parts_mut(&mut self, mut callback: impl FnMut(&mut CompositionParts)) {
        for constant in &mut self.constants {
            callback(&mut constant.parts);
        }
        for operation in &mut self.operations {
            callback(&mut operation.parts);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallbackInterface {
    ir: CallbackInterfaceIr,
}

impl CallbackInterface {
    pub fn new(ir: CallbackInterfaceIr) -> Self {
        CallbackInterface { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    pub fn constants(&self) -> &[Constant] {
        &self.ir.constants
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ir.operations
    }

    pub fn operation_groups(&self) -> &[OverloadGroupIr] {
        &self.ir.operation_groups
    }
}
