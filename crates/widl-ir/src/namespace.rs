//! Namespaces. All namespace members behave as static.

use crate::composition_parts::CompositionParts;
use crate::function_like::OverloadGroupIr;
use crate::member::{Attribute, Constant, Operation};
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamespaceIr {
    pub parts: CompositionParts,
    pub is_partial: bool,
    pub attributes: Vec<Attribute>,
    pub constants: Vec<Constant>,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
}

impl NamespaceIr {
    pub fn new(parts: CompositionParts, is_partial: bool) -> Self {
        NamespaceIr {
            parts,
            is_partial,
            attributes: Vec::new(),
            constants: Vec::new(),
            operations: Vec::new(),
            operation_groups: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    pub fn for_each_member_parts_mut(&mut self, mut callback: impl FnMut(&mut CompositionParts)) {
        for attribute in &mut self.attributes {
            callback(&mut attribute.parts);
        }
        for constant in &mut self.constants {
            callback(&mut constant.parts);
        }
        for operation in &mut self.operations {
            callback(&mut operation.parts);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Namespace {
    ir: NamespaceIr,
}

impl Namespace {
    pub fn new(ir: NamespaceIr) -> Self {
        assert!(!ir.is_partial);
        Namespace { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.ir.attributes
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
