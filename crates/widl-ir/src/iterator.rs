//! Synthesized iterator definitions.
//!
//! An interface with `iterable`, `maplike`, or `setlike` gets a sync
//! iterator definition named `SyncIterator_Host`; `async iterable` gets an
//! async iterator named `AsyncIterator_Host`. They behave like interfaces
//! with a fixed small set of operations.

use crate::composition_parts::CompositionParts;
use crate::function_like::OverloadGroupIr;
use crate::idl_type::TypeId;
use crate::member::Operation;
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IteratorIr {
    pub parts: CompositionParts,
    /// The interface whose iteration this iterator implements.
    pub host: Identifier,
    pub is_async: bool,
    pub key_type: Option<TypeId>,
    pub value_type: TypeId,
    pub operations: Vec<Operation>,
    pub operation_groups: Vec<OverloadGroupIr>,
}

impl IteratorIr {
    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }

    pub fn for_each_member_parts_mut(&mut self, mut callback: impl FnMut(&mut CompositionParts)) {
        for operation in &mut self.operations {
            callback(&mut operation.parts);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncIterator {
    ir: IteratorIr,
}

impl SyncIterator {
    pub fn new(ir: IteratorIr) -> Self {
        assert!(!ir.is_async);
        SyncIterator { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    pub fn host(&self) -> &Identifier {
        &self.ir.host
    }

    pub fn key_type(&self) -> Option<TypeId> {
        self.ir.key_type
    }

    pub fn value_type(&self) -> TypeId {
        self.ir.value_type
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ir.operations
    }

    pub fn operation_groups(&self) -> &[OverloadGroupIr] {
        &self.ir.operation_groups
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AsyncIterator {
    ir: IteratorIr,
}

impl AsyncIterator {
    pub fn new(ir: IteratorIr) -> Self {
        assert!(ir.is_async);
        AsyncIterator { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    pub fn host(&self) -> &Identifier {
        &self.ir.host
    }

    pub fn key_type(&self) -> Option<TypeId> {
        self.ir.key_type
    }

    pub fn value_type(&self) -> TypeId {
        self.ir.value_type
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ir.operations
    }

    pub fn operation_groups(&self) -> &[OverloadGroupIr] {
        &self.ir.operation_groups
    }
}
