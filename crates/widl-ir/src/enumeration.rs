//! Enumerations.

use crate::composition_parts::CompositionParts;
use serde::{Deserialize, Serialize};
use widl_common::Identifier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnumerationIr {
    pub parts: CompositionParts,
    pub values: Vec<String>,
}

impl EnumerationIr {
    pub fn new(parts: CompositionParts, values: Vec<String>) -> Self {
        EnumerationIr { parts, values }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.parts.identifier
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Enumeration {
    ir: EnumerationIr,
}

impl Enumeration {
    pub fn new(ir: EnumerationIr) -> Self {
        Enumeration { ir }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.ir.parts.identifier
    }

    pub fn parts(&self) -> &CompositionParts {
        &self.ir.parts
    }

    /// The string values, in declaration order.
    pub fn values(&self) -> &[String] {
        &self.ir.values
    }
}
