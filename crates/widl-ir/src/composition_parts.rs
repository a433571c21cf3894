//! The parts every IR fragment is composed of.

use crate::code_generator_info::CodeGeneratorInfo;
use crate::exposure::Exposure;
use crate::extended_attribute::ExtendedAttributes;
use serde::{Deserialize, Serialize};
use widl_common::{Component, DebugInfo, Identifier};

/// Identifier, provenance, and metadata shared by every definition and
/// member IR. An empty identifier marks an unnamed construct.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionParts {
    pub identifier: Identifier,
    pub components: Vec<Component>,
    pub debug_info: DebugInfo,
    pub extended_attributes: ExtendedAttributes,
    pub exposure: Exposure,
    pub code_generator_info: CodeGeneratorInfo,
}

impl CompositionParts {
    pub fn new(
        identifier: Identifier,
        component: Component,
        debug_info: DebugInfo,
        extended_attributes: ExtendedAttributes,
    ) -> Self {
        CompositionParts {
            identifier,
            components: vec![component],
            debug_info,
            extended_attributes,
            exposure: Exposure::new(),
            code_generator_info: CodeGeneratorInfo::new(),
        }
    }

    /// Unions in another fragment's components, preserving order and
    /// dropping duplicates.
    pub fn add_components(&mut self, components: &[Component]) {
        for component in components {
            if !self.components.contains(component) {
                self.components.push(component.clone());
            }
        }
    }
}
