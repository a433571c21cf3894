//! Grouped observable array definition objects, one per distinct element
//! type.

use crate::idl_type::TypeId;
use serde::{Deserialize, Serialize};
use widl_common::{Component, Identifier};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObservableArray {
    identifier: Identifier,
    element_type: TypeId,
    instances: Vec<TypeId>,
    components: Vec<Component>,
    for_testing: bool,
}

impl ObservableArray {
    pub fn new(element_type_name: &str, element_type: TypeId) -> Self {
        ObservableArray {
            identifier: Identifier::from(format!("ObservableArray_{element_type_name}")),
            element_type,
            instances: Vec::new(),
            components: Vec::new(),
            for_testing: true,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn element_type(&self) -> TypeId {
        self.element_type
    }

    pub fn instances(&self) -> &[TypeId] {
        &self.instances
    }

    pub fn add_instance(&mut self, id: TypeId) {
        self.instances.push(id);
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

    pub fn merge_for_testing(&mut self, for_testing: bool) {
        self.for_testing &= for_testing;
    }
}
