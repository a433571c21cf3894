//! Hints for the downstream bindings code generator.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGeneratorInfo {
    receiver_implemented_as: Option<String>,
    property_implemented_as: Option<String>,
    blink_headers: Option<Vec<String>>,
    for_testing: bool,
    defined_in_partial: bool,
    defined_in_mixin: bool,
    is_active_script_wrappable: bool,
    is_legacy_unenumerable_named_properties: bool,
}

impl CodeGeneratorInfo {
    pub fn new() -> Self {
        CodeGeneratorInfo::default()
    }

    /// The C++ class implementing the construct (`[ImplementedAs]` on the
    /// definition itself).
    pub fn receiver_implemented_as(&self) -> Option<&str> {
        self.receiver_implemented_as.as_deref()
    }

    pub fn set_receiver_implemented_as(&mut self, name: impl Into<String>) {
        self.receiver_implemented_as = Some(name.into());
    }

    /// The C++ member implementing the property (`[ImplementedAs]` on a
    /// member).
    pub fn property_implemented_as(&self) -> Option<&str> {
        self.property_implemented_as.as_deref()
    }

    pub fn set_property_implemented_as(&mut self, name: impl Into<String>) {
        self.property_implemented_as = Some(name.into());
    }

    pub fn blink_headers(&self) -> Option<&[String]> {
        self.blink_headers.as_deref()
    }

    pub fn set_blink_headers(&mut self, headers: Vec<String>) {
        self.blink_headers = Some(headers);
    }

    pub fn add_blink_headers(&mut self, headers: &[String]) {
        match &mut self.blink_headers {
            Some(existing) => existing.extend(headers.iter().cloned()),
            None => self.blink_headers = Some(headers.to_vec()),
        }
    }

    pub fn for_testing(&self) -> bool {
        self.for_testing
    }

    pub fn set_for_testing(&mut self, value: bool) {
        self.for_testing = value;
    }

    pub fn defined_in_partial(&self) -> bool {
        self.defined_in_partial
    }

    pub fn set_defined_in_partial(&mut self, value: bool) {
        self.defined_in_partial = value;
    }

    pub fn defined_in_mixin(&self) -> bool {
        self.defined_in_mixin
    }

    pub fn set_defined_in_mixin(&mut self, value: bool) {
        self.defined_in_mixin = value;
    }

    pub fn is_active_script_wrappable(&self) -> bool {
        self.is_active_script_wrappable
    }

    pub fn set_is_active_script_wrappable(&mut self, value: bool) {
        self.is_active_script_wrappable = value;
    }

    pub fn is_legacy_unenumerable_named_properties(&self) -> bool {
        self.is_legacy_unenumerable_named_properties
    }

    pub fn set_is_legacy_unenumerable_named_properties(&mut self, value: bool) {
        self.is_legacy_unenumerable_named_properties = value;
    }
}
