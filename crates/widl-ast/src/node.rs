//! Generic AST nodes produced by the external IDL parser.
//!
//! Nodes are deliberately untyped: a node exposes its class, an optional
//! name, ordered children, and a property bag. The IR builder dispatches on
//! `class()` and reads annotations like `PARTIAL` or `NULLABLE` through the
//! typed property accessors.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A property value attached to an AST node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    String(String),
    /// Identifier lists, e.g. the `VALUE` of an `[Exposed=(A,B)]` entry.
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(values) => Some(values),
            _ => None,
        }
    }
}

/// One node of a parsed IDL tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<AstNode>,
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    properties: FxHashMap<String, PropertyValue>,
}

impl AstNode {
    pub fn new(class: impl Into<String>) -> Self {
        AstNode {
            class: class.into(),
            ..AstNode::default()
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// The node's name. Unnamed nodes report an empty string, matching the
    /// external parser's `GetName` contract.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// True iff the property exists and is neither `false` nor absent.
    pub fn bool_property(&self, key: &str) -> bool {
        match self.properties.get(key) {
            Some(PropertyValue::Bool(value)) => *value,
            Some(_) => true,
            None => false,
        }
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|value| value.as_str())
    }

    pub fn integer_property(&self, key: &str) -> Option<i64> {
        self.properties.get(key).and_then(|value| value.as_integer())
    }

    // Builder-style setters, used by tests and by tools that synthesize
    // ASTs without the external parser.

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_bool(self, key: impl Into<String>) -> Self {
        self.with_property(key, PropertyValue::Bool(true))
    }

    pub fn with_str(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_property(key, PropertyValue::String(value.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_accessors_distinguish_types() {
        let node = AstNode::new("Interface")
            .with_name("Window")
            .with_bool("PARTIAL")
            .with_str("FILENAME", "window.idl")
            .with_property("LINENO", PropertyValue::Integer(42));

        assert_eq!(node.class(), "Interface");
        assert_eq!(node.name(), "Window");
        assert!(node.bool_property("PARTIAL"));
        assert!(!node.bool_property("MIXIN"));
        assert_eq!(node.str_property("FILENAME"), Some("window.idl"));
        assert_eq!(node.integer_property("LINENO"), Some(42));
    }

    #[test]
    fn json_round_trip_preserves_children() {
        let node = AstNode::new("File").with_child(AstNode::new("Interface").with_name("A"));
        let text = serde_json::to_string(&node).unwrap();
        let back: AstNode = serde_json::from_str(&text).unwrap();
        assert_eq!(back, node);
    }
}
