//! Extended attributes.
//!
//! An extended attribute takes one of five syntactic shapes:
//!
//! ```text
//! [Key]                      no arguments
//! [Key=Value]                single identifier
//! [Key=(V1, V2)]             identifier list
//! [Key(T1 a1, T2 a2)]        argument list
//! [Key=Name(T1 a1, T2 a2)]   named argument list
//! ```
//!
//! `ExtendedAttributes` is an ordered multimap over them: keys are kept
//! sorted, and attributes sharing a key are ordered by syntactic form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The shape of one extended attribute; doubles as the stable within-key
/// sort key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SyntacticForm {
    NoArgs,
    Ident,
    IdentList,
    ArgList,
    NamedArgList,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedAttribute {
    key: String,
    form: SyntacticForm,
    values: Vec<String>,
    /// Pairs of (type name, argument name) for the argument-list forms.
    arguments: Vec<(String, String)>,
    name: Option<String>,
}

impl ExtendedAttribute {
    pub fn no_args(key: impl Into<String>) -> Self {
        ExtendedAttribute {
            key: key.into(),
            form: SyntacticForm::NoArgs,
            values: Vec::new(),
            arguments: Vec::new(),
            name: None,
        }
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        ExtendedAttribute {
            key: key.into(),
            form: SyntacticForm::Ident,
            values: vec![value.into()],
            arguments: Vec::new(),
            name: None,
        }
    }

    pub fn with_values(key: impl Into<String>, values: Vec<String>) -> Self {
        ExtendedAttribute {
            key: key.into(),
            form: SyntacticForm::IdentList,
            values,
            arguments: Vec::new(),
            name: None,
        }
    }

    pub fn with_arguments(key: impl Into<String>, arguments: Vec<(String, String)>) -> Self {
        ExtendedAttribute {
            key: key.into(),
            form: SyntacticForm::ArgList,
            values: Vec::new(),
            arguments,
            name: None,
        }
    }

    pub fn with_named_arguments(
        key: impl Into<String>,
        name: impl Into<String>,
        arguments: Vec<(String, String)>,
    ) -> Self {
        ExtendedAttribute {
            key: key.into(),
            form: SyntacticForm::NamedArgList,
            values: Vec::new(),
            arguments,
            name: Some(name.into()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn syntactic_form(&self) -> SyntacticForm {
        self.form
    }

    /// The single value of the `[Key=Value]` form.
    pub fn value(&self) -> Option<&str> {
        match self.form {
            SyntacticForm::Ident => self.values.first().map(|value| value.as_str()),
            _ => None,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn has_values(&self) -> bool {
        matches!(self.form, SyntacticForm::Ident | SyntacticForm::IdentList)
    }

    pub fn arguments(&self) -> &[(String, String)] {
        &self.arguments
    }

    pub fn has_arguments(&self) -> bool {
        matches!(
            self.form,
            SyntacticForm::ArgList | SyntacticForm::NamedArgList
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Ordered multimap of extended attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedAttributes {
    attributes: IndexMap<String, Vec<ExtendedAttribute>>,
}

impl ExtendedAttributes {
    pub fn new(attributes: Vec<ExtendedAttribute>) -> Self {
        let mut this = ExtendedAttributes::default();
        for attribute in attributes {
            this.append(attribute);
        }
        this
    }

    pub fn append(&mut self, attribute: ExtendedAttribute) {
        let slot = self.attributes.entry(attribute.key.clone()).or_default();
        slot.push(attribute);
        slot.sort_by_key(|attribute| attribute.form);
        self.attributes.sort_keys();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// The single attribute for `key`. It is a structural error in the
    /// source IDL for the key to appear more than once.
    pub fn get(&self, key: &str) -> Option<&ExtendedAttribute> {
        let list = self.attributes.get(key)?;
        assert!(
            list.len() == 1,
            "multiple [{key}] extended attributes where one is required"
        );
        list.first()
    }

    pub fn get_list_of(&self, key: &str) -> &[ExtendedAttribute] {
        self.attributes
            .get(key)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// The single value of the unique `[Key=Value]` attribute for `key`.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|attribute| attribute.value())
    }

    /// All values of the unique attribute for `key` (either form of the
    /// value-bearing shapes).
    pub fn values_of(&self, key: &str) -> &[String] {
        self.get(key)
            .map(|attribute| attribute.values())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtendedAttribute> {
        self.attributes.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.attributes.values().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_iterate_sorted_by_key_then_form() {
        let attrs = ExtendedAttributes::new(vec![
            ExtendedAttribute::with_value("RuntimeEnabled", "FeatureA"),
            ExtendedAttribute::no_args("Affects"),
            ExtendedAttribute::with_values("Exposed", vec!["Window".into(), "Worker".into()]),
            ExtendedAttribute::no_args("Exposed"),
        ]);
        let keys: Vec<_> = attrs.iter().map(|a| (a.key(), a.syntactic_form())).collect();
        assert_eq!(
            keys,
            vec![
                ("Affects", SyntacticForm::NoArgs),
                ("Exposed", SyntacticForm::NoArgs),
                ("Exposed", SyntacticForm::IdentList),
                ("RuntimeEnabled", SyntacticForm::Ident),
            ]
        );
    }

    #[test]
    fn value_of_reads_the_single_ident_form() {
        let attrs = ExtendedAttributes::new(vec![ExtendedAttribute::with_value(
            "ImplementedAs",
            "HTMLAudioElement",
        )]);
        assert_eq!(attrs.value_of("ImplementedAs"), Some("HTMLAudioElement"));
        assert_eq!(attrs.value_of("Absent"), None);
    }

    #[test]
    #[should_panic(expected = "multiple [Exposed]")]
    fn get_rejects_repeated_keys() {
        let attrs = ExtendedAttributes::new(vec![
            ExtendedAttribute::with_value("Exposed", "Window"),
            ExtendedAttribute::with_value("Exposed", "Worker"),
        ]);
        attrs.get("Exposed");
    }

    #[test]
    fn named_arg_list_keeps_its_name() {
        let attr = ExtendedAttribute::with_named_arguments(
            "LegacyFactoryFunction",
            "Audio",
            vec![("DOMString".into(), "src".into())],
        );
        assert_eq!(attr.name(), Some("Audio"));
        assert_eq!(attr.syntactic_form(), SyntacticForm::NamedArgList);
        assert!(attr.has_arguments());
    }
}
