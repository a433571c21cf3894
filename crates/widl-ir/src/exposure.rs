//! Exposure: the set of conditions under which a construct is visible.

use serde::{Deserialize, Serialize};
use widl_ast::RuntimeEnabledFeatures;
use widl_common::Identifier;

/// One `[Exposed]` entry: a global name, optionally gated on a runtime
/// feature (`[Exposed(Window Feature)]`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalNameAndFeature {
    pub global_name: String,
    pub feature: Option<Identifier>,
}

/// The `[SecureContext]` gate.
///
/// `Unspecified` means no restriction was declared. `Never` is only ever
/// produced by group-exposure aggregation, where an unrestricted overload
/// makes the whole group explicitly unrestricted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecureContextMode {
    #[default]
    Unspecified,
    Always,
    Never,
    Conditional(Vec<Identifier>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    global_names_and_features: Vec<GlobalNameAndFeature>,
    runtime_enabled_features: Vec<Identifier>,
    context_enabled_features: Vec<Identifier>,
    only_in_coi_contexts: bool,
    only_in_coi_contexts_or_runtime_enabled_features: Vec<Identifier>,
    only_in_injection_mitigated_contexts: bool,
    only_in_isolated_contexts: bool,
    only_in_secure_contexts: SecureContextMode,
}

impl Exposure {
    pub fn new() -> Self {
        Exposure::default()
    }

    pub fn add_global_name_and_feature(&mut self, global_name: &str, feature: Option<&str>) {
        self.global_names_and_features.push(GlobalNameAndFeature {
            global_name: global_name.to_string(),
            feature: feature.map(Identifier::from),
        });
    }

    pub fn add_runtime_enabled_feature(&mut self, name: &str) {
        let name = Identifier::from(name);
        if !self.runtime_enabled_features.contains(&name) {
            self.runtime_enabled_features.push(name);
        }
    }

    pub fn add_context_enabled_feature(&mut self, name: &str) {
        let name = Identifier::from(name);
        if !self.context_enabled_features.contains(&name) {
            self.context_enabled_features.push(name);
        }
    }

    pub fn set_only_in_coi_contexts(&mut self, value: bool) {
        self.only_in_coi_contexts = value;
    }

    pub fn add_only_in_coi_contexts_or_runtime_enabled_feature(&mut self, name: &str) {
        let name = Identifier::from(name);
        if !self
            .only_in_coi_contexts_or_runtime_enabled_features
            .contains(&name)
        {
            self.only_in_coi_contexts_or_runtime_enabled_features
                .push(name);
        }
    }

    pub fn set_only_in_injection_mitigated_contexts(&mut self, value: bool) {
        self.only_in_injection_mitigated_contexts = value;
    }

    pub fn set_only_in_isolated_contexts(&mut self, value: bool) {
        self.only_in_isolated_contexts = value;
    }

    pub fn set_only_in_secure_contexts(&mut self, mode: SecureContextMode) {
        self.only_in_secure_contexts = mode;
    }

    pub fn global_names_and_features(&self) -> &[GlobalNameAndFeature] {
        &self.global_names_and_features
    }

    pub fn runtime_enabled_features(&self) -> &[Identifier] {
        &self.runtime_enabled_features
    }

    /// Runtime-enabled features whose value may differ between browsing
    /// contexts.
    pub fn context_dependent_runtime_enabled_features(
        &self,
        features: &RuntimeEnabledFeatures,
    ) -> Vec<Identifier> {
        self.runtime_enabled_features
            .iter()
            .filter(|name| features.is_context_dependent(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn context_independent_runtime_enabled_features(
        &self,
        features: &RuntimeEnabledFeatures,
    ) -> Vec<Identifier> {
        self.runtime_enabled_features
            .iter()
            .filter(|name| !features.is_context_dependent(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn origin_trial_features(&self, features: &RuntimeEnabledFeatures) -> Vec<Identifier> {
        self.runtime_enabled_features
            .iter()
            .filter(|name| features.is_origin_trial(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn context_enabled_features(&self) -> &[Identifier] {
        &self.context_enabled_features
    }

    pub fn only_in_coi_contexts(&self) -> bool {
        self.only_in_coi_contexts
    }

    pub fn only_in_coi_contexts_or_runtime_enabled_features(&self) -> &[Identifier] {
        &self.only_in_coi_contexts_or_runtime_enabled_features
    }

    pub fn only_in_injection_mitigated_contexts(&self) -> bool {
        self.only_in_injection_mitigated_contexts
    }

    pub fn only_in_isolated_contexts(&self) -> bool {
        self.only_in_isolated_contexts
    }

    pub fn only_in_secure_contexts(&self) -> &SecureContextMode {
        &self.only_in_secure_contexts
    }

    /// True when exposure depends on the browsing context at run time.
    pub fn is_context_dependent(&self, features: &RuntimeEnabledFeatures) -> bool {
        self.context_enabled_features.len() > 0
            || self.only_in_coi_contexts
            || self.only_in_coi_contexts_or_runtime_enabled_features.len() > 0
            || self.only_in_injection_mitigated_contexts
            || self.only_in_isolated_contexts
            || !matches!(self.only_in_secure_contexts, SecureContextMode::Unspecified)
            || self
                .global_names_and_features
                .iter()
                .any(|entry| entry.feature.is_some())
            || self
                .runtime_enabled_features
                .iter()
                .any(|name| features.is_context_dependent(name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_features_are_deduplicated() {
        let mut exposure = Exposure::new();
        exposure.add_runtime_enabled_feature("FeatureA");
        exposure.add_runtime_enabled_feature("FeatureA");
        exposure.add_runtime_enabled_feature("FeatureB");
        assert_eq!(exposure.runtime_enabled_features().len(), 2);
    }

    #[test]
    fn secure_context_mode_defaults_to_unspecified() {
        let exposure = Exposure::new();
        assert_eq!(
            exposure.only_in_secure_contexts(),
            &SecureContextMode::Unspecified
        );
    }
}
