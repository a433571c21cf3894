//! The runtime-enabled-features lookup table.
//!
//! Feature files carry a flat `{"data": [...]}` list. Entries union across
//! files and a duplicate name is fatal. Exposure computations only need
//! three predicates: browser-controlled, origin-trial, and the derived
//! context-dependent (either of the two).

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use widl_common::CompileError;

#[derive(Clone, Debug, Default, Deserialize)]
struct FeatureEntry {
    name: String,
    #[serde(default)]
    browser_process_read_write_access: bool,
    #[serde(default)]
    origin_trial_feature_name: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    status: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct FeatureFile {
    data: Vec<FeatureEntry>,
}

/// The union of all feature files given to one compilation.
#[derive(Clone, Debug, Default)]
pub struct RuntimeEnabledFeatures {
    features: FxHashMap<String, FeatureEntry>,
}

impl RuntimeEnabledFeatures {
    pub fn load(paths: &[impl AsRef<Path>]) -> Result<RuntimeEnabledFeatures, CompileError> {
        let mut features: FxHashMap<String, FeatureEntry> = FxHashMap::default();
        for path in paths {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let file: FeatureFile =
                serde_json::from_str(&text).map_err(|err| CompileError::Decode {
                    path: path.display().to_string(),
                    detail: err.to_string(),
                })?;
            debug!(path = %path.display(), entries = file.data.len(), "loaded feature file");
            for entry in file.data {
                if features.insert(entry.name.clone(), entry.clone()).is_some() {
                    return Err(CompileError::DuplicateFeature { name: entry.name });
                }
            }
        }
        Ok(RuntimeEnabledFeatures { features })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// True iff the browser process can toggle the feature at run time.
    pub fn is_browser_controlled(&self, name: &str) -> bool {
        self.features
            .get(name)
            .map(|entry| entry.browser_process_read_write_access)
            .unwrap_or(false)
    }

    pub fn is_origin_trial(&self, name: &str) -> bool {
        self.features
            .get(name)
            .map(|entry| entry.origin_trial_feature_name.is_some())
            .unwrap_or(false)
    }

    /// A feature is context dependent when its value can differ between
    /// browsing contexts, i.e. it is browser controlled or an origin trial.
    pub fn is_context_dependent(&self, name: &str) -> bool {
        self.is_browser_controlled(name) || self.is_origin_trial(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn queries_reflect_entry_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "features.json",
            r#"{"data": [
                {"name": "FeatureA", "status": "stable"},
                {"name": "FeatureB", "browser_process_read_write_access": true},
                {"name": "FeatureC", "origin_trial_feature_name": "TrialC"}
            ]}"#,
        );

        let features = RuntimeEnabledFeatures::load(&[path]).unwrap();
        assert!(!features.is_context_dependent("FeatureA"));
        assert!(features.is_browser_controlled("FeatureB"));
        assert!(features.is_context_dependent("FeatureB"));
        assert!(features.is_origin_trial("FeatureC"));
        assert!(features.is_context_dependent("FeatureC"));
        assert!(!features.contains("FeatureD"));
    }

    #[test]
    fn duplicate_names_across_files_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(&dir, "a.json", r#"{"data": [{"name": "Dup"}]}"#);
        let second = write_file(&dir, "b.json", r#"{"data": [{"name": "Dup"}]}"#);

        let err = RuntimeEnabledFeatures::load(&[first, second]).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateFeature { name } if name == "Dup"));
    }
}
