//! Serialized AST groups.
//!
//! One group per component: a component tag, a for-testing flag, and the
//! root `File` nodes of every IDL file compiled into that component.

use crate::node::AstNode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use widl_common::CompileError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AstGroup {
    pub component: String,
    #[serde(default)]
    pub for_testing: bool,
    pub files: Vec<AstNode>,
}

impl AstGroup {
    pub fn new(component: impl Into<String>, for_testing: bool) -> Self {
        AstGroup {
            component: component.into(),
            for_testing,
            files: Vec::new(),
        }
    }

    pub fn read_from_file(path: &Path) -> Result<AstGroup, CompileError> {
        let text = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let group: AstGroup =
            serde_json::from_str(&text).map_err(|err| CompileError::Decode {
                path: path.display().to_string(),
                detail: err.to_string(),
            })?;
        debug!(
            component = group.component,
            files = group.files.len(),
            "loaded AST group"
        );
        Ok(group)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), CompileError> {
        let text = serde_json::to_string(self).map_err(|err| CompileError::Decode {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;
        std::fs::write(path, text).map_err(|source| CompileError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.astgroup");

        let mut group = AstGroup::new("core", false);
        group
            .files
            .push(AstNode::new("File").with_child(AstNode::new("Enum").with_name("Kind")));
        group.write_to_file(&path).unwrap();

        let back = AstGroup::read_from_file(&path).unwrap();
        assert_eq!(back, group);
    }

    #[test]
    fn unreadable_group_names_the_path() {
        let err = AstGroup::read_from_file(Path::new("/no/such/group.json")).unwrap_err();
        assert!(err.to_string().contains("/no/such/group.json"));
    }
}
