//! Dependency tree nodes.
//!
//! An [`Artifact`] is a module reported by the oracle as an immediate
//! dependency of some directory. Its `dependencies` start out unresolved
//! (`None`) and are filled exactly once by the tree builder.

use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Module path, e.g. `github.com/spf13/cobra`.
    pub name: String,
    /// Version reported by the oracle. Empty for local or replaced modules.
    #[serde(default)]
    pub version: String,
    #[serde(default, serialize_with = "serialize_dependencies")]
    pub dependencies: Option<Vec<Artifact>>,
}

// Unresolved nodes never reach serialization, but an empty array keeps the
// document shape stable if one ever does.
fn serialize_dependencies<S: Serializer>(
    deps: &Option<Vec<Artifact>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match deps {
        Some(deps) => deps.serialize(serializer),
        None => Vec::<Artifact>::new().serialize(serializer),
    }
}

impl Artifact {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: None,
        }
    }

    /// Create an already-resolved node.
    pub fn with_dependencies(
        name: impl Into<String>,
        version: impl Into<String>,
        dependencies: Vec<Artifact>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: Some(dependencies),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.dependencies.is_some()
    }

    /// Children of this node; empty when unresolved or a leaf.
    pub fn children(&self) -> &[Artifact] {
        self.dependencies.as_deref().unwrap_or(&[])
    }

    /// `name@version`, or just `name` for unversioned modules.
    pub fn display_id(&self) -> String {
        format_id(&self.name, &self.version)
    }

    /// True when this node and every descendant has been resolved.
    pub fn is_fully_resolved(&self) -> bool {
        match &self.dependencies {
            Some(deps) => deps.iter().all(Artifact::is_fully_resolved),
            None => false,
        }
    }
}

/// `name@version`, or just `name` when the version is empty.
pub(crate) fn format_id(name: &str, version: &str) -> String {
    if version.is_empty() {
        name.to_string()
    } else {
        format!("{}@{}", name, version)
    }
}

/// An artifact paired with the directory its own manifest lives in.
///
/// Only exists while the tree is being built; the directory is dropped once
/// the artifact's subtree is attached to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryBinding {
    pub artifact: Artifact,
    pub dir: PathBuf,
}

impl DirectoryBinding {
    pub fn new(artifact: Artifact, dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact,
            dir: dir.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_artifact_is_unresolved() {
        let a = Artifact::new("github.com/pkg/errors", "v0.9.1");
        assert!(!a.is_resolved());
        assert!(a.children().is_empty());
    }

    #[test]
    fn test_display_id() {
        assert_eq!(
            Artifact::new("golang.org/x/mod", "v0.14.0").display_id(),
            "golang.org/x/mod@v0.14.0"
        );
        assert_eq!(Artifact::new("example.com/local", "").display_id(), "example.com/local");
        assert_eq!(format_id("example.com/local", ""), "example.com/local");
    }

    #[test]
    fn test_serialized_field_order() {
        let a = Artifact::with_dependencies("P", "v1", vec![]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"name":"P","version":"v1","dependencies":[]}"#);
    }

    #[test]
    fn test_unresolved_serializes_as_empty_list() {
        let json = serde_json::to_string(&Artifact::new("P", "v1")).unwrap();
        assert!(json.ends_with(r#""dependencies":[]}"#));
    }

    #[test]
    fn test_fully_resolved_checks_descendants() {
        let mut root = Artifact::with_dependencies("Q", "v2", vec![Artifact::new("R", "v1")]);
        assert!(root.is_resolved());
        assert!(!root.is_fully_resolved());

        root.dependencies = Some(vec![Artifact::with_dependencies("R", "v1", vec![])]);
        assert!(root.is_fully_resolved());
    }
}
