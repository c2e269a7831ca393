//! Artifact coordinates and repository metadata identifiers.
//!
//! A `Coordinate` names one artifact file (`groupId:artifactId:version`
//! plus extension and optional classifier). Several string keys are
//! derived from it; each one answers a different identity question:
//!
//! - `project_key` (`g:a:v`) - which module produced it
//! - `artifact_key` (`g:a:ext:classifier`) - which file of that module
//! - `versionless_id` (`g:a:ext[:classifier]`) - managed-version lookups
//! - `full_id` (`g:a:ext[:classifier]:v`) - deduplication of resolved artifacts

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Default extension when none is given.
pub const DEFAULT_EXTENSION: &str = "jar";

/// Classifier used by test-jar artifacts.
pub const TESTS_CLASSIFIER: &str = "tests";

/// Artifact coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    /// Optional when the version comes from a managed-version map.
    pub version: Option<String>,
    pub extension: String,
    pub classifier: Option<String>,
    /// Artifact type property (e.g. `test-jar`), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
}

impl Coordinate {
    /// Create a versioned coordinate with the default extension.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Coordinate {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: Some(version.into()),
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: None,
            artifact_type: None,
        }
    }

    /// Create a coordinate without a version.
    pub fn versionless(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Coordinate {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: None,
            artifact_type: None,
        }
    }

    /// Set the extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the classifier. An empty classifier clears it.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        self.classifier = if classifier.is_empty() {
            None
        } else {
            Some(classifier)
        };
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the artifact type property.
    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = Some(artifact_type.into());
        self
    }

    /// Parse `groupId:artifactId[:extension[:classifier]]:version`.
    pub fn parse(coords: &str) -> Result<Self> {
        let parts: Vec<&str> = coords.split(':').collect();
        let coord = match parts.as_slice() {
            [g, a, v] => Coordinate::new(*g, *a, *v),
            [g, a, e, v] => Coordinate::new(*g, *a, *v).with_extension(*e),
            [g, a, e, c, v] => Coordinate::new(*g, *a, *v)
                .with_extension(*e)
                .with_classifier(*c),
            _ => bail!(
                "bad artifact coordinates `{}`, expected format is \
                 <groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>",
                coords
            ),
        };

        if coord.group_id.is_empty() || coord.artifact_id.is_empty() || coord.version().is_empty()
        {
            bail!("bad artifact coordinates `{}`: empty component", coords);
        }

        Ok(coord)
    }

    /// The version, or an empty string when unset.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// The classifier, or an empty string when unset.
    pub fn classifier(&self) -> &str {
        self.classifier.as_deref().unwrap_or("")
    }

    /// Key of the module that owns this artifact: `g:a:v`.
    pub fn project_key(&self) -> String {
        project_key(&self.group_id, &self.artifact_id, self.version())
    }

    /// Identity of the file within its module: `g:a:ext:classifier`.
    pub fn artifact_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.extension,
            self.classifier()
        )
    }

    /// `g:a:ext[:classifier]`, the key of managed-version maps.
    pub fn versionless_id(&self) -> String {
        let mut id = format!("{}:{}:{}", self.group_id, self.artifact_id, self.extension);
        if let Some(classifier) = self.classifier.as_deref().filter(|c| !c.is_empty()) {
            id.push(':');
            id.push_str(classifier);
        }
        id
    }

    /// `g:a:ext[:classifier]:v`, unique per resolved artifact.
    pub fn full_id(&self) -> String {
        format!("{}:{}", self.versionless_id(), self.version())
    }

    /// Whether this coordinate denotes a test artifact.
    pub fn is_test_artifact(&self) -> bool {
        self.artifact_type.as_deref() == Some("test-jar")
            || (self.extension == "jar" && self.classifier() == TESTS_CLASSIFIER)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version())
    }
}

/// Repository metadata identifier (e.g. `maven-metadata.xml`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metadata {
    pub group_id: String,
    pub artifact_id: String,
    /// Empty for artifact-level (version listing) metadata.
    pub version: String,
    pub metadata_type: String,
}

impl Metadata {
    /// Create a metadata identifier with the standard type.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Metadata {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            metadata_type: "maven-metadata.xml".to_string(),
        }
    }

    /// Key of the module this metadata describes: `g:a:v`.
    pub fn project_key(&self) -> String {
        project_key(&self.group_id, &self.artifact_id, &self.version)
    }
}

/// Build a `g:a:v` key.
pub fn project_key(group_id: &str, artifact_id: &str, version: &str) -> String {
    format!("{}:{}:{}", group_id, artifact_id, version)
}

/// Maps packaging / dependency type names to file extension and classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactTypes;

impl ArtifactTypes {
    /// Resolve a type name to `(extension, classifier)`.
    ///
    /// Unknown types use their own name as extension.
    pub fn resolve(&self, type_name: &str) -> (String, Option<String>) {
        let (extension, classifier) = match type_name {
            "pom" => ("pom", None),
            "jar" | "ejb" | "ejb-client" | "maven-plugin" | "bundle" => ("jar", None),
            "war" => ("war", None),
            "ear" => ("ear", None),
            "rar" => ("rar", None),
            "test-jar" => ("jar", Some(TESTS_CLASSIFIER)),
            "java-source" => ("jar", Some("sources")),
            "javadoc" => ("jar", Some("javadoc")),
            other => (other, None),
        };
        (extension.to_string(), classifier.map(str::to_string))
    }

    /// Build a coordinate for `type_name`, keeping an explicit classifier.
    pub fn coordinate(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
        type_name: &str,
        classifier: Option<&str>,
    ) -> Coordinate {
        let (extension, default_classifier) = self.resolve(type_name);
        let classifier = classifier
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or(default_classifier);

        let mut coord = Coordinate::versionless(group_id, artifact_id).with_extension(extension);
        coord.version = version.map(str::to_string);
        coord.classifier = classifier;
        if type_name != coord.extension {
            coord.artifact_type = Some(type_name.to_string());
        }
        coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let coord = Coordinate::new("org.example", "core", "1.0").with_classifier("tests");

        assert_eq!(coord.project_key(), "org.example:core:1.0");
        assert_eq!(coord.artifact_key(), "org.example:core:jar:tests");
        assert_eq!(coord.versionless_id(), "org.example:core:jar:tests");
        assert_eq!(coord.full_id(), "org.example:core:jar:tests:1.0");
    }

    #[test]
    fn test_keys_without_classifier() {
        let coord = Coordinate::new("g", "a", "1.0").with_extension("pom");

        assert_eq!(coord.artifact_key(), "g:a:pom:");
        assert_eq!(coord.versionless_id(), "g:a:pom");
    }

    #[test]
    fn test_parse() {
        let coord = Coordinate::parse("g:a:1.0").unwrap();
        assert_eq!(coord.extension, "jar");
        assert_eq!(coord.version(), "1.0");

        let coord = Coordinate::parse("g:a:war:1.0").unwrap();
        assert_eq!(coord.extension, "war");

        let coord = Coordinate::parse("g:a:jar:tests:1.0").unwrap();
        assert_eq!(coord.classifier(), "tests");
        assert!(coord.is_test_artifact());

        assert!(Coordinate::parse("g:a").is_err());
        assert!(Coordinate::parse("g::1.0").is_err());
    }

    #[test]
    fn test_test_artifact_detection() {
        assert!(Coordinate::new("g", "a", "1").with_type("test-jar").is_test_artifact());
        assert!(!Coordinate::new("g", "a", "1").is_test_artifact());
        assert!(!Coordinate::new("g", "a", "1")
            .with_extension("zip")
            .with_classifier("tests")
            .is_test_artifact());
    }

    #[test]
    fn test_artifact_types() {
        let types = ArtifactTypes;
        let coord = types.coordinate("g", "a", Some("1"), "test-jar", None);
        assert_eq!(coord.extension, "jar");
        assert_eq!(coord.classifier(), "tests");
        assert_eq!(coord.artifact_type.as_deref(), Some("test-jar"));

        let coord = types.coordinate("g", "a", None, "maven-plugin", Some("shaded"));
        assert_eq!(coord.extension, "jar");
        assert_eq!(coord.classifier(), "shaded");
        assert!(coord.version.is_none());

        assert_eq!(types.resolve("zip").0, "zip");
    }

    #[test]
    fn test_metadata_key() {
        let md = Metadata::new("g", "a", "");
        assert_eq!(md.project_key(), "g:a:");
    }
}
