//! Workspace resolution.
//!
//! A workspace reader answers artifact lookups from the modules being built
//! in the current session instead of from a repository.

pub mod resolver;
pub mod staleness;

pub use resolver::WorkspaceResolver;
pub use staleness::is_actual;

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::Coordinate;

/// Artifact lookups served from the workspace.
pub trait WorkspaceReader: Send + Sync {
    /// The file for `coord`, if this reader provides it.
    fn find_artifact(&self, coord: &Coordinate) -> Option<PathBuf>;

    /// Versions of `coord` this reader knows about.
    fn find_versions(&self, coord: &Coordinate) -> Vec<String>;
}

/// Consults several readers in order.
#[derive(Default)]
pub struct ChainedWorkspaceReader {
    readers: Vec<Arc<dyn WorkspaceReader>>,
}

impl ChainedWorkspaceReader {
    pub fn new(readers: Vec<Arc<dyn WorkspaceReader>>) -> Self {
        ChainedWorkspaceReader { readers }
    }

    /// Append a reader after the existing ones.
    pub fn push(&mut self, reader: Arc<dyn WorkspaceReader>) {
        self.readers.push(reader);
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl WorkspaceReader for ChainedWorkspaceReader {
    fn find_artifact(&self, coord: &Coordinate) -> Option<PathBuf> {
        self.readers.iter().find_map(|r| r.find_artifact(coord))
    }

    fn find_versions(&self, coord: &Coordinate) -> Vec<String> {
        let mut versions: Vec<String> = Vec::new();
        for version in self.readers.iter().flat_map(|r| r.find_versions(coord)) {
            if !versions.contains(&version) {
                versions.push(version);
            }
        }
        versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        file: Option<&'static str>,
        versions: Vec<&'static str>,
    }

    impl WorkspaceReader for Fixed {
        fn find_artifact(&self, _coord: &Coordinate) -> Option<PathBuf> {
            self.file.map(PathBuf::from)
        }

        fn find_versions(&self, _coord: &Coordinate) -> Vec<String> {
            self.versions.iter().map(|v| v.to_string()).collect()
        }
    }

    #[test]
    fn test_chain_order_and_version_merge() {
        let chain = ChainedWorkspaceReader::new(vec![
            Arc::new(Fixed {
                file: None,
                versions: vec!["1.0"],
            }),
            Arc::new(Fixed {
                file: Some("/second.jar"),
                versions: vec!["1.0", "2.0"],
            }),
            Arc::new(Fixed {
                file: Some("/third.jar"),
                versions: vec![],
            }),
        ]);
        let coord = Coordinate::new("g", "a", "1.0");

        assert_eq!(chain.find_artifact(&coord), Some(PathBuf::from("/second.jar")));
        assert_eq!(chain.find_versions(&coord), vec!["1.0", "2.0"]);
        assert!(ChainedWorkspaceReader::default().find_artifact(&coord).is_none());
    }
}
