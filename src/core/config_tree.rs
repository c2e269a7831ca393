//! Plugin configuration trees.
//!
//! A node either carries a string value (a leaf) or child nodes, mirroring
//! how plugin `<configuration>` blocks are stored after model building.

use serde::{Deserialize, Serialize};

/// One node of a configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigNode {
    pub name: String,
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Create an empty node.
    pub fn new(name: impl Into<String>) -> Self {
        ConfigNode {
            name: name.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Create a leaf node with a value.
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigNode {
            name: name.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// Append a child.
    pub fn with_child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Values of every leaf, depth-first.
    pub fn leaf_values(&self) -> Vec<&str> {
        let mut values = Vec::new();
        self.collect_values(&mut values);
        values
    }

    fn collect_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.value {
            Some(value) => out.push(value),
            None => {
                for child in &self.children {
                    child.collect_values(out);
                }
            }
        }
    }
}

/// A plugin execution and its own configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginExecution {
    pub id: String,
    pub configuration: Option<ConfigNode>,
}

/// A build plugin with its configuration trees.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plugin {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub configuration: Option<ConfigNode>,
    #[serde(default)]
    pub executions: Vec<PluginExecution>,
}

impl Plugin {
    /// `groupId:artifactId`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}
