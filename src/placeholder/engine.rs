//! PlaceholderEngine - replace dependency placeholders with file paths.

use std::collections::HashSet;
use std::path::Path;

use crate::core::{ArtifactTypes, ConfigNode, Coordinate, Module, Plugin, ProjectRegistry};
use crate::placeholder::token::{next_placeholder, placeholder_body, DependencySpec};
use crate::placeholder::{CollectRequest, DependencyGraphResolver, DependencyNode, PlaceholderError};
use crate::util::config::ImhConfig;
use crate::util::fs::absolute_path;

/// Substitutes placeholders in the configuration of one module at a time.
pub struct PlaceholderEngine<'a> {
    resolver: &'a dyn DependencyGraphResolver,
    registry: &'a ProjectRegistry,
    config: &'a ImhConfig,
}

impl<'a> PlaceholderEngine<'a> {
    pub fn new(
        resolver: &'a dyn DependencyGraphResolver,
        registry: &'a ProjectRegistry,
        config: &'a ImhConfig,
    ) -> Self {
        PlaceholderEngine {
            resolver,
            registry,
            config,
        }
    }

    /// Whether placeholders are substituted for `module` at all.
    pub fn is_enabled_for(&self, module: &Module) -> bool {
        self.config.placeholders_enabled_for(module)
    }

    /// Return `tree` with every placeholder replaced.
    ///
    /// Disabled modules get an unchanged copy. On error nothing is
    /// returned, so a failed module never sees a partial substitution.
    pub fn substitute(&self, tree: &ConfigNode, module: &Module) -> Result<ConfigNode, PlaceholderError> {
        if !self.is_enabled_for(module) {
            return Ok(tree.clone());
        }
        self.substitute_node(tree, module)
    }

    /// Substitute in place; `tree` is only replaced once every value succeeded.
    pub fn apply(&self, tree: &mut ConfigNode, module: &Module) -> Result<(), PlaceholderError> {
        let substituted = self.substitute(tree, module)?;
        *tree = substituted;
        Ok(())
    }

    /// Substitute across every plugin and execution configuration of a module.
    pub fn substitute_plugins(&self, plugins: &[Plugin], module: &Module) -> Result<Vec<Plugin>, PlaceholderError> {
        if !self.is_enabled_for(module) {
            return Ok(plugins.to_vec());
        }

        plugins
            .iter()
            .map(|plugin| -> Result<Plugin, PlaceholderError> {
                let mut plugin = plugin.clone();
                if let Some(config) = &plugin.configuration {
                    plugin.configuration = Some(self.substitute_node(config, module)?);
                }
                for execution in &mut plugin.executions {
                    if let Some(config) = &execution.configuration {
                        execution.configuration = Some(self.substitute_node(config, module)?);
                    }
                }
                Ok(plugin)
            })
            .collect()
    }

    fn substitute_node(&self, node: &ConfigNode, module: &Module) -> Result<ConfigNode, PlaceholderError> {
        let value = match &node.value {
            Some(value) if !value.is_empty() => Some(self.substitute_value(value, module)?),
            other => other.clone(),
        };
        let children = node
            .children
            .iter()
            .map(|child| self.substitute_node(child, module))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ConfigNode {
            name: node.name.clone(),
            value,
            children,
        })
    }

    fn substitute_value(&self, value: &str, module: &Module) -> Result<String, PlaceholderError> {
        let mut out = String::with_capacity(value.len());
        let mut cursor = 0;

        while let Some(span) = next_placeholder(value, cursor) {
            let token = placeholder_body(value, span);
            let paths = self.resolve_token(token, module)?;
            tracing::debug!("{}: $D{{{}}} -> {}", module.id(), token, paths);

            out.push_str(&value[cursor..span.0]);
            out.push_str(&paths);
            cursor = span.1;
        }

        out.push_str(&value[cursor..]);
        Ok(out)
    }

    fn resolve_token(&self, token: &str, module: &Module) -> Result<String, PlaceholderError> {
        let spec = DependencySpec::parse(token).ok_or_else(|| PlaceholderError::Syntax {
            module: module.id(),
            token: token.to_string(),
        })?;
        let coord = self.complete(&spec, token, module)?;

        if self.registry.is_workspace_artifact(&coord) {
            return Err(PlaceholderError::WorkspaceConflict {
                module: module.id(),
                token: token.to_string(),
            });
        }

        let request = CollectRequest {
            root: coord,
            managed: module.managed_dependencies().values().cloned().collect(),
            repositories: module.repositories().to_vec(),
        };
        let root = self
            .resolver
            .resolve(&request)
            .map_err(|source| PlaceholderError::Resolution {
                module: module.id(),
                token: token.to_string(),
                source,
            })?;

        let nodes = match spec.separator {
            Some(_) => transitive_nodes(&root),
            None => vec![&root],
        };

        let mut paths = Vec::with_capacity(nodes.len());
        for node in nodes {
            let file = node.file.as_deref().ok_or_else(|| PlaceholderError::MissingFile {
                module: module.id(),
                token: token.to_string(),
                artifact: node.coordinate.full_id(),
            })?;
            paths.push(render(file));
        }

        let separator = spec.separator.map(String::from).unwrap_or_default();
        Ok(paths.join(&separator))
    }

    /// Turn a parsed token into a full coordinate, taking a missing version from
    /// the module's dependency management.
    fn complete(&self, spec: &DependencySpec, token: &str, module: &Module) -> Result<Coordinate, PlaceholderError> {
        let coord = ArtifactTypes.coordinate(
            &spec.group_id,
            &spec.artifact_id,
            spec.version.as_deref(),
            &spec.packaging,
            spec.classifier.as_deref(),
        );
        if coord.version.is_some() {
            return Ok(coord);
        }

        module
            .managed_dependencies()
            .get(&coord.versionless_id())
            .cloned()
            .ok_or_else(|| PlaceholderError::VersionMissing {
                module: module.id(),
                token: token.to_string(),
            })
    }
}

/// The root followed by each distinct descendant, in visiting order.
fn transitive_nodes(root: &DependencyNode) -> Vec<&DependencyNode> {
    let mut seen = HashSet::new();
    seen.insert(root.coordinate.full_id());

    let mut nodes = vec![root];
    for node in root.descendants() {
        if seen.insert(node.coordinate.full_id()) {
            nodes.push(node);
        }
    }
    nodes
}

fn render(file: &Path) -> String {
    absolute_path(file).display().to_string()
}
