//! Reactor loading - turn an aggregator descriptor into a module tree.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use anyhow::{bail, Result};
use rayon::prelude::*;

use crate::core::Module;
use crate::model::cache::ReactorModelCache;
use crate::model::{ModelError, ModelParser, ParseOptions, ParsedModel, DESCRIPTOR_FILE};
use crate::util::fs::{normalize_path, same_location};

const MAX_NESTING: usize = 64;

struct ParsedTree {
    model: ParsedModel,
    children: Vec<ParsedTree>,
}

/// Load the module tree below `root_descriptor`.
///
/// Every `<module>` of an aggregator becomes a collected child with a weak
/// link back to the aggregator. Sibling descriptors are parsed in parallel.
/// The module whose descriptor is `execution_root` (if any) is flagged as
/// the execution root.
pub fn load_reactor(
    parser: &dyn ModelParser,
    root_descriptor: &Path,
    options: &ParseOptions,
    cache: &ReactorModelCache<ParsedModel>,
    execution_root: Option<&Path>,
) -> Result<Arc<Module>> {
    let root_descriptor = normalize_path(root_descriptor);
    let tree = parse_tree(parser, &root_descriptor, options, cache, 0)?;
    let root = build_module(tree, None, execution_root);
    tracing::debug!(
        "Loaded reactor {} with {} modules",
        root.id(),
        root.descendants().len() + 1
    );
    Ok(root)
}

fn parse_tree(
    parser: &dyn ModelParser,
    descriptor: &Path,
    options: &ParseOptions,
    cache: &ReactorModelCache<ParsedModel>,
    depth: usize,
) -> Result<ParsedTree> {
    if depth > MAX_NESTING {
        bail!("module nesting below {} is too deep", descriptor.display());
    }

    let model = parser.parse(descriptor, options, cache)?;
    let base_dir = model.base_dir().to_path_buf();

    let children = model
        .modules
        .par_iter()
        .map(|name| {
            let path = module_descriptor(&base_dir, name);
            if !path.is_file() {
                return Err(ModelError::MissingModule {
                    path: descriptor.display().to_string(),
                    module: name.clone(),
                }
                .into());
            }
            parse_tree(parser, &normalize_path(&path), options, cache, depth + 1)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParsedTree { model, children })
}

/// A `<module>` entry names a directory or a descriptor file.
fn module_descriptor(base_dir: &Path, name: &str) -> PathBuf {
    let path = base_dir.join(name);
    if path.is_dir() {
        path.join(DESCRIPTOR_FILE)
    } else {
        path
    }
}

fn build_module(
    tree: ParsedTree,
    parent: Option<Weak<Module>>,
    execution_root: Option<&Path>,
) -> Arc<Module> {
    let ParsedTree { model, children } = tree;
    let is_execution_root =
        execution_root.is_some_and(|path| same_location(path, &model.descriptor));

    let mut builder = model.module_builder().execution_root(is_execution_root);
    if let Some(parent) = parent {
        builder = builder.parent_weak(parent);
    }

    builder.build_with_children(|me| {
        children
            .into_iter()
            .map(|child| build_module(child, Some(me.clone()), execution_root))
            .collect()
    })
}
