//! Core data structures for imh.
//!
//! This module contains the foundational types used throughout the crate:
//! - Artifact coordinates and metadata identifiers
//! - Modules and their build layout
//! - Plugin configuration trees
//! - The registry of workspace modules

pub mod config_tree;
pub mod coordinate;
pub mod module;
pub mod registry;

pub use config_tree::{ConfigNode, Plugin, PluginExecution};
pub use coordinate::{ArtifactTypes, Coordinate, Metadata};
pub use module::{Artifact, BuildLayout, Module, ModuleBuilder, RemoteRepository};
pub use registry::ProjectRegistry;
