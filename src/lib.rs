//! imh - inter-module helper for multi-module Maven builds
//!
//! This crate lets modules built together resolve each other from their
//! build outputs, keeps workspace artifacts in an overlay repository apart
//! from the shared local repository, and substitutes dependency
//! placeholders in plugin configuration.

pub mod core;
pub mod model;
pub mod ops;
pub mod placeholder;
pub mod repository;
pub mod util;
pub mod workspace;

pub use core::{
    config_tree::ConfigNode, coordinate::Coordinate, module::Module, registry::ProjectRegistry,
};

pub use ops::{start_session, BuildSession, Reactor, RootLocator};
pub use util::config::ImhConfig;
