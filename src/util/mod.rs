//! Utility modules.

pub mod config;
pub mod context;
pub mod fs;

pub use context::GlobalContext;
