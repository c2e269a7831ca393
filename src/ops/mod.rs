//! High-level operations.
//!
//! Root discovery and the start-up sequence that wires the workspace
//! resolver and the overlay repository into a build.

pub mod root;
pub mod session;

pub use root::{BuildSession, ResolutionContext, RootLocator};
pub use session::{start_session, OverlayFactory, Reactor};
