//! Core domain models
//!
//! Hosts, workers and the registry that resolves them, plus the
//! per-run context and lifecycle state shared by every build step.

pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod registry;
pub mod state;
pub mod step;

pub use context::*;
pub use error::*;
pub use host::*;
pub use registry::*;
pub use state::*;
pub use step::*;
