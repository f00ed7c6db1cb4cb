//! Git operations for repoprobe
//!
//! This module wraps the version-control primitives (init, open, clone,
//! stage, commit, push, pull, branch create/checkout/switch) behind
//! [`GitEngine`], with [`GitRepo`] as the repository handle.

mod branch;
mod clone;
mod engine;
mod index;
mod repo;
mod sync;

pub use clone::Transport;
pub use engine::{EngineOptions, GitEngine, TRACE_TARGET};
pub use repo::{GitRepo, RemoteInfo, ORIGIN};
pub use sync::PullOutcome;
