#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Resource management for conngate
//!
//! This crate provides the admission-control core: lock-free counters that
//! bound how many resources (connections, upgraded connections) are held at
//! once, and the manager that groups one counter per category so a single
//! handle can be threaded through a server.
//!
//! The counters are shared by reference among arbitrarily many concurrent
//! callers. `try_acquire` and `release` never block, never suspend, and
//! never take a lock; all accounting goes through a single atomic word.

pub mod counter;
pub mod limits;
pub mod manager;

pub use counter::{ResourceCounter, ResourceGuard};
pub use limits::{IntoResourceLimits, ResourceLimits};
pub use manager::ResourceManager;
