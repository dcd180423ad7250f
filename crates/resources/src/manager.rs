//! Two-category resource manager
//!
//! Pure composition over the counters: one for baseline connections, one
//! for connections upgraded to another protocol. It performs no admission
//! logic of its own; it exists so a single handle can be threaded through
//! a server instead of two loose counters.

use conngate_errors::Error;
use tracing::debug;

use crate::counter::ResourceCounter;
use crate::limits::ResourceLimits;

/// Owns the admission counters, one per resource category
///
/// Constructed once at startup and shared behind `Arc` for the process
/// lifetime. The set of counters is immutable after construction; the
/// counters themselves remain internally mutable.
#[derive(Debug)]
pub struct ResourceManager {
    normal_connections: ResourceCounter,
    upgraded_connections: ResourceCounter,
}

impl ResourceManager {
    /// Compose a manager from two already-built counters
    #[must_use]
    pub fn new(normal_connections: ResourceCounter, upgraded_connections: ResourceCounter) -> Self {
        Self {
            normal_connections,
            upgraded_connections,
        }
    }

    /// Build a manager from configured limits
    ///
    /// Each `Some(quota)` becomes a bounded counter, each `None` an
    /// unbounded one.
    ///
    /// # Errors
    ///
    /// Returns an error if either configured quota is negative.
    pub fn from_limits(limits: &ResourceLimits) -> Result<Self, Error> {
        let manager = Self::new(
            counter_for(limits.max_connections)?,
            counter_for(limits.max_upgraded_connections)?,
        );
        debug!(
            max_connections = ?limits.max_connections,
            max_upgraded_connections = ?limits.max_upgraded_connections,
            "resource limits applied"
        );
        Ok(manager)
    }

    /// Counter for connections processed by the server
    #[must_use]
    pub fn normal_connections(&self) -> &ResourceCounter {
        &self.normal_connections
    }

    /// Counter for connections that switched to a different protocol
    #[must_use]
    pub fn upgraded_connections(&self) -> &ResourceCounter {
        &self.upgraded_connections
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(ResourceCounter::unbounded(), ResourceCounter::unbounded())
    }
}

fn counter_for(quota: Option<i64>) -> Result<ResourceCounter, Error> {
    match quota {
        Some(quota) => ResourceCounter::bounded(quota),
        None => Ok(ResourceCounter::unbounded()),
    }
}
