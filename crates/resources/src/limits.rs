//! Resource limit configuration
//!
//! This module defines the typed limits handed to
//! [`ResourceManager::from_limits`](crate::manager::ResourceManager::from_limits).
//! `None` means a category has no configured limit and gets an unbounded
//! counter.

use serde::{Deserialize, Serialize};

/// Resource limit configuration
///
/// Quotas are signed so that misconfigured negative values survive parsing
/// and are rejected with a proper error at construction time instead of
/// silently wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum concurrently held connections (None = unlimited)
    pub max_connections: Option<i64>,
    /// Maximum connections switched to another protocol (None = unlimited)
    pub max_upgraded_connections: Option<i64>,
}

impl ResourceLimits {
    /// Create limits with both categories unbounded
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_connections: None,
            max_upgraded_connections: None,
        }
    }

    /// Create small finite limits for tests
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_connections: Some(2),
            max_upgraded_connections: Some(1),
        }
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// Trait for converting configuration types to resource limits
///
/// This trait allows different configuration types to be converted into
/// `ResourceLimits` for use with the `ResourceManager`.
pub trait IntoResourceLimits {
    /// Convert this configuration into `ResourceLimits`
    fn into_resource_limits(self) -> ResourceLimits;
}

impl IntoResourceLimits for ResourceLimits {
    fn into_resource_limits(self) -> ResourceLimits {
        self
    }
}
