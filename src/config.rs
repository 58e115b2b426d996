//! Configuration for mock sessions.
//!
//! This module provides the [`SessionConfig`] struct controlling the
//! capacity bounds of the two call registries owned by a session.

use serde::{Deserialize, Serialize};

/// Configuration for a [`MockSession`](crate::MockSession).
///
/// Each registry can carry an optional capacity bound. With no bound
/// (the default), a registry grows until the allocator refuses; with a
/// bound, an append that would exceed it is refused deterministically and
/// the call is handed back to the caller. Bounds are mostly useful to tests
/// of the harness itself, as a reproducible stand-in for allocation failure.
///
/// # Examples
///
/// ```
/// use callmock::SessionConfig;
///
/// // Unbounded registries (default)
/// let config = SessionConfig::new();
/// assert_eq!(config.max_expected_calls, None);
///
/// // Bound the expected registry to 64 outstanding expectations
/// let config = SessionConfig::new().with_max_expected_calls(64);
/// assert_eq!(config.max_expected_calls, Some(64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Maximum number of outstanding expectations, or `None` for unbounded.
    pub max_expected_calls: Option<usize>,
    /// Maximum number of recorded unexpected calls, or `None` for unbounded.
    pub max_actual_calls: Option<usize>,
}

impl SessionConfig {
    /// Creates a new configuration with unbounded registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity bound for the expected-call registry.
    pub fn with_max_expected_calls(mut self, limit: usize) -> Self {
        self.max_expected_calls = Some(limit);
        self
    }

    /// Sets the capacity bound for the actual-call registry.
    pub fn with_max_actual_calls(mut self, limit: usize) -> Self {
        self.max_actual_calls = Some(limit);
        self
    }
}
