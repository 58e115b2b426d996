//! Error types for the call-mocking core.
//!
//! This module defines the error taxonomy for registry growth failures,
//! collaborator (value capability) failures, and diagnostic render failures,
//! plus the [`RejectedCall`] wrapper that hands a refused call back to the
//! caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::call::MockCall;

/// Convenience alias for results carrying a [`MockError`].
pub type MockResult<T> = std::result::Result<T, MockError>;

/// Identifies one of the two call registries owned by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryKind {
    /// The registry of expectations registered during test setup.
    Expected,
    /// The registry of unexpected calls observed during execution.
    Actual,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => write!(f, "expected"),
            Self::Actual => write!(f, "actual"),
        }
    }
}

/// The main error type for the call-mocking core.
///
/// Growth failures are recoverable at the call boundary: the operation
/// reports the failure and leaves the registry in its prior valid state.
/// Collaborator failures are propagated rather than masked, so a missing or
/// broken value capability never silently degrades a comparison or a
/// diagnostic report.
///
/// # Examples
///
/// ```
/// use callmock::{MockError, RegistryKind};
///
/// let err = MockError::registry_full(RegistryKind::Expected, 8);
/// assert!(err.is_growth_failure());
/// assert!(err.to_string().contains("capacity 8"));
///
/// let err = MockError::unregistered_type("ip_addr");
/// assert!(err.is_collaborator_failure());
/// ```
#[derive(Debug, Error)]
pub enum MockError {
    /// A registry refused to grow because its configured capacity bound was
    /// reached.
    #[error("{registry} call registry is full (capacity {capacity})")]
    RegistryFull {
        /// Which registry refused the append
        registry: RegistryKind,
        /// The configured bound that was hit
        capacity: usize,
    },

    /// Backing storage growth failed at the allocator.
    #[error("out of memory growing {what}")]
    OutOfMemory {
        /// What was being grown (a registry or a diagnostic buffer)
        what: &'static str,
    },

    /// No value capability is registered under the given type key.
    #[error("value type not registered: {key}")]
    UnregisteredType {
        /// The type key that failed to resolve
        key: String,
    },

    /// A registered value capability reported failure.
    #[error("value capability failed for type {key}: {message}")]
    Capability {
        /// The type key whose capability failed
        key: String,
        /// Description of the failure
        message: String,
    },
}

impl MockError {
    /// Creates a new RegistryFull error.
    pub fn registry_full(registry: RegistryKind, capacity: usize) -> Self {
        Self::RegistryFull { registry, capacity }
    }

    /// Creates a new OutOfMemory error.
    pub fn out_of_memory(what: &'static str) -> Self {
        Self::OutOfMemory { what }
    }

    /// Creates a new UnregisteredType error.
    pub fn unregistered_type(key: impl Into<String>) -> Self {
        Self::UnregisteredType { key: key.into() }
    }

    /// Creates a new Capability error.
    pub fn capability(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Capability {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error came from registry or buffer growth.
    pub fn is_growth_failure(&self) -> bool {
        matches!(self, Self::RegistryFull { .. } | Self::OutOfMemory { .. })
    }

    /// Returns true if this error came from a value capability.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::UnregisteredType { .. } | Self::Capability { .. })
    }
}

/// Returned when appending or matching a call fails.
///
/// The refused call is handed back to the caller, who retains ownership: a
/// failed append never destroys the call it was given.
///
/// # Examples
///
/// ```
/// use callmock::{MockSession, SessionConfig};
///
/// let mut session = MockSession::with_config(SessionConfig::new().with_max_expected_calls(0));
/// let call = session.new_call("ping").build();
///
/// let rejected = session.expect(call).unwrap_err();
/// assert!(rejected.error.is_growth_failure());
/// // The call is still usable.
/// assert_eq!(rejected.call.function_name(), "ping");
/// ```
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RejectedCall {
    /// The call that was not appended; ownership returns to the caller.
    pub call: MockCall,
    /// Why the operation was refused.
    #[source]
    pub error: MockError,
}

impl RejectedCall {
    /// Creates a new RejectedCall.
    pub fn new(call: MockCall, error: MockError) -> Self {
        Self { call, error }
    }

    /// Splits this rejection into the refused call and the underlying error.
    pub fn into_parts(self) -> (MockCall, MockError) {
        (self.call, self.error)
    }
}
