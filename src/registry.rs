//! Ordered, owning storage for recorded calls.
//!
//! A [`CallRegistry`] is an insertion-order-significant sequence of owned
//! [`MockCall`]s with capacity-checked growth, ordered removal, and an
//! idempotent reset. Each registry also carries its diagnostic string cache,
//! regenerated on demand and invalidated by every mutation; the cache is
//! derived state only, never authoritative.

use crate::call::MockCall;
use crate::error::{MockError, RegistryKind, RejectedCall};
use crate::report;

/// An ordered sequence of owned calls.
pub struct CallRegistry {
    kind: RegistryKind,
    capacity_limit: Option<usize>,
    calls: Vec<MockCall>,
    rendered: Option<String>,
}

impl CallRegistry {
    /// Creates an empty registry, optionally bounded to `capacity_limit`
    /// calls.
    pub fn new(kind: RegistryKind, capacity_limit: Option<usize>) -> Self {
        Self {
            kind,
            capacity_limit,
            calls: Vec::new(),
            rendered: None,
        }
    }

    /// Which registry this is.
    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Appends `call`, taking ownership.
    ///
    /// Growth is checked before any mutation: if the capacity bound is hit
    /// or the allocator refuses, the registry keeps its prior contents and
    /// the call is handed back inside the error.
    pub fn push(&mut self, call: MockCall) -> Result<(), RejectedCall> {
        if let Some(limit) = self.capacity_limit {
            if self.calls.len() >= limit {
                return Err(RejectedCall::new(
                    call,
                    MockError::registry_full(self.kind, limit),
                ));
            }
        }
        if self.calls.try_reserve(1).is_err() {
            return Err(RejectedCall::new(
                call,
                MockError::out_of_memory("call registry"),
            ));
        }
        self.rendered = None;
        self.calls.push(call);
        Ok(())
    }

    /// Removes and returns the call at `index`, shifting later calls down so
    /// order is preserved with no gaps.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds; callers index from their own scan
    /// of this registry.
    pub fn remove(&mut self, index: usize) -> MockCall {
        self.rendered = None;
        self.calls.remove(index)
    }

    /// Drops every owned call and releases the backing storage. Idempotent.
    pub fn reset(&mut self) {
        self.calls = Vec::new();
        self.rendered = None;
    }

    /// Returns the number of owned calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns true if the registry owns no calls.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Returns the most recently appended call, mutably, without removal.
    pub fn last_mut(&mut self) -> Option<&mut MockCall> {
        // Return payloads attached through this handle do not participate
        // in rendering, so the cache stays valid.
        self.calls.last_mut()
    }

    /// Iterates the owned calls in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MockCall> {
        self.calls.iter()
    }

    /// Renders the registry as one concatenated diagnostic string.
    ///
    /// The result is cached until the next mutation; an empty registry
    /// renders as the empty string. On failure no partial text escapes: the
    /// cache stays unset and the error is returned.
    pub fn render(&mut self) -> Result<String, MockError> {
        if let Some(text) = &self.rendered {
            return Ok(text.clone());
        }
        let text = report::render_calls(self.calls.iter())?;
        self.rendered = Some(text.clone());
        Ok(text)
    }
}

impl std::fmt::Debug for CallRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallRegistry")
            .field("kind", &self.kind)
            .field("len", &self.calls.len())
            .field("capacity_limit", &self.capacity_limit)
            .finish()
    }
}
