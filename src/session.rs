//! The mock session: expectation bookkeeping for one test.
//!
//! A [`MockSession`] owns the value-type registry and the two call
//! registries, and carries them through one test's lifecycle: expectations
//! registered during setup, observations matched or spilled during
//! execution, diagnostic texts compared at teardown. Construct one session
//! per test; a parallel runner isolates by giving each test its own session
//! rather than sharing one.
//!
//! # Example
//!
//! ```
//! use callmock::MockSession;
//!
//! let mut session = MockSession::new();
//!
//! // Setup: the code under test must open the config file.
//! let expected = session
//!     .new_call("open")
//!     .with_arg("str", String::from("config.toml"))
//!     .unwrap()
//!     .build();
//! session.expect(expected).unwrap();
//!
//! // Execution: instrumentation reports what actually happened.
//! let observed = session
//!     .new_call("open")
//!     .with_arg("str", String::from("config.toml"))
//!     .unwrap()
//!     .build();
//! let matched = session.observe(observed).unwrap();
//! assert!(matched.is_some());
//!
//! // Teardown: equal texts mean the test passed.
//! let report = session.report().unwrap();
//! assert!(report.is_match());
//! assert_eq!(report.expected, "");
//! assert_eq!(report.actual, "");
//! ```

use serde::{Deserialize, Serialize};

use crate::call::{CallBuilder, MockCall};
use crate::config::SessionConfig;
use crate::error::{MockError, RegistryKind, RejectedCall};
use crate::registry::CallRegistry;
use crate::values::ValueTypeRegistry;

/// Call-recording and call-matching state for one test.
///
/// All operations are synchronous and run to completion; none may be
/// re-entered from inside a value capability.
#[derive(Debug)]
pub struct MockSession {
    values: ValueTypeRegistry,
    expected: CallRegistry,
    actual: CallRegistry,
}

impl MockSession {
    /// Creates a session with the native value types registered and
    /// unbounded registries.
    pub fn new() -> Self {
        Self::with_registry(ValueTypeRegistry::with_native_types(), SessionConfig::default())
    }

    /// Creates a session with the native value types and the given
    /// configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_registry(ValueTypeRegistry::with_native_types(), config)
    }

    /// Creates a session over a caller-supplied value-type registry.
    ///
    /// The registry must carry every type key the test will record before
    /// the first call is built against it.
    pub fn with_registry(values: ValueTypeRegistry, config: SessionConfig) -> Self {
        Self {
            values,
            expected: CallRegistry::new(RegistryKind::Expected, config.max_expected_calls),
            actual: CallRegistry::new(RegistryKind::Actual, config.max_actual_calls),
        }
    }

    /// The session's value-type registry, for further registrations.
    pub fn value_types(&mut self) -> &mut ValueTypeRegistry {
        &mut self.values
    }

    /// Starts building a call whose argument capabilities resolve against
    /// this session's value-type registry.
    pub fn new_call(&self, function_name: impl Into<String>) -> CallBuilder<'_> {
        MockCall::builder(function_name, &self.values)
    }

    /// Registers an expectation, taking ownership of `call`.
    ///
    /// On growth failure the registry keeps its prior state and the call is
    /// handed back inside the error.
    pub fn expect(&mut self, call: MockCall) -> Result<(), RejectedCall> {
        let result = self.expected.push(call);
        match &result {
            Ok(()) => tracing::debug!(
                outstanding = self.expected.len(),
                "expectation registered"
            ),
            Err(rejected) => tracing::warn!(
                function = rejected.call.function_name(),
                error = %rejected.error,
                "expectation refused"
            ),
        }
        result
    }

    /// Reports an observed call and classifies it.
    ///
    /// Outstanding expectations are scanned in strict registration order;
    /// the first one equal to `call` is consumed: removed from the expected
    /// registry (order of the rest preserved) and returned so the caller can
    /// read its captured state, while the observed call itself is dropped.
    /// Among several equal expectations the earliest-registered one is
    /// always consumed first.
    ///
    /// With no match, `call` is appended to the actual registry and
    /// `Ok(None)` is returned: an unexpected call, which is a diagnostic
    /// outcome, not an error.
    ///
    /// The match path performs no allocation. Only the unexpected-call
    /// append can fail, and a failing equality capability during the scan
    /// propagates; in both cases the observed call comes back inside the
    /// error.
    pub fn observe(&mut self, call: MockCall) -> Result<Option<MockCall>, RejectedCall> {
        let mut matched_index = None;
        for (index, candidate) in self.expected.iter().enumerate() {
            match candidate.matches(&call) {
                Ok(true) => {
                    matched_index = Some(index);
                    break;
                }
                Ok(false) => {}
                Err(error) => return Err(RejectedCall::new(call, error)),
            }
        }

        match matched_index {
            Some(index) => {
                let matched = self.expected.remove(index);
                tracing::debug!(
                    function = matched.function_name(),
                    outstanding = self.expected.len(),
                    "expectation satisfied"
                );
                Ok(Some(matched))
            }
            None => {
                tracing::warn!(function = call.function_name(), "unexpected call");
                self.actual.push(call)?;
                Ok(None)
            }
        }
    }

    /// Drops every call in both registries and releases their storage.
    ///
    /// Callable at teardown or between tests; repeatable, and safe on an
    /// already-empty session.
    pub fn reset_all_calls(&mut self) {
        self.expected.reset();
        self.actual.reset();
        tracing::debug!("all calls reset");
    }

    /// The most recently registered still-outstanding expectation, without
    /// removal.
    ///
    /// "Most recent" is registration order among the currently-outstanding
    /// set: consuming earlier expectations does not change which call this
    /// returns. The usual use is attaching follow-up state right after
    /// registering, e.g. an injected return value:
    ///
    /// ```
    /// use callmock::MockSession;
    ///
    /// let mut session = MockSession::new();
    /// let call = session.new_call("read_temperature").build();
    /// session.expect(call).unwrap();
    /// session.last_expected().unwrap().set_return(21_i32);
    ///
    /// let observed = session.new_call("read_temperature").build();
    /// let matched = session.observe(observed).unwrap().unwrap();
    /// assert_eq!(matched.return_value::<i32>(), Some(&21));
    /// ```
    pub fn last_expected(&mut self) -> Option<&mut MockCall> {
        self.expected.last_mut()
    }

    /// Number of outstanding expectations.
    pub fn outstanding_expected(&self) -> usize {
        self.expected.len()
    }

    /// Number of recorded unexpected calls.
    pub fn unexpected_calls(&self) -> usize {
        self.actual.len()
    }

    /// Diagnostic text for the outstanding expectations, in registration
    /// order.
    ///
    /// An empty registry renders as `Ok("")`; an `Err` means the report is
    /// unavailable, never that the calls matched.
    pub fn expected_calls_text(&mut self) -> Result<String, MockError> {
        self.expected.render()
    }

    /// Diagnostic text for the unexpected calls, in observation order.
    pub fn actual_calls_text(&mut self) -> Result<String, MockError> {
        self.actual.render()
    }

    /// Renders both diagnostic texts and the derived pass/fail signal.
    ///
    /// Either render failing fails the whole report.
    pub fn report(&mut self) -> Result<CallComparison, MockError> {
        let expected = self.expected.render()?;
        let actual = self.actual.render()?;
        Ok(CallComparison { expected, actual })
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Both diagnostic texts for one test, compared as plain text.
///
/// Equal texts are the pass signal: every expectation was consumed and no
/// unexpected call was recorded, so both sides render empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallComparison {
    /// Rendering of the outstanding expectations.
    pub expected: String,
    /// Rendering of the unexpected calls.
    pub actual: String,
}

impl CallComparison {
    /// True if the expected and actual texts are equal.
    pub fn is_match(&self) -> bool {
        self.expected == self.actual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unary(session: &MockSession, name: &str, arg: i32) -> MockCall {
        session
            .new_call(name)
            .with_arg("i32", arg)
            .unwrap()
            .build()
    }

    #[test]
    fn test_observe_consumes_matching_expectation() {
        let mut session = MockSession::new();
        let call = unary(&session, "read", 7);
        session.expect(call).unwrap();

        let matched = session.observe(unary(&session, "read", 7)).unwrap();
        assert!(matched.is_some());
        assert_eq!(session.outstanding_expected(), 0);
        assert_eq!(session.unexpected_calls(), 0);
    }

    #[test]
    fn test_observe_spills_unexpected_call() {
        let mut session = MockSession::new();
        let matched = session.observe(unary(&session, "read", 7)).unwrap();
        assert!(matched.is_none());
        assert_eq!(session.unexpected_calls(), 1);
        assert_eq!(session.actual_calls_text().unwrap(), "[read(7)]");
    }

    #[test]
    fn test_observe_consumes_earliest_equal_expectation() {
        let mut session = MockSession::new();
        for tag in [1_i32, 2] {
            let call = unary(&session, "poll", 0);
            session.expect(call).unwrap();
            session.last_expected().unwrap().set_return(tag);
        }

        let first = session.observe(unary(&session, "poll", 0)).unwrap().unwrap();
        assert_eq!(first.return_value::<i32>(), Some(&1));
        let second = session.observe(unary(&session, "poll", 0)).unwrap().unwrap();
        assert_eq!(second.return_value::<i32>(), Some(&2));
        assert_eq!(session.outstanding_expected(), 0);
    }

    #[test]
    fn test_match_preserves_order_of_remaining_expectations() {
        let mut session = MockSession::new();
        for (name, arg) in [("a", 1), ("b", 2), ("c", 3)] {
            let call = unary(&session, name, arg);
            session.expect(call).unwrap();
        }

        session.observe(unary(&session, "b", 2)).unwrap().unwrap();
        assert_eq!(session.expected_calls_text().unwrap(), "[a(1)][c(3)]");
    }

    #[test]
    fn test_last_expected_is_append_order_among_outstanding() {
        let mut session = MockSession::new();
        for (name, arg) in [("a", 1), ("b", 2)] {
            let call = unary(&session, name, arg);
            session.expect(call).unwrap();
        }

        // Consuming the earlier expectation leaves "b" the most recently
        // appended outstanding one.
        session.observe(unary(&session, "a", 1)).unwrap().unwrap();
        assert_eq!(session.last_expected().unwrap().function_name(), "b");
    }

    #[test]
    fn test_last_expected_empty() {
        let mut session = MockSession::new();
        assert!(session.last_expected().is_none());
    }

    #[test]
    fn test_reset_all_calls_is_idempotent() {
        let mut session = MockSession::new();
        let call = unary(&session, "read", 7);
        session.expect(call).unwrap();
        session.observe(unary(&session, "write", 8)).unwrap();

        session.reset_all_calls();
        assert_eq!(session.outstanding_expected(), 0);
        assert_eq!(session.unexpected_calls(), 0);

        session.reset_all_calls();
        let report = session.report().unwrap();
        assert!(report.is_match());
        assert_eq!(report.expected, "");
    }

    #[test]
    fn test_expect_capacity_rejection_hands_call_back() {
        let mut session =
            MockSession::with_config(SessionConfig::new().with_max_expected_calls(1));
        let call = unary(&session, "a", 1);
        session.expect(call).unwrap();

        let rejected = session.expect(unary(&session, "b", 2)).unwrap_err();
        assert!(rejected.error.is_growth_failure());
        assert_eq!(rejected.call.function_name(), "b");
        // Prior state is intact and still matchable.
        assert_eq!(session.outstanding_expected(), 1);
        assert_eq!(session.expected_calls_text().unwrap(), "[a(1)]");
    }

    #[test]
    fn test_observe_unexpected_capacity_rejection_hands_call_back() {
        let mut session =
            MockSession::with_config(SessionConfig::new().with_max_actual_calls(0));
        let rejected = session.observe(unary(&session, "read", 7)).unwrap_err();
        assert!(rejected.error.is_growth_failure());
        assert_eq!(rejected.call.function_name(), "read");
        assert_eq!(session.unexpected_calls(), 0);
    }

    #[test]
    fn test_report_pass_and_fail() {
        let mut session = MockSession::new();
        let call = unary(&session, "read", 7);
        session.expect(call).unwrap();

        let failing = session.report().unwrap();
        assert!(!failing.is_match());
        assert_eq!(failing.expected, "[read(7)]");
        assert_eq!(failing.actual, "");

        session.observe(unary(&session, "read", 7)).unwrap().unwrap();
        let passing = session.report().unwrap();
        assert!(passing.is_match());
    }

    #[test]
    fn test_render_failure_is_report_unavailable() {
        use std::any::Any;
        use std::sync::Arc;

        use crate::values::ValueType;

        /// Capability that compares but cannot stringify.
        struct Opaque;

        impl ValueType for Opaque {
            fn key(&self) -> &str {
                "opaque"
            }
            fn equals(&self, _left: &dyn Any, _right: &dyn Any) -> Result<bool, MockError> {
                Ok(true)
            }
            fn stringify(&self, _value: &dyn Any) -> Result<String, MockError> {
                Err(MockError::capability("opaque", "no text form"))
            }
        }

        let mut session = MockSession::new();
        session.value_types().register(Arc::new(Opaque));

        let call = session
            .new_call("send")
            .with_arg("opaque", 0_u8)
            .unwrap()
            .build();
        session.expect(call).unwrap();

        // The report is unavailable, which is not the same as empty.
        assert!(session.expected_calls_text().is_err());
        assert!(session.report().is_err());
        assert_eq!(session.actual_calls_text().unwrap(), "");
    }

    #[test]
    fn test_observe_propagates_capability_failure() {
        use std::any::Any;
        use std::sync::Arc;

        use crate::values::ValueType;

        /// Capability whose equality always fails.
        struct Broken;

        impl ValueType for Broken {
            fn key(&self) -> &str {
                "broken"
            }
            fn equals(&self, _left: &dyn Any, _right: &dyn Any) -> Result<bool, MockError> {
                Err(MockError::capability("broken", "comparison unavailable"))
            }
            fn stringify(&self, _value: &dyn Any) -> Result<String, MockError> {
                Ok("?".to_string())
            }
        }

        let mut session = MockSession::new();
        session.value_types().register(Arc::new(Broken));

        let expected = session
            .new_call("probe")
            .with_arg("broken", 0_u8)
            .unwrap()
            .build();
        session.expect(expected).unwrap();

        let observed = session
            .new_call("probe")
            .with_arg("broken", 0_u8)
            .unwrap()
            .build();
        let rejected = session.observe(observed).unwrap_err();
        assert!(rejected.error.is_collaborator_failure());
        // The observed call comes back; the expectation is still outstanding.
        assert_eq!(rejected.call.function_name(), "probe");
        assert_eq!(session.outstanding_expected(), 1);
    }
}
