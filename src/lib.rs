//! # callmock
//!
//! Call-recording and call-matching core for mock-object testing.
//!
//! This crate is the bookkeeping heart of a mock framework: it verifies that
//! a unit under test issues an expected sequence of function calls with
//! expected arguments. Test setup registers *expected calls*; instrumentation
//! in the code under test reports *actual calls*; each observation either
//! consumes the earliest matching outstanding expectation or is recorded as
//! unexpected; and at teardown both registries render to diagnostic text
//! whose plain-text equality is the pass/fail signal.
//!
//! ## Key behaviors
//!
//! - **In-order matching**: expectations are scanned in registration order
//!   and the first equal one is consumed, so registering calls in a
//!   particular order implicitly asserts that order.
//! - **FIFO tie-break**: among several equal expectations, the
//!   earliest-registered is always consumed first; a later, more specific
//!   expectation is never swallowed by an earlier equal one out of turn.
//! - **All-or-nothing diagnostics**: a render either produces the complete
//!   text or fails; a truncated report is never handed out.
//! - **No hidden state**: everything lives in an explicit [`MockSession`]
//!   owned by the test harness, one per test; there are no globals, so a
//!   parallel runner isolates by construction.
//!
//! ## Getting started
//!
//! ```toml
//! [dev-dependencies]
//! callmock = "0.1"
//! ```
//!
//! ```
//! use callmock::MockSession;
//!
//! let mut session = MockSession::new();
//!
//! // Setup: expect a transfer of 42 to "savings", returning receipt 7.
//! let expected = session
//!     .new_call("transfer")
//!     .with_arg("u64", 42_u64)
//!     .unwrap()
//!     .with_arg("str", String::from("savings"))
//!     .unwrap()
//!     .build();
//! session.expect(expected).unwrap();
//! session.last_expected().unwrap().set_return(7_u32);
//!
//! // Execution: the instrumented code reports the call it makes.
//! let observed = session
//!     .new_call("transfer")
//!     .with_arg("u64", 42_u64)
//!     .unwrap()
//!     .with_arg("str", String::from("savings"))
//!     .unwrap()
//!     .build();
//! let matched = session.observe(observed).unwrap().expect("call should match");
//! assert_eq!(matched.return_value::<u32>(), Some(&7));
//!
//! // Teardown: both texts are empty, so the test passed.
//! let report = session.report().unwrap();
//! assert!(report.is_match());
//! ```
//!
//! ## Custom argument types
//!
//! Argument payloads are opaque to the core; comparing and rendering them
//! goes through per-type [`ValueType`] capabilities resolved from the
//! session's [`ValueTypeRegistry`]. The native primitives and `String` are
//! pre-registered; anything deriving `Debug` and `PartialEq` plugs in via
//! [`NativeValueType`]:
//!
//! ```
//! use std::sync::Arc;
//! use callmock::{MockSession, NativeValueType};
//!
//! #[derive(Debug, PartialEq)]
//! struct Endpoint {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut session = MockSession::new();
//! session
//!     .value_types()
//!     .register(Arc::new(NativeValueType::<Endpoint>::new("endpoint")));
//!
//! let call = session
//!     .new_call("connect")
//!     .with_arg("endpoint", Endpoint { host: "db".into(), port: 5432 })
//!     .unwrap()
//!     .build();
//! session.expect(call).unwrap();
//! ```
//!
//! ## Failure model
//!
//! All failures are explicit `Result`s; nothing panics in library code. An
//! append refused by a capacity bound or the allocator hands the call back
//! inside a [`RejectedCall`] with prior registry state untouched. A missing
//! or failing value capability propagates out of matching and rendering as a
//! [`MockError`] instead of being masked. An *unexpected call* is not an
//! error at all: it is the primary diagnostic signal, preserved in the
//! actual registry for the report.
//!
//! ## Module organization
//!
//! - [`call`]: recorded calls, the call builder, equality and rendering
//! - [`config`]: session configuration (registry capacity bounds)
//! - [`error`]: error taxonomy and the call-returning rejection wrapper
//! - [`registry`]: ordered owning call storage with diagnostic caching
//! - [`report`]: all-or-nothing concatenating renderer
//! - [`session`]: the per-test session tying it all together
//! - [`values`]: per-type value capabilities and their registry

pub mod call;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod session;
pub mod values;

// Re-export main types at crate root
pub use call::{CallBuilder, MockCall};
pub use config::SessionConfig;
pub use error::{MockError, MockResult, RegistryKind, RejectedCall};
pub use registry::CallRegistry;
pub use report::render_calls;
pub use session::{CallComparison, MockSession};
pub use values::{NativeValueType, ValueType, ValueTypeRegistry};
