//! Recorded calls and their construction.
//!
//! A [`MockCall`] records one invocation: a function name plus typed
//! argument payloads. The per-type capabilities used to compare and render
//! the payloads are resolved from a [`ValueTypeRegistry`] while the call is
//! built, so an unregistered argument type fails at construction time rather
//! than surfacing later inside a comparison.
//!
//! Equality is identity-independent: two calls are equal iff their function
//! names and every argument value compare equal under the registered
//! capabilities. A call stringifies as one bracketed unit, e.g.
//! `[transfer(42,"savings")]`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::MockError;
use crate::values::{ValueType, ValueTypeRegistry};

/// One recorded argument: the type key, the opaque payload, and the
/// capability resolved for it.
struct CallArg {
    type_key: String,
    value: Box<dyn Any + Send>,
    capability: Arc<dyn ValueType>,
}

impl fmt::Debug for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallArg").field("type_key", &self.type_key).finish()
    }
}

/// One recorded call: a function name, its typed arguments, and an optional
/// injected return payload.
///
/// A call is exclusively owned: by the builder, then by a registry slot, and
/// finally by whoever consumes it. Releasing it is its `Drop`.
///
/// # Examples
///
/// ```
/// use callmock::{MockCall, ValueTypeRegistry};
///
/// let values = ValueTypeRegistry::with_native_types();
/// let call = MockCall::builder("transfer", &values)
///     .with_arg("u64", 42_u64)
///     .unwrap()
///     .with_arg("str", String::from("savings"))
///     .unwrap()
///     .build();
///
/// assert_eq!(call.function_name(), "transfer");
/// assert_eq!(call.arg_count(), 2);
/// assert_eq!(call.render().unwrap(), "[transfer(42,\"savings\")]");
/// ```
pub struct MockCall {
    function_name: String,
    args: Vec<CallArg>,
    return_value: Option<Box<dyn Any + Send>>,
}

impl MockCall {
    /// Starts building a call, resolving argument capabilities from `values`.
    pub fn builder<'a>(
        function_name: impl Into<String>,
        values: &'a ValueTypeRegistry,
    ) -> CallBuilder<'a> {
        CallBuilder {
            values,
            function_name: function_name.into(),
            args: Vec::new(),
        }
    }

    /// Returns the recorded function name.
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Returns the number of recorded arguments.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Attaches an injected return payload to this call.
    ///
    /// Typically set on the most recent expectation after registering it, and
    /// read back from the matched expectation by the instrumentation layer.
    pub fn set_return<T: Any + Send>(&mut self, value: T) {
        self.return_value = Some(Box::new(value));
    }

    /// Reads the injected return payload, if one of type `T` was attached.
    pub fn return_value<T: Any>(&self) -> Option<&T> {
        self.return_value.as_ref().and_then(|value| value.downcast_ref::<T>())
    }

    /// Value equality against another recorded call.
    ///
    /// Names, argument counts, argument type keys, and every argument value
    /// must agree. A failing equality capability propagates as an error; the
    /// injected return payload does not participate in equality.
    pub fn matches(&self, other: &MockCall) -> Result<bool, MockError> {
        if self.function_name != other.function_name || self.args.len() != other.args.len() {
            return Ok(false);
        }
        for (left, right) in self.args.iter().zip(other.args.iter()) {
            if left.type_key != right.type_key {
                return Ok(false);
            }
            let equal = left
                .capability
                .equals(left.value.as_ref(), right.value.as_ref())?;
            if !equal {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Renders this call as one bracketed diagnostic unit.
    ///
    /// The unit carries its own delimiters, so concatenating rendered calls
    /// needs no further separator. Any argument capability failure fails the
    /// whole rendering.
    pub fn render(&self) -> Result<String, MockError> {
        let mut out = String::new();
        out.push('[');
        out.push_str(&self.function_name);
        out.push('(');
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            out.push_str(&arg.capability.stringify(arg.value.as_ref())?);
        }
        out.push_str(")]");
        Ok(out)
    }
}

impl fmt::Debug for MockCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCall")
            .field("function_name", &self.function_name)
            .field("args", &self.args)
            .field("has_return", &self.return_value.is_some())
            .finish()
    }
}

/// Builder recording one call against a value-type registry.
///
/// Created by [`MockCall::builder`] or
/// [`MockSession::new_call`](crate::MockSession::new_call).
#[derive(Debug)]
pub struct CallBuilder<'a> {
    values: &'a ValueTypeRegistry,
    function_name: String,
    args: Vec<CallArg>,
}

impl<'a> CallBuilder<'a> {
    /// Appends one typed argument.
    ///
    /// The capability for `type_key` is resolved now; an unregistered key is
    /// a collaborator failure and consumes the builder.
    pub fn with_arg<T: Any + Send>(
        mut self,
        type_key: impl Into<String>,
        value: T,
    ) -> Result<Self, MockError> {
        let type_key = type_key.into();
        let capability = self.values.lookup(&type_key)?;
        self.args.push(CallArg {
            type_key,
            value: Box::new(value),
            capability,
        });
        Ok(self)
    }

    /// Finishes the builder, producing an owned call.
    pub fn build(self) -> MockCall {
        MockCall {
            function_name: self.function_name,
            args: self.args,
            return_value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> ValueTypeRegistry {
        ValueTypeRegistry::with_native_types()
    }

    fn call(values: &ValueTypeRegistry, name: &str, arg: i32) -> MockCall {
        MockCall::builder(name, values)
            .with_arg("i32", arg)
            .unwrap()
            .build()
    }

    #[test]
    fn test_builder_records_name_and_args() {
        let values = values();
        let call = MockCall::builder("read", &values)
            .with_arg("i32", 7)
            .unwrap()
            .with_arg("str", String::from("buf"))
            .unwrap()
            .build();
        assert_eq!(call.function_name(), "read");
        assert_eq!(call.arg_count(), 2);
    }

    #[test]
    fn test_builder_unregistered_type() {
        let values = ValueTypeRegistry::new();
        let error = MockCall::builder("read", &values)
            .with_arg("i32", 7)
            .unwrap_err();
        assert!(matches!(error, MockError::UnregisteredType { .. }));
    }

    #[test]
    fn test_matches_equal_calls() {
        let values = values();
        let left = call(&values, "read", 7);
        let right = call(&values, "read", 7);
        assert!(left.matches(&right).unwrap());
        assert!(right.matches(&left).unwrap());
    }

    #[test]
    fn test_matches_rejects_name_mismatch() {
        let values = values();
        assert!(!call(&values, "read", 7).matches(&call(&values, "write", 7)).unwrap());
    }

    #[test]
    fn test_matches_rejects_value_mismatch() {
        let values = values();
        assert!(!call(&values, "read", 7).matches(&call(&values, "read", 8)).unwrap());
    }

    #[test]
    fn test_matches_rejects_arity_mismatch() {
        let values = values();
        let unary = call(&values, "read", 7);
        let nullary = MockCall::builder("read", &values).build();
        assert!(!unary.matches(&nullary).unwrap());
    }

    #[test]
    fn test_matches_rejects_type_key_mismatch() {
        let values = values();
        let as_i32 = MockCall::builder("read", &values)
            .with_arg("i32", 7_i32)
            .unwrap()
            .build();
        let as_i64 = MockCall::builder("read", &values)
            .with_arg("i64", 7_i64)
            .unwrap()
            .build();
        assert!(!as_i32.matches(&as_i64).unwrap());
    }

    #[test]
    fn test_matches_ignores_return_payload() {
        let values = values();
        let mut left = call(&values, "read", 7);
        left.set_return(99_i32);
        let right = call(&values, "read", 7);
        assert!(left.matches(&right).unwrap());
    }

    #[test]
    fn test_render_format() {
        let values = values();
        let call = MockCall::builder("transfer", &values)
            .with_arg("u64", 42_u64)
            .unwrap()
            .with_arg("str", String::from("savings"))
            .unwrap()
            .build();
        assert_eq!(call.render().unwrap(), "[transfer(42,\"savings\")]");
    }

    #[test]
    fn test_render_nullary() {
        let values = values();
        let call = MockCall::builder("ping", &values).build();
        assert_eq!(call.render().unwrap(), "[ping()]");
    }

    #[test]
    fn test_return_payload_round_trip() {
        let values = values();
        let mut call = call(&values, "read", 7);
        assert_eq!(call.return_value::<i32>(), None);

        call.set_return(512_usize);
        assert_eq!(call.return_value::<usize>(), Some(&512));
        // Wrong type reads back as absent.
        assert_eq!(call.return_value::<String>(), None);
    }
}
