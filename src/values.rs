//! Per-type value capabilities and the registry that dispenses them.
//!
//! Argument values recorded in a call are opaque to the core: comparing and
//! rendering them goes through a [`ValueType`] capability resolved from a
//! [`ValueTypeRegistry`] when the call is constructed. The registry ships
//! with capabilities for the native primitive types and owned strings; user
//! types plug in through the same [`ValueType`] trait, either via the
//! generic [`NativeValueType`] adapter or a hand-written implementation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use callmock::{NativeValueType, ValueTypeRegistry};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let mut registry = ValueTypeRegistry::with_native_types();
//! registry.register(Arc::new(NativeValueType::<Point>::new("point")));
//!
//! let capability = registry.lookup("point").unwrap();
//! let rendered = capability.stringify(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(rendered, "Point { x: 1, y: 2 }");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::MockError;

/// Capability bundle for one argument value type.
///
/// One implementation serves every value registered under its key: equality
/// for the matching algorithm and stringification for diagnostic reports.
/// Payload release is the value's own `Drop`.
///
/// Implementations must not call back into the session or its registries.
pub trait ValueType: Send + Sync {
    /// The registry key this capability serves (e.g. `"i32"`).
    fn key(&self) -> &str;

    /// Value equality for two opaque payloads of this type.
    ///
    /// Payloads of a different concrete type compare unequal; an `Err` is
    /// reserved for a genuinely failing capability and is propagated by the
    /// matcher rather than treated as inequality.
    fn equals(&self, left: &dyn Any, right: &dyn Any) -> Result<bool, MockError>;

    /// Human-readable rendering of one payload.
    fn stringify(&self, value: &dyn Any) -> Result<String, MockError>;
}

impl fmt::Debug for dyn ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueType").field("key", &self.key()).finish()
    }
}

/// Generic capability for types comparable with `PartialEq` and rendered
/// with `Debug`.
///
/// All built-in registrations go through this adapter, and user types that
/// derive `Debug` and `PartialEq` can use it directly instead of writing a
/// [`ValueType`] by hand.
pub struct NativeValueType<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> NativeValueType<T> {
    /// Creates a capability serving values of `T` under the given key.
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for NativeValueType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeValueType").field("key", &self.key).finish()
    }
}

impl<T> ValueType for NativeValueType<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn key(&self) -> &str {
        self.key
    }

    fn equals(&self, left: &dyn Any, right: &dyn Any) -> Result<bool, MockError> {
        match (left.downcast_ref::<T>(), right.downcast_ref::<T>()) {
            (Some(left), Some(right)) => Ok(left == right),
            _ => Ok(false),
        }
    }

    fn stringify(&self, value: &dyn Any) -> Result<String, MockError> {
        let value = value.downcast_ref::<T>().ok_or_else(|| {
            MockError::capability(self.key, "payload is not a value of this type")
        })?;
        Ok(format!("{value:?}"))
    }
}

/// Registry mapping a type key to the capability serving that type.
///
/// Registration is last-wins: registering a second capability under an
/// existing key replaces the first. A key can also be aliased to an existing
/// entry, sharing its capability.
#[derive(Clone, Default)]
pub struct ValueTypeRegistry {
    entries: HashMap<String, Arc<dyn ValueType>>,
}

impl ValueTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the native registrations.
    ///
    /// Covers `i8 i16 i32 i64 isize u8 u16 u32 u64 usize bool char f32 f64`
    /// under their Rust type names, and owned `String` under the key
    /// `"str"` (rendered quoted).
    pub fn with_native_types() -> Self {
        let mut registry = Self::new();
        registry.register_native_types();
        registry
    }

    /// Registers a capability under its own key, replacing any previous
    /// registration for that key.
    pub fn register(&mut self, capability: Arc<dyn ValueType>) {
        self.entries.insert(capability.key().to_string(), capability);
    }

    /// Registers an alias: `alias` resolves to the capability currently
    /// registered under `existing`.
    pub fn alias(&mut self, existing: &str, alias: impl Into<String>) -> Result<(), MockError> {
        let capability = self.lookup(existing)?;
        self.entries.insert(alias.into(), capability);
        Ok(())
    }

    /// Resolves the capability registered under `key`.
    pub fn lookup(&self, key: &str) -> Result<Arc<dyn ValueType>, MockError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| MockError::unregistered_type(key))
    }

    /// Returns true if a capability is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes every registration.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn register_native_types(&mut self) {
        self.register(Arc::new(NativeValueType::<i8>::new("i8")));
        self.register(Arc::new(NativeValueType::<i16>::new("i16")));
        self.register(Arc::new(NativeValueType::<i32>::new("i32")));
        self.register(Arc::new(NativeValueType::<i64>::new("i64")));
        self.register(Arc::new(NativeValueType::<isize>::new("isize")));
        self.register(Arc::new(NativeValueType::<u8>::new("u8")));
        self.register(Arc::new(NativeValueType::<u16>::new("u16")));
        self.register(Arc::new(NativeValueType::<u32>::new("u32")));
        self.register(Arc::new(NativeValueType::<u64>::new("u64")));
        self.register(Arc::new(NativeValueType::<usize>::new("usize")));
        self.register(Arc::new(NativeValueType::<bool>::new("bool")));
        self.register(Arc::new(NativeValueType::<char>::new("char")));
        self.register(Arc::new(NativeValueType::<f32>::new("f32")));
        self.register(Arc::new(NativeValueType::<f64>::new("f64")));
        self.register(Arc::new(NativeValueType::<String>::new("str")));
    }
}

impl fmt::Debug for ValueTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ValueTypeRegistry").field("keys", &keys).finish()
    }
}
