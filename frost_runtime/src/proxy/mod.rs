//! Deep read-only proxies.
//!
//! A [`Proxy`] holds a shared reference to a real object and a
//! [`ProxyShape`] describing which members it exposes. Every member access
//! is classified first ([`classify`]): writes and deletes are rejected,
//! reads and calls are forwarded to the target, and whatever comes back is
//! passed through the registry's deep-wrap ([`deep::wrap`]) before the
//! caller sees it.
//!
//! Two shape families exist:
//!
//! - [`ObjectShape`]: the generic wrapper. Exposes every member and binds
//!   methods to the proxy itself, so a method body only ever sees `self`
//!   through the read-only view.
//! - [`ExposedShape`]: container wrappers. Expose a fixed set of read-only
//!   methods; anything else is reported missing.
//!
//! ```text
//! wrap(a).b.back.x = 1
//!   wrap(a)   -> ImmutableProxy[A]
//!   .b        -> read, deep-wrap -> ImmutableProxy[B]
//!   .back     -> read, deep-wrap -> ImmutableProxy[A]
//!   .x = 1    -> write -> ConstantAttributeError
//! ```

pub mod classify;
pub mod copy;
pub mod deep;
pub mod registry;

use crate::error::{ConstantAttributeError, RuntimeError, RuntimeResult};
use crate::object::ops::{no_item_assignment, no_item_deletion};
use crate::object::repr::limited_repr;
use crate::object::{TypeRef, Value};
use crate::proxy::classify::{AccessDecision, AccessKind, classify};
use crate::proxy::registry::ProxyRegistry;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

// =============================================================================
// Shapes
// =============================================================================

/// The exposed surface of a proxy.
pub trait ProxyShape: Send + Sync {
    /// Name shown in `repr` and error messages (`ImmutableProxy`, `ListProxy`).
    fn name(&self) -> &str;

    /// Whether `member` is visible through the proxy.
    fn exposes(&self, member: &str) -> bool;

    /// Whether methods and special methods run with the proxy as `self`.
    ///
    /// When false they run against the target, which is only sound when
    /// every exposed member is read-only.
    fn binds_to_wrapper(&self) -> bool {
        true
    }
}

/// Shape of the generic object wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectShape;

impl ObjectShape {
    /// Shared instance.
    pub fn shared() -> Arc<dyn ProxyShape> {
        static SHAPE: OnceLock<Arc<dyn ProxyShape>> = OnceLock::new();
        SHAPE.get_or_init(|| Arc::new(ObjectShape)).clone()
    }
}

impl ProxyShape for ObjectShape {
    fn name(&self) -> &str {
        "ImmutableProxy"
    }

    #[inline]
    fn exposes(&self, _member: &str) -> bool {
        true
    }
}

/// A shape exposing a fixed set of read-only members.
#[derive(Debug, Clone)]
pub struct ExposedShape {
    name: Arc<str>,
    members: FxHashSet<Arc<str>>,
}

impl ExposedShape {
    /// Create a shape named `name` exposing `members`.
    pub fn new(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            members: members.iter().map(|&m| Arc::from(m)).collect(),
        }
    }

    /// Exposed member names, sorted.
    pub fn members(&self) -> Vec<Arc<str>> {
        let mut members: Vec<_> = self.members.iter().cloned().collect();
        members.sort();
        members
    }
}

impl ProxyShape for ExposedShape {
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn exposes(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    fn binds_to_wrapper(&self) -> bool {
        false
    }
}

// =============================================================================
// Proxy
// =============================================================================

/// A read-only view over a value.
pub struct Proxy {
    target: Value,
    shape: Arc<dyn ProxyShape>,
    registry: Arc<ProxyRegistry>,
}

impl Proxy {
    /// Wrap `target` with `shape`.
    ///
    /// A proxy target is unwrapped first, so proxies never nest.
    pub fn new(target: Value, shape: Arc<dyn ProxyShape>, registry: Arc<ProxyRegistry>) -> Value {
        let target = match target {
            Value::Proxy(p) => p.target.clone(),
            other => other,
        };
        Value::Proxy(Arc::new(Self {
            target,
            shape,
            registry,
        }))
    }

    /// The wrapped object.
    #[inline]
    pub fn target(&self) -> &Value {
        &self.target
    }

    #[inline]
    pub fn shape(&self) -> &Arc<dyn ProxyShape> {
        &self.shape
    }

    #[inline]
    pub fn shape_name(&self) -> &str {
        self.shape.name()
    }

    /// Registry used to wrap values leaving this proxy.
    #[inline]
    pub fn registry(&self) -> &Arc<ProxyRegistry> {
        &self.registry
    }

    /// `<Shape>[<TargetType>]`, the owner named in rejection errors.
    pub fn display_name(&self) -> String {
        format!("{}[{}]", self.shape.name(), self.target.type_ref().name())
    }

    /// Deep-wrap a value on its way out of this proxy.
    #[inline]
    pub fn wrap(&self, value: Value) -> Value {
        deep::wrap(&self.registry, &value)
    }

    /// What special methods of the target are bound to.
    fn receiver(self: &Arc<Self>) -> Value {
        if self.shape.binds_to_wrapper() {
            Value::Proxy(self.clone())
        } else {
            self.target.clone()
        }
    }

    fn reject(&self, name: &str, kind: AccessKind) -> RuntimeError {
        let owner = self.display_name();
        debug!(owner = %owner, attr = name, kind = kind.verb(), "mutation rejected");
        ConstantAttributeError {
            owner,
            type_name: self.target.type_ref().name().to_string(),
            attr: name.to_string(),
            kind,
        }
        .into()
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// `proxy.name`.
    pub fn read(self: &Arc<Self>, name: &str) -> RuntimeResult<Value> {
        match classify(self.shape.as_ref(), name, AccessKind::Read) {
            AccessDecision::Forward => {
                let value = self.target.get_attr_bound(name, &self.receiver())?;
                Ok(self.wrap(value))
            }
            AccessDecision::Absent => {
                Err(RuntimeError::no_such_attribute(self.shape.name(), name))
            }
            AccessDecision::Reject => Err(self.reject(name, AccessKind::Read)),
        }
    }

    /// `proxy.name = value`. Always rejected.
    pub fn write(self: &Arc<Self>, name: &str, _value: Value) -> RuntimeResult<()> {
        Err(self.reject(name, AccessKind::Write))
    }

    /// `del proxy.name`. Always rejected.
    pub fn delete(self: &Arc<Self>, name: &str) -> RuntimeResult<()> {
        Err(self.reject(name, AccessKind::Delete))
    }

    // =========================================================================
    // Protocols
    // =========================================================================

    /// `proxy(*args)`.
    pub fn call(self: &Arc<Self>, args: &[Value]) -> RuntimeResult<Value> {
        match classify(self.shape.as_ref(), "__call__", AccessKind::Call) {
            AccessDecision::Forward => {
                let result = self.target.call_as(args, &self.receiver())?;
                Ok(self.wrap(result))
            }
            _ => Err(RuntimeError::type_error(format!(
                "'{}' object is not callable",
                self.shape.name()
            ))),
        }
    }

    /// `proxy[key]`.
    pub fn get_item(self: &Arc<Self>, key: &Value) -> RuntimeResult<Value> {
        let item = self.target.get_item_as(key, &self.receiver())?;
        Ok(self.wrap(item))
    }

    /// `proxy[key] = value`. Always a type error.
    pub fn set_item(self: &Arc<Self>, _key: &Value, _value: Value) -> RuntimeResult<()> {
        Err(no_item_assignment(&Value::Proxy(self.clone())))
    }

    /// `del proxy[key]`. Always a type error.
    pub fn del_item(self: &Arc<Self>, _key: &Value) -> RuntimeResult<()> {
        Err(no_item_deletion(&Value::Proxy(self.clone())))
    }

    pub fn len(self: &Arc<Self>) -> RuntimeResult<usize> {
        self.target.len_as(&self.receiver())
    }

    /// Items of the target, each deep-wrapped.
    pub fn iter(self: &Arc<Self>) -> RuntimeResult<Vec<Value>> {
        let items = self.target.iter_as(&self.receiver())?;
        Ok(items.into_iter().map(|item| self.wrap(item)).collect())
    }

    pub fn contains(self: &Arc<Self>, item: &Value) -> RuntimeResult<bool> {
        self.target.contains_as(item, &self.receiver())
    }

    pub fn truthy(self: &Arc<Self>) -> RuntimeResult<bool> {
        self.target.truthy_as(&self.receiver())
    }

    /// Equality of the target with `other` (itself unwrapped if a proxy).
    pub fn eq(self: &Arc<Self>, other: &Value) -> RuntimeResult<bool> {
        self.target.eq_as(other, &self.receiver())
    }

    /// `<Shape>(<limited repr of target>)`.
    ///
    /// Rendering runs against the target so nested values print as they do
    /// on the real object.
    pub fn repr(&self) -> RuntimeResult<String> {
        let inner = limited_repr(&self.target, &self.registry.config().repr)?;
        Ok(format!("{}({inner})", self.shape.name()))
    }

    /// The target's own `str`.
    pub fn str(&self) -> RuntimeResult<String> {
        self.target.py_str()
    }

    /// `format(proxy, spec)`, with a user `__format__` bound like any
    /// other method.
    pub fn format(self: &Arc<Self>, spec: &str) -> RuntimeResult<String> {
        self.target.format_as(spec, &self.receiver())
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("shape", &self.shape.name())
            .field("target_type", &self.target.type_ref().name())
            .finish()
    }
}

// =============================================================================
// Type Introspection
// =============================================================================

/// Runtime type of `value`, looking through a proxy to its target.
#[inline]
pub fn get_type(value: &Value) -> TypeRef {
    value.type_ref()
}

/// Whether the (unwrapped) type of `value` is `ty` or derives from it.
pub fn is_instance(value: &Value, ty: &TypeRef) -> bool {
    value.type_ref().is_subtype(ty)
}

// =============================================================================
// Tests
// =============================================================================
