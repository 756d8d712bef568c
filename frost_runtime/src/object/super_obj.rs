//! `super()` lookups.
//!
//! `super` searches the MRO of the bound object's type starting *after* the
//! specified class, which is what makes cooperative `__init__` chains work.
//!
//! The bound object may be a proxy. Its MRO is then the wrapped object's,
//! methods found stay bound to the proxy, and any other value found is
//! wrapped by the proxy's registry before it is returned.
//!
//! ```text
//! class D(B, C)           MRO: [D, B, C, A]
//! super(B, d).method  →   searches [C, A]
//! ```

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::attr::class_receiver;
use crate::object::class::PyClass;
use crate::object::{TypeRef, Value};
use crate::types::function::{BoundMethod, FunctionKind};
use std::sync::Arc;

/// The kind of object-to-type binding for super().
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperBinding {
    /// `super(type, obj)` where `obj` is an instance of `type`.
    Instance,
    /// `super(type, type2)` where `type2` is a subclass of `type`.
    Type,
}

/// A bound `super` object.
#[derive(Debug, Clone)]
pub struct SuperObject {
    this_type: Arc<PyClass>,
    obj: Value,
    obj_type: Arc<PyClass>,
    binding: SuperBinding,
}

impl SuperObject {
    /// Bind `super(this_type, obj)`.
    pub fn new(this_type: &Arc<PyClass>, obj: Value) -> RuntimeResult<Self> {
        let (obj_type, binding) = match obj.unwrap_proxy() {
            Value::Class(c) => (c.clone(), SuperBinding::Type),
            other => match other.type_ref() {
                TypeRef::Class(c) => (c, SuperBinding::Instance),
                TypeRef::Builtin(_) => return Err(not_bound(this_type)),
            },
        };
        if !obj_type.is_subclass(this_type) {
            return Err(not_bound(this_type));
        }
        Ok(Self {
            this_type: this_type.clone(),
            obj,
            obj_type,
            binding,
        })
    }

    #[inline]
    pub fn binding(&self) -> SuperBinding {
        self.binding
    }

    /// Look up `name` in the MRO after `this_type` and bind it.
    pub fn get_attr(&self, name: &str) -> RuntimeResult<Value> {
        let found = self
            .obj_type
            .mro()
            .skip_while(|c| c.id() != self.this_type.id())
            .skip(1)
            .find_map(|c| c.dict().get(name))
            .ok_or_else(|| RuntimeError::no_such_attribute("super", name))?;

        let value = match (found, self.binding) {
            (Value::Property(p), SuperBinding::Instance) => p.get(&self.obj)?,
            (Value::Function(f), binding) => match (f.kind(), binding) {
                (FunctionKind::Method, SuperBinding::Instance) => {
                    Value::BoundMethod(Arc::new(BoundMethod::new(self.obj.clone(), f)))
                }
                (FunctionKind::ClassMethod, binding) => {
                    let cls = match (&self.obj, binding) {
                        (Value::Proxy(_), SuperBinding::Type) => self.obj.clone(),
                        _ => class_receiver(&self.obj_type, &self.obj),
                    };
                    Value::BoundMethod(Arc::new(BoundMethod::new(cls, f)))
                }
                _ => Value::Function(f),
            },
            (other, _) => other,
        };

        Ok(match &self.obj {
            Value::Proxy(p) => p.wrap(value),
            _ => value,
        })
    }

    /// `super(this_type, obj).name(*args)`.
    pub fn call_method(&self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        self.get_attr(name)?.call(args)
    }
}

fn not_bound(this_type: &PyClass) -> RuntimeError {
    RuntimeError::type_error(format!(
        "super(type, obj): obj must be an instance or subtype of type '{}'",
        this_type.name()
    ))
}

/// Shorthand for `super(class, receiver).name(*args)`.
pub fn super_call(
    class: &Arc<PyClass>,
    receiver: &Value,
    name: &str,
    args: &[Value],
) -> RuntimeResult<Value> {
    SuperObject::new(class, receiver.clone())?.call_method(name, args)
}
