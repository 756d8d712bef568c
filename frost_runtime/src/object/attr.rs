//! Attribute resolution.
//!
//! Reads follow the usual lookup order for instances:
//!
//! 1. `__class__`
//! 2. a property found on the MRO (data descriptor)
//! 3. the instance dictionary
//! 4. a class attribute, with functions bound by kind
//!
//! Every bound method and property getter receives an explicit *receiver*.
//! Normally the receiver is the object itself; when the read comes through
//! a proxy the receiver is the proxy, so the method body only ever sees the
//! read-only view of `self`.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::class::PyClass;
use crate::object::{TypeRef, Value};
use crate::proxy::classify::AccessKind;
use crate::types::builtin_method;
use crate::types::function::{BoundMethod, Function, FunctionKind};
use std::sync::Arc;

/// Bind a class attribute to `receiver` according to its kind.
///
/// `class` is the receiver's runtime class, the binding target of class
/// methods.
pub(crate) fn bind(value: Value, receiver: &Value, class: &Arc<PyClass>) -> Value {
    match value {
        Value::Function(f) => match f.kind() {
            FunctionKind::Method => bound(receiver.clone(), f),
            FunctionKind::ClassMethod => bound(class_receiver(class, receiver), f),
            FunctionKind::Static => Value::Function(f),
        },
        other => other,
    }
}

/// What a class method reads as `cls`. Behind a proxy the class is only
/// reachable through a read-only view.
pub(crate) fn class_receiver(class: &Arc<PyClass>, receiver: &Value) -> Value {
    match receiver {
        Value::Proxy(p) => p.wrap(Value::Class(class.clone())),
        _ => Value::Class(class.clone()),
    }
}

#[inline]
fn bound(receiver: Value, function: Arc<Function>) -> Value {
    Value::BoundMethod(Arc::new(BoundMethod::new(receiver, function)))
}

fn opt_str(s: Option<&str>) -> Value {
    s.map_or(Value::None, Value::from)
}

impl Value {
    // =========================================================================
    // Read
    // =========================================================================

    /// Read an attribute (`obj.name`).
    pub fn get_attr(&self, name: &str) -> RuntimeResult<Value> {
        self.get_attr_bound(name, self)
    }

    /// Whether `obj.name` resolves. Errors other than a missing attribute
    /// propagate.
    pub fn has_attr(&self, name: &str) -> RuntimeResult<bool> {
        match self.get_attr(name) {
            Ok(_) => Ok(true),
            Err(err) if err.is_no_such_attribute() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Read an attribute, binding methods and property getters to
    /// `receiver` instead of `self`.
    pub(crate) fn get_attr_bound(&self, name: &str, receiver: &Value) -> RuntimeResult<Value> {
        match self {
            Value::Proxy(p) => p.read(name),
            Value::Instance(inst) => {
                let class = inst.class();
                if name == "__class__" {
                    return Ok(Value::Class(class.clone()));
                }
                if let Some(prop) = class.lookup_property(name) {
                    return prop.get(receiver);
                }
                if let Some(value) = inst.get(name) {
                    return Ok(value);
                }
                match class.lookup(name) {
                    Some(value) => Ok(bind(value, receiver, class)),
                    None => Err(RuntimeError::no_such_attribute(class.name(), name)),
                }
            }
            Value::Class(class) => class_attr(class, name, receiver),
            Value::Function(f) => match name {
                "__name__" => Ok(Value::from(f.name())),
                "__qualname__" => Ok(Value::from(f.qualname())),
                "__doc__" => Ok(opt_str(f.doc())),
                _ => Err(RuntimeError::no_such_attribute("function", name)),
            },
            Value::BoundMethod(m) => match name {
                "__self__" => Ok(m.receiver().clone()),
                "__func__" => Ok(Value::Function(m.function().clone())),
                "__name__" => Ok(Value::from(m.function().name())),
                "__qualname__" => Ok(Value::from(m.function().qualname())),
                "__doc__" => Ok(opt_str(m.function().doc())),
                _ => Err(RuntimeError::no_such_attribute("method", name)),
            },
            Value::Property(p) => match name {
                "__doc__" => Ok(opt_str(p.doc())),
                _ => Err(RuntimeError::no_such_attribute("property", name)),
            },
            Value::Complex(c) => match name {
                "real" => Ok(Value::Float(c.re)),
                "imag" => Ok(Value::Float(c.im)),
                _ => Err(RuntimeError::no_such_attribute("complex", name)),
            },
            Value::Slice(s) => {
                let part = match name {
                    "start" => s.start(),
                    "stop" => s.stop(),
                    "step" => s.step(),
                    _ => return Err(RuntimeError::no_such_attribute("slice", name)),
                };
                Ok(part.map_or(Value::None, Value::Int))
            }
            other => match other.type_ref() {
                TypeRef::Builtin(ty) => builtin_method(ty, name)
                    .map(|f| bound(receiver.clone(), f))
                    .ok_or_else(|| RuntimeError::no_such_attribute(ty.name(), name)),
                TypeRef::Class(class) => Err(RuntimeError::no_such_attribute(class.name(), name)),
            },
        }
    }

    // =========================================================================
    // Write / Delete
    // =========================================================================

    /// Assign an attribute (`obj.name = value`).
    pub fn set_attr(&self, name: &str, value: Value) -> RuntimeResult<()> {
        match self {
            Value::Proxy(p) => p.write(name, value),
            Value::Instance(inst) => {
                inst.check_mutable(name, AccessKind::Write)?;
                let class = inst.class();
                if let Some(prop) = class.lookup_property(name) {
                    if prop.set(self, value)? {
                        return Ok(());
                    }
                    return Err(RuntimeError::AttributeError(format!(
                        "property '{name}' of '{}' object has no setter",
                        class.name()
                    )));
                }
                inst.set(name, value)
            }
            Value::Class(class) => {
                class.dict().set(name, value);
                Ok(())
            }
            other => Err(read_only_builtin(other, name)),
        }
    }

    /// Delete an attribute (`del obj.name`).
    pub fn del_attr(&self, name: &str) -> RuntimeResult<()> {
        match self {
            Value::Proxy(p) => p.delete(name),
            Value::Instance(inst) => {
                inst.check_mutable(name, AccessKind::Delete)?;
                let class = inst.class();
                if let Some(prop) = class.lookup_property(name) {
                    if prop.delete(self)? {
                        return Ok(());
                    }
                    return Err(RuntimeError::AttributeError(format!(
                        "property '{name}' of '{}' object has no deleter",
                        class.name()
                    )));
                }
                inst.delete(name)
            }
            Value::Class(class) => match class.dict().delete(name) {
                Some(_) => Ok(()),
                None => Err(RuntimeError::AttributeError(format!(
                    "type object '{}' has no attribute '{name}'",
                    class.name()
                ))),
            },
            other => Err(read_only_builtin(other, name)),
        }
    }
}

/// Builtin objects have no instance dictionary.
fn read_only_builtin(value: &Value, name: &str) -> RuntimeError {
    let ty = value.kind_name();
    if value.has_attr(name).unwrap_or(false) {
        RuntimeError::AttributeError(format!("'{ty}' object attribute '{name}' is read-only"))
    } else {
        RuntimeError::no_such_attribute(ty, name)
    }
}

/// Attribute read on a class object. Class methods bind to `receiver` when
/// it is a proxy over the class.
fn class_attr(class: &Arc<PyClass>, name: &str, receiver: &Value) -> RuntimeResult<Value> {
    match name {
        "__name__" => return Ok(Value::from(class.name())),
        "__doc__" => return Ok(opt_str(class.doc())),
        "__mro__" => return Ok(Value::tuple(class.mro().map(Value::Class).collect())),
        "__bases__" => {
            return Ok(Value::tuple(
                class.bases().iter().cloned().map(Value::Class).collect(),
            ));
        }
        _ => {}
    }
    match class.lookup(name) {
        Some(Value::Function(f)) if f.kind() == FunctionKind::ClassMethod => {
            let cls = match receiver {
                Value::Proxy(_) => receiver.clone(),
                _ => Value::Class(class.clone()),
            };
            Ok(bound(cls, f))
        }
        Some(value) => Ok(value),
        None => Err(RuntimeError::AttributeError(format!(
            "type object '{}' has no attribute '{name}'",
            class.name()
        ))),
    }
}
