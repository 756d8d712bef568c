//! Generic object protocols: calling, item access, length, iteration,
//! containment, truthiness and equality.
//!
//! Each protocol has an internal `*_as` variant taking an explicit receiver.
//! For instances the receiver is what special methods (`__getitem__`,
//! `__len__`, ...) are bound to, so a proxy forwarding a protocol call keeps
//! itself as `self` inside user code.
//!
//! Container locks are never held while user code runs: iteration and
//! comparison work on snapshots.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::object::attr::bind;
use crate::object::class::PyClass;
use crate::object::hash::numeric_eq;
use crate::types::dict::key_error;
use crate::types::slice::{SliceObject, normalize_index};
use std::cell::Cell;
use std::sync::Arc;

/// Special method `name` from the class, bound to `receiver`. The instance
/// dictionary is not consulted.
pub(crate) fn special(class: &Arc<PyClass>, receiver: &Value, name: &str) -> Option<Value> {
    class.lookup(name).map(|v| bind(v, receiver, class))
}

/// Integer index of a sequence, or a slice.
enum Index {
    At(i64),
    Slice(SliceObject),
}

fn sequence_index(seq: &str, key: &Value) -> RuntimeResult<Index> {
    match key.unwrap_proxy() {
        Value::Slice(s) => Ok(Index::Slice(**s)),
        k => k.as_int().map(Index::At).ok_or_else(|| {
            RuntimeError::type_error(format!(
                "{seq} indices must be integers or slices, not {}",
                k.kind_name()
            ))
        }),
    }
}

fn out_of_range(seq: &str) -> RuntimeError {
    RuntimeError::index_error(format!("{seq} index out of range"))
}

impl Value {
    // =========================================================================
    // Calls
    // =========================================================================

    /// Call this value (`obj(*args)`).
    pub fn call(&self, args: &[Value]) -> RuntimeResult<Value> {
        self.call_as(args, self)
    }

    /// Read a method and call it (`obj.name(*args)`).
    pub fn call_method(&self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        self.get_attr(name)?.call(args)
    }

    pub(crate) fn call_as(&self, args: &[Value], receiver: &Value) -> RuntimeResult<Value> {
        match self {
            Value::Function(f) => f.invoke(args),
            Value::BoundMethod(m) => m.call(args),
            Value::Class(c) => c.instantiate(args),
            Value::Proxy(p) => p.call(args),
            Value::Instance(inst) => match special(inst.class(), receiver, "__call__") {
                Some(call) => call.call(args),
                None => Err(not_callable(self)),
            },
            other => Err(not_callable(other)),
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Subscript read (`obj[key]`).
    pub fn get_item(&self, key: &Value) -> RuntimeResult<Value> {
        self.get_item_as(key, self)
    }

    pub(crate) fn get_item_as(&self, key: &Value, receiver: &Value) -> RuntimeResult<Value> {
        match self {
            Value::Tuple(t) => match sequence_index("tuple", key)? {
                Index::At(i) => t.get(i).ok_or_else(|| out_of_range("tuple")),
                Index::Slice(s) => Ok(Value::Tuple(Arc::new(t.slice(&s)?))),
            },
            Value::List(l) => match sequence_index("list", key)? {
                Index::At(i) => l.get(i).ok_or_else(|| out_of_range("list")),
                Index::Slice(s) => Ok(Value::list(l.slice(&s)?)),
            },
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                match sequence_index("string", key)? {
                    Index::At(i) => normalize_index(i, chars.len())
                        .map(|i| Value::from(chars[i].to_string()))
                        .ok_or_else(|| out_of_range("string")),
                    Index::Slice(sl) => {
                        Ok(Value::from(sl.apply(&chars[..])?.into_iter().collect::<String>()))
                    }
                }
            }
            Value::Bytes(b) => match sequence_index("byte", key)? {
                Index::At(i) => normalize_index(i, b.len())
                    .map(|i| Value::Int(b[i] as i64))
                    .ok_or_else(|| out_of_range("index")),
                Index::Slice(s) => Ok(Value::bytes(&s.apply(&b[..])?)),
            },
            Value::Dict(d) => d.get(key)?.ok_or_else(|| key_error(key)),
            Value::Proxy(p) => p.get_item(key),
            Value::Instance(inst) => match special(inst.class(), receiver, "__getitem__") {
                Some(getitem) => getitem.call(std::slice::from_ref(key)),
                None => Err(not_subscriptable(self)),
            },
            other => Err(not_subscriptable(other)),
        }
    }

    /// Subscript assignment (`obj[key] = value`).
    pub fn set_item(&self, key: &Value, value: Value) -> RuntimeResult<()> {
        self.set_item_as(key, value, self)
    }

    pub(crate) fn set_item_as(&self, key: &Value, value: Value, receiver: &Value) -> RuntimeResult<()> {
        match self {
            Value::List(l) => match sequence_index("list", key)? {
                Index::At(i) => l
                    .set(i, value)
                    .then_some(())
                    .ok_or_else(|| RuntimeError::index_error("list assignment index out of range")),
                Index::Slice(s) => l.assign_slice(&s, value.iter()?),
            },
            Value::Dict(d) => d.insert(key.clone(), value),
            Value::Proxy(p) => p.set_item(key, value),
            Value::Instance(inst) => match special(inst.class(), receiver, "__setitem__") {
                Some(setitem) => setitem.call(&[key.clone(), value]).map(drop),
                None => Err(no_item_assignment(self)),
            },
            other => Err(no_item_assignment(other)),
        }
    }

    /// Subscript deletion (`del obj[key]`).
    pub fn del_item(&self, key: &Value) -> RuntimeResult<()> {
        self.del_item_as(key, self)
    }

    pub(crate) fn del_item_as(&self, key: &Value, receiver: &Value) -> RuntimeResult<()> {
        match self {
            Value::List(l) => match sequence_index("list", key)? {
                Index::At(i) => l
                    .remove_at(i)
                    .map(drop)
                    .ok_or_else(|| RuntimeError::index_error("list assignment index out of range")),
                Index::Slice(s) => l.delete_slice(&s),
            },
            Value::Dict(d) => d.remove(key)?.map(drop).ok_or_else(|| key_error(key)),
            Value::Proxy(p) => p.del_item(key),
            Value::Instance(inst) => match special(inst.class(), receiver, "__delitem__") {
                Some(delitem) => delitem.call(std::slice::from_ref(key)).map(drop),
                None => Err(no_item_deletion(self)),
            },
            other => Err(no_item_deletion(other)),
        }
    }

    // =========================================================================
    // Length / Iteration / Containment
    // =========================================================================

    /// `len(obj)`.
    pub fn len(&self) -> RuntimeResult<usize> {
        self.len_as(self)
    }

    pub(crate) fn len_as(&self, receiver: &Value) -> RuntimeResult<usize> {
        match self {
            Value::Str(s) => Ok(s.chars().count()),
            Value::Bytes(b) => Ok(b.len()),
            Value::Tuple(t) => Ok(t.len()),
            Value::List(l) => Ok(l.len()),
            Value::Set(s) => Ok(s.len()),
            Value::Dict(d) => Ok(d.len()),
            Value::Proxy(p) => p.len(),
            Value::Instance(inst) => match special(inst.class(), receiver, "__len__") {
                Some(len) => {
                    let n = len.call(&[])?;
                    match n.as_int() {
                        Some(n) if n >= 0 => Ok(n as usize),
                        Some(_) => Err(RuntimeError::value_error("__len__() should return >= 0")),
                        None => Err(RuntimeError::type_error(format!(
                            "'{}' object cannot be interpreted as an integer",
                            n.kind_name()
                        ))),
                    }
                }
                None => Err(no_len(self)),
            },
            other => Err(no_len(other)),
        }
    }

    /// Items produced by iterating `obj`, collected eagerly.
    pub fn iter(&self) -> RuntimeResult<Vec<Value>> {
        self.iter_as(self)
    }

    pub(crate) fn iter_as(&self, receiver: &Value) -> RuntimeResult<Vec<Value>> {
        match self {
            Value::Str(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Bytes(b) => Ok(b.iter().map(|&x| Value::Int(x as i64)).collect()),
            Value::Tuple(t) => Ok(t.as_slice().to_vec()),
            Value::List(l) => Ok(l.snapshot()),
            Value::Set(s) => Ok(s.snapshot()),
            Value::Dict(d) => Ok(d.keys()),
            Value::Proxy(p) => p.iter(),
            Value::Instance(inst) => match special(inst.class(), receiver, "__iter__") {
                Some(iter) => iter.call(&[])?.iter(),
                None => Err(not_iterable(self)),
            },
            other => Err(not_iterable(other)),
        }
    }

    /// `item in obj`.
    pub fn contains(&self, item: &Value) -> RuntimeResult<bool> {
        self.contains_as(item, self)
    }

    pub(crate) fn contains_as(&self, item: &Value, receiver: &Value) -> RuntimeResult<bool> {
        match self {
            Value::Str(s) => match item.unwrap_proxy() {
                Value::Str(needle) => Ok(s.contains(&**needle)),
                other => Err(RuntimeError::type_error(format!(
                    "'in <string>' requires string as left operand, not {}",
                    other.kind_name()
                ))),
            },
            Value::Dict(d) => d.contains_key(item),
            Value::Set(s) => s.contains(item),
            Value::Proxy(p) => p.contains(item),
            Value::Instance(inst) => match special(inst.class(), receiver, "__contains__") {
                Some(contains) => contains.call(std::slice::from_ref(item))?.truthy(),
                None => {
                    for x in self.iter_as(receiver)? {
                        if x.py_eq(item)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
            },
            other => {
                for x in other.iter()? {
                    if x.py_eq(item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    // =========================================================================
    // Truthiness / Equality
    // =========================================================================

    /// `bool(obj)`.
    pub fn truthy(&self) -> RuntimeResult<bool> {
        self.truthy_as(self)
    }

    pub(crate) fn truthy_as(&self, receiver: &Value) -> RuntimeResult<bool> {
        Ok(match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Set(s) => !s.is_empty(),
            Value::Dict(d) => !d.is_empty(),
            Value::Proxy(p) => return p.truthy(),
            Value::Instance(inst) => {
                if let Some(boolean) = special(inst.class(), receiver, "__bool__") {
                    return match boolean.call(&[])? {
                        Value::Bool(b) => Ok(b),
                        other => Err(RuntimeError::type_error(format!(
                            "__bool__ should return bool, returned {}",
                            other.kind_name()
                        ))),
                    };
                }
                if special(inst.class(), receiver, "__len__").is_some() {
                    return Ok(self.len_as(receiver)? > 0);
                }
                true
            }
            _ => true,
        })
    }

    /// `obj == other`.
    ///
    /// Proxies compare as their targets: two wrappers are equal iff the
    /// objects they wrap are equal.
    pub fn py_eq(&self, other: &Value) -> RuntimeResult<bool> {
        self.eq_as(other, self)
    }

    pub(crate) fn eq_as(&self, other: &Value, receiver: &Value) -> RuntimeResult<bool> {
        let _depth = DepthGuard::enter("in comparison")?;
        if let Value::Proxy(p) = self {
            return p.eq(other);
        }
        if let Value::Instance(inst) = self {
            if let Some(eq) = special(inst.class(), receiver, "__eq__") {
                return eq.call(std::slice::from_ref(other))?.truthy();
            }
        }
        let rhs = other.unwrap_proxy();
        if let Value::Instance(inst) = rhs {
            if !matches!(self, Value::Instance(_)) {
                if let Some(eq) = special(inst.class(), other, "__eq__") {
                    return eq.call(std::slice::from_ref(receiver))?.truthy();
                }
            }
        }
        structural_eq(self, rhs)
    }
}

/// Nested comparisons allowed on one thread before giving up.
const MAX_EQ_DEPTH: usize = 200;

thread_local! {
    static EQ_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Counts one level of comparison nesting until dropped.
struct DepthGuard;

impl DepthGuard {
    fn enter(context: &str) -> RuntimeResult<Self> {
        EQ_DEPTH.with(|depth| {
            if depth.get() >= MAX_EQ_DEPTH {
                return Err(RuntimeError::RecursionError(context.to_string()));
            }
            depth.set(depth.get() + 1);
            Ok(Self)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EQ_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Equality of two unwrapped values without user `__eq__` on either side.
fn structural_eq(a: &Value, b: &Value) -> RuntimeResult<bool> {
    if let Some(eq) = numeric_eq(a, b) {
        return Ok(eq);
    }
    if let (Some(x), Some(y)) = (a.identity(), b.identity()) {
        if x == y {
            return Ok(true);
        }
    }
    match (a, b) {
        (Value::None, Value::None) => Ok(true),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::Bytes(x), Value::Bytes(y)) => Ok(x == y),
        (Value::Slice(x), Value::Slice(y)) => Ok(x == y),
        (Value::Tuple(x), Value::Tuple(y)) => seq_eq(x.as_slice(), y.as_slice()),
        (Value::List(x), Value::List(y)) => seq_eq(&x.snapshot(), &y.snapshot()),
        (Value::Set(x), Value::Set(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for member in x.snapshot() {
                if !y.contains(&member)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Dict(x), Value::Dict(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for (key, value) in x.items() {
                match y.get(&key)? {
                    Some(other) if value.py_eq(&other)? => {}
                    _ => return Ok(false),
                }
            }
            Ok(true)
        }
        (Value::BoundMethod(x), Value::BoundMethod(y)) => {
            Ok(Arc::ptr_eq(x.function(), y.function()) && x.receiver().is(y.receiver()))
        }
        _ => Ok(false),
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> RuntimeResult<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !x.py_eq(y)? {
            return Ok(false);
        }
    }
    Ok(true)
}

// =============================================================================
// Protocol Errors
// =============================================================================

fn not_callable(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("'{}' object is not callable", value.kind_name()))
}

fn not_subscriptable(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("'{}' object is not subscriptable", value.kind_name()))
}

pub(crate) fn no_item_assignment(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "'{}' object does not support item assignment",
        value.kind_name()
    ))
}

pub(crate) fn no_item_deletion(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "'{}' object does not support item deletion",
        value.kind_name()
    ))
}

fn no_len(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("object of type '{}' has no len()", value.kind_name()))
}

fn not_iterable(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("'{}' object is not iterable", value.kind_name()))
}
