//! Shallow and deep copying.
//!
//! Copies are built from the real objects: copying a proxy copies its
//! target, and the result is a plain, mutable value. Immutable values
//! (scalars, strings, functions, classes) copy to themselves.
//!
//! Deep copies keep a memo keyed by object identity, so shared substructure
//! is copied once and cycles in the source become cycles in the copy.

use crate::error::RuntimeResult;
use crate::object::Value;
use crate::object::instance::{AttrMap, InstanceObject};
use crate::object::ops::special;
use crate::types::dict::DictObject;
use crate::types::function::BoundMethod;
use crate::types::list::ListObject;
use crate::types::set::SetObject;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Copies made so far, keyed by the identity of the original.
type Memo = FxHashMap<usize, Value>;

impl Value {
    /// One-level copy. Containers are duplicated; their elements are shared.
    ///
    /// Instances whose class defines `__copy__` are copied by calling it.
    pub fn shallow_copy(&self) -> RuntimeResult<Value> {
        Ok(match self {
            Value::Proxy(p) => return p.target().shallow_copy(),
            Value::List(l) => Value::list(l.snapshot()),
            Value::Dict(d) => Value::Dict(Arc::new(DictObject::from_pairs(d.items())?)),
            Value::Set(s) => Value::Set(Arc::new(SetObject::from_values(s.snapshot())?)),
            Value::Instance(inst) => {
                if let Some(copy) = special(inst.class(), self, "__copy__") {
                    return copy.call(&[]);
                }
                Value::Instance(Arc::new(InstanceObject::with_attrs(
                    inst.class().clone(),
                    inst.attrs(),
                    inst.is_frozen(),
                )))
            }
            other => other.clone(),
        })
    }

    /// Recursive copy of everything reachable from this value.
    pub fn deep_copy(&self) -> RuntimeResult<Value> {
        deep_copy(self, &mut Memo::default())
    }
}

fn deep_copy(value: &Value, memo: &mut Memo) -> RuntimeResult<Value> {
    let value = value.unwrap_proxy();
    let id = value.identity();
    if let Some(copied) = id.and_then(|id| memo.get(&id)) {
        return Ok(copied.clone());
    }

    let copied = match value {
        Value::Tuple(t) => {
            let mut items = Vec::with_capacity(t.len());
            for item in t.iter() {
                items.push(deep_copy(item, memo)?);
            }
            // A tuple of immutables is its own copy.
            if items.iter().zip(t.iter()).all(|(a, b)| a.is(b)) {
                value.clone()
            } else {
                Value::tuple(items)
            }
        }
        Value::List(l) => {
            let list = Arc::new(ListObject::new());
            remember(memo, id, Value::List(list.clone()));
            for item in l.snapshot() {
                list.push(deep_copy(&item, memo)?);
            }
            Value::List(list)
        }
        Value::Dict(d) => {
            let dict = Arc::new(DictObject::new());
            remember(memo, id, Value::Dict(dict.clone()));
            for (k, v) in d.items() {
                dict.insert(deep_copy(&k, memo)?, deep_copy(&v, memo)?)?;
            }
            Value::Dict(dict)
        }
        Value::Set(s) => {
            let set = Arc::new(SetObject::new());
            remember(memo, id, Value::Set(set.clone()));
            for member in s.snapshot() {
                set.add(deep_copy(&member, memo)?)?;
            }
            Value::Set(set)
        }
        Value::Instance(inst) => {
            let copy = Arc::new(InstanceObject::new(inst.class().clone()));
            remember(memo, id, Value::Instance(copy.clone()));
            let mut attrs = AttrMap::default();
            for (name, attr) in inst.attrs() {
                attrs.insert(name, deep_copy(&attr, memo)?);
            }
            copy.restore_attrs(attrs);
            if inst.is_frozen() {
                copy.freeze();
            }
            Value::Instance(copy)
        }
        Value::BoundMethod(m) => Value::BoundMethod(Arc::new(BoundMethod::new(
            deep_copy(m.receiver(), memo)?,
            m.function().clone(),
        ))),
        other => other.clone(),
    };

    remember(memo, id, copied.clone());
    Ok(copied)
}

#[inline]
fn remember(memo: &mut Memo, id: Option<usize>, copy: Value) {
    if let Some(id) = id {
        memo.insert(id, copy);
    }
}
