//! Tuple object implementation.
//!
//! Immutable sequence type with fixed size. A tuple is only as immutable as
//! its elements, which is why proxies wrap it rather than pass it through.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::types::function::{arg, check_arity};
use crate::types::slice::{SliceObject, normalize_index};
use crate::types::{MethodTable, method_table};
use std::sync::{Arc, OnceLock};

/// Tuple object.
#[derive(Debug)]
pub struct TupleObject {
    /// Tuple items (immutable after creation).
    items: Box<[Value]>,
}

impl TupleObject {
    /// Create an empty tuple.
    #[inline]
    pub fn empty() -> Self {
        Self {
            items: Box::new([]),
        }
    }

    /// Create a tuple from a Vec.
    #[inline]
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self {
            items: items.into_boxed_slice(),
        }
    }

    /// Get the length.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by index (supports negative indexing).
    #[inline]
    pub fn get(&self, index: i64) -> Option<Value> {
        let idx = normalize_index(index, self.items.len())?;
        Some(self.items[idx].clone())
    }

    /// Get as slice.
    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Iterate over items.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Slice the tuple.
    pub fn slice(&self, slice: &SliceObject) -> RuntimeResult<TupleObject> {
        Ok(Self::from_vec(slice.apply(&self.items[..])?))
    }
}

// =============================================================================
// Methods
// =============================================================================

pub(crate) fn methods() -> &'static MethodTable {
    static METHODS: OnceLock<MethodTable> = OnceLock::new();
    METHODS.get_or_init(|| method_table("tuple", &[("count", count), ("index", index)]))
}

fn receiver<'a>(args: &'a [Value], method: &str) -> RuntimeResult<&'a Arc<TupleObject>> {
    match arg(args, 0, method)? {
        Value::Tuple(t) => Ok(t),
        other => Err(RuntimeError::type_error(format!(
            "descriptor '{method}' for 'tuple' objects doesn't apply to a '{}' object",
            other.kind_name()
        ))),
    }
}

fn count(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "count")?;
    let tuple = receiver(args, "count")?;
    let mut n = 0i64;
    for item in tuple.iter() {
        if item.py_eq(&args[1])? {
            n += 1;
        }
    }
    Ok(Value::Int(n))
}

fn index(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "index")?;
    let tuple = receiver(args, "index")?;
    for (i, item) in tuple.iter().enumerate() {
        if item.py_eq(&args[1])? {
            return Ok(Value::from(i));
        }
    }
    Err(RuntimeError::value_error("tuple.index(x): x not in tuple"))
}
