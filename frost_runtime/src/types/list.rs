//! List object implementation.
//!
//! Mutable sequence guarded by a `RwLock`. Element comparisons (`index`,
//! `count`, `remove`) run on a snapshot so user `__eq__` never executes while
//! the lock is held.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::types::function::{arg, check_arity};
use crate::types::slice::{SliceObject, normalize_index};
use crate::types::{MethodTable, method_table};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

/// List object.
#[derive(Debug, Default)]
pub struct ListObject {
    items: RwLock<Vec<Value>>,
}

impl ListObject {
    /// Create an empty list.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from a Vec.
    #[inline]
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Get an item by index (supports negative indexing).
    pub fn get(&self, index: i64) -> Option<Value> {
        let items = self.items.read();
        let idx = normalize_index(index, items.len())?;
        Some(items[idx].clone())
    }

    /// Replace an item. Returns false when out of range.
    pub fn set(&self, index: i64, value: Value) -> bool {
        let mut items = self.items.write();
        match normalize_index(index, items.len()) {
            Some(idx) => {
                items[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the current items.
    #[inline]
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    /// Select a slice of the current items.
    pub fn slice(&self, slice: &SliceObject) -> RuntimeResult<Vec<Value>> {
        slice.apply(&self.items.read()[..])
    }

    /// Replace the items a contiguous slice selects.
    pub fn assign_slice(&self, slice: &SliceObject, values: Vec<Value>) -> RuntimeResult<()> {
        let mut items = self.items.write();
        let (start, stop, step) = slice.indices(items.len())?;
        if step != 1 {
            return Err(RuntimeError::value_error(
                "extended slice assignment is not supported",
            ));
        }
        let start = start as usize;
        let stop = (stop as usize).max(start);
        items.splice(start..stop, values);
        Ok(())
    }

    /// Remove the items a slice selects.
    pub fn delete_slice(&self, slice: &SliceObject) -> RuntimeResult<()> {
        let mut items = self.items.write();
        let mut positions = slice.positions(items.len())?;
        positions.sort_unstable();
        for idx in positions.into_iter().rev() {
            items.remove(idx);
        }
        Ok(())
    }

    #[inline]
    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    pub fn extend(&self, values: Vec<Value>) {
        self.items.write().extend(values);
    }

    /// Insert before `index`, clamping like `list.insert`.
    pub fn insert(&self, index: i64, value: Value) {
        let mut items = self.items.write();
        let len = items.len() as i64;
        let idx = if index < 0 { (index + len).max(0) } else { index.min(len) };
        items.insert(idx as usize, value);
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&self, index: i64) -> Option<Value> {
        let mut items = self.items.write();
        let idx = normalize_index(index, items.len())?;
        Some(items.remove(idx))
    }

    pub fn clear(&self) {
        self.items.write().clear();
    }

    pub fn reverse(&self) {
        self.items.write().reverse();
    }

    /// Position of the first item equal to `value`.
    fn position(&self, value: &Value) -> RuntimeResult<Option<usize>> {
        for (i, item) in self.snapshot().iter().enumerate() {
            if item.py_eq(value)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }
}

// =============================================================================
// Methods
// =============================================================================

pub(crate) fn methods() -> &'static MethodTable {
    static METHODS: OnceLock<MethodTable> = OnceLock::new();
    METHODS.get_or_init(|| {
        method_table(
            "list",
            &[
                ("append", append),
                ("extend", extend),
                ("insert", insert),
                ("remove", remove),
                ("pop", pop),
                ("clear", clear),
                ("reverse", reverse),
                ("count", count),
                ("index", index),
                ("copy", copy),
            ],
        )
    })
}

fn receiver<'a>(args: &'a [Value], method: &str) -> RuntimeResult<&'a Arc<ListObject>> {
    match arg(args, 0, method)? {
        Value::List(l) => Ok(l),
        other => Err(RuntimeError::type_error(format!(
            "descriptor '{method}' for 'list' objects doesn't apply to a '{}' object",
            other.kind_name()
        ))),
    }
}

fn int_arg(value: &Value, method: &str) -> RuntimeResult<i64> {
    value.as_int().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{method}() argument must be int, not '{}'",
            value.kind_name()
        ))
    })
}

fn append(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "append")?;
    receiver(args, "append")?.push(args[1].clone());
    Ok(Value::None)
}

fn extend(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "extend")?;
    let list = receiver(args, "extend")?;
    let values = args[1].iter()?;
    list.extend(values);
    Ok(Value::None)
}

fn insert(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 3, 3, "insert")?;
    let list = receiver(args, "insert")?;
    list.insert(int_arg(&args[1], "insert")?, args[2].clone());
    Ok(Value::None)
}

fn remove(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "remove")?;
    let list = receiver(args, "remove")?;
    match list.position(&args[1])? {
        Some(idx) => {
            list.remove_at(idx as i64);
            Ok(Value::None)
        }
        None => Err(RuntimeError::value_error("list.remove(x): x not in list")),
    }
}

fn pop(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 2, "pop")?;
    let list = receiver(args, "pop")?;
    if list.is_empty() {
        return Err(RuntimeError::index_error("pop from empty list"));
    }
    let index = match args.get(1) {
        Some(v) => int_arg(v, "pop")?,
        None => -1,
    };
    list.remove_at(index)
        .ok_or_else(|| RuntimeError::index_error("pop index out of range"))
}

fn clear(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "clear")?;
    receiver(args, "clear")?.clear();
    Ok(Value::None)
}

fn reverse(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "reverse")?;
    receiver(args, "reverse")?.reverse();
    Ok(Value::None)
}

fn count(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "count")?;
    let list = receiver(args, "count")?;
    let mut n = 0i64;
    for item in list.snapshot() {
        if item.py_eq(&args[1])? {
            n += 1;
        }
    }
    Ok(Value::Int(n))
}

fn index(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "index")?;
    let list = receiver(args, "index")?;
    match list.position(&args[1])? {
        Some(idx) => Ok(Value::from(idx)),
        None => Err(RuntimeError::value_error(format!(
            "{} is not in list",
            args[1].repr()?
        ))),
    }
}

fn copy(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "copy")?;
    Ok(Value::list(receiver(args, "copy")?.snapshot()))
}
