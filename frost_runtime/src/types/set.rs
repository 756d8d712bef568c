//! Set object implementation.
//!
//! Insertion-ordered hash set of [`HashKey`]s. Binary operations accept any
//! iterable as the other operand.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::object::hash::HashKey;
use crate::types::function::{arg, check_arity};
use crate::types::{MethodTable, method_table};
use indexmap::IndexSet;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::sync::{Arc, OnceLock};

type Members = IndexSet<HashKey, FxBuildHasher>;

/// Set object.
#[derive(Debug, Default)]
pub struct SetObject {
    members: RwLock<Members>,
}

impl SetObject {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from values, dropping duplicates.
    pub fn from_values(values: Vec<Value>) -> RuntimeResult<Self> {
        Ok(Self {
            members: RwLock::new(collect(values)?),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    pub fn contains(&self, value: &Value) -> RuntimeResult<bool> {
        let key = HashKey::new(value.clone())?;
        Ok(self.members.read().contains(&key))
    }

    /// Add a member. Returns false when it was already present.
    pub fn add(&self, value: Value) -> RuntimeResult<bool> {
        let key = HashKey::new(value)?;
        Ok(self.members.write().insert(key))
    }

    /// Remove a member. Returns false when it was absent.
    pub fn discard(&self, value: &Value) -> RuntimeResult<bool> {
        let key = HashKey::new(value.clone())?;
        Ok(self.members.write().shift_remove(&key))
    }

    pub fn clear(&self) {
        self.members.write().clear();
    }

    /// Current members, in insertion order.
    pub fn snapshot(&self) -> Vec<Value> {
        self.members.read().iter().map(|k| k.value().clone()).collect()
    }

    fn keys(&self) -> Members {
        self.members.read().clone()
    }
}

fn collect(values: Vec<Value>) -> RuntimeResult<Members> {
    let mut members = Members::with_capacity_and_hasher(values.len(), FxBuildHasher);
    for value in values {
        members.insert(HashKey::new(value)?);
    }
    Ok(members)
}

// =============================================================================
// Methods
// =============================================================================

pub(crate) fn methods() -> &'static MethodTable {
    static METHODS: OnceLock<MethodTable> = OnceLock::new();
    METHODS.get_or_init(|| {
        method_table(
            "set",
            &[
                ("add", add),
                ("remove", remove),
                ("discard", discard),
                ("pop", pop),
                ("clear", clear),
                ("update", update),
                ("union", union),
                ("intersection", intersection),
                ("difference", difference),
                ("symmetric_difference", symmetric_difference),
                ("issubset", issubset),
                ("issuperset", issuperset),
                ("isdisjoint", isdisjoint),
                ("copy", copy),
            ],
        )
    })
}

fn receiver<'a>(args: &'a [Value], method: &str) -> RuntimeResult<&'a Arc<SetObject>> {
    match arg(args, 0, method)? {
        Value::Set(s) => Ok(s),
        other => Err(RuntimeError::type_error(format!(
            "descriptor '{method}' for 'set' objects doesn't apply to a '{}' object",
            other.kind_name()
        ))),
    }
}

/// Receiver members and the other operand's members.
fn operands(args: &[Value], method: &str) -> RuntimeResult<(Members, Members)> {
    check_arity(args, 2, 2, method)?;
    let this = receiver(args, method)?.keys();
    let other = collect(args[1].iter()?)?;
    Ok((this, other))
}

fn from_members(members: impl IntoIterator<Item = HashKey>) -> Value {
    let members: Members = members.into_iter().collect();
    Value::Set(Arc::new(SetObject {
        members: RwLock::new(members),
    }))
}

fn add(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "add")?;
    receiver(args, "add")?.add(args[1].clone())?;
    Ok(Value::None)
}

fn remove(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "remove")?;
    if receiver(args, "remove")?.discard(&args[1])? {
        Ok(Value::None)
    } else {
        Err(crate::types::dict::key_error(&args[1]))
    }
}

fn discard(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "discard")?;
    receiver(args, "discard")?.discard(&args[1])?;
    Ok(Value::None)
}

fn pop(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "pop")?;
    match receiver(args, "pop")?.members.write().pop() {
        Some(key) => Ok(key.into_value()),
        None => Err(RuntimeError::KeyError("'pop from an empty set'".into())),
    }
}

fn clear(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "clear")?;
    receiver(args, "clear")?.clear();
    Ok(Value::None)
}

fn update(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "update")?;
    let set = receiver(args, "update")?;
    let incoming = collect(args[1].iter()?)?;
    set.members.write().extend(incoming);
    Ok(Value::None)
}

fn union(args: &[Value]) -> RuntimeResult<Value> {
    let (this, other) = operands(args, "union")?;
    Ok(from_members(this.into_iter().chain(other)))
}

fn intersection(args: &[Value]) -> RuntimeResult<Value> {
    let (this, other) = operands(args, "intersection")?;
    Ok(from_members(this.into_iter().filter(|k| other.contains(k))))
}

fn difference(args: &[Value]) -> RuntimeResult<Value> {
    let (this, other) = operands(args, "difference")?;
    Ok(from_members(this.into_iter().filter(|k| !other.contains(k))))
}

fn symmetric_difference(args: &[Value]) -> RuntimeResult<Value> {
    let (this, other) = operands(args, "symmetric_difference")?;
    let left: Vec<HashKey> = this.iter().filter(|k| !other.contains(*k)).cloned().collect();
    let right = other.into_iter().filter(|k| !this.contains(k));
    Ok(from_members(left.into_iter().chain(right)))
}

fn issubset(args: &[Value]) -> RuntimeResult<Value> {
    let (this, other) = operands(args, "issubset")?;
    Ok(Value::Bool(this.is_subset(&other)))
}

fn issuperset(args: &[Value]) -> RuntimeResult<Value> {
    let (this, other) = operands(args, "issuperset")?;
    Ok(Value::Bool(this.is_superset(&other)))
}

fn isdisjoint(args: &[Value]) -> RuntimeResult<Value> {
    let (this, other) = operands(args, "isdisjoint")?;
    Ok(Value::Bool(this.is_disjoint(&other)))
}

fn copy(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "copy")?;
    Ok(from_members(receiver(args, "copy")?.keys()))
}
