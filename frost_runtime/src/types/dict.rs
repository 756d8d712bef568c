//! Dict object implementation.
//!
//! Insertion-ordered mapping backed by an `IndexMap` keyed by [`HashKey`].

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::object::hash::HashKey;
use crate::types::function::{arg, check_arity};
use crate::types::{MethodTable, method_table};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::sync::{Arc, OnceLock};

type Entries = IndexMap<HashKey, Value, FxBuildHasher>;

/// Dict object.
#[derive(Debug, Default)]
pub struct DictObject {
    entries: RwLock<Entries>,
}

impl DictObject {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key-value pairs; later keys overwrite earlier ones.
    pub fn from_pairs(pairs: Vec<(Value, Value)>) -> RuntimeResult<Self> {
        let mut entries = Entries::with_capacity_and_hasher(pairs.len(), FxBuildHasher);
        for (key, value) in pairs {
            entries.insert(HashKey::new(key)?, value);
        }
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Look up a key.
    pub fn get(&self, key: &Value) -> RuntimeResult<Option<Value>> {
        let key = HashKey::new(key.clone())?;
        Ok(self.entries.read().get(&key).cloned())
    }

    pub fn contains_key(&self, key: &Value) -> RuntimeResult<bool> {
        let key = HashKey::new(key.clone())?;
        Ok(self.entries.read().contains_key(&key))
    }

    /// Insert or overwrite.
    pub fn insert(&self, key: Value, value: Value) -> RuntimeResult<()> {
        let key = HashKey::new(key)?;
        self.entries.write().insert(key, value);
        Ok(())
    }

    /// Remove a key, keeping the order of the remaining entries.
    pub fn remove(&self, key: &Value) -> RuntimeResult<Option<Value>> {
        let key = HashKey::new(key.clone())?;
        Ok(self.entries.write().shift_remove(&key))
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.read().keys().map(|k| k.value().clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.read().values().cloned().collect()
    }

    pub fn items(&self) -> Vec<(Value, Value)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.value().clone(), v.clone()))
            .collect()
    }
}

/// The error raised for a missing key.
pub(crate) fn key_error(key: &Value) -> RuntimeError {
    match key.repr() {
        Ok(repr) => RuntimeError::KeyError(repr),
        Err(err) => err,
    }
}

// =============================================================================
// Methods
// =============================================================================

pub(crate) fn methods() -> &'static MethodTable {
    static METHODS: OnceLock<MethodTable> = OnceLock::new();
    METHODS.get_or_init(|| {
        method_table(
            "dict",
            &[
                ("get", get),
                ("keys", keys),
                ("values", values),
                ("items", items),
                ("pop", pop),
                ("popitem", popitem),
                ("setdefault", setdefault),
                ("update", update),
                ("clear", clear),
                ("copy", copy),
            ],
        )
    })
}

fn receiver<'a>(args: &'a [Value], method: &str) -> RuntimeResult<&'a Arc<DictObject>> {
    match arg(args, 0, method)? {
        Value::Dict(d) => Ok(d),
        other => Err(RuntimeError::type_error(format!(
            "descriptor '{method}' for 'dict' objects doesn't apply to a '{}' object",
            other.kind_name()
        ))),
    }
}

fn get(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 3, "get")?;
    let dict = receiver(args, "get")?;
    let default = args.get(2).cloned().unwrap_or(Value::None);
    Ok(dict.get(&args[1])?.unwrap_or(default))
}

fn keys(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "keys")?;
    Ok(Value::list(receiver(args, "keys")?.keys()))
}

fn values(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "values")?;
    Ok(Value::list(receiver(args, "values")?.values()))
}

fn items(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "items")?;
    let pairs = receiver(args, "items")?
        .items()
        .into_iter()
        .map(|(k, v)| Value::tuple(vec![k, v]))
        .collect();
    Ok(Value::list(pairs))
}

fn pop(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 3, "pop")?;
    let dict = receiver(args, "pop")?;
    match (dict.remove(&args[1])?, args.get(2)) {
        (Some(value), _) => Ok(value),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(key_error(&args[1])),
    }
}

fn popitem(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "popitem")?;
    let dict = receiver(args, "popitem")?;
    match dict.entries.write().pop() {
        Some((key, value)) => Ok(Value::tuple(vec![key.into_value(), value])),
        None => Err(RuntimeError::KeyError("'popitem(): dictionary is empty'".into())),
    }
}

fn setdefault(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 3, "setdefault")?;
    let dict = receiver(args, "setdefault")?;
    let key = HashKey::new(args[1].clone())?;
    let default = args.get(2).cloned().unwrap_or(Value::None);
    Ok(dict.entries.write().entry(key).or_insert(default).clone())
}

fn update(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "update")?;
    let dict = receiver(args, "update")?;
    for (key, value) in mapping_pairs(&args[1])? {
        dict.insert(key, value)?;
    }
    Ok(Value::None)
}

/// Pairs of a mapping or of an iterable of pairs. Anything with `keys()`
/// is read through its own item access, so a wrapped mapping yields
/// wrapped values.
fn mapping_pairs(source: &Value) -> RuntimeResult<Vec<(Value, Value)>> {
    if let Value::Dict(d) = source {
        return Ok(d.items());
    }
    if let Ok(keys) = source.get_attr("keys") {
        return keys
            .call(&[])?
            .iter()?
            .into_iter()
            .map(|key| {
                let value = source.get_item(&key)?;
                Ok((key, value))
            })
            .collect();
    }
    source
        .iter()?
        .into_iter()
        .enumerate()
        .map(|(i, pair)| match pair.iter()?.as_slice() {
            [key, value] => Ok((key.clone(), value.clone())),
            other => Err(RuntimeError::value_error(format!(
                "dictionary update sequence element #{i} has length {}; 2 is required",
                other.len()
            ))),
        })
        .collect()
}

fn clear(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "clear")?;
    receiver(args, "clear")?.clear();
    Ok(Value::None)
}

fn copy(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "copy")?;
    Value::dict(receiver(args, "copy")?.items())
}
