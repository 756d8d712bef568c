//! Hashable keys for dicts and sets.
//!
//! A [`HashKey`] pairs a value with its precomputed hash. Key equality is
//! structural for numbers, strings, bytes and tuples and by identity for
//! every other hashable object, so comparing keys never runs user code and
//! is safe while a container lock is held.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// A value that has been checked for hashability.
#[derive(Clone)]
pub struct HashKey {
    value: Value,
    hash: u64,
}

impl HashKey {
    /// Hash `value`, failing with a type error when it is unhashable.
    pub fn new(value: Value) -> RuntimeResult<Self> {
        let hash = hash_value(&value)?;
        Ok(Self { value, hash })
    }

    /// The key's value.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn into_value(self) -> Value {
        self.value
    }

    #[inline]
    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    /// Equality of two immediates (`None`, bools and numbers) without
    /// numeric coercion across variants.
    pub fn scalar_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::None, Value::None) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
            (Value::Complex(x), Value::Complex(y)) => {
                x.re.to_bits() == y.re.to_bits() && x.im.to_bits() == y.im.to_bits()
            }
            _ => false,
        }
    }
}

impl PartialEq for HashKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && key_eq(&self.value, &other.value)
    }
}

impl Eq for HashKey {}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl std::fmt::Debug for HashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

// =============================================================================
// Hashing
// =============================================================================

fn fx<T: Hash + ?Sized>(tag: u8, value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    tag.hash(&mut hasher);
    value.hash(&mut hasher);
    hasher.finish()
}

/// Numbers that compare equal must hash equal: `1`, `1.0` and `True` share
/// a hash.
fn hash_int(i: i64) -> u64 {
    fx(1, &i)
}

fn hash_float(f: f64) -> u64 {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        hash_int(f as i64)
    } else {
        fx(2, &f.to_bits())
    }
}

fn hash_value(value: &Value) -> RuntimeResult<u64> {
    Ok(match value {
        Value::None => fx(0, &()),
        Value::Bool(b) => hash_int(*b as i64),
        Value::Int(i) => hash_int(*i),
        Value::Float(f) => hash_float(*f),
        Value::Complex(c) if c.im == 0.0 => hash_float(c.re),
        Value::Complex(c) => fx(3, &(c.re.to_bits(), c.im.to_bits())),
        Value::Str(s) => fx(4, &**s),
        Value::Bytes(b) => fx(5, &**b),
        Value::Tuple(t) => {
            let mut hasher = FxHasher::default();
            6u8.hash(&mut hasher);
            for item in t.iter() {
                hasher.write_u64(hash_value(item)?);
            }
            hasher.finish()
        }
        Value::List(_) | Value::Set(_) | Value::Dict(_) | Value::Slice(_) => {
            return Err(RuntimeError::type_error(format!(
                "unhashable type: '{}'",
                value.kind_name()
            )));
        }
        Value::Proxy(p) => hash_value(p.target())?,
        // Keys compare by identity; a user `__eq__` would break the
        // equal-implies-same-hash rule.
        Value::Instance(inst) if inst.class().lookup("__eq__").is_some() => {
            return Err(RuntimeError::type_error(format!(
                "unhashable type: '{}'",
                inst.class().name()
            )));
        }
        other => {
            let addr = other.identity().unwrap_or_default();
            fx(7, &addr)
        }
    })
}

// =============================================================================
// Key Equality
// =============================================================================

fn numeric(value: &Value) -> Option<(f64, f64, Option<i64>)> {
    match value {
        Value::Bool(b) => Some((*b as i64 as f64, 0.0, Some(*b as i64))),
        Value::Int(i) => Some((*i as f64, 0.0, Some(*i))),
        Value::Float(f) => Some((*f, 0.0, None)),
        Value::Complex(c) => Some((c.re, c.im, None)),
        _ => None,
    }
}

/// Equality of two numbers across `bool`, `int`, `float` and `complex`.
pub(crate) fn numeric_eq(a: &Value, b: &Value) -> Option<bool> {
    let (are, aim, aint) = numeric(a)?;
    let (bre, bim, bint) = numeric(b)?;
    Some(match (aint, bint) {
        (Some(x), Some(y)) => x == y,
        _ => are == bre && aim == bim,
    })
}

/// Key equality. Never calls user code.
pub(crate) fn key_eq(a: &Value, b: &Value) -> bool {
    let (a, b) = (a.unwrap_proxy(), b.unwrap_proxy());
    if let Some(eq) = numeric_eq(a, b) {
        return eq;
    }
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Tuple(x), Value::Tuple(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| key_eq(p, q))
        }
        _ => match (a.identity(), b.identity()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: Value) -> HashKey {
        HashKey::new(v).unwrap()
    }

    #[test]
    fn test_numeric_keys_collapse() {
        assert_eq!(key(Value::Int(1)), key(Value::Float(1.0)));
        assert_eq!(key(Value::Int(1)), key(Value::Bool(true)));
        assert_eq!(key(Value::Int(1)).hash_code(), key(Value::Float(1.0)).hash_code());
        assert_ne!(key(Value::Int(1)), key(Value::Float(1.5)));
    }

    #[test]
    fn test_unhashable() {
        let err = HashKey::new(Value::list(vec![])).unwrap_err();
        assert_eq!(err.to_string(), "unhashable type: 'list'");
        assert!(HashKey::new(Value::dict(vec![]).unwrap()).is_err());
    }

    #[test]
    fn test_tuple_keys() {
        let a = key(Value::tuple(vec![Value::from("a"), Value::Int(1)]));
        let b = key(Value::tuple(vec![Value::from("a"), Value::Float(1.0)]));
        assert_eq!(a, b);
        assert!(HashKey::new(Value::tuple(vec![Value::list(vec![])])).is_err());
    }

    #[test]
    fn test_heap_objects_by_identity() {
        let f = Value::Function(std::sync::Arc::new(
            crate::types::function::Function::free("f", |_| Ok(Value::None)),
        ));
        let g = Value::Function(std::sync::Arc::new(
            crate::types::function::Function::free("f", |_| Ok(Value::None)),
        ));
        assert_eq!(key(f.clone()), key(f.clone()));
        assert_ne!(key(f), key(g));
    }

    #[test]
    fn test_scalar_eq_is_strict() {
        assert!(HashKey::scalar_eq(&Value::Int(1), &Value::Int(1)));
        assert!(!HashKey::scalar_eq(&Value::Int(1), &Value::Bool(true)));
        assert!(HashKey::scalar_eq(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
    }

    #[test]
    fn test_instances_with_eq_are_unhashable() {
        use crate::object::class::ClassBuilder;

        let plain = ClassBuilder::new("Plain").build().unwrap();
        let obj = plain.instantiate(&[]).unwrap();
        assert_eq!(key(obj.clone()), key(obj));

        let point = ClassBuilder::new("Point")
            .method("__eq__", |_| Ok(Value::Bool(true)))
            .build()
            .unwrap();
        let err = HashKey::new(point.instantiate(&[]).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "unhashable type: 'Point'");

        let derived = ClassBuilder::new("Derived").base(&point).build().unwrap();
        assert!(HashKey::new(derived.instantiate(&[]).unwrap()).is_err());
        assert!(Value::set(vec![point.instantiate(&[]).unwrap()]).is_err());
    }
}
