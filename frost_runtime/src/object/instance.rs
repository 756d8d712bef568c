//! Instances of user-defined classes.
//!
//! An instance holds its class and an attribute dictionary. Instances of
//! frozen classes are frozen once construction finishes; after that every
//! attribute write or delete fails with [`ConstantAttributeError`].

use crate::error::{ConstantAttributeError, RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::object::class::PyClass;
use crate::proxy::classify::AccessKind;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Instance attribute storage.
pub type AttrMap = FxHashMap<Arc<str>, Value>;

/// An instance of a [`PyClass`].
#[derive(Debug)]
pub struct InstanceObject {
    class: Arc<PyClass>,
    attrs: RwLock<AttrMap>,
    frozen: AtomicBool,
}

impl InstanceObject {
    /// Create an empty, unfrozen instance.
    pub fn new(class: Arc<PyClass>) -> Self {
        Self::with_attrs(class, AttrMap::default(), false)
    }

    /// Create an instance with a prepared attribute dictionary.
    pub(crate) fn with_attrs(class: Arc<PyClass>, attrs: AttrMap, frozen: bool) -> Self {
        Self {
            class,
            attrs: RwLock::new(attrs),
            frozen: AtomicBool::new(frozen),
        }
    }

    #[inline]
    pub fn class(&self) -> &Arc<PyClass> {
        &self.class
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Reject every later write and delete.
    #[inline]
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Read from the instance dictionary only.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.read().contains_key(name)
    }

    /// Write to the instance dictionary.
    pub fn set(&self, name: &str, value: Value) -> RuntimeResult<()> {
        self.check_mutable(name, AccessKind::Write)?;
        self.attrs.write().insert(name.into(), value);
        Ok(())
    }

    /// Delete from the instance dictionary.
    pub fn delete(&self, name: &str) -> RuntimeResult<()> {
        self.check_mutable(name, AccessKind::Delete)?;
        match self.attrs.write().remove(name) {
            Some(_) => Ok(()),
            None => Err(RuntimeError::no_such_attribute(self.class.name(), name)),
        }
    }

    /// Copy of the attribute dictionary.
    pub fn attrs(&self) -> AttrMap {
        self.attrs.read().clone()
    }

    /// Replace the attribute dictionary, ignoring the frozen flag. Used by
    /// copying, which rebuilds state without going through `__setattr__`.
    pub(crate) fn restore_attrs(&self, attrs: AttrMap) {
        *self.attrs.write() = attrs;
    }

    /// Attribute names, sorted.
    pub fn attr_names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<_> = self.attrs.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn check_mutable(&self, name: &str, kind: AccessKind) -> RuntimeResult<()> {
        if !self.is_frozen() {
            return Ok(());
        }
        Err(ConstantAttributeError {
            owner: self.class.name().to_string(),
            type_name: self.class.name().to_string(),
            attr: name.to_string(),
            kind,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::class::ClassBuilder;

    fn instance() -> InstanceObject {
        InstanceObject::new(ClassBuilder::new("Example").build().unwrap())
    }

    #[test]
    fn test_set_get_delete() {
        let inst = instance();
        inst.set("x", Value::Int(1)).unwrap();
        assert_eq!(inst.get("x"), Some(Value::Int(1)));
        inst.delete("x").unwrap();
        assert!(!inst.contains("x"));
    }

    #[test]
    fn test_delete_missing() {
        let err = instance().delete("nope").unwrap_err();
        assert_eq!(err.to_string(), "'Example' object has no attribute 'nope'");
    }

    #[test]
    fn test_frozen_rejects_mutation() {
        let inst = instance();
        inst.set("x", Value::Int(1)).unwrap();
        inst.freeze();

        let err = inst.set("x", Value::Int(2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'Example' object is immutable. Cannot change attribute 'x' after initialization."
        );
        let err = inst.delete("x").unwrap_err();
        assert_eq!(err.as_constant_attribute().unwrap().kind, AccessKind::Delete);
        assert_eq!(inst.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_attr_names_sorted() {
        let inst = instance();
        inst.set("b", Value::None).unwrap();
        inst.set("a", Value::None).unwrap();
        let names = inst.attr_names();
        assert_eq!(names, [Arc::from("a"), Arc::from("b")]);
    }
}
