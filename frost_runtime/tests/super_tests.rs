//! Cooperative `super` calls made by methods running behind a proxy.

mod common;

use common::{ClassSlot, registry};
use frost_runtime::{ClassBuilder, PyClass, Value, super_call};
use std::sync::Arc;

/// A class whose `do` returns 42.
fn answer(name: &str) -> Arc<PyClass> {
    ClassBuilder::new(name)
        .method("do", |_| Ok(Value::Int(42)))
        .build()
        .unwrap()
}

/// `name(bases...)` overriding `do` with `super().do()`.
fn delegating(name: &str, bases: &[&Arc<PyClass>]) -> Arc<PyClass> {
    let slot = ClassSlot::default();
    let me = slot.clone();
    let mut builder = ClassBuilder::new(name)
        .method("do", move |args| super_call(&me.get()?, &args[0], "do", &[]));
    for base in bases {
        builder = builder.base(base);
    }
    let class = builder.build().unwrap();
    slot.fill(&class);
    class
}

#[test]
fn test_method_in_parent() {
    let b = delegating("B", &[&answer("A")]);
    let raw = b.instantiate(&[]).unwrap();
    assert_eq!(raw.call_method("do", &[]).unwrap(), Value::Int(42));
    assert_eq!(registry().wrap(&raw).call_method("do", &[]).unwrap(), Value::Int(42));
}

#[test]
fn test_method_in_grandparent() {
    let a = answer("A");
    let b = ClassBuilder::new("B").base(&a).build().unwrap();
    let c = delegating("C", &[&b]);
    let proxy = registry().wrap(&c.instantiate(&[]).unwrap());
    assert_eq!(proxy.call_method("do", &[]).unwrap(), Value::Int(42));
}

#[test]
fn test_multiple_inheritance() {
    let a = answer("A");
    let b = ClassBuilder::new("B").build().unwrap();
    let c = delegating("C", &[&b, &a]);
    let proxy = registry().wrap(&c.instantiate(&[]).unwrap());
    assert_eq!(proxy.call_method("do", &[]).unwrap(), Value::Int(42));
}

#[test]
fn test_method_missing_from_ancestors() {
    let a = ClassBuilder::new("A").build().unwrap();
    let b = delegating("B", &[&a]);
    let err = b.instantiate(&[]).unwrap().call_method("do", &[]).unwrap_err();
    assert!(err.is_no_such_attribute());
    let proxy = registry().wrap(&b.instantiate(&[]).unwrap());
    let err = proxy.call_method("do", &[]).unwrap_err();
    assert_eq!(err.to_string(), "'super' object has no attribute 'do'");
}

#[test]
fn test_other_method_before_super() {
    let a = answer("A");
    let slot = ClassSlot::default();
    let me = slot.clone();
    let b = ClassBuilder::new("B")
        .base(&a)
        .method("do", move |args| {
            args[0].call_method("other", &[])?;
            super_call(&me.get()?, &args[0], "do", &[])
        })
        .method("other", |_| Ok(Value::Int(24)))
        .build()
        .unwrap();
    slot.fill(&b);
    let proxy = registry().wrap(&b.instantiate(&[]).unwrap());
    assert_eq!(proxy.call_method("do", &[]).unwrap(), Value::Int(42));
}

#[test]
fn test_classmethod_super() {
    let b = ClassBuilder::new("B")
        .classmethod("make", |_| Ok(Value::Int(42)))
        .build()
        .unwrap();
    let slot = ClassSlot::default();
    let me = slot.clone();
    let c = ClassBuilder::new("C")
        .base(&b)
        .classmethod("make", move |args| super_call(&me.get()?, &args[0], "make", &[]))
        .build()
        .unwrap();
    slot.fill(&c);

    let c_value = Value::from(c.clone());
    let a = ClassBuilder::new("A")
        .method("make", move |_| c_value.call_method("make", &[]))
        .build()
        .unwrap();
    let raw = a.instantiate(&[]).unwrap();
    assert_eq!(raw.call_method("make", &[]).unwrap(), Value::Int(42));
    assert_eq!(registry().wrap(&raw).call_method("make", &[]).unwrap(), Value::Int(42));
}

#[test]
fn test_super_on_fresh_object() {
    let c = delegating("C", &[&answer("B")]);
    let a = ClassBuilder::new("A")
        .method("make", move |_| c.instantiate(&[])?.call_method("do", &[]))
        .build()
        .unwrap();
    let proxy = registry().wrap(&a.instantiate(&[]).unwrap());
    assert_eq!(proxy.call_method("make", &[]).unwrap(), Value::Int(42));
}

#[test]
fn test_fresh_object_returned_through_proxy_is_wrapped() {
    let made = ClassBuilder::new("Made").build().unwrap();
    let factory = ClassBuilder::new("Factory")
        .method("make", move |_| made.instantiate(&[]))
        .build()
        .unwrap();
    let proxy = registry().wrap(&factory.instantiate(&[]).unwrap());
    let fresh = proxy.call_method("make", &[]).unwrap();
    assert!(fresh.is_proxy());
    assert!(fresh.set_attr("x", Value::Int(1)).unwrap_err().is_constant_attribute());
}
