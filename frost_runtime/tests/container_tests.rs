//! Container proxy behaviour.
//!
//! Coverage:
//! - The ("immutable", ["mutable"]) pair
//! - Exposed read-only methods per container shape
//! - Missing mutators versus rejected item protocol
//! - Element, slice, iteration and method results being wrapped

mod common;

use common::registry;
use frost_runtime::{ClassBuilder, RuntimeError, Value};

fn strs(values: &[&str]) -> Vec<Value> {
    values.iter().map(|&s| Value::from(s)).collect()
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&i| Value::Int(i)).collect()
}

/// `Holder` with a `mapping` of `{'a': Inner(1)}` and a `lst` of
/// `[Inner(2), Inner(3)]`.
fn holder() -> Value {
    let inner = ClassBuilder::new("Inner")
        .method("__init__", |args| {
            args[0].set_attr("x", args[1].clone())?;
            Ok(Value::None)
        })
        .method("__repr__", |args| {
            Ok(Value::from(format!("Inner({})", args[0].get_attr("x")?.repr()?)))
        })
        .build()
        .unwrap();
    let holder = ClassBuilder::new("Holder")
        .method("__repr__", |args| {
            Ok(Value::from(format!(
                "Holder({}, {})",
                args[0].get_attr("mapping")?.repr()?,
                args[0].get_attr("lst")?.repr()?
            )))
        })
        .build()
        .unwrap();

    let obj = holder.instantiate(&[]).unwrap();
    let one = inner.instantiate(&[Value::Int(1)]).unwrap();
    obj.set_attr("mapping", Value::dict(vec![(Value::from("a"), one)]).unwrap())
        .unwrap();
    let items = vec![
        inner.instantiate(&[Value::Int(2)]).unwrap(),
        inner.instantiate(&[Value::Int(3)]).unwrap(),
    ];
    obj.set_attr("lst", Value::list(items)).unwrap();
    obj
}

// =============================================================================
// Scenario: pair
// =============================================================================

mod pair_tests {
    use super::*;

    fn pair() -> (Value, Value) {
        let raw = Value::tuple(vec![Value::from("immutable"), Value::list(strs(&["mutable"]))]);
        let proxy = registry().wrap(&raw);
        (raw, proxy)
    }

    #[test]
    fn test_pair_reads() {
        let (_, proxy) = pair();
        assert_eq!(proxy.kind_name(), "TupleProxy");

        let first = proxy.get_item(&Value::Int(0)).unwrap();
        assert_eq!(first, Value::from("immutable"));
        assert!(!first.is_proxy());
        assert_eq!(first.call_method("upper", &[]).unwrap(), Value::from("IMMUTABLE"));

        let second = proxy.get_item(&Value::Int(1)).unwrap();
        assert_eq!(second.kind_name(), "ListProxy");
        assert_eq!(second.len().unwrap(), 1);
        assert_eq!(second.call_method("index", &[Value::from("mutable")]).unwrap(), Value::Int(0));
        assert_eq!(proxy.call_method("index", &[Value::from("immutable")]).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_pair_mutators_absent() {
        let (raw, proxy) = pair();
        let second = proxy.get_item(&Value::Int(1)).unwrap();
        let err = second.call_method("append", &[Value::Int(0)]).unwrap_err();
        assert!(err.is_no_such_attribute());
        assert!(!err.is_constant_attribute());
        assert_eq!(raw.get_item(&Value::Int(1)).unwrap().len().unwrap(), 1);
    }

    #[test]
    fn test_pair_item_assignment_is_type_error() {
        let (_, proxy) = pair();
        let err = proxy.set_item(&Value::Int(1), Value::Int(3)).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError(_)));
        let second = proxy.get_item(&Value::Int(1)).unwrap();
        let err = second.set_item(&Value::Int(0), Value::Int(3)).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError(_)));
        let err = second.del_item(&Value::Int(0)).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError(_)));
    }

    #[test]
    fn test_pair_repr() {
        let (_, proxy) = pair();
        assert_eq!(proxy.repr().unwrap(), "TupleProxy(('immutable', ['mutable']))");
        assert_eq!(proxy.py_str().unwrap(), "('immutable', ['mutable'])");
    }

    #[test]
    fn test_tuple_holding_owner_is_guarded() {
        let main = ClassBuilder::new("Main").build().unwrap();
        let obj = main.instantiate(&[]).unwrap();
        obj.set_attr("delegate", Value::tuple(vec![obj.clone()])).unwrap();
        let proxy = registry().wrap(&obj);
        let back = proxy.get_attr("delegate").unwrap().get_item(&Value::Int(0)).unwrap();
        assert!(back.set_attr("x", Value::Int(5)).unwrap_err().is_constant_attribute());
        assert!(!obj.has_attr("x").unwrap());
    }
}

// =============================================================================
// Lists
// =============================================================================

mod list_tests {
    use super::*;

    #[test]
    fn test_scalar_elements_unwrapped() {
        let proxy = registry().wrap(&Value::list(ints(&[1, 2, 3])));
        let item = proxy.get_item(&Value::Int(1)).unwrap();
        assert_eq!(item, Value::Int(2));
        assert!(!item.is_proxy());
        assert_eq!(proxy.get_item(&Value::Int(-1)).unwrap(), Value::Int(3));
        assert_eq!(proxy.call_method("count", &[Value::Int(2)]).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_mutable_elements_wrapped() {
        let set = Value::set(ints(&[2])).unwrap();
        let proxy = registry().wrap(&Value::list(vec![Value::Int(1), set.clone(), Value::Int(3)]));
        let item = proxy.get_item(&Value::Int(1)).unwrap();
        assert_eq!(item, set);
        assert_eq!(item.kind_name(), "SetProxy");
        assert!(item.get_attr("add").unwrap_err().is_no_such_attribute());
    }

    #[test]
    fn test_slice_is_wrapped() {
        let obj = holder();
        let proxy = registry().wrap(&obj);
        let lst = proxy.get_attr("lst").unwrap();
        let all = lst.get_item(&Value::slice(None, None, None)).unwrap();
        assert_eq!(all.kind_name(), "ListProxy");
        let first = all.get_item(&Value::Int(0)).unwrap();
        assert_eq!(first.get_attr("x").unwrap(), Value::Int(2));
        assert!(first.set_attr("x", Value::Int(0)).unwrap_err().is_constant_attribute());
    }

    #[test]
    fn test_iteration_wraps_elements() {
        let proxy = registry().wrap(&holder()).get_attr("lst").unwrap();
        let items = proxy.iter().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(Value::is_proxy));
        assert_eq!(items[1].get_attr("x").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_index_errors_propagate() {
        let proxy = registry().wrap(&Value::list(ints(&[1])));
        let err = proxy.get_item(&Value::Int(5)).unwrap_err();
        assert_eq!(err.to_string(), "list index out of range");
        let err = proxy.call_method("index", &[Value::Int(9)]).unwrap_err();
        assert!(matches!(err, RuntimeError::ValueError(_)));
    }

    #[test]
    fn test_containment_and_truthiness() {
        let proxy = registry().wrap(&Value::list(ints(&[1, 2])));
        assert!(proxy.contains(&Value::Int(2)).unwrap());
        assert!(!proxy.contains(&Value::Int(5)).unwrap());
        assert!(proxy.truthy().unwrap());
        assert!(!registry().wrap(&Value::list(vec![])).truthy().unwrap());
    }

    #[test]
    fn test_unknown_member() {
        let proxy = registry().wrap(&holder()).get_attr("lst").unwrap();
        let err = proxy.get_attr("nonattr").unwrap_err();
        assert_eq!(err.to_string(), "'ListProxy' object has no attribute 'nonattr'");
        for name in ["append", "extend", "insert", "remove", "pop", "clear", "reverse", "copy"] {
            assert!(proxy.get_attr(name).unwrap_err().is_no_such_attribute(), "{name}");
        }
    }

    #[test]
    fn test_self_containing_lists_compare_without_overflow() {
        let a = Value::list(vec![]);
        a.call_method("append", &[a.clone()]).unwrap();
        let b = Value::list(vec![]);
        b.call_method("append", &[b.clone()]).unwrap();

        let registry = registry();
        let err = registry.wrap(&a).py_eq(&registry.wrap(&b)).unwrap_err();
        assert!(err.is_recursion());
        assert!(registry.wrap(&a).py_eq(&a).unwrap());
    }
}

// =============================================================================
// Dicts
// =============================================================================

mod dict_tests {
    use super::*;

    fn mapping() -> Value {
        registry().wrap(&holder()).get_attr("mapping").unwrap()
    }

    #[test]
    fn test_getitem_and_get() {
        let mapping = mapping();
        assert_eq!(mapping.kind_name(), "DictProxy");
        let a = mapping.get_item(&Value::from("a")).unwrap();
        assert!(a.is_proxy());
        assert_eq!(a.get_attr("x").unwrap(), Value::Int(1));

        let got = mapping.call_method("get", &[Value::from("a"), Value::from("5")]).unwrap();
        assert!(got.is_proxy());
        assert_eq!(got.get_attr("x").unwrap(), Value::Int(1));
        let missing = mapping.call_method("get", &[Value::from("b"), Value::from("5")]).unwrap();
        assert_eq!(missing, Value::from("5"));
    }

    #[test]
    fn test_views() {
        let mapping = mapping();
        let keys = mapping.call_method("keys", &[]).unwrap();
        assert_eq!(keys.iter().unwrap(), strs(&["a"]));

        let values = mapping.call_method("values", &[]).unwrap();
        let first = values.get_item(&Value::Int(0)).unwrap();
        assert_eq!(first.get_attr("x").unwrap(), Value::Int(1));

        let items = mapping.call_method("items", &[]).unwrap();
        let pair = items.get_item(&Value::Int(0)).unwrap();
        assert_eq!(pair.kind_name(), "TupleProxy");
        assert_eq!(pair.get_item(&Value::Int(0)).unwrap(), Value::from("a"));
        let value = pair.get_item(&Value::Int(1)).unwrap();
        assert!(value.set_attr("x", Value::Int(7)).unwrap_err().is_constant_attribute());
    }

    #[test]
    fn test_mutators_absent() {
        let mapping = mapping();
        assert!(mapping.get_attr("nonattr").unwrap_err().is_no_such_attribute());
        let update = Value::dict(vec![(Value::from("b"), Value::Int(3))]).unwrap();
        let err = mapping.call_method("update", &[update]).unwrap_err();
        assert!(err.is_no_such_attribute());
        let err = mapping.set_item(&Value::from("b"), Value::Int(3)).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError(_)));
        assert_eq!(mapping.len().unwrap(), 1);
    }

    #[test]
    fn test_missing_key_propagates() {
        let err = mapping().get_item(&Value::from("zzz")).unwrap_err();
        assert!(matches!(err, RuntimeError::KeyError(_)));
    }

    #[test]
    fn test_iteration_and_containment() {
        let mapping = mapping();
        assert_eq!(mapping.iter().unwrap(), strs(&["a"]));
        assert!(mapping.contains(&Value::from("a")).unwrap());
    }
}

// =============================================================================
// Sets
// =============================================================================

mod set_tests {
    use super::*;

    #[test]
    fn test_read_only_set_operations() {
        let raw = Value::set(ints(&[1, 2, 3])).unwrap();
        let proxy = registry().wrap(&raw);
        let other = Value::set(ints(&[3, 4])).unwrap();

        let union = proxy.call_method("union", &[other.clone()]).unwrap();
        assert_eq!(union.kind_name(), "SetProxy");
        assert_eq!(union.len().unwrap(), 4);
        assert_eq!(
            proxy.call_method("intersection", &[other.clone()]).unwrap(),
            Value::set(ints(&[3])).unwrap()
        );
        assert_eq!(proxy.call_method("isdisjoint", &[other]).unwrap(), Value::Bool(false));
        assert!(proxy.contains(&Value::Int(2)).unwrap());
        assert_eq!(raw.len().unwrap(), 3);
    }

    #[test]
    fn test_set_mutators_absent() {
        let proxy = registry().wrap(&Value::set(ints(&[1])).unwrap());
        for name in ["add", "remove", "discard", "pop", "clear", "update"] {
            assert!(proxy.get_attr(name).unwrap_err().is_no_such_attribute(), "{name}");
        }
    }
}

// =============================================================================
// Nested Containers in Objects
// =============================================================================

#[test]
fn test_holder_repr() {
    let proxy = registry().wrap(&holder());
    assert_eq!(
        proxy.repr().unwrap(),
        "ImmutableProxy(Holder({'a': Inner(1)}, [Inner(2), Inner(3)]))"
    );
}
