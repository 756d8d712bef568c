//! Shared fixtures for integration tests.

#![allow(dead_code)]

use frost_runtime::{
    ClassBuilder, Function, ProxyConfig, ProxyRegistry, PyClass, RuntimeError, RuntimeResult,
    Property, Value, super_call,
};
use std::sync::{Arc, OnceLock};

/// Registry with the default registrations, independent of the environment.
pub fn registry() -> Arc<ProxyRegistry> {
    ProxyRegistry::new(ProxyConfig::default())
}

/// A class handle filled in after the class is built, for methods that
/// call `super`.
#[derive(Clone, Default)]
pub struct ClassSlot(Arc<OnceLock<Arc<PyClass>>>);

impl ClassSlot {
    pub fn get(&self) -> RuntimeResult<Arc<PyClass>> {
        self.0
            .get()
            .cloned()
            .ok_or_else(|| RuntimeError::type_error("class not built yet"))
    }

    pub fn fill(&self, class: &Arc<PyClass>) {
        let _ = self.0.set(class.clone());
    }
}

fn int_of(value: &Value) -> i64 {
    value.as_int().unwrap_or_default()
}

/// `Example(x)` with `__repr__` rendering `Example(<x>)`.
pub fn example_class() -> Arc<PyClass> {
    ClassBuilder::new("Example")
        .method("__init__", |args| {
            args[0].set_attr("x", args[1].clone())?;
            Ok(Value::None)
        })
        .method("__repr__", |args| {
            let x = args[0].get_attr("x")?;
            Ok(Value::from(format!("Example({})", x.repr()?)))
        })
        .method("set_x", |args| {
            args[0].set_attr("x", args[1].clone())?;
            Ok(Value::None)
        })
        .build()
        .unwrap()
}

/// `A(x, y=0)`: plain attribute `x`, property `y` backed by `_y`, a class
/// method, a static method, `__str__`, `__bool__` and `__eq__`.
pub fn class_a() -> Arc<PyClass> {
    ClassBuilder::new("A")
        .method("__init__", |args| {
            args[0].set_attr("x", args[1].clone())?;
            args[0].set_attr("y", args.get(2).cloned().unwrap_or(Value::Int(0)))?;
            Ok(Value::None)
        })
        .method("__repr__", |args| {
            let name = args[0].get_attr("__class__")?.get_attr("__name__")?;
            Ok(Value::from(format!(
                "{}({}, {})",
                name.py_str()?,
                args[0].get_attr("x")?.repr()?,
                args[0].get_attr("y")?.repr()?
            )))
        })
        .method("__str__", |args| {
            Ok(Value::from(format!(
                "({}, {})",
                args[0].get_attr("x")?.repr()?,
                args[0].get_attr("y")?.repr()?
            )))
        })
        .method("__bool__", |args| Ok(Value::Bool(args[0].get_attr("x")?.truthy()?)))
        .method("__eq__", |args| {
            if !args[1].has_attr("x")? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(args[0].get_attr("x")?.py_eq(&args[1].get_attr("x")?)?))
        })
        .function(
            Function::method("set_x", |args| {
                args[0].set_attr("x", args[1].clone())?;
                Ok(Value::None)
            })
            .with_doc("Sets x."),
        )
        .method("get_x", |args| args[0].get_attr("x"))
        .property(
            "y",
            Property::new(|args| args[0].get_attr("_y")).with_setter(|args| {
                args[0].set_attr("_y", args[1].clone())?;
                Ok(Value::None)
            }),
        )
        .function(
            Function::new("get_name", frost_runtime::FunctionKind::ClassMethod, |args| {
                args[0].get_attr("__name__")
            })
            .with_doc("Docstring"),
        )
        .staticmethod("get_something", |_| Ok(Value::from("something")))
        .build()
        .unwrap()
}

/// `B(x, y=0, z=-1)` deriving from `a`; every override goes through `super`.
pub fn class_b(a: &Arc<PyClass>) -> Arc<PyClass> {
    let slot = ClassSlot::default();
    let (init_slot, set_slot, get_slot, name_slot) =
        (slot.clone(), slot.clone(), slot.clone(), slot.clone());

    let class = ClassBuilder::new("B")
        .base(a)
        .method("__init__", move |args| {
            let class = init_slot.get()?;
            let y = args.get(2).cloned().unwrap_or(Value::Int(0));
            super_call(&class, &args[0], "__init__", &[args[1].clone(), y])?;
            args[0].set_attr("z", args.get(3).cloned().unwrap_or(Value::Int(-1)))?;
            Ok(Value::None)
        })
        .function(
            Function::method("set_x", move |args| {
                super_call(&set_slot.get()?, &args[0], "set_x", &args[1..])
            })
            .with_doc("Sets x in child."),
        )
        .method("get_x", move |args| {
            super_call(&get_slot.get()?, &args[0], "get_x", &[])
        })
        .function(
            Function::new("get_name", frost_runtime::FunctionKind::ClassMethod, move |args| {
                super_call(&name_slot.get()?, &args[0], "get_name", &[])
            })
            .with_doc("Child Docstring"),
        )
        .build()
        .unwrap();
    slot.fill(&class);
    class
}

/// `Inner(x, y)` and `Outer(a, b)`, where `Outer.b` is a property.
pub fn inner_outer() -> (Arc<PyClass>, Arc<PyClass>) {
    let inner = ClassBuilder::new("Inner")
        .method("__init__", |args| {
            args[0].set_attr("x", args[1].clone())?;
            args[0].set_attr("y", args[2].clone())?;
            Ok(Value::None)
        })
        .method("__repr__", |args| {
            Ok(Value::from(format!(
                "Inner({}, {})",
                int_of(&args[0].get_attr("x")?),
                int_of(&args[0].get_attr("y")?)
            )))
        })
        .method("set_x", |args| {
            args[0].set_attr("x", args[1].clone())?;
            Ok(Value::None)
        })
        .method("get_x", |args| args[0].get_attr("x"))
        .build()
        .unwrap();

    let outer = ClassBuilder::new("Outer")
        .method("__init__", |args| {
            args[0].set_attr("a", args[1].clone())?;
            args[0].set_attr("b", args[2].clone())?;
            Ok(Value::None)
        })
        .method("__repr__", |args| {
            Ok(Value::from(format!(
                "Outer({}, {})",
                args[0].get_attr("a")?.repr()?,
                args[0].get_attr("b")?.repr()?
            )))
        })
        .method("set_a", |args| {
            args[0].set_attr("a", args[1].clone())?;
            Ok(Value::None)
        })
        .method("get_a", |args| args[0].get_attr("a"))
        .property(
            "b",
            Property::new(|args| args[0].get_attr("_b")).with_setter(|args| {
                args[0].set_attr("_b", args[1].clone())?;
                Ok(Value::None)
            }),
        )
        .build()
        .unwrap();

    (inner, outer)
}

/// `Outer(Inner(1, 2), Inner(3, 4))`.
pub fn nested() -> Value {
    let (inner, outer) = inner_outer();
    let a = inner.instantiate(&[Value::Int(1), Value::Int(2)]).unwrap();
    let b = inner.instantiate(&[Value::Int(3), Value::Int(4)]).unwrap();
    outer.instantiate(&[a, b]).unwrap()
}

/// `Main` holding a `Modifier` that points back to it. `Modifier.modify`
/// writes `x` on its main object; `Main.modify` does so through the
/// modifier.
pub fn main_with_modifier() -> Value {
    let modifier = ClassBuilder::new("Modifier")
        .method("__init__", |args| {
            args[0].set_attr("main", args[1].clone())?;
            Ok(Value::None)
        })
        .method("modify", |args| {
            args[0].get_attr("main")?.set_attr("x", Value::Int(-1))?;
            Ok(Value::None)
        })
        .build()
        .unwrap();

    let main = ClassBuilder::new("Main")
        .method("__init__", move |args| {
            args[0].set_attr("x", Value::Int(0))?;
            args[0].set_attr("modifier", modifier.instantiate(&args[..1])?)?;
            Ok(Value::None)
        })
        .method("modify", |args| args[0].get_attr("modifier")?.call_method("modify", &[]))
        .build()
        .unwrap();

    main.instantiate(&[]).unwrap()
}
