//! Deep read-only proxies over a dynamic object model.
//!
//! This crate provides:
//! - A dynamic object model (values, classes with C3 MRO, instances,
//!   properties, native functions, `super`)
//! - Builtin containers (tuple, list, set, dict) with their by-name methods
//! - Deep read-only proxies: wrapping is lazy, every value read through a
//!   proxy is wrapped in turn, and writes anywhere in the reachable graph are
//!   rejected
//! - A registry deciding per type whether values are already immutable or
//!   need a custom proxy
//! - Frozen classes whose instances reject mutation after `__init__`
//! - Shallow and deep copies that escape the read-only view
//!
//! ```
//! use frost_runtime::{Value, wrap};
//!
//! let pair = Value::tuple(vec![Value::from("immutable"), Value::list(vec![Value::from("mutable")])]);
//! let frozen = wrap(&pair);
//! let inner = frozen.get_item(&Value::Int(1)).unwrap();
//! assert_eq!(inner.kind_name(), "ListProxy");
//! assert!(inner.call_method("append", &[Value::Int(1)]).is_err());
//! ```

pub mod config;
pub mod error;
pub mod object;
pub mod proxy;
pub mod types;

// Re-export commonly used items
pub use config::{ProxyConfig, ReprLimits};
pub use error::{ConstantAttributeError, RegistrationKind, RegistryError, RuntimeError, RuntimeResult};
pub use object::class::{ClassBuilder, ClassFlags, PyClass, immutable};
pub use object::repr::limited_repr;
pub use object::super_obj::{SuperObject, super_call};
pub use object::{BuiltinType, TypeRef, Value};

// Re-export the proxy layer
pub use proxy::classify::{AccessDecision, AccessKind, classify};
pub use proxy::copy::{copy, deepcopy};
pub use proxy::registry::{
    Disposition, ProxyFactory, ProxyRegistry, get_registered_immutable, get_registered_proxies,
    global_registry, register_immutable, register_proxy, shape_factory, wrap,
};
pub use proxy::{ExposedShape, ObjectShape, Proxy, ProxyShape, get_type, is_instance};

// Re-export function types used to build classes
pub use types::function::{BoundMethod, Function, FunctionKind, Property};
