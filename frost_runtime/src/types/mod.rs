//! Builtin types.
//!
//! Each container module owns its object type and the table of methods it
//! exposes by name.

pub mod dict;
pub mod function;
pub mod list;
pub mod set;
pub mod slice;
pub mod string;
pub mod tuple;

use crate::error::RuntimeResult;
use crate::object::{BuiltinType, Value};
use crate::types::function::Function;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Native method signature; `args[0]` is the receiver.
pub(crate) type MethodFn = fn(&[Value]) -> RuntimeResult<Value>;

/// Methods of one builtin type, keyed by name.
pub(crate) type MethodTable = FxHashMap<&'static str, Arc<Function>>;

/// Build a method table for `owner`.
pub(crate) fn method_table(owner: &str, entries: &[(&'static str, MethodFn)]) -> MethodTable {
    entries
        .iter()
        .map(|&(name, body)| (name, Arc::new(Function::method(name, body).with_owner(owner))))
        .collect()
}

/// Look up a method of a builtin type.
pub fn builtin_method(ty: BuiltinType, name: &str) -> Option<Arc<Function>> {
    let table = match ty {
        BuiltinType::Str => string::methods(),
        BuiltinType::Tuple => tuple::methods(),
        BuiltinType::List => list::methods(),
        BuiltinType::Dict => dict::methods(),
        BuiltinType::Set => set::methods(),
        _ => return None,
    };
    table.get(name).cloned()
}
