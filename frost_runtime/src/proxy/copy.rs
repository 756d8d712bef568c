//! Mutable copies of wrapped values.
//!
//! Copies are made from the target, never the proxy, and are returned
//! unwrapped. Mutating a copy is never rejected and never shows through the
//! proxy it came from.

use crate::error::RuntimeResult;
use crate::object::Value;

/// One-level mutable copy of `value`'s target.
pub fn copy(value: &Value) -> RuntimeResult<Value> {
    value.unwrap_proxy().shallow_copy()
}

/// Fully independent mutable copy of `value`'s target and everything
/// reachable from it.
pub fn deepcopy(value: &Value) -> RuntimeResult<Value> {
    value.unwrap_proxy().deep_copy()
}
