//! Deep wrapping.
//!
//! [`wrap`] is applied to every value leaving a proxy: attribute reads, call
//! results, items and iteration results. Nothing is wrapped ahead of time,
//! so the cost follows the paths actually read and cyclic graphs need no
//! visited set: each step wraps what it reaches, and reaching an object
//! again simply yields another proxy over it.

use crate::object::Value;
use crate::proxy::registry::{Disposition, ProxyRegistry};
use crate::proxy::{ObjectShape, Proxy};
use std::sync::Arc;
use tracing::trace;

/// Read-only view of `value` under `registry`.
///
/// `None` and proxies are returned as they are.
pub fn wrap(registry: &Arc<ProxyRegistry>, value: &Value) -> Value {
    if matches!(value, Value::None | Value::Proxy(_)) {
        return value.clone();
    }
    let ty = value.type_ref();
    match registry.disposition(&ty) {
        Disposition::Identity => {
            trace!(ty = %ty, "immutable, not wrapped");
            value.clone()
        }
        Disposition::Factory(factory) => {
            trace!(ty = %ty, "custom proxy");
            factory(value, registry)
        }
        Disposition::Generic => {
            trace!(ty = %ty, "generic proxy");
            Proxy::new(value.clone(), ObjectShape::shared(), registry.clone())
        }
    }
}
