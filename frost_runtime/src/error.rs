//! Runtime error types.
//!
//! Every fallible operation on the object model and on proxies returns a
//! [`RuntimeResult`]. Errors raised by an object's own read-only operations
//! (a bad index, a missing key) travel through proxies unchanged.

use crate::proxy::classify::AccessKind;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Constant Attribute Error
// =============================================================================

/// Raised when a write or delete is attempted on an immutable object.
///
/// `owner` is the display name of the object that rejected the mutation:
/// `ImmutableProxy[Example]` for a proxy, or the class name for an instance
/// of a frozen class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "'{owner}' object is immutable. Cannot {action} attribute '{attr}' after initialization.",
    action = .kind.verb()
)]
pub struct ConstantAttributeError {
    /// Display name of the rejecting object.
    pub owner: String,
    /// Runtime type name of the object that would have been mutated.
    pub type_name: String,
    /// Member name.
    pub attr: String,
    /// The attempted access (`Write` or `Delete`).
    pub kind: AccessKind,
}

// =============================================================================
// Registry Errors
// =============================================================================

/// How a type is currently registered with a proxy registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
    /// Registered as already immutable.
    Immutable,
    /// Registered with a custom proxy factory.
    Proxy,
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immutable => f.write_str("an immutable type"),
            Self::Proxy => f.write_str("a proxied type"),
        }
    }
}

/// Errors raised by registry mutators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The type already carries the other disposition.
    #[error("type '{type_name}' is already registered as {existing}")]
    DuplicateRegistration {
        /// Name of the type being registered.
        type_name: String,
        /// The registration that is already in place.
        existing: RegistrationKind,
    },
}

// =============================================================================
// Runtime Error
// =============================================================================

/// Error raised by object model and proxy operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A write or delete was rejected.
    #[error(transparent)]
    ConstantAttribute(#[from] ConstantAttributeError),

    /// The member does not exist on the object (or is not exposed by it).
    #[error("'{type_name}' object has no attribute '{attr}'")]
    NoSuchAttribute {
        /// Type (or proxy shape) name.
        type_name: String,
        /// Member name.
        attr: String,
    },

    /// Any other attribute failure (e.g. a property without a setter).
    #[error("{0}")]
    AttributeError(String),

    /// Operation applied to a value of the wrong type.
    #[error("{0}")]
    TypeError(String),

    /// Sequence index out of range.
    #[error("{0}")]
    IndexError(String),

    /// Mapping key not found.
    #[error("{0}")]
    KeyError(String),

    /// Right type, inappropriate value.
    #[error("{0}")]
    ValueError(String),

    /// Nesting deeper than the runtime follows (e.g. comparing cyclic
    /// containers).
    #[error("maximum recursion depth exceeded {0}")]
    RecursionError(String),

    /// Registry misuse.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl RuntimeError {
    /// Build a [`RuntimeError::NoSuchAttribute`].
    pub fn no_such_attribute(type_name: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::NoSuchAttribute {
            type_name: type_name.into(),
            attr: attr.into(),
        }
    }

    /// Build a [`RuntimeError::TypeError`].
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError(message.into())
    }

    /// Build a [`RuntimeError::IndexError`].
    pub fn index_error(message: impl Into<String>) -> Self {
        Self::IndexError(message.into())
    }

    /// Build a [`RuntimeError::ValueError`].
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::ValueError(message.into())
    }

    /// Whether this is a rejected mutation.
    #[inline]
    pub fn is_constant_attribute(&self) -> bool {
        matches!(self, Self::ConstantAttribute(_))
    }

    /// Whether nesting went past the runtime's depth limit.
    #[inline]
    pub fn is_recursion(&self) -> bool {
        matches!(self, Self::RecursionError(_))
    }

    /// Whether this is a missing (or unexposed) member.
    #[inline]
    pub fn is_no_such_attribute(&self) -> bool {
        matches!(self, Self::NoSuchAttribute { .. })
    }

    /// The rejected mutation, if this is one.
    pub fn as_constant_attribute(&self) -> Option<&ConstantAttributeError> {
        match self {
            Self::ConstantAttribute(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

// =============================================================================
// Tests
// =============================================================================
