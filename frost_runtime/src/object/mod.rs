//! Core value and type representation.
//!
//! Every runtime value is a [`Value`]: immediates are stored inline, heap
//! objects behind an `Arc`. Cloning a `Value` never copies the object it
//! refers to, so a value handed out by a proxy always aliases the real object.

pub mod attr;
pub mod class;
pub mod copy;
pub mod hash;
pub mod instance;
pub mod ops;
pub mod repr;
pub mod super_obj;

use crate::error::RuntimeResult;
use crate::object::class::PyClass;
use crate::object::hash::HashKey;
use crate::object::instance::InstanceObject;
use crate::proxy::Proxy;
use crate::types::dict::DictObject;
use crate::types::function::{BoundMethod, Function, Property};
use crate::types::list::ListObject;
use crate::types::set::SetObject;
use crate::types::slice::SliceObject;
use crate::types::tuple::TupleObject;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// =============================================================================
// Complex Numbers
// =============================================================================

/// Complex number payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

// =============================================================================
// Value
// =============================================================================

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// The "no value" sentinel.
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    Tuple(Arc<TupleObject>),
    List(Arc<ListObject>),
    Set(Arc<SetObject>),
    Dict(Arc<DictObject>),
    Slice(Arc<SliceObject>),
    /// Instance of a user-defined class.
    Instance(Arc<InstanceObject>),
    /// A user-defined class.
    Class(Arc<PyClass>),
    /// A free (or unbound) function.
    Function(Arc<Function>),
    /// A function bound to a receiver.
    BoundMethod(Arc<BoundMethod>),
    /// A property descriptor stored on a class.
    Property(Arc<Property>),
    /// A read-only view over another value.
    Proxy(Arc<Proxy>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a complex number.
    #[inline]
    pub fn complex(re: f64, im: f64) -> Self {
        Self::Complex(Complex { re, im })
    }

    /// Create a bytes value.
    #[inline]
    pub fn bytes(data: &[u8]) -> Self {
        Self::Bytes(data.into())
    }

    /// Create a tuple.
    #[inline]
    pub fn tuple(items: Vec<Value>) -> Self {
        Self::Tuple(Arc::new(TupleObject::from_vec(items)))
    }

    /// Create a list.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Self::List(Arc::new(ListObject::from_vec(items)))
    }

    /// Create a set. Fails if an element is unhashable.
    pub fn set(items: Vec<Value>) -> RuntimeResult<Self> {
        Ok(Self::Set(Arc::new(SetObject::from_values(items)?)))
    }

    /// Create a dict from key-value pairs. Fails if a key is unhashable.
    pub fn dict(pairs: Vec<(Value, Value)>) -> RuntimeResult<Self> {
        Ok(Self::Dict(Arc::new(DictObject::from_pairs(pairs)?)))
    }

    /// Create a slice.
    #[inline]
    pub fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self::Slice(Arc::new(SliceObject::new(start, stop, step)))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Check for the `None` sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Integer payload (`bool` counts as an integer).
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Float payload.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String payload.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Check whether this is a proxy.
    #[inline]
    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::Proxy(_))
    }

    /// The proxy, if this is one.
    #[inline]
    pub fn as_proxy(&self) -> Option<&Arc<Proxy>> {
        match self {
            Self::Proxy(p) => Some(p),
            _ => None,
        }
    }

    /// Strip a proxy layer, yielding the real object.
    #[inline]
    pub fn unwrap_proxy(&self) -> &Value {
        match self {
            Self::Proxy(p) => p.target(),
            other => other,
        }
    }

    /// Runtime type. For a proxy this is the type of the wrapped object.
    pub fn type_ref(&self) -> TypeRef {
        let builtin = match self {
            Self::None => BuiltinType::NoneType,
            Self::Bool(_) => BuiltinType::Bool,
            Self::Int(_) => BuiltinType::Int,
            Self::Float(_) => BuiltinType::Float,
            Self::Complex(_) => BuiltinType::Complex,
            Self::Str(_) => BuiltinType::Str,
            Self::Bytes(_) => BuiltinType::Bytes,
            Self::Tuple(_) => BuiltinType::Tuple,
            Self::List(_) => BuiltinType::List,
            Self::Set(_) => BuiltinType::Set,
            Self::Dict(_) => BuiltinType::Dict,
            Self::Slice(_) => BuiltinType::Slice,
            Self::Class(_) => BuiltinType::Type,
            Self::Function(_) => BuiltinType::Function,
            Self::BoundMethod(_) => BuiltinType::Method,
            Self::Property(_) => BuiltinType::Property,
            Self::Instance(inst) => return TypeRef::Class(inst.class().clone()),
            Self::Proxy(p) => return p.target().type_ref(),
        };
        TypeRef::Builtin(builtin)
    }

    /// Name used in error messages: the proxy shape for proxies, the
    /// runtime type name otherwise.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Proxy(p) => p.shape_name().to_string(),
            other => other.type_ref().name().to_string(),
        }
    }

    /// Identity comparison (`is`).
    ///
    /// Immediates compare by value, heap objects by address.
    pub fn is(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => HashKey::scalar_eq(self, other),
            _ => false,
        }
    }

    /// Address of the heap object, or `None` for immediates.
    pub(crate) fn identity(&self) -> Option<usize> {
        fn addr<T: ?Sized>(arc: &Arc<T>) -> usize {
            Arc::as_ptr(arc) as *const () as usize
        }
        match self {
            Self::None
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Complex(_) => None,
            Self::Str(s) => Some(addr(s)),
            Self::Bytes(b) => Some(addr(b)),
            Self::Tuple(t) => Some(addr(t)),
            Self::List(l) => Some(addr(l)),
            Self::Set(s) => Some(addr(s)),
            Self::Dict(d) => Some(addr(d)),
            Self::Slice(s) => Some(addr(s)),
            Self::Instance(i) => Some(addr(i)),
            Self::Class(c) => Some(addr(c)),
            Self::Function(f) => Some(addr(f)),
            Self::BoundMethod(m) => Some(addr(m)),
            Self::Property(p) => Some(addr(p)),
            Self::Proxy(p) => Some(addr(p)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s.into())
    }
}

impl From<Arc<PyClass>> for Value {
    fn from(class: Arc<PyClass>) -> Self {
        Self::Class(class)
    }
}

/// Structural equality, as `==`. Errors raised by `__eq__` compare unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.py_eq(other).unwrap_or(false)
    }
}

/// Debug output is the value's `repr`.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            Ok(s) => f.write_str(&s),
            Err(err) => write!(f, "<repr failed: {err}>"),
        }
    }
}

/// Display output is the value's `str`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.py_str().map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

// =============================================================================
// Builtin Types
// =============================================================================

/// Types implemented natively by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Object,
    NoneType,
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    Tuple,
    List,
    Set,
    Dict,
    Slice,
    Function,
    Method,
    Property,
    Type,
}

impl BuiltinType {
    /// Type name as shown to users.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::NoneType => "NoneType",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::Tuple => "tuple",
            Self::List => "list",
            Self::Set => "set",
            Self::Dict => "dict",
            Self::Slice => "slice",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::Type => "type",
        }
    }

    /// Direct base, or `None` for `object`.
    const fn base(self) -> Option<BuiltinType> {
        match self {
            Self::Object => None,
            Self::Bool => Some(Self::Int),
            _ => Some(Self::Object),
        }
    }
}

// =============================================================================
// Type References
// =============================================================================

/// A runtime type: builtin or user-defined.
#[derive(Clone)]
pub enum TypeRef {
    Builtin(BuiltinType),
    Class(Arc<PyClass>),
}

impl TypeRef {
    /// The root type.
    pub const OBJECT: TypeRef = TypeRef::Builtin(BuiltinType::Object);

    /// Type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(b) => b.name(),
            Self::Class(c) => c.name(),
        }
    }

    /// Method resolution order, most derived first, ending in `object`.
    pub fn mro(&self) -> Vec<TypeRef> {
        match self {
            Self::Builtin(b) => {
                let mut mro = vec![TypeRef::Builtin(*b)];
                let mut current = b.base();
                while let Some(base) = current {
                    mro.push(TypeRef::Builtin(base));
                    current = base.base();
                }
                mro
            }
            Self::Class(c) => {
                let mut mro: Vec<TypeRef> = c.mro().map(TypeRef::Class).collect();
                mro.push(TypeRef::OBJECT);
                mro
            }
        }
    }

    /// Check whether `self` derives from (or is) `other`.
    pub fn is_subtype(&self, other: &TypeRef) -> bool {
        self.mro().iter().any(|t| t == other)
    }

    /// The class, for user-defined types.
    #[inline]
    pub fn as_class(&self) -> Option<&Arc<PyClass>> {
        match self {
            Self::Class(c) => Some(c),
            Self::Builtin(_) => None,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Builtin(b) => {
                0u8.hash(state);
                b.hash(state);
            }
            Self::Class(c) => {
                1u8.hash(state);
                c.id().hash(state);
            }
        }
    }
}

impl From<BuiltinType> for TypeRef {
    fn from(b: BuiltinType) -> Self {
        Self::Builtin(b)
    }
}

impl From<&Arc<PyClass>> for TypeRef {
    fn from(c: &Arc<PyClass>) -> Self {
        Self::Class(c.clone())
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Tests
// =============================================================================
