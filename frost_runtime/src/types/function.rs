//! Function, bound method and property objects.
//!
//! Functions are native Rust closures taking a slice of arguments. For
//! instance and class methods `args[0]` is the receiver.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use std::fmt;
use std::sync::Arc;

/// Native function body.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync>;

// =============================================================================
// Function
// =============================================================================

/// How a function stored on a class binds when read through an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Binds to the instance.
    Method,
    /// Binds to the instance's class.
    ClassMethod,
    /// Never binds.
    Static,
}

/// A named native function.
pub struct Function {
    name: Arc<str>,
    qualname: Arc<str>,
    doc: Option<Arc<str>>,
    kind: FunctionKind,
    body: NativeFn,
}

impl Function {
    /// Create a function of the given kind.
    pub fn new<F>(name: &str, kind: FunctionKind, body: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            qualname: name.into(),
            doc: None,
            kind,
            body: Arc::new(body),
        }
    }

    /// Create an instance method.
    pub fn method<F>(name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        Self::new(name, FunctionKind::Method, body)
    }

    /// Create a free function.
    pub fn free<F>(name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        Self::new(name, FunctionKind::Static, body)
    }

    /// Attach a doc string.
    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the qualified name (`Owner.name`).
    pub(crate) fn with_owner(mut self, owner: &str) -> Self {
        self.qualname = format!("{owner}.{}", self.name).into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[inline]
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Invoke with the given arguments.
    #[inline]
    pub fn invoke(&self, args: &[Value]) -> RuntimeResult<Value> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("qualname", &self.qualname)
            .field("kind", &self.kind)
            .finish()
    }
}

// =============================================================================
// Bound Method
// =============================================================================

/// A function bound to its receiver.
///
/// The receiver may be a proxy; methods read through a proxy stay bound to
/// the proxy, so anything they write through `self` is rejected.
#[derive(Debug)]
pub struct BoundMethod {
    receiver: Value,
    function: Arc<Function>,
}

impl BoundMethod {
    pub fn new(receiver: Value, function: Arc<Function>) -> Self {
        Self { receiver, function }
    }

    #[inline]
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    #[inline]
    pub fn function(&self) -> &Arc<Function> {
        &self.function
    }

    /// Call with the receiver prepended.
    pub fn call(&self, args: &[Value]) -> RuntimeResult<Value> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(self.receiver.clone());
        full.extend_from_slice(args);
        self.function.invoke(&full)
    }
}

// =============================================================================
// Property
// =============================================================================

/// A computed attribute with optional setter and deleter.
///
/// The getter receives `[receiver]`, the setter `[receiver, value]` and the
/// deleter `[receiver]`.
pub struct Property {
    getter: NativeFn,
    setter: Option<NativeFn>,
    deleter: Option<NativeFn>,
    doc: Option<Arc<str>>,
}

impl Property {
    /// Create a read-only property.
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(getter),
            setter: None,
            deleter: None,
            doc: None,
        }
    }

    /// Attach a setter.
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Attach a deleter.
    pub fn with_deleter<F>(mut self, deleter: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.deleter = Some(Arc::new(deleter));
        self
    }

    /// Attach a doc string.
    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn get(&self, receiver: &Value) -> RuntimeResult<Value> {
        (self.getter)(std::slice::from_ref(receiver))
    }

    /// Run the setter. `Ok(false)` when the property has none.
    pub fn set(&self, receiver: &Value, value: Value) -> RuntimeResult<bool> {
        match &self.setter {
            Some(setter) => setter(&[receiver.clone(), value]).map(|_| true),
            None => Ok(false),
        }
    }

    /// Run the deleter. `Ok(false)` when the property has none.
    pub fn delete(&self, receiver: &Value) -> RuntimeResult<bool> {
        match &self.deleter {
            Some(deleter) => deleter(std::slice::from_ref(receiver)).map(|_| true),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("settable", &self.setter.is_some())
            .field("deletable", &self.deleter.is_some())
            .finish()
    }
}

// =============================================================================
// Argument Helpers
// =============================================================================

/// Fetch argument `index`, or fail with a type error naming `fname`.
#[inline]
pub fn arg<'a>(args: &'a [Value], index: usize, fname: &str) -> RuntimeResult<&'a Value> {
    args.get(index).ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{fname}() missing required argument (position {index})"
        ))
    })
}

/// Check that `args.len()` lies within `min..=max`.
pub fn check_arity(args: &[Value], min: usize, max: usize, fname: &str) -> RuntimeResult<()> {
    let n = args.len();
    if n < min || n > max {
        let expected = if min == max {
            format!("exactly {min}")
        } else {
            format!("from {min} to {max}")
        };
        return Err(RuntimeError::type_error(format!(
            "{fname}() takes {expected} arguments ({n} given)"
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
