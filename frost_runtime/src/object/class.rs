//! User-defined class objects.
//!
//! A `PyClass` holds its name, direct bases, the cached method resolution
//! order and a class dictionary of methods, properties and class variables.
//!
//! # Architecture
//!
//! ```text
//! PyClass
//! ├── id: ClassId (unique per class)
//! ├── name / doc
//! ├── bases: SmallVec<[Arc<PyClass>; 2]>
//! ├── mro_tail: Vec<Arc<PyClass>> (C3 order, excluding the class itself)
//! ├── flags: ClassFlags
//! └── dict: ClassDict
//! ```
//!
//! Classes are built once through [`ClassBuilder`]; bases and MRO are
//! immutable afterwards, the class dictionary is not.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::object::attr::bind;
use crate::object::instance::InstanceObject;
use crate::types::function::{Function, FunctionKind, Property};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

// =============================================================================
// Class IDs
// =============================================================================

/// Unique identifier of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Global counter for allocating class IDs.
static NEXT_CLASS_ID: AtomicU32 = AtomicU32::new(1);

fn allocate_class_id() -> ClassId {
    ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
}

// =============================================================================
// Class Flags
// =============================================================================

bitflags::bitflags! {
    /// Flags describing class behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassFlags: u32 {
        /// Instances reject attribute writes and deletes once `__init__`
        /// returns. Inherited by subclasses.
        const FROZEN = 1 << 0;
    }
}

// =============================================================================
// Class Dictionary
// =============================================================================

/// Class attribute dictionary (methods, properties, class variables).
#[derive(Debug, Default)]
pub struct ClassDict {
    attrs: RwLock<FxHashMap<Arc<str>, Value>>,
}

impl ClassDict {
    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    #[inline]
    pub fn set(&self, name: &str, value: Value) {
        self.attrs.write().insert(name.into(), value);
    }

    #[inline]
    pub fn delete(&self, name: &str) -> Option<Value> {
        self.attrs.write().remove(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.read().contains_key(name)
    }

    /// Attribute names, sorted.
    pub fn keys(&self) -> Vec<Arc<str>> {
        let mut keys: Vec<_> = self.attrs.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.attrs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.read().is_empty()
    }
}

/// Stack-allocated storage for base classes.
/// Most classes have 1-2 base classes.
pub type Bases = SmallVec<[Arc<PyClass>; 2]>;

// =============================================================================
// Class Object
// =============================================================================

/// A user-defined class.
pub struct PyClass {
    id: ClassId,
    name: Arc<str>,
    doc: Option<Arc<str>>,
    bases: Bases,
    mro_tail: Vec<Arc<PyClass>>,
    flags: ClassFlags,
    dict: ClassDict,
}

impl PyClass {
    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[inline]
    pub fn bases(&self) -> &[Arc<PyClass>] {
        &self.bases
    }

    #[inline]
    pub fn flags(&self) -> ClassFlags {
        self.flags
    }

    #[inline]
    pub fn dict(&self) -> &ClassDict {
        &self.dict
    }

    /// Whether instances are frozen after construction.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.flags.contains(ClassFlags::FROZEN)
    }

    /// Method resolution order, starting with this class. `object` is not
    /// included.
    pub fn mro(self: &Arc<Self>) -> impl Iterator<Item = Arc<PyClass>> + '_ {
        std::iter::once(self.clone()).chain(self.mro_tail.iter().cloned())
    }

    /// Check whether this class is `other` or derives from it.
    pub fn is_subclass(&self, other: &PyClass) -> bool {
        self.id == other.id || self.mro_tail.iter().any(|c| c.id == other.id)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Look up an attribute by walking the MRO.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.dict
            .get(name)
            .or_else(|| self.mro_tail.iter().find_map(|c| c.dict.get(name)))
    }

    /// Look up a property on the MRO.
    pub(crate) fn lookup_property(&self, name: &str) -> Option<Arc<Property>> {
        match self.lookup(name)? {
            Value::Property(p) => Some(p),
            _ => None,
        }
    }

    // =========================================================================
    // Instantiation
    // =========================================================================

    /// Create an instance and run `__init__` with `args`.
    ///
    /// Instances of frozen classes are frozen once `__init__` returns.
    pub fn instantiate(self: &Arc<Self>, args: &[Value]) -> RuntimeResult<Value> {
        let instance = Arc::new(InstanceObject::new(self.clone()));
        let value = Value::Instance(instance.clone());

        match self.lookup("__init__") {
            Some(init) => {
                let result = bind(init, &value, self).call(args)?;
                if !result.is_none() {
                    return Err(RuntimeError::type_error(format!(
                        "__init__() should return None, not '{}'",
                        result.kind_name()
                    )));
                }
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::type_error(format!(
                    "{}() takes no arguments",
                    self.name
                )));
            }
            None => {}
        }

        if self.is_frozen() {
            instance.freeze();
        }
        Ok(value)
    }
}

impl fmt::Debug for PyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name)
    }
}

// =============================================================================
// MRO Computation
// =============================================================================

/// C3 linearization of `bases`, excluding the class being defined.
fn compute_c3_mro(bases: &[Arc<PyClass>]) -> Option<Vec<Arc<PyClass>>> {
    let mut seqs: Vec<Vec<Arc<PyClass>>> = bases.iter().map(|b| b.mro().collect()).collect();
    seqs.push(bases.to_vec());

    let mut out = Vec::new();
    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Some(out);
        }
        let candidate = seqs
            .iter()
            .map(|s| &s[0])
            .find(|c| !seqs.iter().any(|s| s[1..].iter().any(|x| x.id == c.id)))?
            .clone();
        for seq in &mut seqs {
            if seq[0].id == candidate.id {
                seq.remove(0);
            }
        }
        out.push(candidate);
    }
}

// =============================================================================
// Class Builder
// =============================================================================

/// Builder for [`PyClass`].
///
/// ```ignore
/// let point = ClassBuilder::new("Point")
///     .method("__init__", |args| { /* ... */ Ok(Value::None) })
///     .property("norm", Property::new(|args| { /* ... */ }))
///     .build()?;
/// ```
pub struct ClassBuilder {
    name: Arc<str>,
    doc: Option<Arc<str>>,
    bases: Bases,
    flags: ClassFlags,
    attrs: Vec<(Arc<str>, Value)>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            doc: None,
            bases: SmallVec::new(),
            flags: ClassFlags::empty(),
            attrs: Vec::new(),
        }
    }

    /// Add a direct base class.
    pub fn base(mut self, base: &Arc<PyClass>) -> Self {
        self.bases.push(base.clone());
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Freeze instances after construction.
    pub fn frozen(mut self) -> Self {
        self.flags |= ClassFlags::FROZEN;
        self
    }

    /// Add an instance method.
    pub fn method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.function(Function::method(name, body))
    }

    /// Add a class method; `args[0]` is the class.
    pub fn classmethod<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.function(Function::new(name, FunctionKind::ClassMethod, body))
    }

    /// Add a static method.
    pub fn staticmethod<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        self.function(Function::new(name, FunctionKind::Static, body))
    }

    /// Add a prebuilt function (keeps its kind and doc).
    pub fn function(mut self, function: Function) -> Self {
        let function = function.with_owner(&self.name);
        let name: Arc<str> = function.name().into();
        self.attrs.push((name, Value::Function(Arc::new(function))));
        self
    }

    pub fn property(mut self, name: &str, property: Property) -> Self {
        self.attrs.push((name.into(), Value::Property(Arc::new(property))));
        self
    }

    /// Add a class variable.
    pub fn attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Compute the MRO and create the class.
    pub fn build(self) -> RuntimeResult<Arc<PyClass>> {
        for (i, base) in self.bases.iter().enumerate() {
            if self.bases[..i].iter().any(|b| b.id == base.id) {
                return Err(RuntimeError::type_error(format!(
                    "duplicate base class {}",
                    base.name
                )));
            }
        }

        let mro_tail = compute_c3_mro(&self.bases).ok_or_else(|| {
            let names: Vec<&str> = self.bases.iter().map(|b| b.name()).collect();
            RuntimeError::type_error(format!(
                "Cannot create a consistent method resolution order (MRO) for bases {}",
                names.join(", ")
            ))
        })?;

        let mut flags = self.flags;
        if self.bases.iter().any(|b| b.is_frozen()) {
            flags |= ClassFlags::FROZEN;
        }

        let dict = ClassDict::default();
        for (name, value) in self.attrs {
            dict.set(&name, value);
        }

        let class = Arc::new(PyClass {
            id: allocate_class_id(),
            name: self.name,
            doc: self.doc,
            bases: self.bases,
            mro_tail,
            flags,
            dict,
        });
        debug!(class = %class.name, id = class.id.0, frozen = class.is_frozen(), "class created");
        Ok(class)
    }
}

/// Derive a frozen subclass of `class` with the same name and doc.
///
/// Instances are mutable inside `__init__` (including cooperative base
/// initializers) and reject writes and deletes afterwards.
pub fn immutable(class: &Arc<PyClass>) -> RuntimeResult<Arc<PyClass>> {
    let mut builder = ClassBuilder::new(class.name()).base(class).frozen();
    if let Some(doc) = class.doc() {
        builder = builder.doc(doc);
    }
    builder.build()
}

// =============================================================================
// Tests
// =============================================================================
