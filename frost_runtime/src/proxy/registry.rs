//! Proxy registry.
//!
//! Maps runtime types to a wrapping disposition: already immutable (wrap
//! returns the value itself) or a custom proxy factory. Types without an
//! entry get the generic object proxy.
//!
//! Lookup walks the value's MRO, most derived type first, and the first type
//! with an entry decides. A type never carries both dispositions.
//!
//! Registration is expected to happen before wrapping starts. The tables are
//! behind a lock, but a wrap racing a registration may see either state.

use crate::config::ProxyConfig;
use crate::error::{RegistrationKind, RegistryError};
use crate::object::{BuiltinType, TypeRef, Value};
use crate::proxy::deep;
use crate::proxy::{ExposedShape, Proxy, ProxyShape};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Builds the read-only view of a value of a registered type.
pub type ProxyFactory = Arc<dyn Fn(&Value, &Arc<ProxyRegistry>) -> Value + Send + Sync>;

/// How values of a type are wrapped.
#[derive(Clone)]
pub enum Disposition {
    /// Already immutable; returned unchanged.
    Identity,
    /// Wrapped by a registered factory.
    Factory(ProxyFactory),
    /// Wrapped by the generic object proxy.
    Generic,
}

impl fmt::Debug for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Generic => f.write_str("Generic"),
        }
    }
}

/// Types wrapped as themselves by a default registry.
const BUILTIN_IMMUTABLE: [BuiltinType; 8] = [
    BuiltinType::NoneType,
    BuiltinType::Bool,
    BuiltinType::Int,
    BuiltinType::Float,
    BuiltinType::Complex,
    BuiltinType::Str,
    BuiltinType::Bytes,
    BuiltinType::Slice,
];

/// Container proxies installed by a default registry: type, shape name and
/// exposed read-only methods.
const BUILTIN_PROXIES: [(BuiltinType, &str, &[&str]); 4] = [
    (BuiltinType::Tuple, "TupleProxy", &["count", "index"]),
    (BuiltinType::List, "ListProxy", &["count", "index"]),
    (BuiltinType::Dict, "DictProxy", &["get", "items", "keys", "values"]),
    (
        BuiltinType::Set,
        "SetProxy",
        &[
            "difference",
            "intersection",
            "isdisjoint",
            "issubset",
            "issuperset",
            "symmetric_difference",
            "union",
        ],
    ),
];

#[derive(Default)]
struct RegistryTables {
    immutable: IndexSet<TypeRef, FxBuildHasher>,
    proxies: IndexMap<TypeRef, ProxyFactory, FxBuildHasher>,
}

/// Table of wrapping dispositions, shared by every proxy it creates.
pub struct ProxyRegistry {
    tables: RwLock<RegistryTables>,
    config: ProxyConfig,
}

impl ProxyRegistry {
    /// A registry with no entries: everything but `None` gets the generic
    /// proxy.
    pub fn empty(config: ProxyConfig) -> Arc<Self> {
        Arc::new(Self {
            tables: RwLock::new(RegistryTables::default()),
            config,
        })
    }

    /// A registry with the builtin entries, unless `config` disables them.
    pub fn new(config: ProxyConfig) -> Arc<Self> {
        let install = config.builtins;
        let registry = Self::empty(config);
        if install {
            registry.install_builtins();
        }
        registry
    }

    fn install_builtins(&self) {
        let mut tables = self.tables.write();
        for ty in BUILTIN_IMMUTABLE {
            tables.immutable.insert(TypeRef::Builtin(ty));
        }
        for (ty, name, members) in BUILTIN_PROXIES {
            let shape: Arc<dyn ProxyShape> = Arc::new(ExposedShape::new(name, members));
            tables.proxies.insert(TypeRef::Builtin(ty), shape_factory(shape));
        }
        debug!(
            immutable = tables.immutable.len(),
            proxies = tables.proxies.len(),
            "builtin registrations installed"
        );
    }

    #[inline]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Mark `ty` (and its subtypes, unless they have their own entry) as
    /// already immutable.
    ///
    /// Registering the same type twice is a no-op.
    pub fn register_immutable(&self, ty: impl Into<TypeRef>) -> Result<(), RegistryError> {
        let ty = ty.into();
        let mut tables = self.tables.write();
        if tables.proxies.contains_key(&ty) {
            return Err(duplicate(&ty, RegistrationKind::Proxy));
        }
        if tables.immutable.insert(ty.clone()) {
            debug!(ty = %ty, "registered immutable type");
        }
        Ok(())
    }

    /// Wrap values of `ty` (and its subtypes, unless they have their own
    /// entry) with `factory`.
    ///
    /// A second factory for the same type replaces the first.
    pub fn register_proxy(&self, ty: impl Into<TypeRef>, factory: ProxyFactory) -> Result<(), RegistryError> {
        let ty = ty.into();
        let mut tables = self.tables.write();
        if tables.immutable.contains(&ty) {
            return Err(duplicate(&ty, RegistrationKind::Immutable));
        }
        let replaced = tables.proxies.insert(ty.clone(), factory).is_some();
        debug!(ty = %ty, replaced, "registered proxy factory");
        Ok(())
    }

    /// Immutable types in registration order.
    pub fn get_registered_immutable(&self) -> Vec<TypeRef> {
        self.tables.read().immutable.iter().cloned().collect()
    }

    /// Types with a proxy factory, in registration order.
    pub fn get_registered_proxies(&self) -> Vec<TypeRef> {
        self.tables.read().proxies.keys().cloned().collect()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Disposition of values whose runtime type is `ty`.
    pub fn disposition(&self, ty: &TypeRef) -> Disposition {
        let tables = self.tables.read();
        for candidate in ty.mro() {
            if tables.immutable.contains(&candidate) {
                return Disposition::Identity;
            }
            if let Some(factory) = tables.proxies.get(&candidate) {
                return Disposition::Factory(factory.clone());
            }
        }
        Disposition::Generic
    }

    /// Read-only view of `value`.
    #[inline]
    pub fn wrap(self: &Arc<Self>, value: &Value) -> Value {
        deep::wrap(self, value)
    }
}

impl fmt::Debug for ProxyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("ProxyRegistry")
            .field("immutable", &tables.immutable)
            .field("proxies", &tables.proxies.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

fn duplicate(ty: &TypeRef, existing: RegistrationKind) -> RegistryError {
    RegistryError::DuplicateRegistration {
        type_name: ty.name().to_string(),
        existing,
    }
}

/// Factory that wraps values in a [`Proxy`] with `shape`.
pub fn shape_factory(shape: Arc<dyn ProxyShape>) -> ProxyFactory {
    Arc::new(move |value, registry| Proxy::new(value.clone(), shape.clone(), registry.clone()))
}

// =============================================================================
// Global Registry Access
// =============================================================================

static GLOBAL_REGISTRY: OnceLock<Arc<ProxyRegistry>> = OnceLock::new();

/// The process-wide registry, configured from the environment on first use.
pub fn global_registry() -> &'static Arc<ProxyRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| ProxyRegistry::new(ProxyConfig::from_env()))
}

/// Read-only view of `value` using the global registry.
pub fn wrap(value: &Value) -> Value {
    global_registry().wrap(value)
}

/// [`ProxyRegistry::register_immutable`] on the global registry.
pub fn register_immutable(ty: impl Into<TypeRef>) -> Result<(), RegistryError> {
    global_registry().register_immutable(ty)
}

/// [`ProxyRegistry::register_proxy`] on the global registry.
pub fn register_proxy(ty: impl Into<TypeRef>, factory: ProxyFactory) -> Result<(), RegistryError> {
    global_registry().register_proxy(ty, factory)
}

pub fn get_registered_immutable() -> Vec<TypeRef> {
    global_registry().get_registered_immutable()
}

pub fn get_registered_proxies() -> Vec<TypeRef> {
    global_registry().get_registered_proxies()
}

// =============================================================================
// Tests
// =============================================================================
