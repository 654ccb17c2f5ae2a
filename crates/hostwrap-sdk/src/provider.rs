//! Host reflection provider contract and an in-memory registry
//!
//! The engine never inspects host types directly; it asks a
//! [`ReflectionProvider`] for the members of a [`RuntimeType`]. The
//! [`TypeRegistry`] is a ready-made provider where host types are declared
//! with Rust closures.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::HostResult;
use crate::host::{HostObject, HostValue};
use crate::member::{MemberDescriptor, MemberKind};
use crate::types::{HostType, RuntimeType, TypeCategory};

/// Source of member descriptors for runtime types
pub trait ReflectionProvider: Send + Sync {
    /// All members of `ty`, inherited public members included, in declaration
    /// order. Unknown types have no members.
    fn members(&self, ty: &RuntimeType) -> Vec<Arc<MemberDescriptor>>;
}

// ============================================================================
// Type registry
// ============================================================================

/// In-memory provider keyed by type identity
pub struct TypeRegistry {
    members: RwLock<FxHashMap<RuntimeType, Vec<Arc<MemberDescriptor>>>>,
    by_name: RwLock<FxHashMap<Arc<str>, RuntimeType>>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            members: RwLock::new(FxHashMap::default()),
            by_name: RwLock::new(FxHashMap::default()),
        }
    }

    /// Start declaring a type named `name`
    pub fn define(&self, name: impl Into<Arc<str>>) -> TypeBuilder<'_> {
        TypeBuilder {
            registry: self,
            name: name.into(),
            parent: None,
            interfaces: Vec::new(),
            category: TypeCategory::Bean,
            members: Vec::new(),
        }
    }

    /// Register `ty` with an explicit member list, replacing any previous one
    pub fn register(&self, ty: RuntimeType, members: Vec<MemberDescriptor>) {
        self.by_name.write().insert(ty.name_arc().clone(), ty.clone());
        self.members
            .write()
            .insert(ty, members.into_iter().map(Arc::new).collect());
    }

    /// Replace the members reported for an already registered type
    pub fn replace_members(&self, ty: &RuntimeType, members: Vec<MemberDescriptor>) {
        self.members
            .write()
            .insert(ty.clone(), members.into_iter().map(Arc::new).collect());
    }

    /// Most recent registration under `name`
    pub fn lookup(&self, name: &str) -> Option<RuntimeType> {
        self.by_name.read().get(name).cloned()
    }

    /// Number of registered type identities
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Check if no type is registered
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflectionProvider for TypeRegistry {
    fn members(&self, ty: &RuntimeType) -> Vec<Arc<MemberDescriptor>> {
        self.members.read().get(ty).cloned().unwrap_or_default()
    }
}

// ============================================================================
// Type builder
// ============================================================================

/// Declares one host type; finish with [`TypeBuilder::register`]
pub struct TypeBuilder<'r> {
    registry: &'r TypeRegistry,
    name: Arc<str>,
    parent: Option<RuntimeType>,
    interfaces: Vec<Arc<str>>,
    category: TypeCategory,
    members: Vec<MemberDescriptor>,
}

impl<'r> TypeBuilder<'r> {
    /// Inherit from `parent`: its ancestry and its non-constructor members
    pub fn extends(mut self, parent: &RuntimeType) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Add an interface-like supertype name
    pub fn implements(mut self, name: impl Into<Arc<str>>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    /// Set the model factory category
    pub fn category(mut self, category: TypeCategory) -> Self {
        self.category = category;
        self
    }

    /// Add a public instance method
    pub fn method(
        mut self,
        name: &str,
        params: Vec<HostType>,
        body: impl Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        let member = MemberDescriptor::method(self.name.clone(), name, params, body);
        self.members.push(member);
        self
    }

    /// Add a public static method
    pub fn static_method(
        mut self,
        name: &str,
        params: Vec<HostType>,
        body: impl Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        let member = MemberDescriptor::method(self.name.clone(), name, params, body).as_static();
        self.members.push(member);
        self
    }

    /// Add a public varargs instance method; the last parameter must be an array
    pub fn varargs_method(
        mut self,
        name: &str,
        params: Vec<HostType>,
        body: impl Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        let member = MemberDescriptor::method(self.name.clone(), name, params, body).varargs();
        self.members.push(member);
        self
    }

    /// Add a public constructor
    pub fn constructor(
        mut self,
        params: Vec<HostType>,
        body: impl Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        let member = MemberDescriptor::constructor(self.name.clone(), params, body);
        self.members.push(member);
        self
    }

    /// Add a public instance field
    pub fn field(
        mut self,
        name: &str,
        field_type: HostType,
        getter: impl Fn(Option<&HostObject>) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        let member = MemberDescriptor::field(self.name.clone(), name, field_type, getter);
        self.members.push(member);
        self
    }

    /// Add a fully configured member
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// Create the type identity and publish its members
    pub fn register(self) -> RuntimeType {
        let mut ancestors = Vec::new();
        if let Some(parent) = &self.parent {
            ancestors.push(parent.name_arc().clone());
        }
        ancestors.extend(self.interfaces.iter().cloned());
        if let Some(parent) = &self.parent {
            for name in parent.ancestors() {
                if !ancestors.contains(name) {
                    ancestors.push(name.clone());
                }
            }
        }
        let ty = RuntimeType::new(self.name.clone(), ancestors, self.category);

        let mut members = self.members;
        if let Some(parent) = &self.parent {
            for inherited in self.registry.members(parent) {
                if inherited.kind() == MemberKind::Constructor {
                    continue;
                }
                if members.iter().any(|own| own.overrides(&inherited)) {
                    continue;
                }
                members.push(inherited.inherited_by(&self.name));
            }
        }
        self.registry.register(ty.clone(), members);
        ty
    }
}
