//! Object wrapper: the entry point used by template evaluators
//!
//! [`ObjectWrapper`] owns the introspection cache, the model factories and
//! the model cache. [`Wrapper`] is the per-object handle templates work with.
//!
//! # Example
//!
//! ```ignore
//! let wrapper = ObjectWrapper::new(registry, &BridgeConfig::default())?;
//! let model = wrapper.get_wrapper(&point);
//! let distance = model.invoke("distance_to", &[DynamicValue::Object(origin)])?;
//! ```

use std::sync::Arc;

use hostwrap_sdk::{
    DynamicValue, HostError, HostObject, HostType, HostValue, ReflectionProvider, RuntimeType,
};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::introspect::{ClassIntrospector, IntrospectionEntry, MemberView};
use crate::invoke::{invoke_member, read_field};
use crate::model::{ModelCache, ModelCore, ModelFactories, ModelKind};
use crate::notify::{InvalidationHandle, InvalidationSource};
use crate::overload::{self, resolve};
use crate::policy::AccessPolicy;

/// Returned by [`Wrapper::get_as_string`] when string conversion is not exposed
pub const TO_STRING_NOT_EXPOSED: &str = "[to_string not exposed]";

/// Shared state behind an [`ObjectWrapper`] and its wrappers
pub(crate) struct BridgeInner {
    introspector: ClassIntrospector,
    factories: ModelFactories,
    models: ModelCache,
    default_view: MemberView,
}

impl BridgeInner {
    pub(crate) fn invalidate_type(&self, ty: &RuntimeType) {
        self.introspector.invalidate(ty);
        self.factories.invalidate(ty);
        self.models.invalidate_type(ty);
    }

    pub(crate) fn invalidate_prefix(&self, prefix: &str) -> usize {
        let removed = self.introspector.invalidate_by_prefix(prefix);
        self.factories.invalidate_where(|ty| ty.name().starts_with(prefix));
        self.models.invalidate_where(|ty| ty.name().starts_with(prefix));
        removed
    }

    pub(crate) fn clear_all(&self) {
        self.introspector.clear();
        self.factories.clear();
        self.models.clear();
    }
}

// ============================================================================
// ObjectWrapper
// ============================================================================

/// Wraps host objects for template access. Cheap to clone.
#[derive(Clone)]
pub struct ObjectWrapper {
    inner: Arc<BridgeInner>,
}

impl ObjectWrapper {
    /// Build a wrapper using the policy described by `config`
    pub fn new(provider: Arc<dyn ReflectionProvider>, config: &BridgeConfig) -> BridgeResult<Self> {
        let policy = config.policy.build()?;
        Ok(Self::with_policy(provider, policy, config))
    }

    /// Build a wrapper with an explicit access policy
    pub fn with_policy(
        provider: Arc<dyn ReflectionProvider>,
        policy: AccessPolicy,
        config: &BridgeConfig,
    ) -> Self {
        tracing::debug!(
            use_model_cache = config.cache.use_model_cache,
            capacity = config.cache.model_cache_capacity,
            "creating object wrapper"
        );
        Self {
            inner: Arc::new(BridgeInner {
                introspector: ClassIntrospector::new(provider, policy, &config.introspection),
                factories: ModelFactories::new(),
                models: ModelCache::new(
                    config.cache.model_cache_capacity,
                    config.cache.use_model_cache,
                ),
                default_view: config.introspection.default_view,
            }),
        }
    }

    /// Wrapper for `obj`; repeated calls for a live object share one model
    pub fn get_wrapper(&self, obj: &HostObject) -> Wrapper {
        let kind = self.inner.factories.kind_for(obj.runtime_type());
        let core = self
            .inner
            .models
            .get_or_create(obj, || ModelCore::new(obj.runtime_type().clone(), kind));
        Wrapper {
            object: obj.clone(),
            core,
            view: self.inner.default_view,
            inner: self.inner.clone(),
        }
    }

    /// Host value in the evaluator's representation
    pub fn wrap(&self, value: HostValue) -> DynamicValue {
        value.into_dynamic()
    }

    /// Convert a dynamic value for a declared host type
    pub fn unwrap(&self, value: &DynamicValue, target: &HostType) -> BridgeResult<HostValue> {
        overload::unwrap(value, target)
    }

    /// Instantiate `ty` through its best matching exposed constructor
    pub fn construct(&self, ty: &RuntimeType, args: &[DynamicValue]) -> BridgeResult<HostObject> {
        let entry = self.inner.introspector.get(ty);
        let group = entry
            .all_constructors()
            .ok_or_else(|| BridgeError::NotInstantiable(ty.name().to_string()))?;
        let (member, converted) = resolve(&group, args).into_result(group.name(), args)?;
        match invoke_member(&member, None, &converted)? {
            HostValue::Object(obj) => Ok(obj),
            other => Err(BridgeError::InvocationFailure {
                member: member.to_string(),
                source: HostError::mismatch(ty.name(), other.type_name()),
            }),
        }
    }

    /// Call an exposed static method of `ty`
    pub fn invoke_static(
        &self,
        ty: &RuntimeType,
        name: &str,
        args: &[DynamicValue],
    ) -> BridgeResult<DynamicValue> {
        let entry = self.inner.introspector.get(ty);
        let group = entry.static_method(name).ok_or_else(|| BridgeError::NoSuchMember {
            type_name: ty.name().to_string(),
            member: name.to_string(),
        })?;
        let (member, converted) = resolve(group, args).into_result(name, args)?;
        Ok(invoke_member(&member, None, &converted)?.into_dynamic())
    }

    /// Forget everything cached about `ty`
    pub fn invalidate_type(&self, ty: &RuntimeType) {
        self.inner.invalidate_type(ty);
    }

    /// Forget everything cached about types whose name starts with `prefix`
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.inner.invalidate_prefix(prefix)
    }

    /// Forget everything
    pub fn clear_all(&self) {
        self.inner.clear_all();
    }

    /// Handle through which external code can invalidate this wrapper's caches
    pub fn invalidation_handle(&self) -> InvalidationHandle {
        InvalidationHandle::new(Arc::downgrade(&self.inner))
    }

    /// Register with a source of "type changed" notifications
    pub fn attach_invalidation_source(&self, source: &dyn InvalidationSource) {
        source.register(self.invalidation_handle());
    }

    /// Turn the identity model cache on or off
    pub fn set_use_model_cache(&self, enabled: bool) {
        self.inner.models.set_enabled(enabled);
    }

    /// Introspection cache in use
    pub fn introspector(&self) -> &ClassIntrospector {
        &self.inner.introspector
    }

    /// Number of model cache slots
    pub fn model_cache_len(&self) -> usize {
        self.inner.models.len()
    }
}

// ============================================================================
// Wrapper
// ============================================================================

/// Template-facing handle to one host object
#[derive(Clone)]
pub struct Wrapper {
    object: HostObject,
    core: Arc<ModelCore>,
    view: MemberView,
    inner: Arc<BridgeInner>,
}

/// Result of looking up a name on a [`Wrapper`]
#[derive(Clone)]
pub enum Lookup {
    /// Field value or generic `get` result
    Value(DynamicValue),
    /// Method group bound to the wrapped object
    Method(BoundMethod),
}

/// Method group bound to its receiver
#[derive(Clone)]
pub struct BoundMethod {
    target: Wrapper,
    name: String,
}

impl BoundMethod {
    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve and call
    pub fn call(&self, args: &[DynamicValue]) -> BridgeResult<DynamicValue> {
        self.target.invoke(&self.name, args)
    }
}

impl Wrapper {
    /// Wrapped object
    pub fn object(&self) -> &HostObject {
        &self.object
    }

    /// Model kind chosen for the object's type
    pub fn kind(&self) -> ModelKind {
        self.core.kind()
    }

    /// Member view in force
    pub fn view(&self) -> MemberView {
        self.view
    }

    /// Same object seen through another view
    pub fn with_view(&self, view: MemberView) -> Wrapper {
        Wrapper {
            view,
            ..self.clone()
        }
    }

    /// Whether both wrappers share one memoised model
    pub fn same_model(&self, other: &Wrapper) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Exposed field names, sorted
    pub fn list_fields(&self) -> Vec<String> {
        self.entry()
            .field_names(self.view)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Exposed method names, sorted
    pub fn list_method_names(&self) -> Vec<String> {
        self.entry()
            .method_names(self.view)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Look up `name`: a method, then a field, then the generic `get(String)`
    pub fn get(&self, name: &str) -> BridgeResult<Lookup> {
        let entry = self.entry();
        if entry.method(name, self.view).is_some() {
            return Ok(Lookup::Method(BoundMethod {
                target: self.clone(),
                name: name.to_string(),
            }));
        }
        if let Some(field) = entry.field(name, self.view) {
            let value = read_field(field, Some(&self.object))?;
            return Ok(Lookup::Value(value.into_dynamic()));
        }
        if self.view != MemberView::PropertiesOnly {
            if let Some(getter) = entry.generic_get() {
                let value = invoke_member(getter, Some(&self.object), &[HostValue::str(name)])?;
                return Ok(Lookup::Value(value.into_dynamic()));
            }
        }
        Err(self.no_such_member(name))
    }

    /// Resolve the overload of `name` that fits `args` and call it
    pub fn invoke(&self, name: &str, args: &[DynamicValue]) -> BridgeResult<DynamicValue> {
        let entry = self.entry();
        let group = entry
            .method(name, self.view)
            .ok_or_else(|| self.no_such_member(name))?;
        let (member, converted) = resolve(group, args).into_result(name, args)?;
        Ok(invoke_member(&member, Some(&self.object), &converted)?.into_dynamic())
    }

    /// String form of the object, or [`TO_STRING_NOT_EXPOSED`]
    pub fn get_as_string(&self) -> BridgeResult<String> {
        let entry = self.entry();
        if entry.is_to_string_hidden() {
            return Ok(TO_STRING_NOT_EXPOSED.to_string());
        }
        let member = entry.to_string_member();
        match invoke_member(member, Some(&self.object), &[])? {
            HostValue::Str(s) => Ok(s.to_string()),
            HostValue::Char(c) => Ok(c.to_string()),
            HostValue::Num(n) => Ok(n.to_string()),
            HostValue::Bool(b) => Ok(b.to_string()),
            HostValue::Null => Ok(String::new()),
            other => Err(BridgeError::InvocationFailure {
                member: member.to_string(),
                source: HostError::mismatch("String", other.type_name()),
            }),
        }
    }

    fn entry(&self) -> Arc<IntrospectionEntry> {
        self.inner.introspector.get(self.object.runtime_type())
    }

    fn no_such_member(&self, name: &str) -> BridgeError {
        BridgeError::NoSuchMember {
            type_name: self.object.runtime_type().name().to_string(),
            member: name.to_string(),
        }
    }
}

impl std::fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wrapper")
            .field("object", &self.object)
            .field("kind", &self.core.kind())
            .field("view", &self.view)
            .finish()
    }
}

impl std::fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundMethod({}.{})", self.target.object.runtime_type(), self.name)
    }
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Lookup::Method(m) => f.debug_tuple("Method").field(m).finish(),
        }
    }
}
