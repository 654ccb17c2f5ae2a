//! Per-type introspection cache
//!
//! [`ClassIntrospector::get`] returns the exposed member set of a runtime
//! type: the provider's public members filtered through the access policy,
//! grouped into overload sets. Entries are built once and shared; see
//! [`crate::cache`] for the concurrency and reload rules.

pub mod entry;

pub use entry::{CallableGroup, IntrospectionEntry};

use std::collections::BTreeMap;
use std::sync::Arc;

use hostwrap_sdk::{
    HostError, HostType, HostValue, MemberDescriptor, MemberKind, ReflectionProvider, RuntimeType,
    ROOT_TYPE,
};
use serde::{Deserialize, Serialize};

use crate::cache::TypeCache;
use crate::config::IntrospectionConfig;
use crate::policy::{AccessPolicy, TO_STRING_METHOD};

/// Name of the generic key-lookup fallback method
pub const GENERIC_GET_METHOD: &str = "get";

/// Which member kinds are introspected at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExposureLevel {
    /// Methods, fields and constructors
    #[default]
    All,
    /// Fields and constructors only
    PropertiesOnly,
    /// Constructors only
    Nothing,
}

/// How a wrapper resolves a member name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberView {
    /// Methods and fields; a method shadows a field of the same name
    #[default]
    Generic,
    /// Methods only (the "API view")
    MethodsOnly,
    /// Fields only
    PropertiesOnly,
}

/// Memoised, policy-filtered member discovery
pub struct ClassIntrospector {
    provider: Arc<dyn ReflectionProvider>,
    policy: AccessPolicy,
    exposure: ExposureLevel,
    expose_fields: bool,
    cache: TypeCache<Arc<IntrospectionEntry>>,
}

impl ClassIntrospector {
    /// Create an introspector over `provider`
    pub fn new(
        provider: Arc<dyn ReflectionProvider>,
        policy: AccessPolicy,
        config: &IntrospectionConfig,
    ) -> Self {
        Self {
            provider,
            policy,
            exposure: config.exposure,
            expose_fields: config.expose_fields,
            cache: TypeCache::new("introspection"),
        }
    }

    /// Exposed member set of `ty`, computed on first use
    pub fn get(&self, ty: &RuntimeType) -> Arc<IntrospectionEntry> {
        self.cache
            .get_or_compute(ty, |ty| Arc::new(self.introspect(ty)))
    }

    /// Drop the entry for exactly `ty`
    pub fn invalidate(&self, ty: &RuntimeType) -> bool {
        tracing::debug!(type_name = ty.name(), "invalidating introspection entry");
        self.cache.invalidate(ty)
    }

    /// Drop entries of every type whose name starts with `prefix`
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let removed = self.cache.invalidate_where(|ty| ty.name().starts_with(prefix));
        tracing::debug!(prefix, removed, "invalidated introspection entries by prefix");
        removed
    }

    /// Drop every entry
    pub fn clear(&self) {
        tracing::debug!("clearing introspection cache");
        self.cache.clear();
    }

    /// Changes whenever previously returned entries may be outdated
    pub fn clearing_count(&self) -> u64 {
        self.cache.clearing_count()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Access policy in force
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    #[tracing::instrument(level = "debug", skip_all, fields(type_name = %ty))]
    fn introspect(&self, ty: &RuntimeType) -> IntrospectionEntry {
        let decisions = self.policy.for_type(ty);
        let members = self.provider.members(ty);

        let mut fields = BTreeMap::new();
        let mut methods: BTreeMap<Arc<str>, CallableGroup> = BTreeMap::new();
        let mut static_methods: BTreeMap<Arc<str>, CallableGroup> = BTreeMap::new();
        let mut constructors: BTreeMap<usize, CallableGroup> = BTreeMap::new();
        let mut to_string_member = None;

        for member in members.iter().filter(|m| m.is_public()) {
            if member.kind() == MemberKind::Method
                && !member.is_static()
                && member.name() == TO_STRING_METHOD
                && member.params().is_empty()
            {
                to_string_member = Some(member.clone());
            }
            if !decisions.is_exposed(member) {
                continue;
            }
            let name = member.signature().name.clone();
            match member.kind() {
                MemberKind::Field if self.exposes_fields() && !member.is_static() => {
                    fields.insert(name, member.clone());
                }
                MemberKind::Field => {}
                MemberKind::Method if self.exposure == ExposureLevel::All => {
                    let target = if member.is_static() {
                        &mut static_methods
                    } else {
                        &mut methods
                    };
                    add_to_group(target, name, member.clone());
                }
                MemberKind::Method => {}
                MemberKind::Constructor => {
                    add_to_group(&mut constructors, member.params().len(), member.clone());
                }
            }
        }

        let to_string_member = to_string_member.unwrap_or_else(|| Arc::new(fallback_to_string()));
        let to_string_hidden = !self.policy.is_to_string_always_exposed()
            && !decisions.is_method_exposed(&to_string_member);

        let generic_get = methods.get(GENERIC_GET_METHOD).and_then(|group| {
            group
                .members()
                .iter()
                .find(|m| m.params() == [HostType::Str])
                .cloned()
        });

        tracing::debug!(
            fields = fields.len(),
            methods = methods.len(),
            constructors = constructors.len(),
            to_string_hidden,
            "introspected type"
        );

        IntrospectionEntry {
            runtime_type: ty.clone(),
            fields,
            methods,
            static_methods,
            constructors,
            to_string_hidden,
            to_string_member,
            generic_get,
        }
    }

    fn exposes_fields(&self) -> bool {
        self.expose_fields && self.exposure != ExposureLevel::Nothing
    }
}

fn add_to_group<K: Ord>(groups: &mut BTreeMap<K, CallableGroup>, key: K, member: Arc<MemberDescriptor>) {
    match groups.get_mut(&key) {
        Some(group) => group.push(member),
        None => {
            groups.insert(key, CallableGroup::new(member));
        }
    }
}

/// Root `to_string()` used for types that do not declare one
fn fallback_to_string() -> MemberDescriptor {
    MemberDescriptor::method(ROOT_TYPE, TO_STRING_METHOD, vec![], |this, _| match this {
        Some(obj) => Ok(HostValue::str(format!(
            "{}@{:x}",
            obj.runtime_type().name(),
            obj.identity()
        ))),
        None => Err(HostError::ArgumentError("to_string needs a receiver".to_string())),
    })
}
