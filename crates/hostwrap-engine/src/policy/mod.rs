//! Member access policy
//!
//! A policy decides, per runtime type, which methods, constructors and fields
//! templates may touch. Policies are plain data so they can be composed
//! with [`AccessPolicy::and`] and [`AccessPolicy::or`]; the introspection
//! cache asks once per type and caches the outcome, so the policy itself
//! keeps no state.

pub mod list;
pub mod selector;

pub use list::{ListMode, MemberSelectorListPolicy};
pub use selector::MemberSelector;

use hostwrap_sdk::{MemberDescriptor, MemberKind, RuntimeType};
use once_cell::sync::Lazy;

use crate::error::BridgeResult;

/// Name of the well-known string-conversion member
pub const TO_STRING_METHOD: &str = "to_string";

/// Members hidden by [`AccessPolicy::default_policy`]
pub const UNSAFE_MEMBERS: &[&str] = &[
    "Object.get_class()",
    "Object.wait(*)",
    "Object.notify()",
    "Object.notify_all()",
    "Object.finalize()",
    "Object.clone()",
];

static DEFAULT_BLACKLIST: Lazy<BridgeResult<MemberSelectorListPolicy>> = Lazy::new(|| {
    MemberSelectorListPolicy::parse(ListMode::Blacklist, UNSAFE_MEMBERS.iter().copied(), None)
});

// ============================================================================
// Policy tree
// ============================================================================

/// Composable member access policy
#[derive(Debug, Clone)]
pub enum AccessPolicy {
    /// Expose every public member
    AllowAll,
    /// Blacklist or whitelist of selectors
    List(MemberSelectorListPolicy),
    /// Exposed only if both sides expose it
    And(Box<AccessPolicy>, Box<AccessPolicy>),
    /// Exposed if either side exposes it
    Or(Box<AccessPolicy>, Box<AccessPolicy>),
}

impl AccessPolicy {
    /// Blacklist of well-known unsafe members
    pub fn default_policy() -> BridgeResult<Self> {
        DEFAULT_BLACKLIST.clone().map(AccessPolicy::List)
    }

    /// Intersection of two policies
    pub fn and(a: AccessPolicy, b: AccessPolicy) -> Self {
        AccessPolicy::And(Box::new(a), Box::new(b))
    }

    /// Union of two policies
    pub fn or(a: AccessPolicy, b: AccessPolicy) -> Self {
        AccessPolicy::Or(Box::new(a), Box::new(b))
    }

    /// Decisions for members of `ty`
    pub fn for_type(&self, ty: &RuntimeType) -> TypeAccessPolicy<'_> {
        TypeAccessPolicy {
            policy: self,
            ty: ty.clone(),
        }
    }

    /// Whether the zero-argument `to_string` member is exposed on every type,
    /// regardless of per-member decisions
    pub fn is_to_string_always_exposed(&self) -> bool {
        match self {
            AccessPolicy::AllowAll => true,
            AccessPolicy::List(list) => list.is_to_string_always_exposed(),
            AccessPolicy::And(a, b) => a.is_to_string_always_exposed() && b.is_to_string_always_exposed(),
            AccessPolicy::Or(a, b) => a.is_to_string_always_exposed() || b.is_to_string_always_exposed(),
        }
    }

    fn is_exposed(&self, ty: &RuntimeType, member: &MemberDescriptor) -> bool {
        match self {
            AccessPolicy::AllowAll => true,
            AccessPolicy::List(list) => list.is_exposed(ty, member),
            AccessPolicy::And(a, b) => a.is_exposed(ty, member) && b.is_exposed(ty, member),
            AccessPolicy::Or(a, b) => a.is_exposed(ty, member) || b.is_exposed(ty, member),
        }
    }
}

/// Access decisions for the members of one runtime type
pub struct TypeAccessPolicy<'p> {
    policy: &'p AccessPolicy,
    ty: RuntimeType,
}

impl TypeAccessPolicy<'_> {
    /// Whether a method may be called
    pub fn is_method_exposed(&self, method: &MemberDescriptor) -> bool {
        method.kind() == MemberKind::Method && self.policy.is_exposed(&self.ty, method)
    }

    /// Whether a constructor may be called
    pub fn is_constructor_exposed(&self, constructor: &MemberDescriptor) -> bool {
        constructor.kind() == MemberKind::Constructor && self.policy.is_exposed(&self.ty, constructor)
    }

    /// Whether a field may be read
    pub fn is_field_exposed(&self, field: &MemberDescriptor) -> bool {
        field.kind() == MemberKind::Field && self.policy.is_exposed(&self.ty, field)
    }

    /// Dispatch on the member's kind
    pub fn is_exposed(&self, member: &MemberDescriptor) -> bool {
        match member.kind() {
            MemberKind::Method => self.is_method_exposed(member),
            MemberKind::Constructor => self.is_constructor_exposed(member),
            MemberKind::Field => self.is_field_exposed(member),
        }
    }

    /// Type these decisions apply to
    pub fn runtime_type(&self) -> &RuntimeType {
        &self.ty
    }
}
