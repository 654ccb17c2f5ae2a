//! Introspection results: overload groups and per-type entries

use std::collections::BTreeMap;
use std::sync::Arc;

use hostwrap_sdk::{MemberDescriptor, RuntimeType};

use super::MemberView;

// ============================================================================
// Callable groups
// ============================================================================

/// Overload set: every exposed callable sharing one name.
///
/// Never empty; members are unique by signature and keep declaration order.
#[derive(Debug, Clone)]
pub struct CallableGroup {
    name: Arc<str>,
    members: Vec<Arc<MemberDescriptor>>,
}

impl CallableGroup {
    /// Group holding a single member
    pub fn new(first: Arc<MemberDescriptor>) -> Self {
        Self {
            name: first.signature().name.clone(),
            members: vec![first],
        }
    }

    /// Group from a member list; `None` when the list is empty
    pub fn from_members(members: impl IntoIterator<Item = Arc<MemberDescriptor>>) -> Option<Self> {
        let mut iter = members.into_iter();
        let mut group = Self::new(iter.next()?);
        for member in iter {
            group.push(member);
        }
        Some(group)
    }

    /// Add an overload unless one with the same signature is present
    pub(crate) fn push(&mut self, member: Arc<MemberDescriptor>) {
        if !self.members.iter().any(|m| **m == *member) {
            self.members.push(member);
        }
    }

    /// Shared member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overloads in declaration order
    pub fn members(&self) -> &[Arc<MemberDescriptor>] {
        &self.members
    }

    /// Number of overloads
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; groups are never empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ============================================================================
// Introspection entries
// ============================================================================

/// Exposed member set of one runtime type. Immutable once built.
#[derive(Debug)]
pub struct IntrospectionEntry {
    pub(crate) runtime_type: RuntimeType,
    pub(crate) fields: BTreeMap<Arc<str>, Arc<MemberDescriptor>>,
    pub(crate) methods: BTreeMap<Arc<str>, CallableGroup>,
    pub(crate) static_methods: BTreeMap<Arc<str>, CallableGroup>,
    pub(crate) constructors: BTreeMap<usize, CallableGroup>,
    pub(crate) to_string_hidden: bool,
    pub(crate) to_string_member: Arc<MemberDescriptor>,
    pub(crate) generic_get: Option<Arc<MemberDescriptor>>,
}

impl IntrospectionEntry {
    /// Type this entry describes
    pub fn runtime_type(&self) -> &RuntimeType {
        &self.runtime_type
    }

    /// Exposed field `name` as seen through `view`.
    ///
    /// In the generic view a method with the same name shadows the field.
    pub fn field(&self, name: &str, view: MemberView) -> Option<&Arc<MemberDescriptor>> {
        match view {
            MemberView::MethodsOnly => None,
            MemberView::PropertiesOnly => self.fields.get(name),
            MemberView::Generic if self.methods.contains_key(name) => None,
            MemberView::Generic => self.fields.get(name),
        }
    }

    /// Exposed instance method group `name` as seen through `view`
    pub fn method(&self, name: &str, view: MemberView) -> Option<&CallableGroup> {
        match view {
            MemberView::PropertiesOnly => None,
            MemberView::Generic | MemberView::MethodsOnly => self.methods.get(name),
        }
    }

    /// Exposed static method group `name`
    pub fn static_method(&self, name: &str) -> Option<&CallableGroup> {
        self.static_methods.get(name)
    }

    /// Field names visible through `view`, sorted
    pub fn field_names(&self, view: MemberView) -> Vec<&str> {
        self.fields
            .keys()
            .map(|k| &**k)
            .filter(|name| self.field(name, view).is_some())
            .collect()
    }

    /// Method names visible through `view`, sorted
    pub fn method_names(&self, view: MemberView) -> Vec<&str> {
        match view {
            MemberView::PropertiesOnly => Vec::new(),
            _ => self.methods.keys().map(|k| &**k).collect(),
        }
    }

    /// Constructors declaring exactly `arity` parameters
    pub fn constructors_with_arity(&self, arity: usize) -> Option<&CallableGroup> {
        self.constructors.get(&arity)
    }

    /// Every exposed constructor as one overload set
    pub fn all_constructors(&self) -> Option<CallableGroup> {
        CallableGroup::from_members(
            self.constructors
                .values()
                .flat_map(|g| g.members().iter().cloned()),
        )
    }

    /// Whether string conversion must yield the "not exposed" marker
    pub fn is_to_string_hidden(&self) -> bool {
        self.to_string_hidden
    }

    /// Member used for string conversion
    pub fn to_string_member(&self) -> &Arc<MemberDescriptor> {
        &self.to_string_member
    }

    /// Exposed `get(String)` fallback for unknown keys
    pub fn generic_get(&self) -> Option<&Arc<MemberDescriptor>> {
        self.generic_get.as_ref()
    }
}
