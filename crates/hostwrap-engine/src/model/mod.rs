//! Wrapper models
//!
//! Each wrapped object gets a [`ModelCore`] describing how templates see it.
//! The model kind is chosen per runtime type by [`ModelFactories`] and the
//! core is memoised per object identity by [`ModelCache`].

pub mod cache;

pub use cache::ModelCache;

use hostwrap_sdk::{RuntimeType, TypeCategory};

use crate::cache::TypeCache;

/// How a wrapped object behaves in templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Generic member access
    Bean,
    /// Boolean value
    Boolean,
    /// Number value
    Number,
    /// String-like value
    Text,
    /// Date or time value
    Date,
    /// Enumeration constant
    Enumeration,
}

impl ModelKind {
    /// Model kind for a type category
    pub fn for_category(category: TypeCategory) -> Self {
        match category {
            TypeCategory::Bean => ModelKind::Bean,
            TypeCategory::Boolean => ModelKind::Boolean,
            TypeCategory::Number => ModelKind::Number,
            TypeCategory::Text => ModelKind::Text,
            TypeCategory::Date => ModelKind::Date,
            TypeCategory::Enumeration => ModelKind::Enumeration,
        }
    }
}

/// Per-object model state shared by every wrapper of that object
#[derive(Debug)]
pub struct ModelCore {
    object_type: RuntimeType,
    kind: ModelKind,
}

impl ModelCore {
    /// Model of an object of type `object_type`
    pub fn new(object_type: RuntimeType, kind: ModelKind) -> Self {
        Self { object_type, kind }
    }

    /// Runtime type of the modelled object
    pub fn object_type(&self) -> &RuntimeType {
        &self.object_type
    }

    /// Model kind
    pub fn kind(&self) -> ModelKind {
        self.kind
    }
}

/// Per-type model kind selection, memoised like the introspection cache
pub struct ModelFactories {
    cache: TypeCache<ModelKind>,
}

impl ModelFactories {
    /// Create an empty factory cache
    pub fn new() -> Self {
        Self {
            cache: TypeCache::new("model-factory"),
        }
    }

    /// Model kind for objects of `ty`
    pub fn kind_for(&self, ty: &RuntimeType) -> ModelKind {
        self.cache
            .get_or_compute(ty, |ty| ModelKind::for_category(ty.category()))
    }

    /// Forget the choice for `ty`
    pub fn invalidate(&self, ty: &RuntimeType) -> bool {
        self.cache.invalidate(ty)
    }

    /// Forget choices for types matching `pred`
    pub fn invalidate_where(&self, pred: impl Fn(&RuntimeType) -> bool) -> usize {
        self.cache.invalidate_where(pred)
    }

    /// Forget everything
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of memoised types
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing is memoised
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for ModelFactories {
    fn default() -> Self {
        Self::new()
    }
}
