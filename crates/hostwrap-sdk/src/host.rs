//! Host-side values: what member bodies receive and return

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::types::RuntimeType;
use crate::value::{DynamicValue, Number};

/// Shared payload of a host object
pub type HostData = Arc<dyn Any + Send + Sync>;

/// Weak handle to a host object's payload
pub type WeakHostData = Weak<dyn Any + Send + Sync>;

// ============================================================================
// Host objects
// ============================================================================

/// A live host object: its runtime type plus a shared payload.
///
/// Identity is the payload allocation; clones share identity.
#[derive(Clone)]
pub struct HostObject {
    ty: RuntimeType,
    data: HostData,
}

impl HostObject {
    /// Allocate a new object of type `ty` holding `data`
    pub fn new<T: Any + Send + Sync>(ty: RuntimeType, data: T) -> Self {
        HostObject {
            ty,
            data: Arc::new(data),
        }
    }

    /// Wrap an existing shared payload
    pub fn from_shared(ty: RuntimeType, data: HostData) -> Self {
        HostObject { ty, data }
    }

    /// Runtime type of this object
    pub fn runtime_type(&self) -> &RuntimeType {
        &self.ty
    }

    /// Address-based identity
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }

    /// Shared payload
    pub fn data(&self) -> &HostData {
        &self.data
    }

    /// Weak reference to the payload; does not keep the object alive
    pub fn downgrade(&self) -> WeakHostData {
        Arc::downgrade(&self.data)
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Whether both handles refer to the same object
    pub fn same_object(&self, other: &HostObject) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("type", &self.ty.name())
            .field("identity", &format_args!("{:#x}", self.identity()))
            .finish()
    }
}

// ============================================================================
// Host values
// ============================================================================

/// Value in host representation, as passed to and returned from member bodies
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// Null reference (also the result of members returning nothing)
    Null,
    /// Boolean
    Bool(bool),
    /// Single character
    Char(char),
    /// Text
    Str(Arc<str>),
    /// Number of a concrete kind
    Num(Number),
    /// List
    List(Vec<HostValue>),
    /// Array
    Array(Vec<HostValue>),
    /// Text-keyed map
    Map(BTreeMap<Arc<str>, HostValue>),
    /// Host object
    Object(HostObject),
}

impl HostValue {
    /// Text value
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        HostValue::Str(s.into())
    }

    /// Convert to the evaluator's dynamic representation
    pub fn into_dynamic(self) -> DynamicValue {
        match self {
            HostValue::Null => DynamicValue::Null,
            HostValue::Bool(b) => DynamicValue::Bool(b),
            HostValue::Char(c) => DynamicValue::Text(c.to_string().into()),
            HostValue::Str(s) => DynamicValue::Text(s),
            HostValue::Num(n) => DynamicValue::Number(n),
            HostValue::List(items) | HostValue::Array(items) => {
                DynamicValue::Sequence(items.into_iter().map(HostValue::into_dynamic).collect())
            }
            HostValue::Map(entries) => DynamicValue::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_dynamic()))
                    .collect(),
            ),
            HostValue::Object(obj) => DynamicValue::Object(obj),
        }
    }

    /// Short type description for diagnostics
    pub fn type_name(&self) -> String {
        match self {
            HostValue::Null => "null".to_string(),
            HostValue::Bool(_) => "boolean".to_string(),
            HostValue::Char(_) => "char".to_string(),
            HostValue::Str(_) => "String".to_string(),
            HostValue::Num(n) => n.kind().name().to_string(),
            HostValue::List(_) => "List".to_string(),
            HostValue::Array(_) => "array".to_string(),
            HostValue::Map(_) => "Map".to_string(),
            HostValue::Object(obj) => obj.runtime_type().name().to_string(),
        }
    }
}
