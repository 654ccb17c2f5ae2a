//! Host type model
//!
//! A [`RuntimeType`] is the identity of one registered host type. Registering
//! the same name twice produces two distinct identities, which is how a type
//! "reload" looks to the caches. [`HostType`] is the declared type of a
//! member parameter or field.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{HostError, HostResult};

/// Name of the implicit root of every type hierarchy
pub const ROOT_TYPE: &str = "Object";

// ============================================================================
// Numeric kinds
// ============================================================================

/// Concrete numeric representations a parameter can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericKind {
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// Arbitrary-width integer (backed by `i128`)
    BigInteger,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
}

impl NumericKind {
    /// All kinds, narrowest first
    pub const ALL: [NumericKind; 7] = [
        NumericKind::Byte,
        NumericKind::Short,
        NumericKind::Int,
        NumericKind::Long,
        NumericKind::BigInteger,
        NumericKind::Float,
        NumericKind::Double,
    ];

    /// Whether this kind holds whole numbers only
    pub fn is_integral(self) -> bool {
        !matches!(self, NumericKind::Float | NumericKind::Double)
    }

    /// Name used in signatures and selectors
    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Byte => "byte",
            NumericKind::Short => "short",
            NumericKind::Int => "int",
            NumericKind::Long => "long",
            NumericKind::BigInteger => "BigInteger",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        NumericKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

// ============================================================================
// Declared types
// ============================================================================

/// Declared type of a parameter or field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    /// Primitive boolean
    Bool,
    /// Primitive single character
    Char,
    /// Text
    Str,
    /// Primitive number of a concrete kind
    Num(NumericKind),
    /// Abstract numeric supertype accepting any number
    Number,
    /// Root reference type, accepts anything
    Any,
    /// Host object type by name (matches the type and its subtypes)
    Object(Arc<str>),
    /// Ordered list with the given element type
    List(Box<HostType>),
    /// Fixed array with the given element type
    Array(Box<HostType>),
    /// Text-keyed map with the given value type
    Map(Box<HostType>),
}

impl HostType {
    /// Host object type by name
    pub fn object(name: impl Into<Arc<str>>) -> Self {
        HostType::Object(name.into())
    }

    /// Array of `elem`
    pub fn array(elem: HostType) -> Self {
        HostType::Array(Box::new(elem))
    }

    /// List of `elem`
    pub fn list(elem: HostType) -> Self {
        HostType::List(Box::new(elem))
    }

    /// Map with `value` values
    pub fn map(value: HostType) -> Self {
        HostType::Map(Box::new(value))
    }

    /// Primitive types cannot hold null
    pub fn is_primitive(&self) -> bool {
        matches!(self, HostType::Bool | HostType::Char | HostType::Num(_))
    }

    /// Parse a type name as written in selectors and signatures.
    ///
    /// `int`, `long`, `double`, ..., `boolean`, `char`, `String`, `Number`,
    /// `Object`, `List`, `Map`, any other identifier for an object type, and a
    /// trailing `[]` for arrays.
    pub fn parse(text: &str) -> HostResult<HostType> {
        let text = text.trim();
        if let Some(elem) = text.strip_suffix("[]") {
            return Ok(HostType::array(HostType::parse(elem)?));
        }
        if let Some(kind) = NumericKind::from_name(text) {
            return Ok(HostType::Num(kind));
        }
        let ty = match text {
            "boolean" => HostType::Bool,
            "char" => HostType::Char,
            "String" => HostType::Str,
            "Number" => HostType::Number,
            ROOT_TYPE => HostType::Any,
            "List" => HostType::list(HostType::Any),
            "Map" => HostType::map(HostType::Any),
            other if is_qualified_identifier(other) => HostType::object(other),
            other => {
                return Err(HostError::ArgumentError(format!(
                    "malformed type name: {:?}",
                    other
                )))
            }
        };
        Ok(ty)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Bool => write!(f, "boolean"),
            HostType::Char => write!(f, "char"),
            HostType::Str => write!(f, "String"),
            HostType::Num(kind) => write!(f, "{}", kind.name()),
            HostType::Number => write!(f, "Number"),
            HostType::Any => write!(f, "{}", ROOT_TYPE),
            HostType::Object(name) => write!(f, "{}", name),
            HostType::Array(elem) => write!(f, "{}[]", elem),
            HostType::List(elem) if **elem == HostType::Any => write!(f, "List"),
            HostType::List(elem) => write!(f, "List<{}>", elem),
            HostType::Map(value) if **value == HostType::Any => write!(f, "Map"),
            HostType::Map(value) => write!(f, "Map<{}>", value),
        }
    }
}

/// `a.b.C` style name: dot-separated identifiers
pub fn is_qualified_identifier(text: &str) -> bool {
    !text.is_empty() && text.split('.').all(is_identifier)
}

/// Single identifier: letter or underscore followed by alphanumerics
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

// ============================================================================
// Runtime types
// ============================================================================

/// Broad category of a host type, used to pick a model factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeCategory {
    /// Plain object exposing members
    #[default]
    Bean,
    /// Boolean-like value; models are never identity-cached
    Boolean,
    /// Numeric value
    Number,
    /// Textual value
    Text,
    /// Date or time value
    Date,
    /// Enumeration constant
    Enumeration,
}

/// Registration data behind a [`RuntimeType`]
#[derive(Debug)]
pub struct TypeInfo {
    name: Arc<str>,
    ancestors: Vec<Arc<str>>,
    category: TypeCategory,
}

/// Identity-compared handle to a registered host type
#[derive(Clone)]
pub struct RuntimeType(Arc<TypeInfo>);

impl RuntimeType {
    /// Create a new type identity.
    ///
    /// `ancestors` lists supertype names nearest first; the root type is
    /// implicit and must not be listed.
    pub fn new(
        name: impl Into<Arc<str>>,
        ancestors: Vec<Arc<str>>,
        category: TypeCategory,
    ) -> Self {
        RuntimeType(Arc::new(TypeInfo {
            name: name.into(),
            ancestors,
            category,
        }))
    }

    /// Fully qualified type name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Shared fully qualified type name
    pub fn name_arc(&self) -> &Arc<str> {
        &self.0.name
    }

    /// Last segment of the qualified name
    pub fn simple_name(&self) -> &str {
        simple_name(&self.0.name)
    }

    /// Supertype names, nearest first, excluding the root
    pub fn ancestors(&self) -> &[Arc<str>] {
        &self.0.ancestors
    }

    /// Model factory category
    pub fn category(&self) -> TypeCategory {
        self.0.category
    }

    /// Address-based identity, stable for the life of this registration
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Hierarchy distance to `name`: 0 for the type itself, `n` for the n-th
    /// ancestor, and one past the last ancestor for the root type.
    pub fn distance_to(&self, name: &str) -> Option<u32> {
        if *self.0.name == *name {
            return Some(0);
        }
        if let Some(idx) = self.0.ancestors.iter().position(|a| **a == *name) {
            return Some(idx as u32 + 1);
        }
        if name == ROOT_TYPE {
            return Some(self.0.ancestors.len() as u32 + 1);
        }
        None
    }

    /// Whether this type is `name` or one of its subtypes
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.distance_to(name).is_some()
    }
}

/// Last segment of a dot-qualified name
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

impl PartialEq for RuntimeType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RuntimeType {}

impl Hash for RuntimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeType({}@{:#x})", self.0.name, self.id())
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}
