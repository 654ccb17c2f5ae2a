//! Member descriptors: methods, constructors and fields of host types

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::HostResult;
use crate::host::{HostObject, HostValue};
use crate::types::{simple_name, HostType};

/// Callable body of a method or constructor.
///
/// Receives the receiver (`None` for static members and constructors) and the
/// already-unwrapped arguments.
pub type CallableFn =
    Arc<dyn Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync>;

/// Getter body of a field
pub type GetterFn = Arc<dyn Fn(Option<&HostObject>) -> HostResult<HostValue> + Send + Sync>;

/// Kind of host member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Instance or static method
    Method,
    /// Constructor
    Constructor,
    /// Field
    Field,
}

/// Identity of a member: everything except its body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberSignature {
    /// Member kind
    pub kind: MemberKind,
    /// Name of the declaring type
    pub declaring_type: Arc<str>,
    /// Member name (constructors use the simple type name)
    pub name: Arc<str>,
    /// Declared parameter types; a varargs member's last one is an array
    pub params: Vec<HostType>,
    /// Whether the last parameter collects trailing arguments
    pub is_varargs: bool,
    /// Whether the member needs no receiver
    pub is_static: bool,
    /// Whether the member is public
    pub is_public: bool,
}

impl fmt::Display for MemberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)?;
        if self.kind == MemberKind::Field {
            return Ok(());
        }
        write!(f, "(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match param {
                HostType::Array(elem) if self.is_varargs && i == last => write!(f, "{}...", elem)?,
                other => write!(f, "{}", other)?,
            }
        }
        write!(f, ")")
    }
}

/// Executable part of a member
#[derive(Clone)]
pub enum MemberBody {
    /// Method or constructor
    Callable(CallableFn),
    /// Field read
    Getter(GetterFn),
}

/// A member of a host type together with its body.
///
/// Equality and hashing consider the signature only.
#[derive(Clone)]
pub struct MemberDescriptor {
    signature: MemberSignature,
    field_type: Option<HostType>,
    tags: Vec<Arc<str>>,
    body: MemberBody,
}

impl MemberDescriptor {
    /// Public instance method
    pub fn method(
        declaring_type: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        params: Vec<HostType>,
        body: impl Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        MemberDescriptor {
            signature: MemberSignature {
                kind: MemberKind::Method,
                declaring_type: declaring_type.into(),
                name: name.into(),
                params,
                is_varargs: false,
                is_static: false,
                is_public: true,
            },
            field_type: None,
            tags: Vec::new(),
            body: MemberBody::Callable(Arc::new(body)),
        }
    }

    /// Public constructor; named after the simple name of the declaring type
    pub fn constructor(
        declaring_type: impl Into<Arc<str>>,
        params: Vec<HostType>,
        body: impl Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        let declaring_type = declaring_type.into();
        let name: Arc<str> = simple_name(&declaring_type).into();
        MemberDescriptor {
            signature: MemberSignature {
                kind: MemberKind::Constructor,
                declaring_type,
                name,
                params,
                is_varargs: false,
                is_static: true,
                is_public: true,
            },
            field_type: None,
            tags: Vec::new(),
            body: MemberBody::Callable(Arc::new(body)),
        }
    }

    /// Public instance field
    pub fn field(
        declaring_type: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        field_type: HostType,
        getter: impl Fn(Option<&HostObject>) -> HostResult<HostValue> + Send + Sync + 'static,
    ) -> Self {
        MemberDescriptor {
            signature: MemberSignature {
                kind: MemberKind::Field,
                declaring_type: declaring_type.into(),
                name: name.into(),
                params: Vec::new(),
                is_varargs: false,
                is_static: false,
                is_public: true,
            },
            field_type: Some(field_type),
            tags: Vec::new(),
            body: MemberBody::Getter(Arc::new(getter)),
        }
    }

    /// Mark the last parameter as collecting trailing arguments
    pub fn varargs(mut self) -> Self {
        self.signature.is_varargs = true;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.signature.is_static = true;
        self
    }

    /// Mark as non-public; such members are never exposed
    pub fn private(mut self) -> Self {
        self.signature.is_public = false;
        self
    }

    /// Attach a metadata tag
    pub fn with_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Same member re-declared on another type (inheritance)
    pub fn inherited_by(&self, declaring_type: &Arc<str>) -> Self {
        let mut copy = self.clone();
        copy.signature.declaring_type = declaring_type.clone();
        copy
    }

    /// Signature of this member
    pub fn signature(&self) -> &MemberSignature {
        &self.signature
    }

    /// Member kind
    pub fn kind(&self) -> MemberKind {
        self.signature.kind
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Declaring type name
    pub fn declaring_type(&self) -> &str {
        &self.signature.declaring_type
    }

    /// Declared parameter types
    pub fn params(&self) -> &[HostType] {
        &self.signature.params
    }

    /// Whether the last parameter collects trailing arguments
    pub fn is_varargs(&self) -> bool {
        self.signature.is_varargs
    }

    /// Whether the member needs no receiver
    pub fn is_static(&self) -> bool {
        self.signature.is_static
    }

    /// Whether the member is public
    pub fn is_public(&self) -> bool {
        self.signature.is_public
    }

    /// Declared type of a field
    pub fn field_type(&self) -> Option<&HostType> {
        self.field_type.as_ref()
    }

    /// Whether the member carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| **t == *tag)
    }

    /// Executable body
    pub fn body(&self) -> &MemberBody {
        &self.body
    }

    /// Same name, kind and parameter list; used for override detection
    pub fn overrides(&self, other: &MemberDescriptor) -> bool {
        self.signature.kind == other.signature.kind
            && self.signature.name == other.signature.name
            && self.signature.params == other.signature.params
    }
}

impl PartialEq for MemberDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for MemberDescriptor {}

impl Hash for MemberDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.signature.kind, self.signature)
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.signature, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumericKind;

    fn nop(_: Option<&HostObject>, _: &[HostValue]) -> HostResult<HostValue> {
        Ok(HostValue::Null)
    }

    #[test]
    fn test_signature_display() {
        let m = MemberDescriptor::method(
            "pkg.Fmt",
            "format",
            vec![HostType::Str, HostType::array(HostType::Any)],
            nop,
        )
        .varargs();
        assert_eq!(m.to_string(), "pkg.Fmt.format(String, Object...)");

        let c = MemberDescriptor::constructor("pkg.Fmt", vec![HostType::Num(NumericKind::Int)], nop);
        assert_eq!(c.name(), "Fmt");
        assert_eq!(c.to_string(), "pkg.Fmt.Fmt(int)");

        let f = MemberDescriptor::field("pkg.Fmt", "width", HostType::Num(NumericKind::Int), |_| {
            Ok(HostValue::Null)
        });
        assert_eq!(f.to_string(), "pkg.Fmt.width");
    }

    #[test]
    fn test_equality_ignores_body_and_tags() {
        let a = MemberDescriptor::method("T", "m", vec![], nop);
        let b = MemberDescriptor::method("T", "m", vec![], |_, _| Ok(HostValue::Bool(true)))
            .with_tag("exposed");
        assert_eq!(a, b);
        assert_ne!(a, a.clone().as_static());
    }

    #[test]
    fn test_overrides_ignores_declaring_type() {
        let base = MemberDescriptor::method("Base", "m", vec![HostType::Str], nop);
        let sub = MemberDescriptor::method("Sub", "m", vec![HostType::Str], nop);
        assert!(sub.overrides(&base));
        assert_ne!(sub, base);
        assert_eq!(base.inherited_by(&Arc::from("Sub")), sub);
    }
}
