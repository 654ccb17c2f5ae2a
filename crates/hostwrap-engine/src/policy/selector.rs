//! Member selectors
//!
//! A selector names one member (or every overload of a method) on an upper
//! bound type. It matches that member on the type itself and on every
//! subtype.
//!
//! Syntax:
//!
//! | Text                         | Selects                                   |
//! |------------------------------|-------------------------------------------|
//! | `pkg.Type.name`              | field `name`                              |
//! | `pkg.Type.name(int, String)` | method `name` with exactly these params   |
//! | `pkg.Type.name(*)`           | every overload of method `name`           |
//! | `pkg.Type.Type(int)`         | constructor (member name = simple name)   |

use std::fmt;
use std::sync::Arc;

use hostwrap_sdk::types::{is_identifier, is_qualified_identifier, simple_name};
use hostwrap_sdk::{HostType, MemberDescriptor, MemberKind, RuntimeType};

use crate::error::{BridgeError, BridgeResult};

/// Selects a member by upper bound type, name, kind and parameter list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberSelector {
    upper_bound: Arc<str>,
    name: Arc<str>,
    kind: MemberKind,
    /// `None` selects every overload
    params: Option<Vec<HostType>>,
}

impl MemberSelector {
    /// Select a field
    pub fn field(upper_bound: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            upper_bound: upper_bound.into(),
            name: name.into(),
            kind: MemberKind::Field,
            params: None,
        }
    }

    /// Select one method overload
    pub fn method(
        upper_bound: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        params: Vec<HostType>,
    ) -> Self {
        Self {
            upper_bound: upper_bound.into(),
            name: name.into(),
            kind: MemberKind::Method,
            params: Some(params),
        }
    }

    /// Select every overload of a method
    pub fn any_overload(upper_bound: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            upper_bound: upper_bound.into(),
            name: name.into(),
            kind: MemberKind::Method,
            params: None,
        }
    }

    /// Select one constructor
    pub fn constructor(upper_bound: impl Into<Arc<str>>, params: Vec<HostType>) -> Self {
        let upper_bound = upper_bound.into();
        let name: Arc<str> = simple_name(&upper_bound).into();
        Self {
            upper_bound,
            name,
            kind: MemberKind::Constructor,
            params: Some(params),
        }
    }

    /// Parse selector text
    pub fn parse(text: &str) -> BridgeResult<Self> {
        let text = text.trim();
        let malformed = |why: &str| {
            BridgeError::PolicyMisconfiguration(format!("malformed member selector {:?}: {}", text, why))
        };

        for bad in ["<", ">", "...", ";"] {
            if text.contains(bad) {
                return Err(malformed(&format!("must not contain {:?}", bad)));
            }
        }

        let (head, params) = match text.find('(') {
            Some(open) => {
                let inner = text[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| malformed("missing closing parenthesis"))?;
                (&text[..open], Some(inner.trim()))
            }
            None => (text, None),
        };

        let head = head.trim();
        let (type_name, member) = head
            .rsplit_once('.')
            .ok_or_else(|| malformed("expected Type.member"))?;
        if !is_qualified_identifier(type_name) {
            return Err(malformed("bad type name"));
        }
        if !is_identifier(member) {
            return Err(malformed("bad member name"));
        }

        let params = match params {
            None => return Ok(Self::field(type_name, member)),
            Some("*") => None,
            Some("") => Some(Vec::new()),
            Some(list) => Some(
                list.split(',')
                    .map(|p| HostType::parse(p).map_err(|e| malformed(&e.to_string())))
                    .collect::<BridgeResult<Vec<_>>>()?,
            ),
        };

        let kind = if member == simple_name(type_name) {
            MemberKind::Constructor
        } else {
            MemberKind::Method
        };
        if kind == MemberKind::Constructor && params.is_none() {
            return Err(malformed("constructors need an explicit parameter list"));
        }

        Ok(Self {
            upper_bound: type_name.into(),
            name: member.into(),
            kind,
            params,
        })
    }

    /// Upper bound type name
    pub fn upper_bound(&self) -> &str {
        &self.upper_bound
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member kind
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Selected parameter list; `None` for every overload (and for fields)
    pub fn params(&self) -> Option<&[HostType]> {
        self.params.as_deref()
    }

    /// Whether this selects every method overload
    pub fn is_any_overload(&self) -> bool {
        self.kind == MemberKind::Method && self.params.is_none()
    }

    /// Whether this selects `member` as seen on an object of type `ty`
    pub fn matches(&self, ty: &RuntimeType, member: &MemberDescriptor) -> bool {
        self.kind == member.kind()
            && *self.name == *member.name()
            && ty.is_subtype_of(&self.upper_bound)
            && self.params.as_deref().map_or(true, |p| p == member.params())
    }

    /// Whether this selects the zero-argument member `name`
    pub(crate) fn selects_nullary_method(&self, name: &str) -> bool {
        self.kind == MemberKind::Method
            && *self.name == *name
            && self.params.as_ref().map_or(true, |p| p.is_empty())
    }
}

impl fmt::Display for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.upper_bound, self.name)?;
        match (&self.kind, &self.params) {
            (MemberKind::Field, _) => Ok(()),
            (_, None) => write!(f, "(*)"),
            (_, Some(params)) => {
                let list: Vec<String> = params.iter().map(ToString::to_string).collect();
                write!(f, "({})", list.join(", "))
            }
        }
    }
}
