//! Traits for moving between host values and Rust types inside member bodies.
//!
//! # Example
//!
//! ```ignore
//! use hostwrap_sdk::{arg, IntoHost, TypeRegistry, HostType, NumericKind};
//!
//! let registry = TypeRegistry::new();
//! registry
//!     .define("Math")
//!     .static_method("add", vec![HostType::Num(NumericKind::Int); 2], |_, args| {
//!         let a: i32 = arg(args, 0)?;
//!         let b: i32 = arg(args, 1)?;
//!         Ok((a + b).into_host())
//!     })
//!     .register();
//! ```

use std::sync::Arc;

use crate::error::{HostError, HostResult};
use crate::host::{HostObject, HostValue};
use crate::value::Number;

/// Extract a Rust value from a host value
pub trait FromHost: Sized {
    /// Convert, failing with [`HostError::TypeMismatch`]
    fn from_host(value: &HostValue) -> HostResult<Self>;
}

/// Produce a host value from a Rust value
pub trait IntoHost {
    /// Convert into host representation
    fn into_host(self) -> HostValue;
}

/// Convert argument `index` of a member call
pub fn arg<T: FromHost>(args: &[HostValue], index: usize) -> HostResult<T> {
    let value = args
        .get(index)
        .ok_or_else(|| HostError::ArgumentError(format!("missing argument {}", index)))?;
    T::from_host(value)
}

macro_rules! numeric_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromHost for $ty {
                fn from_host(value: &HostValue) -> HostResult<Self> {
                    match value {
                        HostValue::Num(Number::$variant(v)) => Ok(*v),
                        other => Err(HostError::mismatch(stringify!($ty), other.type_name())),
                    }
                }
            }

            impl IntoHost for $ty {
                fn into_host(self) -> HostValue {
                    HostValue::Num(Number::$variant(self))
                }
            }
        )*
    };
}

numeric_conversions! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    i128 => BigInteger,
    f32 => Float,
    f64 => Double,
}

impl FromHost for bool {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::Bool(b) => Ok(*b),
            other => Err(HostError::mismatch("boolean", other.type_name())),
        }
    }
}

impl FromHost for char {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::Char(c) => Ok(*c),
            other => Err(HostError::mismatch("char", other.type_name())),
        }
    }
}

impl FromHost for String {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::Str(s) => Ok(s.to_string()),
            other => Err(HostError::mismatch("String", other.type_name())),
        }
    }
}

impl FromHost for Arc<str> {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::Str(s) => Ok(s.clone()),
            other => Err(HostError::mismatch("String", other.type_name())),
        }
    }
}

impl FromHost for Number {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::Num(n) => Ok(*n),
            other => Err(HostError::mismatch("Number", other.type_name())),
        }
    }
}

impl FromHost for HostObject {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::Object(obj) => Ok(obj.clone()),
            other => Err(HostError::mismatch("Object", other.type_name())),
        }
    }
}

impl FromHost for HostValue {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromHost> FromHost for Option<T> {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::Null => Ok(None),
            other => T::from_host(other).map(Some),
        }
    }
}

impl<T: FromHost> FromHost for Vec<T> {
    fn from_host(value: &HostValue) -> HostResult<Self> {
        match value {
            HostValue::List(items) | HostValue::Array(items) => {
                items.iter().map(T::from_host).collect()
            }
            other => Err(HostError::mismatch("List", other.type_name())),
        }
    }
}

impl IntoHost for () {
    fn into_host(self) -> HostValue {
        HostValue::Null
    }
}

impl IntoHost for bool {
    fn into_host(self) -> HostValue {
        HostValue::Bool(self)
    }
}

impl IntoHost for char {
    fn into_host(self) -> HostValue {
        HostValue::Char(self)
    }
}

impl IntoHost for String {
    fn into_host(self) -> HostValue {
        HostValue::Str(self.into())
    }
}

impl IntoHost for &str {
    fn into_host(self) -> HostValue {
        HostValue::Str(self.into())
    }
}

impl IntoHost for HostObject {
    fn into_host(self) -> HostValue {
        HostValue::Object(self)
    }
}

impl<T: IntoHost> IntoHost for Option<T> {
    fn into_host(self) -> HostValue {
        match self {
            Some(v) => v.into_host(),
            None => HostValue::Null,
        }
    }
}

impl<T: IntoHost> IntoHost for Vec<T> {
    fn into_host(self) -> HostValue {
        HostValue::List(self.into_iter().map(IntoHost::into_host).collect())
    }
}
