//! Hostwrap SDK - host type model and reflection contract
//!
//! This crate holds the data model shared between host code and the
//! `hostwrap-engine` crate: runtime type handles, declared member types,
//! dynamic and host values, member descriptors, and the
//! [`ReflectionProvider`] trait through which the engine discovers members.
//!
//! # Example
//!
//! ```ignore
//! use hostwrap_sdk::{HostType, NumericKind, TypeRegistry, IntoHost, arg};
//!
//! let registry = TypeRegistry::new();
//! let point = registry
//!     .define("geo.Point")
//!     .constructor(vec![HostType::Num(NumericKind::Int); 2], |_, args| { ... })
//!     .method("dist", vec![], |this, _| { ... })
//!     .register();
//! ```

#![warn(missing_docs)]

pub mod convert;
pub mod error;
pub mod host;
pub mod member;
pub mod provider;
pub mod types;
pub mod value;

pub use convert::{arg, FromHost, IntoHost};
pub use error::{HostError, HostResult};
pub use host::{HostData, HostObject, HostValue, WeakHostData};
pub use member::{CallableFn, GetterFn, MemberBody, MemberDescriptor, MemberKind, MemberSignature};
pub use provider::{ReflectionProvider, TypeBuilder, TypeRegistry};
pub use types::{HostType, NumericKind, RuntimeType, TypeCategory, ROOT_TYPE};
pub use value::{DynamicValue, Number};
