//! Hostwrap Engine - exposes host objects to a template evaluator
//!
//! The engine sits between a dynamically typed template language and a
//! statically typed host object model:
//! - **Policy** (`policy`): which members templates may see
//! - **Introspection** (`introspect`): per-type exposed member sets, cached
//!   and safely invalidated while other threads read them
//! - **Overloads** (`overload`): picking the most specific member for a call
//! - **Invocation** (`invoke`): calling members and capturing host failures
//! - **Models** (`model`): one model per live object identity
//! - **Wrapper** (`wrapper`): the facade the evaluator talks to
//!
//! # Example
//!
//! ```ignore
//! use hostwrap_engine::{BridgeConfig, ObjectWrapper};
//!
//! let wrapper = ObjectWrapper::new(registry.clone(), &BridgeConfig::default())?;
//! let model = wrapper.get_wrapper(&obj);
//! let greeting = model.invoke("greet", &["world".into()])?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod config;
pub mod error;
pub mod introspect;
pub mod invoke;
pub mod logging;
pub mod model;
pub mod notify;
pub mod overload;
pub mod policy;
pub mod wrapper;

pub use cache::TypeCache;
pub use config::{BridgeConfig, CacheConfig, IntrospectionConfig, PolicyConfig, PolicyMode};
pub use error::{BridgeError, BridgeResult};
pub use introspect::{
    CallableGroup, ClassIntrospector, ExposureLevel, IntrospectionEntry, MemberView,
};
pub use invoke::{invoke_member, read_field};
pub use logging::init_tracing;
pub use model::{ModelCache, ModelCore, ModelFactories, ModelKind};
pub use notify::{InvalidationHandle, InvalidationHub, InvalidationSource};
pub use overload::{conversion_cost, resolve, unwrap, ResolvedCall};
pub use policy::{
    AccessPolicy, ListMode, MemberSelector, MemberSelectorListPolicy, TypeAccessPolicy,
    TO_STRING_METHOD,
};
pub use wrapper::{BoundMethod, Lookup, ObjectWrapper, Wrapper, TO_STRING_NOT_EXPOSED};
