//! Wrapper configuration (hostwrap.toml)
//!
//! ```toml
//! [cache]
//! use_model_cache = true
//! model_cache_capacity = 4096
//!
//! [introspection]
//! exposure = "all"           # all | properties-only | nothing
//! expose_fields = true
//! default_view = "generic"   # generic | methods-only | properties-only
//!
//! [policy]
//! mode = "default"           # default | allow-all | blacklist | whitelist
//! accessible_tag = "template_accessible"
//! selectors = [
//!     "com.acme.Secret.reveal()",
//!     "Object.get_class()",
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::introspect::{ExposureLevel, MemberView};
use crate::policy::{AccessPolicy, ListMode, MemberSelectorListPolicy};

/// Top-level wrapper configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Model cache settings
    pub cache: CacheConfig,
    /// Introspection settings
    pub introspection: IntrospectionConfig,
    /// Member access policy
    pub policy: PolicyConfig,
}

/// `[cache]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Memoise wrappers per object identity
    pub use_model_cache: bool,
    /// Upper bound on identity-cache entries
    pub model_cache_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            use_model_cache: true,
            model_cache_capacity: 4096,
        }
    }
}

/// `[introspection]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectionConfig {
    /// Which member kinds are introspected at all
    pub exposure: ExposureLevel,
    /// Expose public instance fields
    pub expose_fields: bool,
    /// View new wrappers start with
    pub default_view: MemberView,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            exposure: ExposureLevel::All,
            expose_fields: true,
            default_view: MemberView::Generic,
        }
    }
}

/// How the `[policy]` section builds an [`AccessPolicy`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyMode {
    /// Built-in unsafe-member blacklist, plus `selectors` if any
    #[default]
    Default,
    /// Expose everything
    AllowAll,
    /// Expose everything except `selectors`
    Blacklist,
    /// Expose only `selectors` and tagged members
    Whitelist,
}

/// `[policy]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Policy mode
    pub mode: PolicyMode,
    /// Member selectors, one per entry
    pub selectors: Vec<String>,
    /// Whitelist mode: members carrying this tag are exposed too
    pub accessible_tag: Option<String>,
}

impl PolicyConfig {
    /// Build the access policy described by this section
    pub fn build(&self) -> BridgeResult<AccessPolicy> {
        let lines = self.selectors.iter().map(String::as_str);
        let policy = match self.mode {
            PolicyMode::AllowAll => AccessPolicy::AllowAll,
            PolicyMode::Default if self.selectors.is_empty() => AccessPolicy::default_policy()?,
            PolicyMode::Default => AccessPolicy::and(
                AccessPolicy::default_policy()?,
                AccessPolicy::List(MemberSelectorListPolicy::parse(ListMode::Blacklist, lines, None)?),
            ),
            PolicyMode::Blacklist => {
                AccessPolicy::List(MemberSelectorListPolicy::parse(ListMode::Blacklist, lines, None)?)
            }
            PolicyMode::Whitelist => AccessPolicy::List(MemberSelectorListPolicy::parse(
                ListMode::Whitelist,
                lines,
                self.accessible_tag.as_deref(),
            )?),
        };
        Ok(policy)
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> BridgeResult<Self> {
        let config: BridgeConfig = toml::from_str(content)?;
        if config.cache.model_cache_capacity == 0 {
            return Err(BridgeError::Config(
                "cache.model_cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> BridgeResult<String> {
        toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))
    }
}
