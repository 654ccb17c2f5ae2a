//! Blacklist and whitelist policies built from member selectors

use std::sync::Arc;

use hostwrap_sdk::{MemberDescriptor, MemberKind, RuntimeType, ROOT_TYPE};
use rustc_hash::FxHashMap;

use super::selector::MemberSelector;
use super::TO_STRING_METHOD;
use crate::error::{BridgeError, BridgeResult};

/// How selected members are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Selected members are hidden, everything else is exposed
    Blacklist,
    /// Only selected (or tagged) members are exposed
    Whitelist,
}

/// Access policy driven by a list of [`MemberSelector`]s
#[derive(Debug, Clone)]
pub struct MemberSelectorListPolicy {
    mode: ListMode,
    selectors: Vec<MemberSelector>,
    accessible_tag: Option<Arc<str>>,
    to_string_always_exposed: bool,
}

impl MemberSelectorListPolicy {
    /// Build from parsed selectors.
    ///
    /// Fails when one type/method pair is selected both as "every overload"
    /// and as an explicit overload.
    pub fn new(
        mode: ListMode,
        selectors: Vec<MemberSelector>,
        accessible_tag: Option<&str>,
    ) -> BridgeResult<Self> {
        check_conflicts(&selectors)?;

        let to_string_always_exposed = match mode {
            ListMode::Blacklist => !selectors
                .iter()
                .any(|s| s.selects_nullary_method(TO_STRING_METHOD)),
            ListMode::Whitelist => selectors
                .iter()
                .any(|s| s.upper_bound() == ROOT_TYPE && s.selects_nullary_method(TO_STRING_METHOD)),
        };

        Ok(Self {
            mode,
            selectors,
            accessible_tag: accessible_tag.map(Arc::from),
            to_string_always_exposed,
        })
    }

    /// Parse selector lines; blank lines and `#` or `//` comments are skipped
    pub fn parse<'a>(
        mode: ListMode,
        lines: impl IntoIterator<Item = &'a str>,
        accessible_tag: Option<&str>,
    ) -> BridgeResult<Self> {
        let selectors = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
            .map(MemberSelector::parse)
            .collect::<BridgeResult<Vec<_>>>()?;
        Self::new(mode, selectors, accessible_tag)
    }

    /// List mode
    pub fn mode(&self) -> ListMode {
        self.mode
    }

    /// Selectors in declaration order
    pub fn selectors(&self) -> &[MemberSelector] {
        &self.selectors
    }

    /// Whether `member` of an object of type `ty` is exposed
    pub fn is_exposed(&self, ty: &RuntimeType, member: &MemberDescriptor) -> bool {
        let selected = self.selectors.iter().any(|s| s.matches(ty, member));
        match self.mode {
            ListMode::Blacklist => !selected,
            ListMode::Whitelist => {
                selected
                    || self
                        .accessible_tag
                        .as_deref()
                        .map_or(false, |tag| member.has_tag(tag))
            }
        }
    }

    /// Whether the zero-argument `to_string` member is exposed on every type
    pub fn is_to_string_always_exposed(&self) -> bool {
        self.to_string_always_exposed
    }
}

fn check_conflicts(selectors: &[MemberSelector]) -> BridgeResult<()> {
    // (type, method) -> (has wildcard, has explicit overload)
    let mut seen: FxHashMap<(&str, &str), (bool, bool)> = FxHashMap::default();
    for sel in selectors.iter().filter(|s| s.kind() == MemberKind::Method) {
        let slot = seen.entry((sel.upper_bound(), sel.name())).or_default();
        if sel.is_any_overload() {
            slot.0 = true;
        } else {
            slot.1 = true;
        }
        if slot.0 && slot.1 {
            return Err(BridgeError::PolicyMisconfiguration(format!(
                "{}.{} is selected both with (*) and with an explicit parameter list",
                sel.upper_bound(),
                sel.name()
            )));
        }
    }
    Ok(())
}
