//! Per-window rules: every controlled property carries its own policy
//! rather than the whole rule sharing one.

use crate::core::geometry::{Rect, Size};

/// Per-property policy: whether a rule merely suggests a value, forces it
/// permanently, forces it once, or leaves the property alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    DontAffect,
    Force,
    ForceTemporarily,
    Apply,
    ApplyNow,
    Remember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Position,
    MinSize,
    MaxSize,
    Maximized,
    Minimized,
    Desktop,
    Activity,
    Screen,
    WindowType,
    Above,
    Below,
    SkipTaskbar,
    SkipPager,
    SkipSwitcher,
    OpacityActive,
    OpacityInactive,
    Fullscreen,
    NoBorder,
    PlacementStrategy,
    FocusAccept,
    FocusStealingLevel,
    CloseBehaviour,
    ShortcutBinding,
    DesktopFileId,
    BlockingCompositing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Rect(Rect),
    Size(Size),
    Bool(bool),
    U32(u32),
    I32(i32),
    Text(String),
}

/// A single substring/exact matcher against a window property. `None`
/// means "don't care", matching any window.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    pub wm_class: Option<String>,
    pub role: Option<String>,
    pub title: Option<String>,
    pub client_machine: Option<String>,
    pub window_types: Option<Vec<String>>,
}

impl Matcher {
    fn field_matches(pattern: &Option<String>, value: &str) -> bool {
        pattern.as_deref().is_none_or(|p| p == value)
    }

    pub fn matches(&self, info: &WindowMatchInfo) -> bool {
        Self::field_matches(&self.wm_class, &info.wm_class)
            && Self::field_matches(&self.role, &info.role)
            && Self::field_matches(&self.title, &info.title)
            && Self::field_matches(&self.client_machine, &info.client_machine)
            && self
                .window_types
                .as_ref()
                .is_none_or(|types| types.iter().any(|t| t == &info.window_type))
    }
}

/// The window-identifying fields rules match against.
#[derive(Debug, Clone, Default)]
pub struct WindowMatchInfo {
    pub wm_class: String,
    pub role: String,
    pub title: String,
    pub client_machine: String,
    pub window_type: String,
}

#[derive(Debug, Clone)]
pub struct PropertyOverride {
    pub property: PropertyKey,
    pub policy: Policy,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub matcher: Matcher,
    pub overrides: Vec<PropertyOverride>,
}

/// Ordered list of rules, evaluated first-match-wins per property.
#[derive(Debug, Default)]
pub struct RulesEngine {
    rules: Vec<Rule>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluates `property` for a window matching `info`, against
    /// `default`. `apply_now`/`force_temporarily` matches are consumed
    /// (removed from the owning rule) after first use.
    pub fn check_property(
        &mut self,
        info: &WindowMatchInfo,
        property: PropertyKey,
        default: PropertyValue,
    ) -> PropertyValue {
        for rule in &mut self.rules {
            if !rule.matcher.matches(info) {
                continue;
            }
            let Some(pos) = rule
                .overrides
                .iter()
                .position(|o| o.property == property && o.policy != Policy::DontAffect)
            else {
                continue;
            };
            let value = rule.overrides[pos].value.clone();
            let policy = rule.overrides[pos].policy;
            if matches!(policy, Policy::ApplyNow | Policy::ForceTemporarily) {
                rule.overrides.remove(pos);
            }
            return value;
        }
        default
    }

    /// True iff some matching, non-consumed rule forces (`Force` or
    /// `ApplyNow`) `property`, used by `space::quick_tile` to decide
    /// whether a forced position rule should pre-empt combine-debounce.
    pub fn is_forced(&self, info: &WindowMatchInfo, property: PropertyKey) -> bool {
        self.rules.iter().any(|rule| {
            rule.matcher.matches(info)
                && rule.overrides.iter().any(|o| {
                    o.property == property && matches!(o.policy, Policy::Force | Policy::ApplyNow)
                })
        })
    }
}
