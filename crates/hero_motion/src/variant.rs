//! Variant sets
//!
//! A variant set maps the two lifecycle states (`hidden`, `visible`) to
//! property values and a transition descriptor. Containers may carry a
//! stagger descriptor that spreads their children's entrances over time.

use hero_animation::Easing;
use hero_core::PropertyMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VariantError};

/// Lifecycle state of a declaratively animated element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantState {
    #[default]
    Hidden,
    Visible,
}

impl std::fmt::Display for VariantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantState::Hidden => f.write_str("hidden"),
            VariantState::Visible => f.write_str("visible"),
        }
    }
}

/// Configuration for staggered child entrances
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaggerConfig {
    /// Delay before the first child starts (ms)
    pub base_delay_ms: u32,
    /// Delay between each child's start (ms)
    pub per_child_ms: u32,
}

impl StaggerConfig {
    pub fn new(base_delay_ms: u32, per_child_ms: u32) -> Self {
        Self {
            base_delay_ms,
            per_child_ms,
        }
    }

    /// Start delay for the child at `index`
    pub fn delay_for_index(&self, index: usize) -> u32 {
        let offset = self
            .per_child_ms
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
        self.base_delay_ms.saturating_add(offset)
    }
}

/// How an element moves into a lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub duration_ms: u32,
    #[serde(default)]
    pub delay_ms: u32,
    #[serde(default)]
    pub easing: Easing,
    /// Present on containers whose children enter one after another
    #[serde(default)]
    pub stagger: Option<StaggerConfig>,
}

impl Transition {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            easing: Easing::EaseOut,
            stagger: None,
        }
    }

    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn stagger(mut self, stagger: StaggerConfig) -> Self {
        self.stagger = Some(stagger);
        self
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(300)
    }
}

/// Named mapping from lifecycle state to property values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    pub name: String,
    /// Values rendered before the element enters
    pub hidden: PropertyMap,
    /// Values the element settles on
    pub visible: PropertyMap,
    /// Transition into `visible`
    pub transition: Transition,
}

impl VariantSet {
    pub fn new(
        name: impl Into<String>,
        hidden: PropertyMap,
        visible: PropertyMap,
        transition: Transition,
    ) -> Self {
        Self {
            name: name.into(),
            hidden,
            visible,
            transition,
        }
    }

    pub fn values(&self, state: VariantState) -> &PropertyMap {
        match state {
            VariantState::Hidden => &self.hidden,
            VariantState::Visible => &self.visible,
        }
    }

    /// Check that both states cover the same finite properties and the easing
    /// is usable
    pub fn validate(&self) -> Result<()> {
        for state in [VariantState::Hidden, VariantState::Visible] {
            if !self.values(state).is_finite() {
                return Err(VariantError::NonFinite {
                    name: self.name.clone(),
                    state,
                });
            }
        }
        if !self.hidden.same_properties(&self.visible) {
            return Err(VariantError::PropertyMismatch {
                name: self.name.clone(),
            });
        }
        if !self.transition.easing.is_valid() {
            return Err(VariantError::InvalidEasing {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Momentary deltas layered over the lifecycle state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSet {
    /// Applied while the pointer is over the element
    #[serde(default)]
    pub hover: PropertyMap,
    /// Applied while the element is pressed, over `hover`
    #[serde(default)]
    pub tap: PropertyMap,
}

impl GestureSet {
    pub fn new(hover: PropertyMap, tap: PropertyMap) -> Self {
        Self { hover, tap }
    }

    /// Overlay for the given interaction flags
    pub fn overlay(&self, hovered: bool, pressed: bool) -> PropertyMap {
        let mut out = PropertyMap::new();
        if hovered {
            for (property, value) in self.hover.iter() {
                out.set(property, value);
            }
        }
        if pressed {
            for (property, value) in self.tap.iter() {
                out.set(property, value);
            }
        }
        out
    }

    /// Every property either gesture drives
    pub fn properties(&self) -> impl Iterator<Item = hero_core::Property> + '_ {
        self.hover
            .properties()
            .chain(self.tap.properties().filter(|p| !self.hover.contains(*p)))
    }

    pub fn is_finite(&self) -> bool {
        self.hover.is_finite() && self.tap.is_finite()
    }
}
