//! Effect catalog
//!
//! The named presets a scene can use: entrance tweens, ambient loops,
//! variant sets and gesture sets. Presets are plain data; the catalog only
//! stores, looks up and validates them.

use hero_animation::{Easing, LoopOptions, TweenOptions};
use hero_core::{Property, PropertyMap};
use hero_motion::{GestureSet, StaggerConfig, Transition, VariantSet};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, SceneError};

/// One-shot from/to tween
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TweenTemplate {
    pub from: PropertyMap,
    pub to: PropertyMap,
    pub options: TweenOptions,
}

impl TweenTemplate {
    /// Every property the tween writes
    pub fn properties(&self) -> PropertyMap {
        let mut out = self.to.clone();
        for (property, value) in self.from.iter() {
            if !out.contains(property) {
                out.set(property, value);
            }
        }
        out
    }
}

/// Infinite yoyo loop toward `to`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoopTemplate {
    pub to: PropertyMap,
    pub options: LoopOptions,
}

/// Kind of a preset, used in lookups and error messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    Variant,
    Tween,
    Loop,
    Gesture,
}

impl std::fmt::Display for PresetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PresetKind::Variant => "variant",
            PresetKind::Tween => "tween",
            PresetKind::Loop => "loop",
            PresetKind::Gesture => "gesture",
        };
        f.write_str(name)
    }
}

/// A named, immutable effect description
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Preset {
    Variant(VariantSet),
    Tween(TweenTemplate),
    Loop(LoopTemplate),
    Gesture(GestureSet),
}

impl Preset {
    pub fn kind(&self) -> PresetKind {
        match self {
            Preset::Variant(_) => PresetKind::Variant,
            Preset::Tween(_) => PresetKind::Tween,
            Preset::Loop(_) => PresetKind::Loop,
            Preset::Gesture(_) => PresetKind::Gesture,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        let finite = match self {
            Preset::Variant(set) => {
                set.validate()?;
                true
            }
            Preset::Tween(t) => {
                t.from.is_finite() && t.to.is_finite() && t.options.easing.is_valid()
            }
            Preset::Loop(l) => l.to.is_finite() && l.options.easing.is_valid(),
            Preset::Gesture(g) => g.is_finite(),
        };
        if finite {
            Ok(())
        } else {
            Err(SceneError::MalformedPreset(name.to_string()))
        }
    }
}

/// Ordered registry of presets
#[derive(Clone, Debug, Default)]
pub struct EffectCatalog {
    presets: IndexMap<&'static str, Preset>,
}

impl EffectCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The presets used by the hero view
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (name, preset) in standard_presets() {
            catalog.insert(name, preset);
        }
        catalog
    }

    /// Add or replace a preset, returning the previous one
    pub fn insert(&mut self, name: &'static str, preset: Preset) -> Option<Preset> {
        self.presets.insert(name, preset)
    }

    pub fn remove(&mut self, name: &str) -> Option<Preset> {
        self.presets.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Result<&Preset> {
        self.presets
            .get(name)
            .ok_or_else(|| SceneError::UnknownPreset(name.to_string()))
    }

    /// Look up a preset and validate its values
    fn checked(&self, name: &str) -> Result<&Preset> {
        let preset = self.get(name)?;
        preset.validate(name)?;
        Ok(preset)
    }

    pub fn variant(&self, name: &str) -> Result<&VariantSet> {
        match self.checked(name)? {
            Preset::Variant(set) => Ok(set),
            other => Err(kind_error(name, PresetKind::Variant, other)),
        }
    }

    pub fn tween(&self, name: &str) -> Result<&TweenTemplate> {
        match self.checked(name)? {
            Preset::Tween(template) => Ok(template),
            other => Err(kind_error(name, PresetKind::Tween, other)),
        }
    }

    pub fn ambient(&self, name: &str) -> Result<&LoopTemplate> {
        match self.checked(name)? {
            Preset::Loop(template) => Ok(template),
            other => Err(kind_error(name, PresetKind::Loop, other)),
        }
    }

    pub fn gesture(&self, name: &str) -> Result<&GestureSet> {
        match self.checked(name)? {
            Preset::Gesture(gestures) => Ok(gestures),
            other => Err(kind_error(name, PresetKind::Gesture, other)),
        }
    }

    /// Validate every preset
    pub fn validate(&self) -> Result<()> {
        for (name, preset) in &self.presets {
            preset.validate(name)?;
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.presets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Preset)> + '_ {
        self.presets.iter().map(|(name, preset)| (*name, preset))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn kind_error(name: &str, expected: PresetKind, found: &Preset) -> SceneError {
    SceneError::PresetKind {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

fn props(values: &[(Property, f32)]) -> PropertyMap {
    values.iter().copied().collect()
}

fn fade(name: &str, hidden: &[(Property, f32)], transition: Transition) -> Preset {
    let hidden = props(hidden);
    let visible = hidden.identity();
    Preset::Variant(VariantSet::new(name, hidden, visible, transition))
}

fn standard_presets() -> Vec<(&'static str, Preset)> {
    use Property::*;

    let out_expo = Easing::CubicBezier {
        x1: 0.22,
        y1: 1.0,
        x2: 0.36,
        y2: 1.0,
    };

    vec![
        (
            "skew-in",
            Preset::Tween(TweenTemplate {
                from: props(&[(Opacity, 0.0), (Y, 80.0), (SkewY, 3.0)]),
                to: props(&[(Opacity, 1.0), (Y, 0.0), (SkewY, 0.0)]),
                options: TweenOptions::new(1200).delay(300).easing(Easing::Power4Out),
            }),
        ),
        (
            "slide-in",
            Preset::Tween(TweenTemplate {
                from: props(&[(Opacity, 0.0), (X, -50.0)]),
                to: props(&[(Opacity, 1.0), (X, 0.0)]),
                options: TweenOptions::new(1000).delay(600).easing(Easing::Power3Out),
            }),
        ),
        (
            "fade-up",
            Preset::Tween(TweenTemplate {
                from: props(&[(Opacity, 0.0), (Y, 30.0)]),
                to: props(&[(Opacity, 1.0), (Y, 0.0)]),
                options: TweenOptions::new(800).delay(900).easing(Easing::Power2Out),
            }),
        ),
        (
            "float-loop",
            Preset::Loop(LoopTemplate {
                to: props(&[(Y, -30.0), (X, 20.0)]),
                options: LoopOptions::new(4000).easing(Easing::SineInOut),
            }),
        ),
        (
            "float-loop-alt",
            Preset::Loop(LoopTemplate {
                to: props(&[(Y, 20.0), (X, -30.0)]),
                options: LoopOptions::new(5000).easing(Easing::SineInOut),
            }),
        ),
        (
            "scroll-bob",
            Preset::Loop(LoopTemplate {
                to: props(&[(Y, 8.0)]),
                options: LoopOptions::new(1000).easing(Easing::EaseInOut),
            }),
        ),
        (
            "stagger-container",
            fade(
                "stagger-container",
                &[(Opacity, 0.0)],
                Transition::new(300).stagger(StaggerConfig::new(1200, 150)),
            ),
        ),
        (
            "stagger-item",
            fade(
                "stagger-item",
                &[(Opacity, 0.0), (Y, 30.0)],
                Transition::new(600).easing(out_expo),
            ),
        ),
        (
            "pop-in",
            fade(
                "pop-in",
                &[(Opacity, 0.0), (Scale, 0.8), (Y, 20.0)],
                Transition::new(500).delay(100),
            ),
        ),
        (
            "underline-reveal",
            fade(
                "underline-reveal",
                &[(ScaleX, 0.0)],
                Transition::new(500).delay(1200),
            ),
        ),
        (
            "drop-in",
            fade(
                "drop-in",
                &[(Opacity, 0.0), (Y, -10.0)],
                Transition::new(500).delay(2000),
            ),
        ),
        (
            "hover-grow",
            Preset::Gesture(GestureSet::new(
                props(&[(Scale, 1.05)]),
                props(&[(Scale, 0.95)]),
            )),
        ),
        (
            "hover-lift",
            Preset::Gesture(GestureSet::new(
                props(&[(Scale, 1.1), (Y, -3.0)]),
                props(&[(Scale, 0.95)]),
            )),
        ),
    ]
}
