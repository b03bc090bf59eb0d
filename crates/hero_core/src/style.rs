//! Presentation style
//!
//! Only the transform/opacity layer of an element is animatable. Colors,
//! spacing and layout live in class tokens that the engines never read.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An animatable presentation property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Opacity (0.0 - 1.0)
    Opacity,
    /// Horizontal translation in px
    X,
    /// Vertical translation in px
    Y,
    /// Uniform scale
    Scale,
    /// Horizontal scale
    ScaleX,
    /// Vertical scale
    ScaleY,
    /// Vertical skew in degrees
    SkewY,
}

impl Property {
    pub const ALL: [Property; 7] = [
        Property::Opacity,
        Property::X,
        Property::Y,
        Property::Scale,
        Property::ScaleX,
        Property::ScaleY,
        Property::SkewY,
    ];

    /// Value the property has when nothing animates it
    pub fn identity(self) -> f32 {
        match self {
            Property::Opacity | Property::Scale | Property::ScaleX | Property::ScaleY => 1.0,
            Property::X | Property::Y | Property::SkewY => 0.0,
        }
    }

    /// Whether overlays combine this property by multiplication (scales)
    /// rather than addition (offsets)
    pub fn is_multiplicative(self) -> bool {
        matches!(
            self,
            Property::Opacity | Property::Scale | Property::ScaleX | Property::ScaleY
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::X => "x",
            Property::Y => "y",
            Property::Scale => "scale",
            Property::ScaleX => "scale_x",
            Property::ScaleY => "scale_y",
            Property::SkewY => "skew_y",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Current presentation values of an element
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub skew_y: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_y: 0.0,
        }
    }
}

impl Style {
    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::Opacity => self.opacity,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Scale => self.scale,
            Property::ScaleX => self.scale_x,
            Property::ScaleY => self.scale_y,
            Property::SkewY => self.skew_y,
        }
    }

    pub fn set(&mut self, property: Property, value: f32) {
        let slot = match property {
            Property::Opacity => &mut self.opacity,
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Scale => &mut self.scale,
            Property::ScaleX => &mut self.scale_x,
            Property::ScaleY => &mut self.scale_y,
            Property::SkewY => &mut self.skew_y,
        };
        *slot = value;
    }

    /// Read the current values of the given properties
    pub fn sample<I>(&self, properties: I) -> PropertyMap
    where
        I: IntoIterator<Item = Property>,
    {
        properties.into_iter().map(|p| (p, self.get(p))).collect()
    }

    /// Check whether every property is at its identity value
    pub fn is_identity(&self) -> bool {
        Property::ALL
            .iter()
            .all(|p| (self.get(*p) - p.identity()).abs() < 1e-6)
    }
}

/// A sparse set of property values
///
/// Insertion order is kept so that logs and plans read the way presets were
/// declared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap {
    entries: SmallVec<[(Property, f32); 4]>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder pattern)
    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.set(property, value);
        self
    }

    /// Set a value, replacing any previous value for the property
    pub fn set(&mut self, property: Property, value: f32) {
        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| *p == property) {
            entry.1 = value;
        } else {
            self.entries.push((property, value));
        }
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, property: Property) -> bool {
        self.get(property).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether both maps cover exactly the same properties
    pub fn same_properties(&self, other: &PropertyMap) -> bool {
        self.len() == other.len() && self.properties().all(|p| other.contains(p))
    }

    /// Check whether any property is shared with `other`
    pub fn overlaps(&self, other: &PropertyMap) -> bool {
        self.properties().any(|p| other.contains(p))
    }

    pub fn is_finite(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_finite())
    }

    /// The identity values for the same set of properties
    pub fn identity(&self) -> PropertyMap {
        self.properties().map(|p| (p, p.identity())).collect()
    }
}

impl FromIterator<(Property, f32)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (Property, f32)>>(iter: T) -> Self {
        let mut map = PropertyMap::new();
        for (p, v) in iter {
            map.set(p, v);
        }
        map
    }
}
