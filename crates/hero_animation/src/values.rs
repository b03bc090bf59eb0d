//! Animatable value types
//!
//! Linear interpolation for scalars and sparse property maps.

use hero_core::{Property, PropertyMap};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// PropertyMap Implementation
// ============================================================================

/// Interpolates every property present in either map. A property missing on
/// one side is taken at its identity value.
impl Interpolate for PropertyMap {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut out = PropertyMap::new();
        for (property, from) in self.iter() {
            let to = other.get(property).unwrap_or(property.identity());
            out.set(property, from.lerp(&to, t));
        }
        for (property, to) in other.iter() {
            if !self.contains(property) {
                out.set(property, property.identity().lerp(&to, t));
            }
        }
        out
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.properties().chain(other.properties()).all(|p| {
            let a = self.get(p).unwrap_or(p.identity());
            let b = other.get(p).unwrap_or(p.identity());
            a.approx_eq(&b, epsilon)
        })
    }
}

/// Combine a lifecycle value with an interaction overlay
///
/// Scales and opacity multiply, offsets add.
pub fn compose(base: &PropertyMap, overlay: &PropertyMap) -> PropertyMap {
    let mut out = base.clone();
    for (property, delta) in overlay.iter() {
        let current = out.get(property).unwrap_or(property.identity());
        out.set(property, combine(property, current, delta));
    }
    out
}

fn combine(property: Property, value: f32, delta: f32) -> f32 {
    if property.is_multiplicative() {
        value * delta
    } else {
        value + delta
    }
}
