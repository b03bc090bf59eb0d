//! Hero Motion
//!
//! The declarative transition engine. Elements are assigned a variant set,
//! render its `hidden` values at once and move to `visible` when revealed,
//! either alone or as staggered children of a container. Hover and press
//! overlays ride on top without touching the lifecycle.
//!
//! # Example
//!
//! ```rust
//! use hero_core::{ElementTree, Property, PropertyMap};
//! use hero_motion::{TransitionEngine, Transition, VariantSet, VariantState};
//!
//! let mut tree = ElementTree::new();
//! let badge = tree.create("span");
//! tree.attach(badge).unwrap();
//! let tree = tree.into_shared();
//!
//! let engine = TransitionEngine::new(tree.clone());
//! let pop_in = VariantSet::new(
//!     "pop-in",
//!     PropertyMap::new().with(Property::Opacity, 0.0),
//!     PropertyMap::new().with(Property::Opacity, 1.0),
//!     Transition::new(500).delay(100),
//! );
//!
//! engine.apply_variant(badge, &pop_in, VariantState::Visible);
//! assert_eq!(tree.borrow().property(badge, Property::Opacity), Some(0.0));
//!
//! while engine.tick(16.0) {}
//! assert_eq!(tree.borrow().property(badge, Property::Opacity), Some(1.0));
//! ```

pub mod engine;
pub mod error;
pub mod interaction;
pub mod variant;

pub use engine::{TransitionEngine, TransitionHandle, VariantChange};
pub use error::{Result, VariantError};
pub use interaction::Pointer;
pub use variant::{
    GestureSet, StaggerConfig, Transition, VariantSet, VariantState,
};
