//! Hero Core
//!
//! Foundational primitives shared by both animation engines:
//!
//! - **Element Tree**: a headless, DOM-like arena with attach/detach semantics
//! - **Style**: the animatable presentation layer (opacity and transforms)
//! - **Property Maps**: sparse sets of property values used by presets
//!
//! # Example
//!
//! ```rust
//! use hero_core::{ElementTree, Property};
//!
//! let mut tree = ElementTree::new();
//! let title = tree.create("h1");
//! tree.attach(title).unwrap();
//!
//! tree.set_property(title, Property::Opacity, 0.0);
//! assert_eq!(tree.property(title, Property::Opacity), Some(0.0));
//! ```

pub mod element;
pub mod error;
pub mod style;

pub use element::{Element, ElementId, ElementTree, SharedTree};
pub use error::{Result, TreeError};
pub use style::{Property, PropertyMap, Style};
