//! Hero Animation System
//!
//! The imperative timeline engine: scoped tweens, ambient loops and springs.
//!
//! # Features
//!
//! - **Scopes**: ownership boundaries bound to a root element; closing one
//!   kills its tweens and restores every property they touched
//! - **Tweens**: from/to animations with delay, easing, repeat and yoyo
//! - **Ambient Loops**: infinite yoyo tweens that only end with their scope
//! - **Easing**: CSS keyword curves, cubic beziers, power and sine curves
//! - **Springs**: RK4-integrated springs for interaction feedback
//!
//! # Example
//!
//! ```rust
//! use hero_animation::{AnimationScheduler, Easing, TweenOptions};
//! use hero_core::{ElementTree, Property, PropertyMap};
//!
//! let mut tree = ElementTree::new();
//! let title = tree.create("h1");
//! tree.attach(title).unwrap();
//! let tree = tree.into_shared();
//!
//! let scheduler = AnimationScheduler::new(tree.clone());
//! let mut scope = scheduler.open_scope(tree.borrow().document());
//!
//! let from = PropertyMap::new().with(Property::Opacity, 0.0);
//! let to = PropertyMap::new().with(Property::Opacity, 1.0);
//! scope.tween(title, &from, &to, TweenOptions::new(800).easing(Easing::Power2Out));
//!
//! while scheduler.tick(16.0) {}
//! assert_eq!(tree.borrow().property(title, Property::Opacity), Some(1.0));
//!
//! scope.close();
//! ```

pub mod easing;
pub mod scheduler;
pub mod spring;
pub mod tween;
pub mod values;

pub use easing::Easing;
pub use scheduler::{
    AnimationScheduler, SchedulerHandle, Scope, ScopeId, TweenEvent, TweenHandle, TweenId,
};
pub use spring::{Spring, SpringConfig};
pub use tween::{LoopOptions, Repeat, Target, Tween, TweenOptions, TweenState, TweenStep};
pub use values::{compose, Interpolate};
