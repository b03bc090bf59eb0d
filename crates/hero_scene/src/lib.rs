//! Hero Scene
//!
//! The landing view and its choreography. A [`HeroScene`] renders the view
//! subtree, resolves its script against an [`EffectCatalog`] and, once the
//! host has attached the view, starts every effect through the two engines
//! owned by a [`Stage`]. Unmounting undoes all of it.
//!
//! # Example
//!
//! ```rust
//! use hero_scene::{EffectCatalog, HeroContent, HeroScene, MountOutcome, Stage};
//!
//! let mut stage = Stage::new();
//! let mut scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();
//!
//! let view = scene.render(&mut stage.tree().borrow_mut()).unwrap().clone();
//! stage.attach(view.root).unwrap();
//! assert_eq!(scene.mount(&stage).unwrap(), MountOutcome::Mounted);
//!
//! stage.run_for(2500, 16.0);
//! assert_eq!(stage.snapshot(view.title).unwrap().opacity, 1.0);
//!
//! scene.unmount();
//! assert_eq!(stage.scheduler().tween_count(), 0);
//! ```

pub mod catalog;
pub mod composer;
pub mod content;
pub mod error;
pub mod runner;
pub mod stage;
pub mod view;

pub use catalog::{EffectCatalog, LoopTemplate, Preset, PresetKind, TweenTemplate};
pub use composer::{Cue, HeroScene, MountOutcome, PlanEntry, HERO_SCRIPT};
pub use content::{CallToAction, CtaStyle, HeroContent, SocialLink};
pub use error::{Result, SceneError};
pub use runner::{
    Effect, EffectRunner, Engine, Recorded, RecordingRunner, ScopeRunner, VariantRunner,
};
pub use stage::Stage;
pub use view::{HeroView, Role, HOVER_CLASS};
