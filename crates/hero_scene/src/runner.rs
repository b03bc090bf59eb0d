//! Effect runners
//!
//! The composer never talks to an engine directly. It hands resolved
//! [`Effect`]s to an [`EffectRunner`]: [`ScopeRunner`] drives the timeline
//! engine through a scope, [`VariantRunner`] drives the transition engine.
//! [`RecordingRunner`] only records what it is asked to do.

use std::cell::RefCell;
use std::rc::Rc;

use hero_animation::{SchedulerHandle, Scope, Target, TweenHandle};
use hero_core::ElementId;
use hero_motion::{GestureSet, Pointer, TransitionHandle, VariantSet, VariantState};
use smallvec::SmallVec;

use crate::catalog::{LoopTemplate, TweenTemplate};
use crate::error::{Result, SceneError};

/// Which engine an effect belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Timeline,
    Transition,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Timeline => f.write_str("timeline"),
            Engine::Transition => f.write_str("transition"),
        }
    }
}

/// A preset bound to concrete elements
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// One-shot tween on one element
    Tween {
        target: ElementId,
        template: TweenTemplate,
    },
    /// Infinite yoyo loop on an element or class
    Ambient {
        target: Target,
        template: LoopTemplate,
    },
    /// Move one element from hidden to visible
    Reveal {
        target: ElementId,
        variant: VariantSet,
    },
    /// Reveal a container and stagger its items
    Stagger {
        container: ElementId,
        container_variant: VariantSet,
        items: SmallVec<[ElementId; 4]>,
        item_variant: VariantSet,
    },
    /// Hover and press overlays
    Gestures {
        target: ElementId,
        gestures: GestureSet,
    },
}

impl Effect {
    pub fn engine(&self) -> Engine {
        match self {
            Effect::Tween { .. } | Effect::Ambient { .. } => Engine::Timeline,
            Effect::Reveal { .. } | Effect::Stagger { .. } | Effect::Gestures { .. } => {
                Engine::Transition
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Effect::Tween { .. } => "tween",
            Effect::Ambient { .. } => "ambient",
            Effect::Reveal { .. } => "reveal",
            Effect::Stagger { .. } => "stagger",
            Effect::Gestures { .. } => "gesture",
        }
    }
}

/// Something that can play effects and later undo them all
pub trait EffectRunner {
    fn name(&self) -> &'static str;

    /// Start an effect
    fn run(&mut self, effect: &Effect) -> Result<()>;

    /// Route a pointer event; returns whether anything reacted
    fn pointer(&mut self, _element: ElementId, _pointer: Pointer) -> bool {
        false
    }

    /// Cancel everything this runner started. Safe to call repeatedly.
    fn dispose(&mut self);
}

/// Timeline runner backed by one scope
pub struct ScopeRunner {
    scope: Scope,
    handles: Vec<TweenHandle>,
}

impl ScopeRunner {
    /// Open a scope on `root`
    pub fn open(scheduler: &SchedulerHandle, root: ElementId) -> Self {
        Self {
            scope: scheduler.open_scope(root),
            handles: Vec::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Handles of every effect started so far
    pub fn handles(&self) -> &[TweenHandle] {
        &self.handles
    }
}

impl EffectRunner for ScopeRunner {
    fn name(&self) -> &'static str {
        "scope"
    }

    fn run(&mut self, effect: &Effect) -> Result<()> {
        let handle = match effect {
            Effect::Tween { target, template } => {
                self.scope
                    .tween(*target, &template.from, &template.to, template.options)
            }
            Effect::Ambient { target, template } => {
                self.scope
                    .ambient(target.clone(), &template.to, template.options)
            }
            other => {
                return Err(SceneError::UnsupportedEffect {
                    runner: self.name(),
                    effect: other.kind(),
                })
            }
        };
        self.handles.push(handle);
        Ok(())
    }

    fn dispose(&mut self) {
        self.handles.clear();
        self.scope.close();
    }
}

/// Transition runner for one view subtree
pub struct VariantRunner {
    engine: TransitionHandle,
    root: ElementId,
    disposed: bool,
}

impl VariantRunner {
    pub fn new(engine: TransitionHandle, root: ElementId) -> Self {
        Self {
            engine,
            root,
            disposed: false,
        }
    }
}

impl EffectRunner for VariantRunner {
    fn name(&self) -> &'static str {
        "variant"
    }

    fn run(&mut self, effect: &Effect) -> Result<()> {
        match effect {
            Effect::Reveal { target, variant } => {
                self.engine
                    .apply_variant(*target, variant, VariantState::Visible);
            }
            Effect::Stagger {
                container,
                container_variant,
                items,
                item_variant,
            } => {
                for item in items {
                    self.engine.assign(*item, item_variant);
                }
                self.engine
                    .animate_group(*container, container_variant, item_variant);
            }
            Effect::Gestures { target, gestures } => {
                self.engine.set_gestures(*target, gestures.clone());
            }
            other => {
                return Err(SceneError::UnsupportedEffect {
                    runner: self.name(),
                    effect: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn pointer(&mut self, element: ElementId, pointer: Pointer) -> bool {
        !self.disposed && self.engine.pointer(element, pointer)
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let dropped = self.engine.unmount(self.root);
        tracing::debug!("unmounted {} motion entries under {:?}", dropped, self.root);
    }
}

/// What a [`RecordingRunner`] saw
#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    Run(Effect),
    Pointer(ElementId, Pointer),
    Dispose,
}

/// Runner that records calls instead of animating
///
/// Clones share one log, so a test can keep a clone while the composer
/// owns the runner.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    log: Rc<RefCell<Vec<Recorded>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<Recorded> {
        self.log.borrow().clone()
    }

    /// Effects run so far, in order
    pub fn effects(&self) -> Vec<Effect> {
        self.log
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Recorded::Run(effect) => Some(effect.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn dispose_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|r| matches!(r, Recorded::Dispose))
            .count()
    }
}

impl EffectRunner for RecordingRunner {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn run(&mut self, effect: &Effect) -> Result<()> {
        self.log.borrow_mut().push(Recorded::Run(effect.clone()));
        Ok(())
    }

    fn pointer(&mut self, element: ElementId, pointer: Pointer) -> bool {
        self.log
            .borrow_mut()
            .push(Recorded::Pointer(element, pointer));
        true
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().push(Recorded::Dispose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EffectCatalog;
    use hero_animation::AnimationScheduler;
    use hero_core::{ElementTree, Property};
    use hero_motion::TransitionEngine;

    #[test]
    fn test_scope_runner_rejects_variant_effects() {
        let mut tree = ElementTree::new();
        let root = tree.create("section");
        tree.attach(root).unwrap();
        let scheduler = AnimationScheduler::new(tree.into_shared());
        let mut runner = ScopeRunner::open(&scheduler.handle(), root);

        let catalog = EffectCatalog::standard();
        let effect = Effect::Reveal {
            target: root,
            variant: catalog.variant("drop-in").unwrap().clone(),
        };

        let err = runner.run(&effect).unwrap_err();
        assert_eq!(err.to_string(), "scope runner cannot run reveal effects");
    }

    #[test]
    fn test_scope_runner_dispose_reverts() {
        let mut tree = ElementTree::new();
        let root = tree.create("section");
        let title = tree.create("h1");
        tree.append_child(root, title).unwrap();
        tree.attach(root).unwrap();
        let tree = tree.into_shared();
        let scheduler = AnimationScheduler::new(tree.clone());
        let mut runner = ScopeRunner::open(&scheduler.handle(), root);

        let template = EffectCatalog::standard().tween("skew-in").unwrap().clone();
        runner
            .run(&Effect::Tween {
                target: title,
                template,
            })
            .unwrap();
        assert_eq!(tree.borrow().property(title, Property::Y), Some(80.0));

        runner.dispose();
        runner.dispose();
        assert!(tree.borrow().style(title).unwrap().is_identity());
        assert!(runner.scope().is_closed());
        assert_eq!(scheduler.tween_count(), 0);
    }

    #[test]
    fn test_variant_runner_dispose_unmounts() {
        let mut tree = ElementTree::new();
        let root = tree.create("section");
        let badge = tree.create("div");
        tree.append_child(root, badge).unwrap();
        tree.attach(root).unwrap();
        let engine = TransitionEngine::new(tree.into_shared());
        let mut runner = VariantRunner::new(engine.handle(), root);

        let variant = EffectCatalog::standard().variant("pop-in").unwrap().clone();
        runner
            .run(&Effect::Reveal {
                target: badge,
                variant,
            })
            .unwrap();
        assert_eq!(engine.node_count(), 1);

        runner.dispose();
        assert_eq!(engine.node_count(), 0);
        assert!(!runner.pointer(badge, Pointer::Enter));
    }

    #[test]
    fn test_recording_runner_shares_log() {
        let recorder = RecordingRunner::new();
        let mut boxed: Box<dyn EffectRunner> = Box::new(recorder.clone());

        let mut tree = ElementTree::new();
        let el = tree.create("a");
        boxed.pointer(el, Pointer::Down);
        boxed.dispose();

        assert_eq!(
            recorder.log(),
            vec![Recorded::Pointer(el, Pointer::Down), Recorded::Dispose]
        );
        assert_eq!(recorder.dispose_count(), 1);
    }
}
