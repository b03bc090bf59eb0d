//! Interaction overlays
//!
//! Hover and press feedback layered over an element's lifecycle values.
//! Starting an interaction springs the overlay toward the gesture's deltas;
//! ending one snaps it to whatever interaction remains (press falls back to
//! hover, hover falls back to identity). Overlays never touch the lifecycle
//! state.

use hero_animation::{Spring, SpringConfig};
use hero_core::{ElementId, Property, PropertyMap};
use smallvec::SmallVec;

use crate::engine::{EngineInner, TransitionEngine, TransitionHandle};
use crate::variant::GestureSet;

/// Pointer interaction kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    Enter,
    Leave,
    Down,
    Up,
}

/// Spring-driven overlay state of one element
#[derive(Clone, Debug)]
pub(crate) struct Overlay {
    gestures: GestureSet,
    hovered: bool,
    pressed: bool,
    springs: SmallVec<[(Property, Spring); 2]>,
}

impl Overlay {
    fn new(gestures: GestureSet) -> Self {
        let springs = gestures
            .properties()
            .map(|p| (p, Spring::new(SpringConfig::interaction(), p.identity())))
            .collect();
        Self {
            gestures,
            hovered: false,
            pressed: false,
            springs,
        }
    }

    fn target(&self) -> PropertyMap {
        self.gestures.overlay(self.hovered, self.pressed)
    }

    /// Spring every property toward the current target
    fn animate(&mut self) {
        let target = self.target();
        for (property, spring) in self.springs.iter_mut() {
            spring.set_target(target.get(*property).unwrap_or(property.identity()));
        }
    }

    /// Jump every property to the current target
    fn snap(&mut self) {
        let target = self.target();
        for (property, spring) in self.springs.iter_mut() {
            spring.snap(target.get(*property).unwrap_or(property.identity()));
        }
    }

    /// Apply a pointer event; returns whether the overlay snapped and needs
    /// an immediate write
    fn handle(&mut self, pointer: Pointer) -> bool {
        match pointer {
            Pointer::Enter => {
                self.hovered = true;
                self.animate();
                false
            }
            Pointer::Down => {
                self.pressed = true;
                self.animate();
                false
            }
            Pointer::Leave => {
                self.hovered = false;
                self.pressed = false;
                self.snap();
                true
            }
            Pointer::Up => {
                self.pressed = false;
                self.snap();
                true
            }
        }
    }

    pub(crate) fn values(&self) -> PropertyMap {
        self.springs
            .iter()
            .map(|(property, spring)| (*property, spring.value()))
            .collect()
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.springs.iter().all(|(_, spring)| spring.is_settled())
    }

    pub(crate) fn is_active(&self) -> bool {
        self.hovered || self.pressed
    }

    /// Step the springs; returns whether any value moved
    pub(crate) fn tick(&mut self, dt_ms: f32) -> bool {
        if self.is_settled() {
            return false;
        }
        let dt = dt_ms / 1000.0;
        for (_, spring) in self.springs.iter_mut() {
            spring.step(dt);
        }
        true
    }
}

impl EngineInner {
    pub(crate) fn set_gestures(&mut self, element: ElementId, gestures: GestureSet) {
        if !self.tree.borrow().contains(element) {
            tracing::warn!("cannot attach gestures to missing element {:?}", element);
            return;
        }
        self.overlays.insert(element, Overlay::new(gestures));
    }

    pub(crate) fn pointer(&mut self, element: ElementId, pointer: Pointer) -> bool {
        let Some(overlay) = self.overlays.get_mut(&element) else {
            return false;
        };
        if overlay.handle(pointer) {
            self.write(element);
        }
        tracing::trace!("{:?} on {:?}", pointer, element);
        true
    }

    fn is_interacting(&self, element: ElementId) -> bool {
        self.overlays.get(&element).is_some_and(Overlay::is_active)
    }
}

impl TransitionEngine {
    /// Route a pointer event to an element's overlay
    ///
    /// Returns `false` if the element has no gestures.
    pub fn pointer(&self, element: ElementId, pointer: Pointer) -> bool {
        self.with_inner(|inner| inner.pointer(element, pointer))
    }

    pub fn pointer_enter(&self, element: ElementId) -> bool {
        self.pointer(element, Pointer::Enter)
    }

    pub fn pointer_leave(&self, element: ElementId) -> bool {
        self.pointer(element, Pointer::Leave)
    }

    pub fn pointer_down(&self, element: ElementId) -> bool {
        self.pointer(element, Pointer::Down)
    }

    pub fn pointer_up(&self, element: ElementId) -> bool {
        self.pointer(element, Pointer::Up)
    }

    /// Whether the element is hovered or pressed
    pub fn is_interacting(&self, element: ElementId) -> bool {
        self.with_inner(|inner| inner.is_interacting(element))
    }
}

impl TransitionHandle {
    pub fn pointer(&self, element: ElementId, pointer: Pointer) -> bool {
        self.with_inner(|inner| inner.pointer(element, pointer))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Transition, VariantSet, VariantState};
    use hero_core::{ElementTree, SharedTree};

    fn hover_lift() -> GestureSet {
        GestureSet::new(
            PropertyMap::new()
                .with(Property::Scale, 1.1)
                .with(Property::Y, -3.0),
            PropertyMap::new().with(Property::Scale, 0.95),
        )
    }

    fn setup() -> (SharedTree, TransitionEngine, ElementId) {
        let mut tree = ElementTree::new();
        let link = tree.create("a");
        tree.attach(link).unwrap();
        let tree = tree.into_shared();
        let engine = TransitionEngine::new(tree.clone());
        engine.set_gestures(link, hover_lift());
        (tree, engine, link)
    }

    fn settle(engine: &TransitionEngine) {
        for _ in 0..120 {
            engine.tick(1000.0 / 60.0);
        }
    }

    #[test]
    fn test_hover_springs_to_target() {
        let (tree, engine, link) = setup();

        assert!(engine.pointer_enter(link));
        assert!(engine.is_interacting(link));
        engine.tick(16.0);
        let scale = tree.borrow().property(link, Property::Scale).unwrap();
        assert!(scale > 1.0 && scale < 1.1);

        settle(&engine);
        let tree = tree.borrow();
        assert!((tree.property(link, Property::Scale).unwrap() - 1.1).abs() < 0.002);
        assert!((tree.property(link, Property::Y).unwrap() + 3.0).abs() < 0.01);
    }

    #[test]
    fn test_release_snaps_to_hover() {
        let (tree, engine, link) = setup();
        engine.pointer_enter(link);
        settle(&engine);

        engine.pointer_down(link);
        engine.tick(16.0);
        engine.pointer_up(link);

        // No frame needed: the overlay snapped back to hover
        let tree = tree.borrow();
        assert!((tree.property(link, Property::Scale).unwrap() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_leave_snaps_to_identity() {
        let (tree, engine, link) = setup();
        engine.pointer_enter(link);
        engine.tick(16.0);

        engine.pointer_leave(link);
        assert!(!engine.is_interacting(link));
        {
            let tree = tree.borrow();
            assert_eq!(tree.property(link, Property::Scale), Some(1.0));
            assert_eq!(tree.property(link, Property::Y), Some(0.0));
        }
        assert!(!engine.tick(16.0));
    }

    #[test]
    fn test_overlay_composes_over_lifecycle() {
        let (tree, engine, link) = setup();
        let set = VariantSet::new(
            "stagger-item",
            PropertyMap::new()
                .with(Property::Opacity, 0.0)
                .with(Property::Y, 30.0),
            PropertyMap::new()
                .with(Property::Opacity, 1.0)
                .with(Property::Y, 0.0),
            Transition::new(100),
        );
        engine.apply_variant(link, &set, VariantState::Visible);
        engine.pointer_enter(link);
        settle(&engine);

        assert_eq!(engine.state(link), Some(VariantState::Visible));
        let tree = tree.borrow();
        assert_eq!(tree.property(link, Property::Opacity), Some(1.0));
        assert!((tree.property(link, Property::Y).unwrap() + 3.0).abs() < 0.01);
    }

    #[test]
    fn test_pointer_without_gestures_is_ignored() {
        let (tree, engine, _) = setup();
        let plain = tree.borrow_mut().create("div");
        assert!(!engine.pointer_enter(plain));
        assert!(!engine.is_interacting(plain));
    }
}
