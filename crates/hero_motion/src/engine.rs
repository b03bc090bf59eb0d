//! Transition engine
//!
//! Drives declarative lifecycle transitions: each managed element renders
//! its `hidden` values on assignment, then moves to `visible` once its
//! (possibly staggered) delay elapses. The state machine only goes forward.
//!
//! Interaction overlays live next to the lifecycle state and are composed
//! over it on every write, see [`crate::interaction`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use hero_animation::{compose, Easing, Interpolate};
use hero_core::{ElementId, PropertyMap, SharedTree};
use rustc_hash::FxHashMap;

use crate::interaction::Overlay;
use crate::variant::{GestureSet, VariantSet, VariantState};

/// Result of a lifecycle request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantChange {
    /// A transition was scheduled
    Started,
    /// The element is already in (or heading to) the requested state
    Unchanged,
    /// The request would move the element backwards
    Rejected,
    /// The element is missing or detached
    Ignored,
}

/// Where a lifecycle transition is
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MotionPhase {
    /// Showing hidden values, waiting out the entrance delay
    Waiting { remaining_delay_ms: f32 },
    /// Interpolating hidden to visible
    Entering { elapsed_ms: f32, duration_ms: f32 },
    /// Resting on the current state's values
    Settled,
}

#[derive(Clone, Debug)]
pub(crate) struct MotionNode {
    pub(crate) set: VariantSet,
    pub(crate) state: VariantState,
    pub(crate) phase: MotionPhase,
    pub(crate) easing: Easing,
    /// Lifecycle values as of the last frame
    pub(crate) base: PropertyMap,
    pub(crate) entrance_delay_ms: Option<u32>,
}

impl MotionNode {
    fn hidden(set: &VariantSet) -> Self {
        Self {
            set: set.clone(),
            state: VariantState::Hidden,
            phase: MotionPhase::Settled,
            easing: set.transition.easing,
            base: set.hidden.clone(),
            entrance_delay_ms: None,
        }
    }

    fn is_animating(&self) -> bool {
        !matches!(self.phase, MotionPhase::Settled)
    }

    fn start_visible(&mut self, delay_ms: u32) {
        self.state = VariantState::Visible;
        self.entrance_delay_ms = Some(delay_ms);
        self.easing = self.set.transition.easing;
        self.phase = if delay_ms > 0 {
            MotionPhase::Waiting {
                remaining_delay_ms: delay_ms as f32,
            }
        } else {
            self.entering()
        };
        if matches!(self.phase, MotionPhase::Settled) {
            self.base = self.set.visible.clone();
        }
    }

    fn entering(&self) -> MotionPhase {
        if self.set.transition.duration_ms > 0 {
            MotionPhase::Entering {
                elapsed_ms: 0.0,
                duration_ms: self.set.transition.duration_ms as f32,
            }
        } else {
            MotionPhase::Settled
        }
    }

    /// Advance the lifecycle; returns whether `base` changed
    fn tick(&mut self, dt_ms: f32) -> bool {
        match &mut self.phase {
            MotionPhase::Waiting { remaining_delay_ms } => {
                *remaining_delay_ms -= dt_ms;
                if *remaining_delay_ms > 0.0 {
                    return false;
                }
                let overshoot = -*remaining_delay_ms;
                tracing::debug!(
                    "Motion: Starting {} transition, duration={}ms",
                    self.set.name,
                    self.set.transition.duration_ms
                );
                self.phase = self.entering();
                if matches!(self.phase, MotionPhase::Settled) {
                    self.base = self.set.visible.clone();
                    return true;
                }
                self.tick(overshoot)
            }
            MotionPhase::Entering {
                elapsed_ms,
                duration_ms,
            } => {
                *elapsed_ms += dt_ms;
                let progress = *elapsed_ms / *duration_ms;
                if progress >= 1.0 {
                    self.phase = MotionPhase::Settled;
                    self.base = self.set.visible.clone();
                } else {
                    let eased = self.easing.apply(progress);
                    self.base = self.set.hidden.lerp(&self.set.visible, eased);
                }
                true
            }
            MotionPhase::Settled => false,
        }
    }
}

pub(crate) struct EngineInner {
    pub(crate) tree: SharedTree,
    pub(crate) nodes: FxHashMap<ElementId, MotionNode>,
    pub(crate) overlays: FxHashMap<ElementId, Overlay>,
}

impl EngineInner {
    /// Write the composed lifecycle and overlay values of one element
    pub(crate) fn write(&self, element: ElementId) -> bool {
        let base = self
            .nodes
            .get(&element)
            .map(|n| n.base.clone())
            .unwrap_or_default();
        let values = match self.overlays.get(&element) {
            Some(overlay) => compose(&base, &overlay.values()),
            None => base,
        };
        self.tree.borrow_mut().apply(element, &values)
    }

    fn assign(&mut self, element: ElementId, set: &VariantSet) -> bool {
        if !self.tree.borrow().contains(element) {
            tracing::warn!("cannot assign variant '{}' to missing element {:?}", set.name, element);
            return false;
        }
        if self.nodes.contains_key(&element) {
            return false;
        }
        self.nodes.insert(element, MotionNode::hidden(set));
        self.write(element);
        true
    }

    fn apply_variant(
        &mut self,
        element: ElementId,
        set: &VariantSet,
        state: VariantState,
        delay_ms: u32,
    ) -> VariantChange {
        if !self.tree.borrow().is_attached(element) {
            tracing::warn!(
                "ignoring variant '{}' for detached element {:?}",
                set.name,
                element
            );
            return VariantChange::Ignored;
        }

        // Hidden must render before visible can be reached
        self.assign(element, set);

        let Some(node) = self.nodes.get_mut(&element) else {
            return VariantChange::Ignored;
        };
        if node.state == state {
            return VariantChange::Unchanged;
        }
        if state == VariantState::Hidden {
            tracing::debug!(
                "rejecting {:?} -> hidden: lifecycle only moves forward",
                element
            );
            return VariantChange::Rejected;
        }

        if node.set.name != set.name {
            node.set = set.clone();
        }
        node.start_visible(delay_ms);
        self.write(element);
        VariantChange::Started
    }

    fn animate_group(
        &mut self,
        container: ElementId,
        container_set: &VariantSet,
        item_set: &VariantSet,
    ) -> usize {
        let container_change = self.apply_variant(
            container,
            container_set,
            VariantState::Visible,
            container_set.transition.delay_ms,
        );
        if container_change == VariantChange::Ignored {
            return 0;
        }

        let items: Vec<(ElementId, Option<ElementId>)> = {
            let tree = self.tree.borrow();
            tree.descendants(container)
                .into_iter()
                .filter(|id| {
                    self.nodes
                        .get(id)
                        .is_some_and(|n| n.set.name == item_set.name)
                })
                .map(|id| (id, tree.parent(id)))
                .collect()
        };

        let mut indices: FxHashMap<Option<ElementId>, usize> = FxHashMap::default();
        let mut started = 0;
        for (item, parent) in items {
            let index = indices.entry(parent).or_default();
            let delay = match container_set.transition.stagger {
                Some(stagger) => stagger.delay_for_index(*index),
                None => 0,
            };
            *index += 1;

            let delay = delay.saturating_add(item_set.transition.delay_ms);
            if self.apply_variant(item, item_set, VariantState::Visible, delay)
                == VariantChange::Started
            {
                started += 1;
            }
        }

        tracing::debug!(
            "animating group {:?}: {} '{}' children",
            container,
            started,
            item_set.name
        );
        started
    }

    fn unmount(&mut self, element: ElementId) -> usize {
        let mut subtree = self.tree.borrow().descendants(element);
        subtree.push(element);

        let before = self.nodes.len() + self.overlays.len();
        for id in &subtree {
            self.nodes.remove(id);
            self.overlays.remove(id);
        }

        // Elements already removed from the tree take their state with them
        let tree = self.tree.borrow();
        self.nodes.retain(|id, _| tree.contains(*id));
        self.overlays.retain(|id, _| tree.contains(*id));

        before - (self.nodes.len() + self.overlays.len())
    }

    fn tick(&mut self, dt_ms: f32) -> bool {
        let mut dirty: Vec<ElementId> = Vec::new();

        for (id, node) in self.nodes.iter_mut() {
            if node.tick(dt_ms) {
                dirty.push(*id);
            }
        }
        for (id, overlay) in self.overlays.iter_mut() {
            if overlay.tick(dt_ms) && !dirty.contains(id) {
                dirty.push(*id);
            }
        }

        for id in dirty {
            self.write(id);
        }

        self.nodes.values().any(MotionNode::is_animating)
            || self.overlays.values().any(|o| !o.is_settled())
    }
}

/// Declarative lifecycle engine for a shared element tree
pub struct TransitionEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl TransitionEngine {
    pub fn new(tree: SharedTree) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineInner {
                tree,
                nodes: FxHashMap::default(),
                overlays: FxHashMap::default(),
            })),
        }
    }

    /// Get a weak handle to the engine
    pub fn handle(&self) -> TransitionHandle {
        TransitionHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Put an element under management and render its `hidden` values
    ///
    /// Returns `false` if the element is missing or already managed.
    pub fn assign(&self, element: ElementId, set: &VariantSet) -> bool {
        self.inner.borrow_mut().assign(element, set)
    }

    /// Register hover and press overlays for an element
    pub fn set_gestures(&self, element: ElementId, gestures: GestureSet) {
        self.inner.borrow_mut().set_gestures(element, gestures);
    }

    /// Move an element to `state` using the set's own transition delay
    pub fn apply_variant(
        &self,
        element: ElementId,
        set: &VariantSet,
        state: VariantState,
    ) -> VariantChange {
        self.inner
            .borrow_mut()
            .apply_variant(element, set, state, set.transition.delay_ms)
    }

    /// Reveal a container and stagger every descendant assigned `item_set`
    ///
    /// Returns the number of children whose entrance was scheduled.
    pub fn animate_group(
        &self,
        container: ElementId,
        container_set: &VariantSet,
        item_set: &VariantSet,
    ) -> usize {
        self.inner
            .borrow_mut()
            .animate_group(container, container_set, item_set)
    }

    /// Entrance delay computed for an element, once it has been revealed
    pub fn entrance_delay(&self, element: ElementId) -> Option<u32> {
        self.inner
            .borrow()
            .nodes
            .get(&element)
            .and_then(|n| n.entrance_delay_ms)
    }

    pub fn state(&self, element: ElementId) -> Option<VariantState> {
        self.inner.borrow().nodes.get(&element).map(|n| n.state)
    }

    pub fn is_animating(&self, element: ElementId) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(&element)
            .is_some_and(MotionNode::is_animating)
    }

    /// Forget every element in the subtree rooted at `element`
    ///
    /// Returns how many entries were dropped.
    pub fn unmount(&self, element: ElementId) -> usize {
        self.inner.borrow_mut().unmount(element)
    }

    /// Advance every transition and overlay by `dt_ms`
    pub fn tick(&self, dt_ms: f32) -> bool {
        self.inner.borrow_mut().tick(dt_ms)
    }

    /// Number of managed elements still entering or waiting to
    pub fn active_transition_count(&self) -> usize {
        self.inner
            .borrow()
            .nodes
            .values()
            .filter(|n| n.is_animating())
            .count()
    }

    /// Number of elements under lifecycle management
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&mut EngineInner) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

/// Weak handle to the transition engine
///
/// Calls on a handle whose engine was dropped are no-ops.
#[derive(Clone)]
pub struct TransitionHandle {
    inner: Weak<RefCell<EngineInner>>,
}

impl TransitionHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn assign(&self, element: ElementId, set: &VariantSet) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.borrow_mut().assign(element, set))
    }

    pub fn set_gestures(&self, element: ElementId, gestures: GestureSet) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().set_gestures(element, gestures);
        }
    }

    pub fn apply_variant(
        &self,
        element: ElementId,
        set: &VariantSet,
        state: VariantState,
    ) -> VariantChange {
        match self.inner.upgrade() {
            Some(inner) => {
                inner
                    .borrow_mut()
                    .apply_variant(element, set, state, set.transition.delay_ms)
            }
            None => VariantChange::Ignored,
        }
    }

    pub fn animate_group(
        &self,
        container: ElementId,
        container_set: &VariantSet,
        item_set: &VariantSet,
    ) -> usize {
        match self.inner.upgrade() {
            Some(inner) => inner
                .borrow_mut()
                .animate_group(container, container_set, item_set),
            None => 0,
        }
    }

    pub fn entrance_delay(&self, element: ElementId) -> Option<u32> {
        let inner = self.inner.upgrade()?;
        let delay = inner
            .borrow()
            .nodes
            .get(&element)
            .and_then(|n| n.entrance_delay_ms);
        delay
    }

    pub fn unmount(&self, element: ElementId) -> usize {
        match self.inner.upgrade() {
            Some(inner) => inner.borrow_mut().unmount(element),
            None => 0,
        }
    }

    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&mut EngineInner) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let result = f(&mut inner.borrow_mut());
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{StaggerConfig, Transition};
    use hero_core::{ElementTree, Property};

    fn item_set() -> VariantSet {
        VariantSet::new(
            "stagger-item",
            PropertyMap::new()
                .with(Property::Opacity, 0.0)
                .with(Property::Y, 30.0),
            PropertyMap::new()
                .with(Property::Opacity, 1.0)
                .with(Property::Y, 0.0),
            Transition::new(600).easing(Easing::Linear),
        )
    }

    fn container_set() -> VariantSet {
        VariantSet::new(
            "stagger-container",
            PropertyMap::new().with(Property::Opacity, 0.0),
            PropertyMap::new().with(Property::Opacity, 1.0),
            Transition::new(300).stagger(StaggerConfig::new(1200, 150)),
        )
    }

    fn row(children: usize) -> (SharedTree, ElementId, Vec<ElementId>) {
        let mut tree = ElementTree::new();
        let container = tree.create("div");
        let items: Vec<_> = (0..children)
            .map(|_| {
                let item = tree.create("a");
                tree.append_child(container, item).unwrap();
                item
            })
            .collect();
        tree.attach(container).unwrap();
        (tree.into_shared(), container, items)
    }

    #[test]
    fn test_assign_renders_hidden() {
        let (tree, _, items) = row(1);
        let engine = TransitionEngine::new(tree.clone());

        assert!(engine.assign(items[0], &item_set()));
        assert!(!engine.assign(items[0], &item_set()));

        let tree = tree.borrow();
        assert_eq!(tree.property(items[0], Property::Opacity), Some(0.0));
        assert_eq!(tree.property(items[0], Property::Y), Some(30.0));
        assert_eq!(engine.state(items[0]), Some(VariantState::Hidden));
    }

    #[test]
    fn test_visible_without_assign_renders_hidden_first() {
        let (tree, _, items) = row(1);
        let engine = TransitionEngine::new(tree.clone());
        let set = item_set();

        let change = engine.apply_variant(items[0], &set, VariantState::Visible);
        assert_eq!(change, VariantChange::Started);
        assert_eq!(tree.borrow().property(items[0], Property::Opacity), Some(0.0));

        engine.tick(300.0);
        assert!((tree.borrow().property(items[0], Property::Opacity).unwrap() - 0.5).abs() < 1e-4);

        engine.tick(300.0);
        assert_eq!(tree.borrow().property(items[0], Property::Opacity), Some(1.0));
        assert!(!engine.is_animating(items[0]));
    }

    #[test]
    fn test_same_state_twice_is_noop() {
        let (tree, _, items) = row(1);
        let engine = TransitionEngine::new(tree);
        let set = item_set();

        assert_eq!(
            engine.apply_variant(items[0], &set, VariantState::Visible),
            VariantChange::Started
        );
        engine.tick(100.0);
        assert_eq!(
            engine.apply_variant(items[0], &set, VariantState::Visible),
            VariantChange::Unchanged
        );
        assert_eq!(engine.active_transition_count(), 1);
    }

    #[test]
    fn test_hidden_after_visible_is_rejected() {
        let (tree, _, items) = row(1);
        let engine = TransitionEngine::new(tree.clone());
        let set = item_set();

        engine.apply_variant(items[0], &set, VariantState::Visible);
        for _ in 0..10 {
            engine.tick(100.0);
        }
        let mutations = tree.borrow().mutation_count();

        assert_eq!(
            engine.apply_variant(items[0], &set, VariantState::Hidden),
            VariantChange::Rejected
        );
        assert_eq!(engine.state(items[0]), Some(VariantState::Visible));
        assert_eq!(tree.borrow().mutation_count(), mutations);
    }

    #[test]
    fn test_group_staggers_children() {
        let (tree, container, items) = row(3);
        let engine = TransitionEngine::new(tree);
        let item = item_set();
        for id in &items {
            engine.assign(*id, &item);
        }

        let started = engine.animate_group(container, &container_set(), &item);

        assert_eq!(started, 3);
        let delays: Vec<_> = items.iter().map(|id| engine.entrance_delay(*id)).collect();
        assert_eq!(delays, vec![Some(1200), Some(1350), Some(1500)]);
        assert_eq!(engine.state(container), Some(VariantState::Visible));
    }

    #[test]
    fn test_group_ignores_unassigned_children() {
        let (tree, container, items) = row(3);
        let engine = TransitionEngine::new(tree);
        let item = item_set();
        engine.assign(items[0], &item);
        engine.assign(items[2], &item);

        engine.animate_group(container, &container_set(), &item);

        assert_eq!(engine.entrance_delay(items[0]), Some(1200));
        assert_eq!(engine.entrance_delay(items[1]), None);
        assert_eq!(engine.entrance_delay(items[2]), Some(1350));
    }

    #[test]
    fn test_child_waits_out_delay() {
        let (tree, container, items) = row(2);
        let engine = TransitionEngine::new(tree.clone());
        let item = item_set();
        for id in &items {
            engine.assign(*id, &item);
        }
        engine.animate_group(container, &container_set(), &item);

        for _ in 0..12 {
            engine.tick(100.0);
        }
        // First child just reached its delay, second still waiting
        assert_eq!(tree.borrow().property(items[0], Property::Opacity), Some(0.0));
        assert_eq!(tree.borrow().property(items[1], Property::Opacity), Some(0.0));

        for _ in 0..6 {
            engine.tick(100.0);
        }
        assert_eq!(tree.borrow().property(items[0], Property::Opacity), Some(1.0));
        assert!(engine.is_animating(items[1]));
    }

    #[test]
    fn test_unmount_stops_writes() {
        let (tree, container, items) = row(3);
        let engine = TransitionEngine::new(tree.clone());
        let item = item_set();
        for id in &items {
            engine.assign(*id, &item);
        }
        engine.animate_group(container, &container_set(), &item);
        engine.tick(1300.0);

        assert_eq!(engine.unmount(container), 4);
        let mutations = tree.borrow().mutation_count();
        assert!(!engine.tick(100.0));
        assert_eq!(tree.borrow().mutation_count(), mutations);
        assert_eq!(engine.node_count(), 0);
        assert_eq!(engine.unmount(container), 0);
    }

    #[test]
    fn test_detached_element_is_ignored() {
        let mut tree = ElementTree::new();
        let loose = tree.create("div");
        let tree = tree.into_shared();
        let engine = TransitionEngine::new(tree.clone());

        assert_eq!(
            engine.apply_variant(loose, &item_set(), VariantState::Visible),
            VariantChange::Ignored
        );
        assert_eq!(tree.borrow().mutation_count(), 0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let (tree, _, items) = row(1);
        let engine = TransitionEngine::new(tree);
        let handle = engine.handle();
        assert!(handle.is_alive());
        assert!(handle.assign(items[0], &item_set()));

        drop(engine);
        assert!(!handle.is_alive());
        assert_eq!(
            handle.apply_variant(items[0], &item_set(), VariantState::Visible),
            VariantChange::Ignored
        );
        assert_eq!(handle.unmount(items[0]), 0);
    }
}
