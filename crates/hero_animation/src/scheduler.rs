//! Animation scheduler
//!
//! The scheduler owns every tween and advances them together from the host's
//! redraw callback. Tweens are registered through a [`Scope`], an ownership
//! boundary bound to a root element: closing (or dropping) the scope kills
//! its tweens and restores the style values they touched.
//!
//! Handles hold a weak reference to the scheduler, so a handle that outlives
//! the scheduler silently becomes a no-op.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use hero_core::{ElementId, PropertyMap, SharedTree};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::tween::{LoopOptions, Target, Tween, TweenOptions, TweenState};
use crate::values::Interpolate;

new_key_type! {
    /// Handle to a registered tween
    pub struct TweenId;
    /// Handle to an open scope
    pub struct ScopeId;
}

/// Notifications queued by the scheduler and drained by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenEvent {
    /// The tween's delay elapsed and it wrote its first frame
    Started(TweenId),
    /// A finite tween reached its end
    Completed(TweenId),
    /// A tween was cancelled through its handle
    Killed(TweenId),
    /// A scope closed and restored the values its tweens touched
    Reverted(ScopeId),
}

impl TweenEvent {
    pub fn tween(&self) -> Option<TweenId> {
        match *self {
            TweenEvent::Started(id) | TweenEvent::Completed(id) | TweenEvent::Killed(id) => {
                Some(id)
            }
            TweenEvent::Reverted(_) => None,
        }
    }
}

/// One animated element of a tween
#[derive(Clone, Debug)]
struct Track {
    element: ElementId,
    from: PropertyMap,
    /// Values before the tween first wrote, restored on scope close
    original: PropertyMap,
}

struct TweenEntry {
    scope: ScopeId,
    tween: Tween,
    tracks: SmallVec<[Track; 1]>,
    to: PropertyMap,
}

struct ScopeEntry {
    root: ElementId,
    tweens: Vec<TweenId>,
}

struct SchedulerInner {
    tree: SharedTree,
    tweens: SlotMap<TweenId, TweenEntry>,
    scopes: SlotMap<ScopeId, ScopeEntry>,
    /// Registration order, which is also the per-frame write order
    order: Vec<TweenId>,
    events: Vec<TweenEvent>,
}

/// Drives every scoped tween against a shared element tree
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new(tree: SharedTree) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tree,
                tweens: SlotMap::with_key(),
                scopes: SlotMap::with_key(),
                order: Vec::new(),
                events: Vec::new(),
            })),
        }
    }

    /// Get a weak handle for opening scopes from elsewhere
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Open a new scope bound to `root`
    pub fn open_scope(&self, root: ElementId) -> Scope {
        self.handle().open_scope(root)
    }

    /// Advance every active tween by `dt_ms`
    ///
    /// Returns `true` while any tween still needs frames.
    pub fn tick(&self, dt_ms: f32) -> bool {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let tree = inner.tree.clone();
        let mut tree = tree.borrow_mut();

        for &id in &inner.order {
            let Some(entry) = inner.tweens.get_mut(id) else {
                continue;
            };
            let step = entry.tween.advance(dt_ms);
            if step.started {
                inner.events.push(TweenEvent::Started(id));
            }
            if let Some(ratio) = step.ratio {
                for track in &entry.tracks {
                    let values = track.from.lerp(&entry.to, ratio);
                    tree.apply(track.element, &values);
                }
            }
            if step.completed {
                tracing::trace!("tween {:?} completed", id);
                inner.events.push(TweenEvent::Completed(id));
            }
        }

        inner.tweens.values().any(|e| e.tween.is_active())
    }

    pub fn has_active_animations(&self) -> bool {
        self.inner
            .borrow()
            .tweens
            .values()
            .any(|e| e.tween.is_active())
    }

    /// Number of registered tweens, finished ones included
    pub fn tween_count(&self) -> usize {
        self.inner.borrow().tweens.len()
    }

    /// Number of tweens still pending or running
    pub fn active_tween_count(&self) -> usize {
        self.inner
            .borrow()
            .tweens
            .values()
            .filter(|e| e.tween.is_active())
            .count()
    }

    pub fn scope_count(&self) -> usize {
        self.inner.borrow().scopes.len()
    }

    /// Take all queued events
    ///
    /// Events of a scope that has since closed are dropped; only its
    /// `Reverted` event remains.
    pub fn drain_events(&self) -> Vec<TweenEvent> {
        std::mem::take(&mut self.inner.borrow_mut().events)
    }
}

/// Weak handle to the scheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Open a scope bound to `root`
    ///
    /// A missing or detached root yields an inert scope.
    pub fn open_scope(&self, root: ElementId) -> Scope {
        let id = self.inner.upgrade().and_then(|inner| {
            let mut inner = inner.borrow_mut();
            if !inner.tree.borrow().is_attached(root) {
                tracing::warn!("scope root {:?} is not attached, animations disabled", root);
                return None;
            }
            let id = inner.scopes.insert(ScopeEntry {
                root,
                tweens: Vec::new(),
            });
            tracing::debug!("opened scope {:?} on {:?}", id, root);
            Some(id)
        });

        Scope {
            id,
            root,
            scheduler: self.clone(),
            closed: false,
        }
    }

    fn register(
        &self,
        scope: ScopeId,
        target: &Target,
        from: &PropertyMap,
        to: &PropertyMap,
        options: TweenOptions,
    ) -> Option<TweenId> {
        let inner = self.inner.upgrade()?;
        let mut inner = inner.borrow_mut();
        let root = inner.scopes.get(scope)?.root;

        let tree = inner.tree.clone();
        let mut tree = tree.borrow_mut();

        let elements: SmallVec<[ElementId; 4]> = match target {
            Target::Element(id) if tree.is_attached(*id) => SmallVec::from_slice(&[*id]),
            Target::Element(_) => SmallVec::new(),
            Target::Class(class) => tree.query_class(root, class).into_iter().collect(),
        };
        if elements.is_empty() {
            tracing::warn!("tween target {} did not resolve to an attached element", target);
            return None;
        }

        let mut tracks = SmallVec::new();
        for element in elements {
            let Some(style) = tree.style(element) else {
                continue;
            };
            let current = style.sample(to.properties());
            let start: PropertyMap = current
                .iter()
                .map(|(p, v)| (p, from.get(p).unwrap_or(v)))
                .collect();
            tree.apply(element, &start);
            tracks.push(Track {
                element,
                from: start,
                original: current,
            });
        }

        let id = inner.tweens.insert(TweenEntry {
            scope,
            tween: Tween::new(options),
            tracks,
            to: to.clone(),
        });
        inner.order.push(id);
        if let Some(entry) = inner.scopes.get_mut(scope) {
            entry.tweens.push(id);
        }
        tracing::debug!(
            "registered tween {:?} on {} ({}ms, delay {}ms, {:?})",
            id,
            target,
            options.duration_ms,
            options.delay_ms,
            options.repeat
        );
        Some(id)
    }

    /// Kill every tween of a scope, restore the values they touched and
    /// release the scope. Returns the number of tweens released.
    fn close_scope(&self, scope: ScopeId) -> usize {
        let Some(inner) = self.inner.upgrade() else {
            return 0;
        };
        let mut inner = inner.borrow_mut();
        let Some(entry) = inner.scopes.remove(scope) else {
            return 0;
        };

        let tree = inner.tree.clone();
        let mut tree = tree.borrow_mut();

        for id in entry.tweens.iter().rev() {
            if let Some(mut tween) = inner.tweens.remove(*id) {
                tween.tween.kill();
                for track in tween.tracks.iter().rev() {
                    tree.apply(track.element, &track.original);
                }
            }
        }

        let released = &entry.tweens;
        inner.order.retain(|id| !released.contains(id));
        inner
            .events
            .retain(|event| event.tween().map_or(true, |id| !released.contains(&id)));
        inner.events.push(TweenEvent::Reverted(scope));

        tracing::debug!("closed scope {:?}, reverted {} tweens", scope, released.len());
        released.len()
    }

    fn with_tween<R>(&self, id: TweenId, f: impl FnOnce(&mut TweenEntry) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let mut inner = inner.borrow_mut();
        inner.tweens.get_mut(id).map(f)
    }

    fn state(&self, id: TweenId) -> Option<TweenState> {
        self.with_tween(id, |entry| entry.tween.state())
    }

    fn progress(&self, id: TweenId) -> Option<f32> {
        self.with_tween(id, |entry| entry.tween.progress())
    }

    fn pause(&self, id: TweenId) {
        self.with_tween(id, |entry| entry.tween.pause());
    }

    fn resume(&self, id: TweenId) {
        self.with_tween(id, |entry| entry.tween.resume());
    }

    fn kill(&self, id: TweenId) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        let killed = match inner.tweens.get_mut(id) {
            Some(entry) if !entry.tween.state().is_terminal() => {
                entry.tween.kill();
                true
            }
            _ => false,
        };
        if killed {
            inner.events.push(TweenEvent::Killed(id));
        }
    }

    fn scope_tween_states(&self, scope: ScopeId) -> Vec<TweenState> {
        let Some(inner) = self.inner.upgrade() else {
            return Vec::new();
        };
        let inner = inner.borrow();
        inner
            .tweens
            .values()
            .filter(|e| e.scope == scope)
            .map(|e| e.tween.state())
            .collect()
    }
}

/// Ownership boundary for a batch of tweens bound to one root element
///
/// Closing the scope (explicitly or by dropping it) kills every tween it
/// registered and restores the pre-animation values of every property they
/// touched, in reverse registration order.
pub struct Scope {
    id: Option<ScopeId>,
    root: ElementId,
    scheduler: SchedulerHandle,
    closed: bool,
}

impl Scope {
    pub fn id(&self) -> Option<ScopeId> {
        self.id
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// A scope whose root was not attached; registrations are no-ops
    pub fn is_inert(&self) -> bool {
        self.id.is_none() && !self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// One-shot animation from `from` to `to`
    ///
    /// `from` is written immediately. Properties listed only in `to` start
    /// from the element's current value.
    pub fn tween(
        &self,
        target: impl Into<Target>,
        from: &PropertyMap,
        to: &PropertyMap,
        options: TweenOptions,
    ) -> TweenHandle {
        let target = target.into();
        let id = self
            .id
            .and_then(|scope| self.scheduler.register(scope, &target, from, to, options));
        TweenHandle {
            id,
            scheduler: self.scheduler.clone(),
        }
    }

    /// Infinite yoyo loop from the current values to `to`
    pub fn ambient(
        &self,
        target: impl Into<Target>,
        to: &PropertyMap,
        options: LoopOptions,
    ) -> TweenHandle {
        self.tween(target, &PropertyMap::new(), to, options.into())
    }

    /// Number of tweens registered in this scope
    pub fn handle_count(&self) -> usize {
        self.id
            .map(|id| self.scheduler.scope_tween_states(id).len())
            .unwrap_or(0)
    }

    /// Number of tweens in this scope still pending or running
    pub fn active_count(&self) -> usize {
        self.id
            .map(|id| {
                self.scheduler
                    .scope_tween_states(id)
                    .into_iter()
                    .filter(|s| matches!(s, TweenState::Pending | TweenState::Running))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Kill and revert every tween in the scope. Safe to call repeatedly.
    ///
    /// Undrained `Started` and `Completed` events of the scope's tweens are
    /// discarded.
    pub fn close(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.close_scope(id);
        }
        self.closed = true;
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.close();
    }
}

/// Token for one registered tween
///
/// Dropping the handle does not stop the tween; its scope owns it.
pub struct TweenHandle {
    id: Option<TweenId>,
    scheduler: SchedulerHandle,
}

impl TweenHandle {
    pub fn id(&self) -> Option<TweenId> {
        self.id
    }

    /// A handle whose registration was a no-op
    pub fn is_inert(&self) -> bool {
        self.id.is_none()
    }

    /// Current state, `None` for inert or released tweens
    pub fn state(&self) -> Option<TweenState> {
        self.id.and_then(|id| self.scheduler.state(id))
    }

    /// Progress through the current iteration
    pub fn progress(&self) -> Option<f32> {
        self.id.and_then(|id| self.scheduler.progress(id))
    }

    pub fn pause(&self) {
        if let Some(id) = self.id {
            self.scheduler.pause(id);
        }
    }

    pub fn resume(&self) {
        if let Some(id) = self.id {
            self.scheduler.resume(id);
        }
    }

    /// Stop the tween where it is; values are restored when the scope closes
    pub fn kill(&self) {
        if let Some(id) = self.id {
            self.scheduler.kill(id);
        }
    }
}
