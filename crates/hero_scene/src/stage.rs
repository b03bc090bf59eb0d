//! Stage
//!
//! Stand-in for the host's redraw loop: owns the shared element tree and
//! both engines, and advances them one frame at a time.

use hero_animation::{AnimationScheduler, TweenEvent};
use hero_core::{ElementId, ElementTree, SharedTree, Style};
use hero_motion::TransitionEngine;

use crate::error::Result;

pub struct Stage {
    tree: SharedTree,
    scheduler: AnimationScheduler,
    transitions: TransitionEngine,
    elapsed_ms: f64,
    frames: u64,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// A stage with an empty document
    pub fn new() -> Self {
        Self::with_tree(ElementTree::new().into_shared())
    }

    pub fn with_tree(tree: SharedTree) -> Self {
        Self {
            scheduler: AnimationScheduler::new(tree.clone()),
            transitions: TransitionEngine::new(tree.clone()),
            tree,
            elapsed_ms: 0.0,
            frames: 0,
        }
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn transitions(&self) -> &TransitionEngine {
        &self.transitions
    }

    /// Attach a rendered subtree under the document root
    pub fn attach(&self, root: ElementId) -> Result<()> {
        self.tree.borrow_mut().attach(root)?;
        Ok(())
    }

    /// Advance both engines by one frame
    ///
    /// The timeline engine runs first. Returns `true` while either engine
    /// still has work.
    pub fn frame(&mut self, dt_ms: f32) -> bool {
        let timeline = self.scheduler.tick(dt_ms);
        let transitions = self.transitions.tick(dt_ms);
        self.elapsed_ms += f64::from(dt_ms);
        self.frames += 1;
        timeline || transitions
    }

    /// Run frames of `dt_ms` until `duration_ms` has elapsed, returning the
    /// number of frames
    pub fn run_for(&mut self, duration_ms: u32, dt_ms: f32) -> u64 {
        let mut remaining = duration_ms as f32;
        let mut frames = 0;
        while remaining > 0.0 && dt_ms > 0.0 {
            let step = dt_ms.min(remaining);
            self.frame(step);
            remaining -= step;
            frames += 1;
        }
        frames
    }

    /// Time advanced since the stage was created
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Take queued timeline events
    pub fn drain_events(&self) -> Vec<TweenEvent> {
        self.scheduler.drain_events()
    }

    /// Current style of an element
    pub fn snapshot(&self, element: ElementId) -> Option<Style> {
        self.tree.borrow().style(element)
    }
}
