//! Tween timing
//!
//! A [`Tween`] is the clock of one scheduled animation: it knows its delay,
//! duration, easing, repeat count and yoyo flag, and turns elapsed time into
//! an eased ratio. What the ratio is applied to (which elements, which
//! properties) is tracked by the scheduler.

use hero_core::ElementId;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// What a tween animates
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A specific element
    Element(ElementId),
    /// Every element carrying a class, resolved inside the scope root
    Class(String),
}

impl Target {
    /// Class selector target; a leading `.` is accepted and ignored
    pub fn class(selector: &str) -> Self {
        Target::Class(selector.trim_start_matches('.').to_string())
    }
}

impl From<ElementId> for Target {
    fn from(id: ElementId) -> Self {
        Target::Element(id)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Element(id) => write!(f, "{id:?}"),
            Target::Class(class) => write!(f, ".{class}"),
        }
    }
}

/// How many extra times a tween plays after its first iteration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    Times(u32),
    #[default]
    Once,
    Infinite,
}

impl Repeat {
    /// Total number of iterations, `None` when unbounded
    pub fn iterations(self) -> Option<u32> {
        match self {
            Repeat::Once => Some(1),
            Repeat::Times(n) => Some(n.saturating_add(1)),
            Repeat::Infinite => None,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Repeat::Infinite)
    }
}

/// Timing options for a one-shot tween
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweenOptions {
    pub duration_ms: u32,
    /// Delay relative to registration (the scene start for scoped tweens)
    pub delay_ms: u32,
    pub easing: Easing,
    pub repeat: Repeat,
    /// Reverse direction on every other iteration
    pub yoyo: bool,
}

impl TweenOptions {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            easing: Easing::default(),
            repeat: Repeat::Once,
            yoyo: false,
        }
    }

    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }
}

/// Timing options for an ambient (infinite yoyo) loop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopOptions {
    /// Duration of one direction
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub easing: Easing,
}

impl LoopOptions {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            easing: Easing::SineInOut,
        }
    }

    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl From<LoopOptions> for TweenOptions {
    fn from(options: LoopOptions) -> Self {
        TweenOptions::new(options.duration_ms)
            .delay(options.delay_ms)
            .easing(options.easing)
            .repeat(Repeat::Infinite)
            .yoyo(true)
    }
}

/// Lifecycle of a tween
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenState {
    /// Waiting out its delay
    Pending,
    Running,
    Paused,
    /// Finished naturally (finite tweens only)
    Completed,
    /// Cancelled explicitly
    Killed,
}

impl TweenState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TweenState::Completed | TweenState::Killed)
    }
}

/// Outcome of advancing a tween by one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TweenStep {
    /// Eased ratio to apply this frame, if the tween is past its delay
    pub ratio: Option<f32>,
    /// The delay elapsed during this frame
    pub started: bool,
    /// The tween finished during this frame
    pub completed: bool,
}

/// Timing state of one tween
#[derive(Clone, Debug)]
pub struct Tween {
    options: TweenOptions,
    elapsed_ms: f32,
    state: TweenState,
    paused: bool,
}

impl Tween {
    pub fn new(options: TweenOptions) -> Self {
        Self {
            options,
            elapsed_ms: 0.0,
            state: TweenState::Pending,
            paused: false,
        }
    }

    pub fn options(&self) -> &TweenOptions {
        &self.options
    }

    pub fn state(&self) -> TweenState {
        if self.paused && !self.state.is_terminal() {
            TweenState::Paused
        } else {
            self.state
        }
    }

    /// Whether the tween still needs frames (pending or running, not paused)
    pub fn is_active(&self) -> bool {
        matches!(self.state(), TweenState::Pending | TweenState::Running)
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn kill(&mut self) {
        if !self.state.is_terminal() {
            self.state = TweenState::Killed;
        }
    }

    /// Progress through the current iteration (0.0 to 1.0), before easing
    pub fn progress(&self) -> f32 {
        match self.state {
            TweenState::Pending => 0.0,
            TweenState::Completed => 1.0,
            _ => self.iteration_at(self.active_ms()).1,
        }
    }

    fn active_ms(&self) -> f32 {
        self.elapsed_ms - self.options.delay_ms as f32
    }

    /// Total active time, `None` for infinite tweens
    pub fn total_duration_ms(&self) -> Option<f32> {
        self.options
            .repeat
            .iterations()
            .map(|n| n as f32 * self.options.duration_ms as f32)
    }

    /// Split active time into (iteration index, local progress)
    fn iteration_at(&self, active_ms: f32) -> (u64, f32) {
        let duration = self.options.duration_ms as f32;
        if duration <= 0.0 {
            return (0, 1.0);
        }
        let active = active_ms.max(0.0);
        let iteration = (active / duration).floor();
        let local = (active - iteration * duration) / duration;
        (iteration as u64, local.clamp(0.0, 1.0))
    }

    /// Eased ratio for a given iteration and local progress
    fn ratio(&self, iteration: u64, local: f32) -> f32 {
        if self.options.yoyo && iteration % 2 == 1 {
            self.options.easing.apply(1.0 - local)
        } else {
            self.options.easing.apply(local)
        }
    }

    /// Ratio of the final frame of a finite tween
    fn final_ratio(&self) -> f32 {
        let last = self
            .options
            .repeat
            .iterations()
            .unwrap_or(1)
            .saturating_sub(1) as u64;
        if self.options.yoyo && last % 2 == 1 {
            0.0
        } else {
            1.0
        }
    }

    /// Advance the clock by `dt_ms`
    pub fn advance(&mut self, dt_ms: f32) -> TweenStep {
        if !self.is_active() {
            return TweenStep::default();
        }

        self.elapsed_ms += dt_ms.max(0.0);
        let mut active = self.active_ms();
        if active < 0.0 {
            return TweenStep::default();
        }

        // Infinite loops keep their clock within one yoyo cycle
        let cycle = 2.0 * self.options.duration_ms as f32;
        if self.options.repeat.is_infinite() && cycle > 0.0 && active >= cycle {
            active %= cycle;
            self.elapsed_ms = self.options.delay_ms as f32 + active;
        }

        let started = self.state == TweenState::Pending;
        self.state = TweenState::Running;

        if let Some(total) = self.total_duration_ms() {
            if active >= total {
                self.state = TweenState::Completed;
                return TweenStep {
                    ratio: Some(self.final_ratio()),
                    started,
                    completed: true,
                };
            }
        }

        let (iteration, local) = self.iteration_at(active);
        TweenStep {
            ratio: Some(self.ratio(iteration, local)),
            started,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_holds_pending() {
        let mut tween = Tween::new(TweenOptions::new(1000).delay(300).easing(Easing::Linear));

        let step = tween.advance(200.0);
        assert_eq!(step.ratio, None);
        assert_eq!(tween.state(), TweenState::Pending);

        let step = tween.advance(200.0);
        assert!(step.started);
        assert!((step.ratio.unwrap() - 0.1).abs() < 1e-4);
        assert_eq!(tween.state(), TweenState::Running);
    }

    #[test]
    fn test_finite_tween_completes_at_target() {
        let mut tween = Tween::new(TweenOptions::new(1200).delay(300));
        let mut completed = 0;
        for _ in 0..20 {
            let step = tween.advance(100.0);
            if step.completed {
                completed += 1;
                assert_eq!(step.ratio, Some(1.0));
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(tween.state(), TweenState::Completed);
        assert_eq!(tween.advance(100.0), TweenStep::default());
    }

    #[test]
    fn test_yoyo_reverses_on_odd_iterations() {
        let options = TweenOptions::new(1000)
            .easing(Easing::Linear)
            .repeat(Repeat::Times(1))
            .yoyo(true);
        let mut tween = Tween::new(options);

        let step = tween.advance(250.0);
        assert!((step.ratio.unwrap() - 0.25).abs() < 1e-4);

        let step = tween.advance(1000.0);
        assert!((step.ratio.unwrap() - 0.75).abs() < 1e-4);

        // Two iterations with yoyo end back at the start
        let step = tween.advance(1000.0);
        assert!(step.completed);
        assert_eq!(step.ratio, Some(0.0));
    }

    #[test]
    fn test_infinite_loop_never_completes() {
        let mut tween = Tween::new(LoopOptions::new(4000).into());
        for _ in 0..10_000 {
            let step = tween.advance(16.0);
            assert!(!step.completed);
        }
        assert_eq!(tween.state(), TweenState::Running);
        assert_eq!(tween.total_duration_ms(), None);

        tween.kill();
        assert_eq!(tween.state(), TweenState::Killed);
        assert!(!tween.is_active());
    }

    #[test]
    fn test_infinite_loop_keeps_moving_after_days() {
        let mut tween = Tween::new(LoopOptions::new(4000).delay(500).into());
        // Roughly six days of frames in one step
        let first = tween.advance(536_870_912.0).ratio.unwrap();
        assert!(tween.elapsed_ms() < 500.0 + 8000.0);

        let mut last = first;
        for _ in 0..3 {
            let next = tween.advance(16.0).ratio.unwrap();
            assert!((next - last).abs() > 1e-6);
            last = next;
        }
        assert_eq!(tween.state(), TweenState::Running);
    }

    #[test]
    fn test_loop_wrap_preserves_phase() {
        let mut wrapped = Tween::new(LoopOptions::new(1000).easing(Easing::Linear).into());
        // Three full cycles plus a quarter of the forward leg
        let step = wrapped.advance(6250.0);
        assert!((step.ratio.unwrap() - 0.25).abs() < 1e-4);

        // Into the reverse leg
        let step = wrapped.advance(1000.0);
        assert!((step.ratio.unwrap() - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut tween = Tween::new(TweenOptions::new(1000).easing(Easing::Linear));
        tween.advance(100.0);
        tween.pause();
        assert_eq!(tween.state(), TweenState::Paused);
        assert_eq!(tween.advance(500.0), TweenStep::default());
        assert_eq!(tween.elapsed_ms(), 100.0);

        tween.resume();
        let step = tween.advance(100.0);
        assert!((step.ratio.unwrap() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut tween = Tween::new(TweenOptions::new(0));
        let step = tween.advance(0.0);
        assert!(step.started);
        assert!(step.completed);
        assert_eq!(step.ratio, Some(1.0));
    }

    #[test]
    fn test_class_target_strips_dot() {
        assert_eq!(Target::class(".hero-orb-1"), Target::Class("hero-orb-1".into()));
        assert_eq!(Target::class("hero-orb-1").to_string(), ".hero-orb-1");
    }
}
