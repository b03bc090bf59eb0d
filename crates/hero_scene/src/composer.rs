//! Scene composer
//!
//! Declares which part of the hero view gets which preset and hands the
//! resulting effects to two [`EffectRunner`]s, one per engine. Everything
//! that can be wrong with a script is caught in [`HeroScene::with_script`];
//! mounting only fails if a runner refuses an effect.

use hero_animation::Target;
use hero_core::{ElementId, ElementTree, PropertyMap, SharedTree};
use hero_motion::{GestureSet, Pointer, VariantSet};
use serde::Serialize;
use smallvec::SmallVec;

use crate::catalog::{EffectCatalog, LoopTemplate, TweenTemplate};
use crate::content::HeroContent;
use crate::error::{Result, SceneError};
use crate::runner::{Effect, EffectRunner, Engine, ScopeRunner, VariantRunner};
use crate::stage::Stage;
use crate::view::{HeroView, Role, HOVER_CLASS};

/// One line of a scene script
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// One-shot timeline tween on every element of `role`
    Tween { role: Role, preset: &'static str },
    /// Infinite timeline loop, bound to the scene's scope
    Ambient { role: Role, preset: &'static str },
    /// Declarative hidden to visible transition
    Reveal { role: Role, preset: &'static str },
    /// Declarative reveal of a container with staggered items
    Group {
        container: Role,
        item: Role,
        container_preset: &'static str,
        item_preset: &'static str,
    },
    /// Hover and press overlays
    Gesture { role: Role, preset: &'static str },
}

/// The hero entrance choreography
pub const HERO_SCRIPT: &[Cue] = &[
    Cue::Tween {
        role: Role::Title,
        preset: "skew-in",
    },
    Cue::Tween {
        role: Role::Subtitle,
        preset: "slide-in",
    },
    Cue::Tween {
        role: Role::Description,
        preset: "fade-up",
    },
    Cue::Ambient {
        role: Role::OrbA,
        preset: "float-loop",
    },
    Cue::Ambient {
        role: Role::OrbB,
        preset: "float-loop-alt",
    },
    Cue::Ambient {
        role: Role::ScrollBob,
        preset: "scroll-bob",
    },
    Cue::Reveal {
        role: Role::Badge,
        preset: "pop-in",
    },
    Cue::Reveal {
        role: Role::NameHighlight,
        preset: "underline-reveal",
    },
    Cue::Group {
        container: Role::CtaRow,
        item: Role::Cta,
        container_preset: "stagger-container",
        item_preset: "stagger-item",
    },
    Cue::Group {
        container: Role::SocialRow,
        item: Role::Social,
        container_preset: "stagger-container",
        item_preset: "stagger-item",
    },
    Cue::Reveal {
        role: Role::ScrollIndicator,
        preset: "drop-in",
    },
    Cue::Gesture {
        role: Role::Cta,
        preset: "hover-grow",
    },
    Cue::Gesture {
        role: Role::Social,
        preset: "hover-lift",
    },
];

/// A cue with its presets resolved
#[derive(Clone, Debug)]
enum Step {
    Tween {
        role: Role,
        preset: &'static str,
        template: TweenTemplate,
    },
    Ambient {
        role: Role,
        preset: &'static str,
        template: LoopTemplate,
    },
    Reveal {
        role: Role,
        preset: &'static str,
        variant: VariantSet,
    },
    Group {
        container: Role,
        item: Role,
        container_preset: &'static str,
        item_preset: &'static str,
        container_variant: VariantSet,
        item_variant: VariantSet,
    },
    Gesture {
        role: Role,
        gestures: GestureSet,
    },
}

impl Step {
    fn resolve(catalog: &EffectCatalog, cue: Cue) -> Result<Self> {
        let step = match cue {
            Cue::Tween { role, preset } => Step::Tween {
                role,
                preset,
                template: catalog.tween(preset)?.clone(),
            },
            Cue::Ambient { role, preset } => Step::Ambient {
                role,
                preset,
                template: catalog.ambient(preset)?.clone(),
            },
            Cue::Reveal { role, preset } => Step::Reveal {
                role,
                preset,
                variant: catalog.variant(preset)?.clone(),
            },
            Cue::Group {
                container,
                item,
                container_preset,
                item_preset,
            } => Step::Group {
                container,
                item,
                container_preset,
                item_preset,
                container_variant: catalog.variant(container_preset)?.clone(),
                item_variant: catalog.variant(item_preset)?.clone(),
            },
            Cue::Gesture { role, preset } => Step::Gesture {
                role,
                gestures: catalog.gesture(preset)?.clone(),
            },
        };
        Ok(step)
    }

    /// Properties each role has claimed, and on which engine
    fn claims(&self) -> SmallVec<[(Role, Engine, PropertyMap); 2]> {
        let mut claims = SmallVec::new();
        match self {
            Step::Tween { role, template, .. } => {
                claims.push((*role, Engine::Timeline, template.properties()));
            }
            Step::Ambient { role, template, .. } => {
                claims.push((*role, Engine::Timeline, template.to.clone()));
            }
            Step::Reveal { role, variant, .. } => {
                claims.push((*role, Engine::Transition, variant.hidden.clone()));
            }
            Step::Group {
                container,
                item,
                container_variant,
                item_variant,
                ..
            } => {
                claims.push((
                    *container,
                    Engine::Transition,
                    container_variant.hidden.clone(),
                ));
                claims.push((*item, Engine::Transition, item_variant.hidden.clone()));
            }
            Step::Gesture { role, gestures } => {
                let properties = gestures.properties().map(|p| (p, p.identity())).collect();
                claims.push((*role, Engine::Transition, properties));
            }
        }
        claims
    }
}

/// Reject scripts where one property of one role is driven by both engines
fn check_conflicts(steps: &[Step]) -> Result<()> {
    let claims: Vec<_> = steps.iter().flat_map(Step::claims).collect();
    for (i, (role, engine, properties)) in claims.iter().enumerate() {
        for (other_role, other_engine, other_properties) in &claims[i + 1..] {
            if role != other_role || engine == other_engine {
                continue;
            }
            if let Some(property) = properties.properties().find(|p| other_properties.contains(*p))
            {
                return Err(SceneError::PropertyConflict {
                    role: *role,
                    property,
                });
            }
        }
    }
    Ok(())
}

/// Result of [`HeroScene::mount`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountOutcome {
    /// Every effect was started
    Mounted,
    /// The view is not rendered or not attached yet; nothing was started
    Deferred,
    /// The scene was already running
    AlreadyMounted,
}

/// One scheduled entrance or loop, as reported by [`HeroScene::plan`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanEntry {
    pub role: Role,
    /// Position among elements sharing the role, for repeated roles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub preset: &'static str,
    pub engine: Engine,
    pub delay_ms: u32,
    pub duration_ms: u32,
    pub looping: bool,
}

struct Live {
    tree: SharedTree,
    timeline: Box<dyn EffectRunner>,
    transitions: Box<dyn EffectRunner>,
    root: ElementId,
}

/// The hero view and its choreography
pub struct HeroScene {
    content: HeroContent,
    steps: Vec<Step>,
    view: Option<HeroView>,
    live: Option<Live>,
}

impl HeroScene {
    /// A scene playing [`HERO_SCRIPT`]
    pub fn new(catalog: &EffectCatalog, content: HeroContent) -> Result<Self> {
        Self::with_script(catalog, content, HERO_SCRIPT)
    }

    /// A scene playing a custom script
    ///
    /// Fails if the content is invalid, a cue names a missing or mistyped
    /// preset, or a property would be driven by both engines.
    pub fn with_script(
        catalog: &EffectCatalog,
        content: HeroContent,
        script: &[Cue],
    ) -> Result<Self> {
        content.validate()?;
        let steps = script
            .iter()
            .map(|cue| Step::resolve(catalog, *cue))
            .collect::<Result<Vec<_>>>()?;
        check_conflicts(&steps)?;

        tracing::debug!("composed hero scene with {} cues", steps.len());
        Ok(Self {
            content,
            steps,
            view: None,
            live: None,
        })
    }

    pub fn content(&self) -> &HeroContent {
        &self.content
    }

    /// The rendered view, if [`render`](Self::render) has run
    pub fn view(&self) -> Option<&HeroView> {
        self.view.as_ref()
    }

    /// Build the detached view subtree; later calls return the same view
    pub fn render(&mut self, tree: &mut ElementTree) -> Result<&HeroView> {
        let view = match self.view.take() {
            Some(view) => view,
            None => HeroView::build(tree, &self.content)?,
        };
        Ok(self.view.insert(view))
    }

    /// Start times of every entrance and loop, earliest first
    pub fn plan(&self) -> Vec<PlanEntry> {
        let mut plan = Vec::new();
        for step in &self.steps {
            match step {
                Step::Tween {
                    role,
                    preset,
                    template,
                } => {
                    for index in self.indices(*role) {
                        plan.push(PlanEntry {
                            role: *role,
                            index,
                            preset: *preset,
                            engine: Engine::Timeline,
                            delay_ms: template.options.delay_ms,
                            duration_ms: template.options.duration_ms,
                            looping: template.options.repeat.is_infinite(),
                        });
                    }
                }
                Step::Ambient {
                    role,
                    preset,
                    template,
                } => {
                    for index in self.indices(*role) {
                        plan.push(PlanEntry {
                            role: *role,
                            index,
                            preset: *preset,
                            engine: Engine::Timeline,
                            delay_ms: template.options.delay_ms,
                            duration_ms: template.options.duration_ms,
                            looping: true,
                        });
                    }
                }
                Step::Reveal {
                    role,
                    preset,
                    variant,
                } => {
                    for index in self.indices(*role) {
                        plan.push(PlanEntry {
                            role: *role,
                            index,
                            preset: *preset,
                            engine: Engine::Transition,
                            delay_ms: variant.transition.delay_ms,
                            duration_ms: variant.transition.duration_ms,
                            looping: false,
                        });
                    }
                }
                Step::Group {
                    container,
                    item,
                    container_preset,
                    item_preset,
                    container_variant,
                    item_variant,
                } => {
                    plan.push(PlanEntry {
                        role: *container,
                        index: None,
                        preset: *container_preset,
                        engine: Engine::Transition,
                        delay_ms: container_variant.transition.delay_ms,
                        duration_ms: container_variant.transition.duration_ms,
                        looping: false,
                    });
                    let total = self.count(*item);
                    for index in 0..total {
                        let stagger = container_variant
                            .transition
                            .stagger
                            .map_or(0, |s| s.delay_for_index(index));
                        plan.push(PlanEntry {
                            role: *item,
                            index: Some(index),
                            preset: *item_preset,
                            engine: Engine::Transition,
                            delay_ms: stagger.saturating_add(item_variant.transition.delay_ms),
                            duration_ms: item_variant.transition.duration_ms,
                            looping: false,
                        });
                    }
                }
                Step::Gesture { .. } => {}
            }
        }
        plan.sort_by_key(|entry| entry.delay_ms);
        plan
    }

    /// Number of elements the content gives a role
    fn count(&self, role: Role) -> usize {
        match role {
            Role::Cta => self.content.ctas.len(),
            Role::Social => self.content.socials.len(),
            _ => 1,
        }
    }

    fn indices(&self, role: Role) -> Vec<Option<usize>> {
        match role {
            Role::Cta | Role::Social => (0..self.count(role)).map(Some).collect(),
            _ => vec![None],
        }
    }

    /// Bind every cue to the elements of `view`, in script order
    pub fn effects(&self, view: &HeroView) -> Vec<Effect> {
        let mut effects = Vec::new();
        for step in &self.steps {
            match step {
                Step::Tween { role, template, .. } => {
                    effects.extend(view.elements(*role).into_iter().map(|target| {
                        Effect::Tween {
                            target,
                            template: template.clone(),
                        }
                    }));
                }
                Step::Ambient { role, template, .. } => match role.selector() {
                    Some(class) => effects.push(Effect::Ambient {
                        target: Target::class(class),
                        template: template.clone(),
                    }),
                    None => {
                        effects.extend(view.elements(*role).into_iter().map(|target| {
                            Effect::Ambient {
                                target: Target::Element(target),
                                template: template.clone(),
                            }
                        }));
                    }
                },
                Step::Reveal { role, variant, .. } => {
                    effects.extend(view.elements(*role).into_iter().map(|target| {
                        Effect::Reveal {
                            target,
                            variant: variant.clone(),
                        }
                    }));
                }
                Step::Group {
                    container,
                    item,
                    container_variant,
                    item_variant,
                    ..
                } => {
                    let items = view.elements(*item);
                    for container in view.elements(*container) {
                        effects.push(Effect::Stagger {
                            container,
                            container_variant: container_variant.clone(),
                            items: items.clone(),
                            item_variant: item_variant.clone(),
                        });
                    }
                }
                Step::Gesture { role, gestures } => {
                    effects.extend(view.elements(*role).into_iter().map(|target| {
                        Effect::Gestures {
                            target,
                            gestures: gestures.clone(),
                        }
                    }));
                }
            }
        }
        effects
    }

    /// Start the choreography on the stage's engines
    pub fn mount(&mut self, stage: &Stage) -> Result<MountOutcome> {
        if self.live.is_some() {
            return Ok(MountOutcome::AlreadyMounted);
        }
        let Some(root) = self.view.as_ref().map(|view| view.root) else {
            tracing::debug!("hero scene not rendered yet, deferring mount");
            return Ok(MountOutcome::Deferred);
        };
        if !stage.tree().borrow().is_attached(root) {
            tracing::warn!("hero root {:?} is not attached, deferring mount", root);
            return Ok(MountOutcome::Deferred);
        }

        let timeline = ScopeRunner::open(&stage.scheduler().handle(), root);
        let transitions = VariantRunner::new(stage.transitions().handle(), root);
        self.mount_with(
            stage.tree().clone(),
            Box::new(timeline),
            Box::new(transitions),
        )
    }

    /// Start the choreography on caller-supplied runners
    ///
    /// Timeline effects go to `timeline`, the rest to `transitions`. If a
    /// runner rejects an effect both runners are disposed before the error
    /// is returned.
    pub fn mount_with(
        &mut self,
        tree: SharedTree,
        mut timeline: Box<dyn EffectRunner>,
        mut transitions: Box<dyn EffectRunner>,
    ) -> Result<MountOutcome> {
        if self.live.is_some() {
            return Ok(MountOutcome::AlreadyMounted);
        }
        let Some(view) = self.view.as_ref() else {
            return Ok(MountOutcome::Deferred);
        };
        let root = view.root;
        if !tree.borrow().is_attached(root) {
            tracing::warn!("hero root {:?} is not attached, deferring mount", root);
            return Ok(MountOutcome::Deferred);
        }

        let effects = self.effects(view);
        for effect in &effects {
            let runner = match effect.engine() {
                Engine::Timeline => &mut timeline,
                Engine::Transition => &mut transitions,
            };
            tracing::trace!("running {} effect on {} runner", effect.kind(), runner.name());
            if let Err(err) = runner.run(effect) {
                timeline.dispose();
                transitions.dispose();
                return Err(err);
            }
        }

        tracing::info!("mounted hero scene: {} effects", effects.len());
        self.live = Some(Live {
            tree,
            timeline,
            transitions,
            root,
        });
        Ok(MountOutcome::Mounted)
    }

    pub fn is_mounted(&self) -> bool {
        self.live.is_some()
    }

    /// Route a pointer event to a call-to-action or social link
    ///
    /// Returns whether the element reacted. Other elements are ignored.
    pub fn pointer(&mut self, element: ElementId, pointer: Pointer) -> bool {
        let (Some(live), Some(view)) = (self.live.as_mut(), self.view.as_ref()) else {
            return false;
        };
        if !view.is_interactive(element) {
            return false;
        }

        let toggled = {
            let mut tree = live.tree.borrow_mut();
            match pointer {
                Pointer::Enter => tree.add_class(element, HOVER_CLASS),
                Pointer::Leave => tree.remove_class(element, HOVER_CLASS),
                Pointer::Down | Pointer::Up => Ok(()),
            }
        };
        if let Err(err) = toggled {
            tracing::warn!("cannot toggle hover class: {}", err);
        }

        live.transitions.pointer(element, pointer)
    }

    /// Stop every effect, restore pre-animation styles and detach the view
    ///
    /// Returns `false` if the scene was not mounted.
    pub fn unmount(&mut self) -> bool {
        let Some(mut live) = self.live.take() else {
            return false;
        };

        live.timeline.dispose();
        live.transitions.dispose();

        let detached = live.tree.borrow_mut().detach(live.root);
        if let Err(err) = detached {
            tracing::warn!("cannot detach hero root: {}", err);
        }

        tracing::info!("unmounted hero scene");
        true
    }
}

impl Drop for HeroScene {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Preset;
    use crate::runner::{Recorded, RecordingRunner};
    use hero_core::Property;

    #[test]
    fn test_standard_script_composes() {
        let scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();
        assert_eq!(scene.steps.len(), HERO_SCRIPT.len());
        assert!(scene.view().is_none());
        assert!(!scene.is_mounted());
    }

    #[test]
    fn test_unknown_preset_fails_construction() {
        let mut catalog = EffectCatalog::standard();
        catalog.remove("drop-in");

        let err = HeroScene::new(&catalog, HeroContent::default())
            .err()
            .unwrap();
        assert!(matches!(err, SceneError::UnknownPreset(name) if name == "drop-in"));
    }

    #[test]
    fn test_cross_engine_conflict_detected() {
        let script = [
            Cue::Tween {
                role: Role::Title,
                preset: "skew-in",
            },
            Cue::Reveal {
                role: Role::Title,
                preset: "drop-in",
            },
        ];
        let err = HeroScene::with_script(&EffectCatalog::standard(), HeroContent::default(), &script)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SceneError::PropertyConflict {
                role: Role::Title,
                property: Property::Opacity,
            }
        ));
    }

    #[test]
    fn test_same_engine_overlap_is_allowed() {
        let script = [
            Cue::Group {
                container: Role::CtaRow,
                item: Role::Cta,
                container_preset: "stagger-container",
                item_preset: "stagger-item",
            },
            Cue::Gesture {
                role: Role::Cta,
                preset: "hover-grow",
            },
        ];
        assert!(
            HeroScene::with_script(&EffectCatalog::standard(), HeroContent::default(), &script)
                .is_ok()
        );
    }

    #[test]
    fn test_gesture_conflicts_with_timeline() {
        let mut catalog = EffectCatalog::standard();
        catalog.insert(
            "nudge",
            Preset::Tween(TweenTemplate {
                from: PropertyMap::new().with(Property::Scale, 0.5),
                to: PropertyMap::new().with(Property::Scale, 1.0),
                options: hero_animation::TweenOptions::new(200),
            }),
        );
        let script = [
            Cue::Tween {
                role: Role::Social,
                preset: "nudge",
            },
            Cue::Gesture {
                role: Role::Social,
                preset: "hover-lift",
            },
        ];
        assert!(matches!(
            HeroScene::with_script(&catalog, HeroContent::default(), &script),
            Err(SceneError::PropertyConflict {
                role: Role::Social,
                ..
            })
        ));
    }

    #[test]
    fn test_plan_is_sorted_and_expands_stagger() {
        let scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();
        let plan = scene.plan();

        assert!(plan.windows(2).all(|w| w[0].delay_ms <= w[1].delay_ms));

        let socials: Vec<u32> = plan
            .iter()
            .filter(|e| e.role == Role::Social)
            .map(|e| e.delay_ms)
            .collect();
        assert_eq!(socials, vec![1200, 1350, 1500]);

        let title = plan.iter().find(|e| e.role == Role::Title).unwrap();
        assert_eq!((title.delay_ms, title.duration_ms), (300, 1200));
        assert_eq!(title.engine, Engine::Timeline);

        assert_eq!(plan.iter().filter(|e| e.looping).count(), 3);
    }

    #[test]
    fn test_plan_serializes_for_tooling() {
        let scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();
        let json = serde_json::to_value(scene.plan()).unwrap();

        let first = &json[0];
        assert_eq!(first["role"], "orb-a");
        assert_eq!(first["engine"], "timeline");
        assert_eq!(first["looping"], true);
        assert!(first.get("index").is_none());

        let social = json
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["role"] == "social")
            .unwrap();
        assert_eq!(social["index"], 0);
        assert_eq!(social["delay_ms"], 1200);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut tree = ElementTree::new();
        let mut scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();

        let first = scene.render(&mut tree).unwrap().root;
        let count = tree.len();
        let second = scene.render(&mut tree).unwrap().root;

        assert_eq!(first, second);
        assert_eq!(tree.len(), count);
    }

    #[test]
    fn test_effects_route_to_runners_in_script_order() {
        let mut tree = ElementTree::new();
        let mut scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();
        let root = scene.render(&mut tree).unwrap().root;
        tree.attach(root).unwrap();

        let timeline = RecordingRunner::new();
        let transitions = RecordingRunner::new();
        let outcome = scene
            .mount_with(
                tree.into_shared(),
                Box::new(timeline.clone()),
                Box::new(transitions.clone()),
            )
            .unwrap();
        assert_eq!(outcome, MountOutcome::Mounted);

        let kinds: Vec<_> = timeline.effects().iter().map(Effect::kind).collect();
        assert_eq!(
            kinds,
            vec!["tween", "tween", "tween", "ambient", "ambient", "ambient"]
        );
        assert!(timeline
            .effects()
            .iter()
            .all(|e| e.engine() == Engine::Timeline));

        let kinds: Vec<_> = transitions.effects().iter().map(Effect::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "reveal", "reveal", "stagger", "stagger", "reveal", "gesture", "gesture",
                "gesture", "gesture", "gesture"
            ]
        );

        assert!(scene.unmount());
        assert!(!scene.unmount());
        assert_eq!(timeline.dispose_count(), 1);
        assert_eq!(transitions.dispose_count(), 1);
    }

    #[test]
    fn test_pointer_ignores_non_interactive_elements() {
        let mut tree = ElementTree::new();
        let mut scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();
        let view = scene.render(&mut tree).unwrap().clone();
        tree.attach(view.root).unwrap();

        let transitions = RecordingRunner::new();
        scene
            .mount_with(
                tree.into_shared(),
                Box::new(RecordingRunner::new()),
                Box::new(transitions.clone()),
            )
            .unwrap();

        assert!(!scene.pointer(view.title, Pointer::Enter));
        assert!(scene.pointer(view.ctas[0], Pointer::Enter));
        assert_eq!(
            transitions.log().last(),
            Some(&Recorded::Pointer(view.ctas[0], Pointer::Enter))
        );
    }
}
