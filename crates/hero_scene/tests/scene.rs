//! End-to-end choreography tests
//!
//! Mount the standard scene on a stage and drive it with fixed frames.

use hero_animation::TweenEvent;
use hero_motion::{Pointer, VariantState};
use hero_scene::{
    Cue, EffectCatalog, HeroContent, HeroScene, HeroView, MountOutcome, Role, SceneError, Stage,
    HOVER_CLASS,
};

fn mounted() -> (Stage, HeroScene, HeroView) {
    let stage = Stage::new();
    let mut scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();
    let view = scene.render(&mut stage.tree().borrow_mut()).unwrap().clone();
    stage.attach(view.root).unwrap();
    assert_eq!(scene.mount(&stage).unwrap(), MountOutcome::Mounted);
    (stage, scene, view)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_title_hidden_at_mount_and_visible_after_entrance() {
    let (mut stage, _scene, view) = mounted();

    let title = stage.snapshot(view.title).unwrap();
    assert_eq!(title.opacity, 0.0);
    assert_eq!(title.y, 80.0);
    assert_eq!(title.skew_y, 3.0);

    // 300 ms delay + 1200 ms duration
    stage.run_for(1500, 100.0);
    let title = stage.snapshot(view.title).unwrap();
    assert!(approx(title.opacity, 1.0));
    assert!(approx(title.y, 0.0));
    assert!(approx(title.skew_y, 0.0));
}

#[test]
fn test_entrances_start_in_delay_order() {
    let (mut stage, _scene, view) = mounted();

    stage.run_for(700, 100.0);
    let title = stage.snapshot(view.title).unwrap();
    let subtitle = stage.snapshot(view.subtitle).unwrap();
    let description = stage.snapshot(view.description).unwrap();

    assert!(title.opacity > 0.0);
    assert!(subtitle.opacity > 0.0);
    assert_eq!(description.opacity, 0.0);
    assert_eq!(description.y, 30.0);
}

#[test]
fn test_social_links_stagger() {
    let (stage, _scene, view) = mounted();
    let transitions = stage.transitions();

    let delays: Vec<_> = view
        .socials
        .iter()
        .map(|id| transitions.entrance_delay(*id))
        .collect();
    assert_eq!(delays, vec![Some(1200), Some(1350), Some(1500)]);

    let ctas: Vec<_> = view
        .ctas
        .iter()
        .map(|id| transitions.entrance_delay(*id))
        .collect();
    assert_eq!(ctas, vec![Some(1200), Some(1350)]);
}

#[test]
fn test_social_links_reveal_on_schedule() {
    let (mut stage, _scene, view) = mounted();

    stage.run_for(1300, 100.0);
    let first = stage.snapshot(view.socials[0]).unwrap();
    let last = stage.snapshot(view.socials[2]).unwrap();
    assert!(first.opacity > 0.0);
    assert_eq!(last.opacity, 0.0);

    stage.run_for(1000, 100.0);
    for social in &view.socials {
        assert_eq!(
            stage.transitions().state(*social),
            Some(VariantState::Visible)
        );
        assert!(approx(stage.snapshot(*social).unwrap().opacity, 1.0));
    }
}

#[test]
fn test_orbs_loop_until_unmount() {
    let (mut stage, mut scene, view) = mounted();

    stage.run_for(12_000, 100.0);
    assert!(stage.scheduler().has_active_animations());
    let completed = stage
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, TweenEvent::Completed(_)))
        .count();
    // Three one-shot entrances complete, the three loops never do
    assert_eq!(completed, 3);
    assert_eq!(stage.scheduler().active_tween_count(), 3);

    scene.unmount();
    assert!(!stage.scheduler().has_active_animations());
    assert!(stage.snapshot(view.orbs[0]).unwrap().is_identity());
}

#[test]
fn test_unmount_stops_all_mutation() {
    let (mut stage, mut scene, view) = mounted();

    stage.run_for(2000, 100.0);
    assert!(scene.unmount());

    let events = stage.drain_events();
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| matches!(e, TweenEvent::Reverted(_))));
    assert_eq!(events.len(), 1);

    assert_eq!(stage.scheduler().tween_count(), 0);
    assert_eq!(stage.scheduler().scope_count(), 0);
    assert_eq!(stage.transitions().node_count(), 0);
    assert!(!stage.tree().borrow().is_attached(view.root));

    let mutations = stage.tree().borrow().mutation_count();
    let frames_before = stage.frame_count();
    stage.run_for(3000, 100.0);
    assert_eq!(stage.frame_count(), frames_before + 30);
    assert_eq!(stage.tree().borrow().mutation_count(), mutations);
    assert!(stage.drain_events().is_empty());
}

#[test]
fn test_unmount_is_idempotent_and_drop_unmounts() {
    let (stage, mut scene, _view) = mounted();
    assert!(scene.unmount());
    assert!(!scene.unmount());
    drop(scene);
    assert!(stage.drain_events().len() <= 1);

    let (stage, scene, view) = mounted();
    drop(scene);
    assert_eq!(stage.scheduler().tween_count(), 0);
    assert_eq!(stage.transitions().node_count(), 0);
    assert!(!stage.tree().borrow().is_attached(view.root));
}

#[test]
fn test_mount_outcomes() {
    let stage = Stage::new();
    let mut scene = HeroScene::new(&EffectCatalog::standard(), HeroContent::default()).unwrap();

    // Not rendered
    assert_eq!(scene.mount(&stage).unwrap(), MountOutcome::Deferred);

    // Rendered but detached
    let root = scene.render(&mut stage.tree().borrow_mut()).unwrap().root;
    assert_eq!(scene.mount(&stage).unwrap(), MountOutcome::Deferred);
    assert_eq!(stage.scheduler().scope_count(), 0);
    assert_eq!(stage.transitions().node_count(), 0);

    stage.attach(root).unwrap();
    assert_eq!(scene.mount(&stage).unwrap(), MountOutcome::Mounted);
    let tweens = stage.scheduler().tween_count();
    assert_eq!(scene.mount(&stage).unwrap(), MountOutcome::AlreadyMounted);
    assert_eq!(stage.scheduler().tween_count(), tweens);
}

#[test]
fn test_configuration_errors_fail_at_construction() {
    let mut catalog = EffectCatalog::standard();
    catalog.remove("float-loop");
    assert!(matches!(
        HeroScene::new(&catalog, HeroContent::default()),
        Err(SceneError::UnknownPreset(_))
    ));

    let script = [Cue::Reveal {
        role: Role::Badge,
        preset: "skew-in",
    }];
    assert!(matches!(
        HeroScene::with_script(&EffectCatalog::standard(), HeroContent::default(), &script),
        Err(SceneError::PresetKind { .. })
    ));

    let content = HeroContent {
        name: String::new(),
        ..Default::default()
    };
    assert!(matches!(
        HeroScene::new(&EffectCatalog::standard(), content),
        Err(SceneError::Content(_))
    ));
}

#[test]
fn test_social_count_drives_stagger() {
    let mut content = HeroContent::default();
    content.socials.truncate(1);

    let stage = Stage::new();
    let mut scene = HeroScene::new(&EffectCatalog::standard(), content).unwrap();
    let view = scene.render(&mut stage.tree().borrow_mut()).unwrap().clone();
    stage.attach(view.root).unwrap();
    scene.mount(&stage).unwrap();

    assert_eq!(view.socials.len(), 1);
    assert_eq!(
        stage.transitions().entrance_delay(view.socials[0]),
        Some(1200)
    );
    let planned = scene.plan().iter().filter(|e| e.role == Role::Social).count();
    assert_eq!(planned, 1);
}

#[test]
fn test_hover_toggles_class_and_overlay() {
    let (mut stage, mut scene, view) = mounted();
    stage.run_for(2600, 100.0);

    let cta = view.ctas[0];
    assert!(scene.pointer(cta, Pointer::Enter));
    assert!(stage.tree().borrow().has_class(cta, HOVER_CLASS));

    stage.run_for(1000, 16.0);
    assert!((stage.snapshot(cta).unwrap().scale - 1.05).abs() < 0.01);

    assert!(scene.pointer(cta, Pointer::Leave));
    assert!(!stage.tree().borrow().has_class(cta, HOVER_CLASS));
    assert!(approx(stage.snapshot(cta).unwrap().scale, 1.0));

    assert!(!scene.pointer(view.title, Pointer::Enter));
}

#[test]
fn test_scroll_bob_bound_to_scope() {
    let (mut stage, mut scene, view) = mounted();

    stage.run_for(500, 100.0);
    let y = stage.snapshot(view.scroll_bob).unwrap().y;
    assert!(y > 0.0 && y < 8.0);

    scene.unmount();
    assert_eq!(stage.snapshot(view.scroll_bob).unwrap().y, 0.0);
}
