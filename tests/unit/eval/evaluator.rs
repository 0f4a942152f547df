use super::*;
use crate::animation::ease::interpolate;
use crate::animation::sync::SyncDef;
use crate::animation::track::Track;
use crate::expression::engine::SandboxedEngine;
use crate::foundation::core::{Rgba, Xyz};
use crate::scene::definition::AnimationKind;
use crate::scene::layers::LayerKey;

fn kf(start: f64, duration: f64, value: f64) -> Keyframe<f64> {
    Keyframe {
        window: TimeWindow::new(start, duration),
        value,
    }
}

fn plain(track: &[Keyframe<f64>], time: f64) -> f64 {
    evaluate(
        track,
        Sampling::wall(time, TimeWindow::new(0.0, 10.0)),
        0.0,
        &mut |v: &f64| Ok(*v),
    )
    .unwrap()
}

fn hook(window: TimeWindow, sync: Option<SyncState>) -> Animation {
    Animation {
        id: 0,
        layer: LayerKey::first(),
        window,
        shader: None,
        sync,
        init_function: None,
        run_function: None,
        error: None,
        kind: AnimationKind::Hook,
        extra: serde_json::Map::new(),
    }
}

#[test]
fn segment_boundaries() {
    let track = [kf(0.0, 2.0, 10.0)];
    assert_eq!(plain(&track, 1.0), interpolate(0.5, 0.0, 10.0));
    assert_eq!(plain(&track, 2.0), 10.0);
    assert_eq!(plain(&track, -1.0), 0.0);
    assert_eq!(plain(&track, 7.0), 10.0);
}

#[test]
fn elapsed_keyframes_compound() {
    // second keyframe blends from the first one's result, not from its end value
    let track = [kf(0.0, 5.0, 0.0), kf(2.0, 5.0, 255.0)];
    let seeded = evaluate(
        &track,
        Sampling::wall(3.0, TimeWindow::new(0.0, 5.0)),
        255.0,
        &mut |v: &f64| Ok(*v),
    )
    .unwrap();
    assert!((seeded - 132.6).abs() < 1e-9, "{seeded}");
}

#[test]
fn zero_length_keyframe_snaps_to_target() {
    let track = [kf(1.0, 0.0, 4.0)];
    assert_eq!(plain(&track, 1.0), 4.0);
    assert_eq!(plain(&track, 3.0), 4.0);
    assert_eq!(plain(&track, 0.5), 0.0);
}

#[test]
fn synced_sampling_uses_progress() {
    let window = TimeWindow::new(10.0, 4.0);
    let track = [kf(10.0, 4.0, 8.0)];
    let synced = Sampling {
        time: 0.0,
        window,
        synced: true,
        progress: 0.5,
    };
    let v = evaluate(&track, synced, 0.0, &mut |v: &f64| Ok(*v)).unwrap();
    assert_eq!(v, 4.0);

    let idle = Sampling {
        progress: 0.0,
        ..synced
    };
    let v = evaluate(&track, idle, -1.0, &mut |v: &f64| Ok(*v)).unwrap();
    assert_eq!(v, -1.0);
}

#[test]
fn sampling_follows_the_property_flag() {
    let mut state = SyncDef {
        color: Some(true),
        ..SyncDef::default()
    }
    .resolve();
    state.progress = 0.3;
    let window = TimeWindow::new(0.0, 1.0);

    let color = Sampling::for_property(5.0, window, Some(&state), SyncProperty::Color);
    assert!(color.synced);
    assert_eq!(color.progress, 0.3);
    let angle = Sampling::for_property(5.0, window, Some(&state), SyncProperty::Angle);
    assert!(!angle.synced);
    assert!(!Sampling::for_property(5.0, window, None, SyncProperty::Color).synced);
}

#[test]
fn property_resolves_expressions_against_the_animation() {
    let engine = SandboxedEngine::new();
    let anim = hook(TimeWindow::new(0.0, 4.0), None);
    let track: Track<Xyz<Scalar>> = smallvec::smallvec![Keyframe {
        window: TimeWindow::new(0.0, 4.0),
        value: Xyz::new(
            Scalar::Expr("{ animation.duration * 10 }".into()),
            Scalar::Number(2.0),
            Scalar::Expr("{ time }".into()),
        ),
    }];
    let eval = PropertyEvaluator::new(&engine, &anim, 2.0);
    let v = eval
        .property(Some(&track[..]), SyncProperty::Position, Xyz::new(0.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(v, Xyz::new(20.0, 1.0, 1.0));
}

#[test]
fn absent_track_returns_seed() {
    let engine = SandboxedEngine::new();
    let anim = hook(TimeWindow::new(0.0, 4.0), None);
    let eval = PropertyEvaluator::new(&engine, &anim, 2.0);
    let seed = Rgba::new(255.0, 255.0, 255.0, 255.0);
    let v = eval
        .property::<Rgba<Scalar>>(None, SyncProperty::Color, seed)
        .unwrap();
    assert_eq!(v, seed);
}

#[test]
fn failing_expression_is_an_expression_error() {
    let engine = SandboxedEngine::new();
    let anim = hook(TimeWindow::new(0.0, 4.0), None);
    let eval = PropertyEvaluator::new(&engine, &anim, 2.0);
    let err = eval
        .scalar(&Scalar::Expr("{ animation.nothing + 1 }".into()))
        .unwrap_err();
    assert!(matches!(err, crate::foundation::error::SceneError::Expression(_)));
    assert!(eval.hook("not an expression").is_ok());
    assert!(eval.hook("{ sqrt(-1) > 0 ? 1 : 0 }").is_ok());
}
