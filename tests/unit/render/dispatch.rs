use super::*;
use crate::foundation::core::TimeWindow;
use crate::host::recording::{DrawCall, FixedSync, MemoryLoader, RecordingHost};
use crate::preprocess::Preprocessor;
use crate::scene::model::SceneDef;

fn load(settings: PlayerSettings, json: &str, rig: &mut RecordingHost) -> SceneContext {
    let mut ctx = SceneContext::new(settings);
    let scene: SceneDef = serde_json::from_str(json).unwrap();
    Preprocessor::new(&mut ctx)
        .load(scene, &mut rig.host())
        .unwrap();
    ctx
}

fn frame(ctx: &mut SceneContext, rig: &mut RecordingHost, time: f64) -> FrameStats {
    rig.renderer.clear();
    Dispatcher::new(ctx).draw_at(time, &mut rig.host())
}

/// Recorded calls without the scope bookkeeping.
fn work(rig: &RecordingHost) -> Vec<DrawCall> {
    rig.renderer
        .calls
        .iter()
        .filter(|c| {
            !matches!(
                c,
                DrawCall::PushMatrix | DrawCall::PopMatrix | DrawCall::PushAttrib | DrawCall::PopAttrib
            )
        })
        .cloned()
        .collect()
}

fn position_of(rig: &RecordingHost, pred: impl Fn(&DrawCall) -> bool) -> usize {
    rig.renderer.calls.iter().position(pred).unwrap()
}

#[test]
fn scopes_stay_balanced_across_layers() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[
            {"image": "a.png", "duration": 10},
            {"layer": 2, "text": {"string": "x"}, "start": 0, "duration": 10},
            {"layer": 2, "image": "b.png", "start": 20, "duration": 1}
        ]"#,
        &mut rig,
    );
    let stats = frame(&mut ctx, &mut rig, 1.0);
    assert_eq!(
        stats,
        FrameStats {
            layers: 2,
            drawn: 2,
            skipped: 1,
            failed: 0,
        }
    );

    let calls = &rig.renderer.calls;
    let count = |want: &DrawCall| calls.iter().filter(|c| *c == want).count();
    assert_eq!(count(&DrawCall::PushMatrix), 2);
    assert_eq!(count(&DrawCall::PopMatrix), 2);
    assert_eq!(count(&DrawCall::PushAttrib), 3);
    assert_eq!(count(&DrawCall::PopAttrib), 3);
    assert_eq!(
        calls[calls.len() - 3..],
        [DrawCall::PushAttrib, DrawCall::PopAttrib, DrawCall::PopMatrix]
    );
}

#[test]
fn draw_frame_reads_the_clock() {
    let mut rig = RecordingHost::at(30.0);
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"image": "a.png", "start": 0, "duration": 10}]"#,
        &mut rig,
    );
    let stats = Dispatcher::new(&mut ctx).draw_frame(&mut rig.host());
    assert_eq!(stats.skipped, 1);
    assert_eq!(rig.renderer.images().count(), 0);
}

#[test]
fn errored_animations_are_never_drawn() {
    let mut rig = RecordingHost {
        loader: MemoryLoader::new().fail_on("missing.png"),
        ..RecordingHost::default()
    };
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"image": "missing.png", "duration": 5}]"#,
        &mut rig,
    );
    let stats = frame(&mut ctx, &mut rig, 1.0);
    assert_eq!(stats.skipped, 1);
    assert!(work(&rig).is_empty());
}

#[test]
fn shader_wraps_the_draw() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"image": "a.png", "duration": 5, "shader": {"name": ["v.vs", "f.fs"]}}]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 1.0);
    let enable = position_of(&rig, |c| {
        matches!(c, DrawCall::EnableShader { name, .. } if name == "f.fs")
    });
    let draw = position_of(&rig, |c| matches!(c, DrawCall::DrawImage(_)));
    let disable = position_of(&rig, |c| {
        matches!(c, DrawCall::DisableShader { name, .. } if name == "f.fs")
    });
    assert!(enable < draw && draw < disable);
}

#[test]
fn sync_progress_is_queried_only_with_a_sync_block() {
    let mut rig = RecordingHost {
        sync: FixedSync::new(0.5),
        ..RecordingHost::default()
    };
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[
            {"image": "a.png", "start": 0, "duration": 4, "sync": {}},
            {"image": "b.png", "start": 0, "duration": 4}
        ]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 1.0);
    assert_eq!(rig.sync.queries, vec![(1.0, TimeWindow::new(0.0, 4.0))]);
    let synced = ctx.animations().next().unwrap();
    assert_eq!(synced.sync.unwrap().progress, 0.5);
}

#[test]
fn videos_start_playing_once() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"image": {"name": "clip.mp4", "video": {"speed": 2}}, "start": 1, "duration": 5}]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 2.0);
    let plays = |rig: &RecordingHost| {
        rig.renderer
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::PlayVideo { .. }))
            .count()
    };
    assert_eq!(plays(&rig), 1);
    let settings = rig
        .renderer
        .calls
        .iter()
        .find_map(|c| match c {
            DrawCall::ConfigureVideo { settings, .. } => Some(*settings),
            _ => None,
        })
        .unwrap();
    assert_eq!(settings.start_time, 1.0);
    assert_eq!(settings.speed, Some(2.0));
    assert_eq!(settings.fps, None);

    frame(&mut ctx, &mut rig, 3.0);
    assert_eq!(plays(&rig), 0);
    assert!(
        rig.renderer
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::ConfigureVideo { .. }))
    );
}

#[test]
fn image_draw_carries_evaluated_tracks() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"image": ["a.png", "b.png"], "start": 0, "duration": 4,
             "position": [{"x": 10, "y": 20, "duration": 0}],
             "color": [{"a": 0, "duration": 0}]}]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 1.0);
    let draw = rig.renderer.images().next().unwrap().clone();
    assert_eq!(draw.units.len(), 1);
    assert_eq!(draw.units[0].0, 1);
    assert_eq!(draw.position, Some(Xyz::new(10.0, 20.0, 0.0)));
    assert_eq!(draw.scale, Xyz::new(1.0, 1.0, 1.0));
    assert_eq!(draw.angle, None);
    assert_eq!(draw.align, None);
    let color = rig.renderer.colors().last().unwrap();
    assert_eq!(color.a, 0.0);
    assert_eq!(color.r, 255.0);
}

#[test]
fn legacy_coordinates_flip_screen_y() {
    let settings = PlayerSettings {
        height: 1000,
        legacy_coordinates: true,
        ..PlayerSettings::default()
    };
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        settings,
        r#"[
            {"image": "a.png", "start": 0, "duration": 4, "position": [{"y": 100, "duration": 0}]},
            {"text": {"string": "t", "perspective": "3d"}, "start": 0, "duration": 4,
             "position": [{"y": 100, "duration": 0}]}
        ]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 1.0);
    let image = rig.renderer.images().next().unwrap();
    assert_eq!(image.position, Some(Xyz::new(0.0, 900.0, 0.0)));
    let text = rig
        .renderer
        .calls
        .iter()
        .find_map(|c| match c {
            DrawCall::DrawText(t) => Some(t.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(text.position, Some(Xyz::new(0.0, 100.0, 0.0)));
    assert_eq!(text.align, None);
}

#[test]
fn fbo_actions_issue_their_call_sequences() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[
            {"fbo": {"name": "glow", "action": "begin"}, "start": 0, "duration": 5},
            {"fbo": {"name": "glow", "action": "end"}, "start": 0, "duration": 5}
        ]"#,
        &mut rig,
    );
    let AnimationKind::Fbo(fbo) = &ctx.animations().next().unwrap().kind else {
        panic!("expected an fbo");
    };
    let h = fbo.handle;
    frame(&mut ctx, &mut rig, 1.0);
    assert_eq!(
        work(&rig),
        vec![
            DrawCall::BindFbo { fbo: Some(h) },
            DrawCall::UpdateViewport { fbo: Some(h) },
            DrawCall::BindFbo { fbo: None },
            DrawCall::UpdateViewport { fbo: None },
            DrawCall::BindFboTextures { fbo: Some(h) },
            DrawCall::SetColor {
                color: seeds::COLOR,
            },
            DrawCall::DrawFbo { fbo: h },
            DrawCall::BindFboTextures { fbo: None },
        ]
    );
}

#[test]
fn fbo_dimension_track_sets_render_size() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"fbo": {"action": "unbind"}, "start": 0, "duration": 5,
             "dimension": [{"x": 0.5, "y": 0.25, "duration": 0}]}]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 1.0);
    let calls = work(&rig);
    assert!(matches!(
        calls[0],
        DrawCall::SetFboRenderDimensions { width, height, .. } if width == 0.5 && height == 0.25
    ));
    assert_eq!(calls[1..], [
        DrawCall::BindFbo { fbo: None },
        DrawCall::UpdateViewport { fbo: None },
    ]);
}

#[test]
fn light_follows_a_relative_object_once_it_exists() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[
            {"object": "ship.obj", "start": 0, "duration": 5},
            {"light": {"index": 2, "action": "begin"}, "lightRelativePosition": "ship.obj",
             "start": 0, "duration": 5},
            {"light": {"index": 3}, "lightRelativePosition": "nowhere.obj",
             "start": 0, "duration": 5}
        ]"#,
        &mut rig,
    );
    let ship = match &ctx.animations().next().unwrap().kind {
        AnimationKind::Object(o) => o.handle,
        other => panic!("expected an object, got {}", other.name()),
    };
    frame(&mut ctx, &mut rig, 1.0);

    let attached: Vec<(u32, Option<Handle>)> = rig
        .renderer
        .calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::SetLightPositionObject { index, object } => Some((*index, *object)),
            _ => None,
        })
        .collect();
    assert_eq!(attached, vec![(2, None), (2, ship), (3, None)]);
    assert!(
        rig.renderer
            .calls
            .contains(&DrawCall::SetLightEnabled { index: 2, on: true })
    );

    let lights: Vec<&LightAnimation> = ctx
        .animations()
        .filter_map(|a| match &a.kind {
            AnimationKind::Light(l) => Some(l),
            _ => None,
        })
        .collect();
    assert_eq!(lights[0].position_object, ship);
    assert_eq!(lights[1].position_object, None);
}

#[test]
fn camera_sets_perspective_then_resets_the_view() {
    let settings = PlayerSettings {
        aspect_ratio: Some(2.0),
        ..PlayerSettings::default()
    };
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        settings,
        r#"[{"camera": "main", "start": 0, "duration": 5, "target": [{"z": -1, "duration": 0}]}]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 1.0);
    let calls = work(&rig);
    assert_eq!(
        calls[0],
        DrawCall::SetCameraPerspective {
            perspective: seeds::perspective(2.0),
        }
    );
    assert_eq!(
        calls[1..],
        [
            DrawCall::SetCameraLookAt {
                target: Xyz::new(0.0, 0.0, -1.0),
            },
            DrawCall::SetCameraPositionObject { object: None },
            DrawCall::SetCameraTargetObject { object: None },
            DrawCall::ResetView,
        ]
    );
}

#[test]
fn object_frame_follows_fps_unless_fixed() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[
            {"object": "a.obj", "fps": 10, "start": 2, "duration": 5},
            {"object": "b.obj", "frame": 4, "start": 2, "duration": 5, "color": [{"g": 0, "duration": 0}]}
        ]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 3.5);
    let draws: Vec<ObjectDraw> = rig
        .renderer
        .calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::DrawObject(d) => Some(d.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(draws[0].frame, 15.0);
    assert_eq!(draws[0].color, None);
    assert_eq!(draws[0].scale, Xyz::new(1.0, 1.0, 1.0));
    assert_eq!(draws[1].frame, 4.0);
    assert_eq!(draws[1].color, Some([1.0, 0.0, 1.0, 1.0]));
}

#[test]
fn custom_shapes_get_their_own_matrix_scope() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"object": "blob", "shape": {"type": "CUSTOM"}, "start": 0, "duration": 5,
             "objectFunction": "{ time * 2 }"}]"#,
        &mut rig,
    );
    frame(&mut ctx, &mut rig, 1.0);
    let calls = &rig.renderer.calls;
    let draw = position_of(&rig, |c| matches!(c, DrawCall::DrawObject(_)));
    assert_eq!(calls[draw - 1], DrawCall::PushMatrix);
    assert_eq!(calls[draw + 1], DrawCall::PopMatrix);
    assert_eq!(calls.iter().filter(|c| **c == DrawCall::PushMatrix).count(), 2);
}

#[test]
fn failing_run_function_flags_the_animation() {
    let mut rig = RecordingHost::default();
    let mut ctx = load(
        PlayerSettings::default(),
        r#"[{"image": "a.png", "start": 0, "duration": 5, "runFunction": "{ nosuch(1) }",
             "shader": {"name": ["v.vs", "f.fs"]}}]"#,
        &mut rig,
    );
    assert!(ctx.animations().next().unwrap().error.is_none());

    let stats = frame(&mut ctx, &mut rig, 1.0);
    assert_eq!(stats.failed, 1);
    assert_eq!(rig.renderer.images().count(), 1);
    assert!(
        rig.renderer
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::DisableShader { .. }))
    );
    assert_eq!(rig.renderer.calls.last(), Some(&DrawCall::PopMatrix));
    let error = ctx.animations().next().unwrap().error.clone().unwrap();
    assert_eq!(error.kind, AnimationErrorKind::Expression);
    assert!(error.message.contains("nosuch"), "{}", error.message);
    assert_eq!(
        rig.titles.titles.last().map(String::as_str),
        Some("EXPRESSION ERROR")
    );

    let stats = frame(&mut ctx, &mut rig, 2.0);
    assert_eq!(stats.skipped, 1);
    assert_eq!(rig.renderer.images().count(), 0);
}
