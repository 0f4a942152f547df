use super::*;
use crate::config::PlayerSettings;
use crate::host::recording::{LoaderCall, RecordingHost};
use crate::scene::model::SceneDef;

fn defs(json: &str) -> Vec<AnimationDef> {
    serde_json::from_str::<SceneDef>(json).unwrap().animations
}

fn staged(ctx: &SceneContext) -> Vec<(String, &AnimationDef)> {
    ctx.staged
        .iter()
        .flat_map(|(k, v)| v.iter().map(move |s| (k.as_str().to_owned(), &s.def)))
        .collect()
}

fn fbo_of(def: &AnimationDef) -> (Option<&str>, Option<&str>) {
    let fbo = def.fbo.as_ref().unwrap();
    (fbo.name.as_deref(), fbo.action.as_deref())
}

#[test]
fn layers_inherit_the_last_explicit_key() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    let n = add_animations(
        &mut ctx,
        defs(r#"[{"layer":7},{"layer":"00002"},{}]"#),
        &mut rig.host(),
    );
    assert_eq!(n, 3);
    let keys: Vec<String> = staged(&ctx).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["00002", "00007", "00007"]);
}

#[test]
fn layer_defaults_to_first() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    add_animations(&mut ctx, defs(r#"[{}, {}]"#), &mut rig.host());
    let keys: Vec<String> = staged(&ctx).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["00001", "00001"]);
}

#[test]
fn shader_array_expands_into_chained_passes() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    let scene = r#"[{
        "image": "scene.color.fbo",
        "shader": [{"name": "A.fs"}, {"name": "B.fs"}],
        "passToFbo": {"name": "p"}
    }]"#;
    let n = add_animations(&mut ctx, defs(scene), &mut rig.host());
    assert_eq!(n, 6);

    let entries = staged(&ctx);
    assert_eq!(fbo_of(entries[0].1), (Some("p.pass.0"), Some("begin")));
    let first = entries[1].1;
    assert_eq!(first.pass_to_fbo.as_ref().unwrap().name, "p.pass.0");
    assert_eq!(first.image.as_ref().unwrap().refs()[0].name(), "scene.color.fbo");
    assert_eq!(fbo_of(entries[2].1), (Some("p.pass.0"), Some("unbind")));

    assert_eq!(fbo_of(entries[3].1), (Some("p"), Some("begin")));
    let last = entries[4].1;
    assert_eq!(last.pass_to_fbo.as_ref().unwrap().name, "p");
    assert_eq!(
        last.image.as_ref().unwrap().refs()[0].name(),
        "p.pass.0.color.fbo"
    );
    match &last.shader {
        Some(ShaderField::One(s)) => assert_eq!(s.resolved_program_name(), "B.fs"),
        other => panic!("unexpected shader {other:?}"),
    }
    assert_eq!(fbo_of(entries[5].1), (Some("p"), Some("unbind")));
}

#[test]
fn fbo_input_follows_previous_pass() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    let scene = r#"[{
        "fbo": {"name": "src", "action": "draw"},
        "shader": [{"name": "A.fs"}, {"name": "B.fs"}, {"name": "C.fs"}],
        "passToFbo": {"name": "out"}
    }]"#;
    add_animations(&mut ctx, defs(scene), &mut rig.host());
    let owners: Vec<(Option<&str>, String)> = staged(&ctx)
        .into_iter()
        .filter(|(_, d)| d.shader.is_some())
        .map(|(_, d)| {
            (
                d.fbo.as_ref().unwrap().name.as_deref(),
                d.pass_to_fbo.as_ref().unwrap().name.clone(),
            )
        })
        .collect();
    assert_eq!(
        owners,
        vec![
            (Some("src"), "out.pass.0".to_owned()),
            (Some("out.pass.0"), "out.pass.1".to_owned()),
            (Some("out.pass.1"), "out".to_owned()),
        ]
    );
}

#[test]
fn shader_array_without_target_is_rejected() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    let n = add_animations(
        &mut ctx,
        defs(r#"[{"image":"a.png","shader":[{"name":"A.fs"}]}, {"image":"b.png"}]"#),
        &mut rig.host(),
    );
    assert_eq!(n, 1);
    assert_eq!(ctx.rejected().len(), 1);
    assert_eq!(ctx.rejected()[0].error.kind, AnimationErrorKind::Parse);
    assert_eq!(rig.titles.titles, vec!["PARSE ERROR".to_owned()]);
}

#[test]
fn pass_to_fbo_brackets_use_their_own_layers_and_actions() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    let scene = r#"[
        {"layer": 5, "start": 1, "duration": 2, "image": "a.png",
         "passToFbo": {"name": "p", "beginLayer": 1, "endLayer": 9, "endAction": "end"}},
        {"image": "b.png"}
    ]"#;
    add_animations(&mut ctx, defs(scene), &mut rig.host());
    let entries = staged(&ctx);
    let summary: Vec<(String, Option<&str>)> = entries
        .iter()
        .map(|(k, d)| (k.clone(), d.fbo.as_ref().and_then(|f| f.action.as_deref())))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("00001".to_owned(), Some("begin")),
            ("00005".to_owned(), None),
            ("00005".to_owned(), None),
            ("00009".to_owned(), Some("end")),
        ]
    );
    // brackets copy the owner's explicit timing
    assert_eq!(entries[0].1.time_fields(), entries[1].1.time_fields());
}

#[test]
fn dependencies_register_once() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    let scene = r#"[
        {"image": ["a.png", "b.png"], "initFunction": "{ 1 }"},
        {"image": "a.png", "shader": {"name": ["v.vs", "f.fs"]}},
        {"object": "ship.obj"},
        {"fbo": {}}
    ]"#;
    add_animations(&mut ctx, defs(scene), &mut rig.host());
    let reg = ctx.registry();
    for name in ["a.png", "b.png", "{ 1 }", "f.fs", "ship.obj", "fbo"] {
        assert!(reg.state(name).is_some(), "{name} not registered");
    }
    assert_eq!(reg.registered(), 6);
    assert_eq!(rig.progress.added, 6);
    let requested: Vec<&LoaderCall> = rig
        .loader
        .calls
        .iter()
        .filter(|c| matches!(c, LoaderCall::RequestImageAsync { .. }))
        .collect();
    assert_eq!(requested.len(), 2);
}
