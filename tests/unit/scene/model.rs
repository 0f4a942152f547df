use super::*;

#[test]
fn scene_accepts_bare_and_wrapped_arrays() {
    let bare: SceneDef = serde_json::from_str(r#"[{"image":"a.png"}]"#).unwrap();
    let wrapped: SceneDef = serde_json::from_str(r#"{"animations":[{"text":{"string":"hi"}}]}"#).unwrap();
    assert_eq!(bare.animations.len(), 1);
    assert_eq!(wrapped.animations[0].text.as_ref().unwrap().string, "hi");
}

#[test]
fn bad_entries_are_set_aside_without_losing_the_rest() {
    let scene: SceneDef = serde_json::from_str(
        r#"[
            {"image": "ok.png", "start": 0, "duration": 5},
            {"layer": 3, "image": "bad.png", "color": [{"a": "half"}]},
            {"object": "o", "shape": {"type": "TORUS"}},
            {"text": {"string": "after"}}
        ]"#,
    )
    .unwrap();
    assert_eq!(scene.animations.len(), 2);
    assert_eq!(scene.invalid.len(), 2);

    let bad = &scene.invalid[0];
    assert_eq!(bad.index, 1);
    assert_eq!(bad.layer, Some(LayerValue::Number(3.0)));
    assert_eq!(bad.raw["image"], "bad.png");
    assert!(bad.message.contains("half"), "{}", bad.message);
    assert_eq!(scene.invalid[1].index, 2);
    assert_eq!(scene.invalid[1].layer, None);

    let order: Vec<bool> = scene
        .clone()
        .into_entries()
        .iter()
        .map(|e| matches!(e, SceneEntry::Def(_)))
        .collect();
    assert_eq!(order, vec![true, false, false, true]);
}

#[test]
fn bad_entry_is_rejected_and_the_good_one_is_staged() {
    use crate::config::PlayerSettings;
    use crate::host::recording::RecordingHost;
    use crate::preprocess::Preprocessor;
    use crate::scene::context::SceneContext;
    use crate::scene::definition::AnimationErrorKind;

    let scene: SceneDef = serde_json::from_str(
        r#"[{"image": "ok.png", "start": 0, "duration": 5},
            {"layer": 4, "image": "bad.png", "color": [{"a": "half"}]},
            {"image": "next.png"}]"#,
    )
    .unwrap();
    let mut ctx = SceneContext::new(PlayerSettings::default());
    let mut rig = RecordingHost::default();
    let staged = Preprocessor::new(&mut ctx).add_scene(scene, &mut rig.host());

    assert_eq!(staged, 2);
    assert_eq!(ctx.rejected().len(), 1);
    let rejected = &ctx.rejected()[0];
    assert_eq!(rejected.error.kind, AnimationErrorKind::Parse);
    assert_eq!(rejected.layer.as_str(), "00004");
    assert_eq!(rejected.def["image"], "bad.png");
    assert!(rig.titles.titles.contains(&"PARSE ERROR".to_owned()));

    Preprocessor::new(&mut ctx).process(&mut rig.host()).unwrap();
    let layers: Vec<&str> = ctx.animations().map(|a| a.layer.as_str()).collect();
    assert_eq!(layers, vec!["00001", "00004"]);
    assert_eq!(ctx.failed().count(), 0);
}

#[test]
fn unknown_fields_are_kept_as_extra() {
    let def: AnimationDef =
        serde_json::from_str(r#"{"start":"0:00","duration":5,"speed":3,"label":"x"}"#).unwrap();
    assert_eq!(def.start, Some(TimeValue::Clock("0:00".into())));
    assert_eq!(def.duration, Some(TimeValue::Seconds(5.0)));
    assert_eq!(def.extra["speed"], 3);
    assert_eq!(def.extra["label"], "x");
    assert!(!def.extra.contains_key("start"));
}

#[test]
fn image_field_forms() {
    let def: AnimationDef = serde_json::from_str(
        r#"{"image":["a.png",{"name":"b.ogv","video":{"speed":2,"loop":true}}]}"#,
    )
    .unwrap();
    let image = def.image.unwrap();
    let refs = image.refs();
    assert_eq!(refs[0].name(), "a.png");
    assert_eq!(refs[1].name(), "b.ogv");
    let video = refs[1].video().unwrap();
    assert_eq!(video.speed, Some(Scalar::Number(2.0)));
    assert_eq!(video.looping, Some(Scalar::Number(1.0)));
}

#[test]
fn image_rename_touches_every_unit() {
    let mut image = ImageField::One(ImageRef::Name("p.color.fbo".into()));
    image.rename(|n| n.ends_with(".color.fbo").then(|| "q.color.fbo".to_owned()));
    assert_eq!(image.refs()[0].name(), "q.color.fbo");
}

#[test]
fn shapes_fill_their_defaults() {
    let s: ShapeSpec = serde_json::from_str(r#"{"type":"SPHERE","radius":2}"#).unwrap();
    assert_eq!(
        s,
        ShapeSpec::Sphere {
            radius: 2.0,
            lats: 30,
            longs: 30
        }
    );
    let d: ShapeSpec = serde_json::from_str(r#"{"type":"DISK"}"#).unwrap();
    assert_eq!(
        d,
        ShapeSpec::Disk {
            inner: 0.0,
            outer: 1.0,
            slices: 30,
            loops: 30
        }
    );
    let c: ShapeSpec = serde_json::from_str(r#"{"type":"CUSTOM"}"#).unwrap();
    assert_eq!(c, ShapeSpec::Custom);
}

#[test]
fn blend_factors_accept_codes_and_names() {
    let b: BlendDef = serde_json::from_str(r#"{"src":770,"dst":"GL_ONE"}"#).unwrap();
    assert_eq!(b.src, Some(BlendFactor::SrcAlpha));
    assert_eq!(b.dst, Some(BlendFactor::One));
    assert_eq!(BlendFactor::OneMinusSrcAlpha.gl_code(), 0x0303);
    assert!(serde_json::from_str::<BlendFactor>("12345").is_err());
}

#[test]
fn align_accepts_codes_and_names() {
    let a: Vec<Align> = serde_json::from_str(r#"[1, "right", 0]"#).unwrap();
    assert_eq!(a, vec![Align::Center, Align::Right, Align::None]);
    assert_eq!(Align::Right.code(), 5);
}

#[test]
fn shader_field_single_and_array() {
    let one: ShaderField =
        serde_json::from_str(r#"{"name":["a.vs","a.fs"],"strength":0.5}"#).unwrap();
    match one {
        ShaderField::One(def) => {
            assert_eq!(def.resolved_program_name(), "a.fs");
            assert_eq!(def.variables["strength"], 0.5);
        }
        other => panic!("unexpected {other:?}"),
    }
    let many: ShaderField =
        serde_json::from_str(r#"[{"name":"a.fs"},{"name":"b.fs","programName":"B"}]"#).unwrap();
    match many {
        ShaderField::Many(v) => assert_eq!(v[1].resolved_program_name(), "B"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn perspective_is_mode_or_track() {
    let mode: PerspectiveField = serde_json::from_str(r#""3d""#).unwrap();
    assert_eq!(mode, PerspectiveField::Mode(Projection::ThreeD));
    let track: PerspectiveField = serde_json::from_str(r#"[{"fov":30}]"#).unwrap();
    assert!(matches!(track, PerspectiveField::Track(v) if v.len() == 1));
}
