use super::*;

#[test]
fn scalar_accepts_numbers_bools_and_expressions() {
    let v: Vec<Scalar> =
        serde_json::from_str(r#"[1.5, 7, true, false, "2.25", "{ animation.start + 1 }"]"#)
            .unwrap();
    assert_eq!(
        v,
        vec![
            Scalar::Number(1.5),
            Scalar::Number(7.0),
            Scalar::Number(1.0),
            Scalar::Number(0.0),
            Scalar::Number(2.25),
            Scalar::Expr("{ animation.start + 1 }".to_owned()),
        ]
    );
}

#[test]
fn scalar_rejects_plain_words() {
    let err = serde_json::from_str::<Scalar>(r#""tex.png""#).unwrap_err();
    assert!(err.to_string().contains("expression"));
}

#[test]
fn scalar_serializes_back_to_its_source_form() {
    let v = serde_json::to_value(vec![Scalar::Number(3.0), Scalar::Expr("{1}".into())]).unwrap();
    assert_eq!(v, serde_json::json!([3.0, "{1}"]));
}

#[test]
fn resolve_stops_on_first_failure() {
    let xyz = Xyz::new(Scalar::Number(1.0), Scalar::Expr("{x}".into()), Scalar::Number(3.0));
    let mut calls = 0;
    let out = xyz.resolve_scalars(&mut |s| {
        calls += 1;
        s.number()
            .ok_or_else(|| crate::foundation::error::SceneError::expression("nope"))
    });
    assert!(out.is_err());
    assert_eq!(calls, 2);
}

#[test]
fn seeds_lift_into_literal_scalars() {
    let seed = Rgba::new(255.0, 255.0, 255.0, 255.0).into_scalars();
    assert_eq!(seed.a, Scalar::Number(255.0));
    assert!(!seed.r.is_expr());
}
