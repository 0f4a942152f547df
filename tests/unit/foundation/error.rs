use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SceneError::parse("x").to_string().contains("parse error:"));
    assert!(
        SceneError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        SceneError::expression("x")
            .to_string()
            .contains("expression error:")
    );
    assert!(
        SceneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_become_serde_errors() {
    let err: SceneError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, SceneError::Serde(_)));
}
