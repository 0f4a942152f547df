use super::*;
use crate::host::recording::TitleLog;
use crate::scene::definition::AnimationErrorKind;

#[test]
fn fresh_context_is_empty() {
    let ctx = SceneContext::new(PlayerSettings::default());
    assert_eq!(ctx.animations().count(), 0);
    assert_eq!(ctx.pending(), 0);
    assert!(ctx.rejected().is_empty());
    assert_eq!(ctx.registry().registered(), 0);
}

#[test]
fn ids_are_sequential() {
    let mut ctx = SceneContext::new(PlayerSettings::default());
    assert_eq!(ctx.allocate_id(), 0);
    assert_eq!(ctx.allocate_id(), 1);
    assert_eq!(ctx.allocate_id(), 2);
}

#[test]
fn reported_errors_set_the_title() {
    let mut titles = TitleLog::default();
    let error = AnimationError::new(AnimationErrorKind::Resource, "Could not load a.png");
    report_error(&mut titles, &error, &AnimationDef::default());
    assert_eq!(titles.titles, vec!["RESOURCE ERROR".to_owned()]);
}
