use super::*;
use crate::host::recording::CountingProgress;

#[test]
fn registering_twice_counts_once() {
    let mut reg = ResourceRegistry::default();
    let mut progress = CountingProgress::default();
    assert!(reg.register("tex1", &mut progress));
    assert!(!reg.register("tex1", &mut progress));
    assert_eq!(progress.added, 1);
    assert_eq!(reg.registered(), 1);
    assert_eq!(reg.state("tex1"), Some(ResourceState::Pending));
}

#[test]
fn mark_loaded_notifies_once() {
    let mut reg = ResourceRegistry::default();
    let mut progress = CountingProgress::default();
    reg.register("tex1", &mut progress);
    assert!(reg.mark_loaded("tex1", &mut progress));
    assert!(!reg.mark_loaded("tex1", &mut progress));
    assert_eq!(progress.loaded, 1);
    assert_eq!(reg.state("tex1"), Some(ResourceState::Loaded));
}

#[test]
fn unknown_names_are_ignored() {
    let mut reg = ResourceRegistry::default();
    let mut progress = CountingProgress::default();
    assert!(!reg.mark_loaded("ghost", &mut progress));
    assert_eq!(progress.loaded, 0);
    assert_eq!(reg.state("ghost"), None);
}

#[test]
fn pending_lists_only_unloaded_names() {
    let mut reg = ResourceRegistry::default();
    let mut progress = CountingProgress::default();
    reg.register("b", &mut progress);
    reg.register("a", &mut progress);
    reg.mark_loaded("b", &mut progress);
    assert_eq!(reg.pending().collect::<Vec<_>>(), vec!["a"]);
}
