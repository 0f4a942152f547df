use super::*;

#[test]
fn numbers_are_zero_padded() {
    assert_eq!(LayerKey::from_value(&LayerValue::Number(7.0)).as_str(), "00007");
    assert_eq!(LayerKey::from_value(&LayerValue::Number(21.0)).as_str(), "00021");
    assert_eq!(LayerKey::from_value(&LayerValue::Number(123456.0)).as_str(), "23456");
    assert_eq!(LayerKey::from_value(&LayerValue::Number(2.5)).as_str(), "002.5");
}

#[test]
fn extreme_numbers_use_script_notation() {
    assert_eq!(number_text(1e20), "100000000000000000000");
    assert_eq!(number_text(1e21), "1e+21");
    assert_eq!(number_text(1.5e-7), "1.5e-7");
    assert_eq!(number_text(0.000001), "0.000001");
    assert_eq!(number_text(-3.0), "-3");
    assert_eq!(number_text(123.25), "123.25");
    assert_eq!(LayerKey::from_value(&LayerValue::Number(1e21)).as_str(), "1e+21");
    assert_eq!(LayerKey::from_value(&LayerValue::Number(1e20)).as_str(), "00000");
    assert_eq!(LayerKey::from_value(&LayerValue::Number(1.5e-7)).as_str(), ".5e-7");
    assert_eq!(LayerKey::from_value(&LayerValue::Number(-3.0)).as_str(), "000-3");
}

#[test]
fn strings_pass_through() {
    assert_eq!(
        LayerKey::from_value(&LayerValue::Text("00002".into())).as_str(),
        "00002"
    );
    assert_eq!(
        LayerKey::from_value(&LayerValue::Text("overlay".into())).as_str(),
        "overlay"
    );
}

#[test]
fn iteration_is_key_then_insertion_order() {
    let mut map = LayerMap::default();
    map.push(LayerKey::from_value(&LayerValue::Number(7.0)), "a");
    map.push(LayerKey::from_value(&LayerValue::Text("00002".into())), "b");
    map.push(LayerKey::from_value(&LayerValue::Number(7.0)), "c");
    assert_eq!(map.entries().copied().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    assert_eq!(
        map.keys().map(LayerKey::as_str).collect::<Vec<_>>(),
        vec!["00002", "00007"]
    );
    assert_eq!(map.len(), 3);
}

#[test]
fn drain_empties_the_map_in_order() {
    let mut map = LayerMap::default();
    map.push(LayerKey::first(), 1);
    map.push(LayerKey::from_value(&LayerValue::Text("00000".into())), 0);
    let drained: Vec<_> = map.drain().map(|(_, v)| v).collect();
    assert_eq!(drained, vec![0, 1]);
    assert!(map.is_empty());
}
