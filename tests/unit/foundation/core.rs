use super::*;

#[test]
fn window_is_half_open() {
    let w = TimeWindow::new(2.0, 3.0);
    assert_eq!(w.end, 5.0);
    assert!(!w.contains(1.999));
    assert!(w.contains(2.0));
    assert!(w.contains(4.999));
    assert!(!w.contains(5.0));
}

#[test]
fn following_window_is_back_to_back() {
    let next = TimeWindow::new(0.0, 5.0).following();
    assert_eq!(next, TimeWindow::new(5.0, 5.0));
    assert_eq!(next.end, 10.0);
}

#[test]
fn normalized_color_scales_channels() {
    let c = Rgba::new(255.0, 0.0, 51.0, 127.5);
    assert_eq!(c.normalized(), [1.0, 0.0, 0.2, 0.5]);
}

#[test]
fn angle_serializes_with_camel_case_degrees() {
    let a = Angle {
        degrees_x: 1.0,
        degrees_y: 2.0,
        degrees_z: 3.0,
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };
    let v = serde_json::to_value(a).unwrap();
    assert_eq!(v["degreesZ"], 3.0);
}
