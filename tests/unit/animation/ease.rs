use super::*;

#[test]
fn ease_endpoints_are_stable() {
    for e in [Ease::Linear, Ease::SmoothStep, Ease::SmootherStep] {
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
    }
}

#[test]
fn progress_is_clamped() {
    assert_eq!(interpolate(-3.0, 0.0, 10.0), 0.0);
    assert_eq!(interpolate(0.5, 0.0, 10.0), 5.0);
    assert_eq!(interpolate(7.0, 0.0, 10.0), 10.0);
    assert_eq!(interpolate(f64::INFINITY, 2.0, 4.0), 4.0);
    assert_eq!(interpolate(f64::NAN, 2.0, 4.0), 4.0);
}

#[test]
fn smooth_kinds_return_the_bare_curve() {
    assert_eq!(interpolate_kind(Ease::Linear, 0.25, 0.0, 10.0), 2.5);
    assert_eq!(interpolate_kind(Ease::SmoothStep, 0.25, 0.0, 10.0), 0.15625);
    assert_eq!(interpolate_kind(Ease::SmoothStep, 0.25, 100.0, 200.0), 0.15625);
    assert_eq!(interpolate_kind(Ease::SmootherStep, 2.0, 0.0, 10.0), 1.0);
}

#[test]
fn smoothstep_is_symmetric_around_midpoint() {
    assert!((Ease::SmoothStep.apply(0.5) - 0.5).abs() < 1e-12);
    assert!(Ease::SmoothStep.apply(0.25) < 0.25);
    assert!(Ease::SmootherStep.apply(0.25) < Ease::SmoothStep.apply(0.25));
}

#[test]
fn host_codes_select_curves() {
    assert_eq!(Ease::from_code(0), Ease::Linear);
    assert_eq!(Ease::from_code(1), Ease::SmoothStep);
    assert_eq!(Ease::from_code(2), Ease::SmootherStep);
    assert_eq!(Ease::from_code(42), Ease::Linear);
}

#[test]
fn color_interpolates_per_channel() {
    let from = Rgba::new(255.0, 255.0, 255.0, 255.0);
    let to = Rgba::new(0.0, 255.0, 55.0, 0.0);
    let mid = Rgba::interpolate(Ease::Linear, 0.2, &from, &to);
    assert_eq!(mid, Rgba::new(204.0, 255.0, 215.0, 204.0));
}
