use super::*;
use crate::host::recording::ManualClock;

#[test]
fn clock_text_converts_to_seconds() {
    assert_eq!(parse_clock_time("0:00").unwrap(), 0.0);
    assert_eq!(parse_clock_time("1:02").unwrap(), 62.0);
    assert_eq!(parse_clock_time("#2:05.5").unwrap(), 125.5);
    assert!((parse_clock_time("0:01.250").unwrap() - 1.25).abs() < 1e-12);
    assert_eq!(parse_clock_time("12:3").unwrap(), 723.0);
}

#[test]
fn malformed_clock_text_is_a_parse_error() {
    for text in ["N/A", "soon", "1:", ":30", "1:234", "1:02x", "1:02.5s", "-1:00"] {
        let err = parse_clock_time(text).unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)), "{text}: {err}");
    }
}

#[test]
fn default_conversion_goes_through_the_parser() {
    let clock = ManualClock::new(4.0);
    assert_eq!(clock.now(), 4.0);
    assert_eq!(clock.convert_textual_time("0:03").unwrap(), 3.0);
    clock.set(9.5);
    assert_eq!(clock.now(), 9.5);
}
