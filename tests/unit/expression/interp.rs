use super::*;
use crate::expression::parser::parse_expr;

struct Ctx {
    time: f64,
    window: TimeWindow,
}

impl ExprContext for Ctx {
    fn time(&self) -> f64 {
        self.time
    }

    fn window(&self) -> TimeWindow {
        self.window
    }

    fn lookup(&self, path: &[String]) -> Option<ExprValue> {
        match path.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["time"] => Some(ExprValue::Number(self.time)),
            ["animation", "start"] => Some(ExprValue::Number(self.window.start)),
            ["animation", "visible"] => Some(ExprValue::Bool(true)),
            _ => None,
        }
    }
}

fn run(src: &str, time: f64) -> Result<ExprValue, ExprError> {
    let ctx = Ctx {
        time,
        window: TimeWindow::new(2.0, 4.0),
    };
    eval(&parse_expr(src)?, &ctx)
}

#[test]
fn arithmetic_and_paths() {
    assert_eq!(
        run("{ return animation.start * 10 + time; }", 3.0).unwrap(),
        ExprValue::Number(23.0)
    );
    assert_eq!(run("7 % 4 - -1", 0.0).unwrap(), ExprValue::Number(4.0));
}

#[test]
fn ternary_and_logic() {
    assert_eq!(
        run("animation.visible && time > 1 ? 255 : 0", 3.0).unwrap(),
        ExprValue::Number(255.0)
    );
    assert_eq!(
        run("!animation.visible || time == 0", 0.0).unwrap(),
        ExprValue::Bool(true)
    );
}

#[test]
fn builtins() {
    assert_eq!(run("max(1, min(5, 3))", 0.0).unwrap(), ExprValue::Number(3.0));
    assert_eq!(run("clamp(9, 0, 2)", 0.0).unwrap(), ExprValue::Number(2.0));
    assert_eq!(run("interpolate(2, 0, 10)", 0.0).unwrap(), ExprValue::Number(10.0));
    assert_eq!(run("interpolate(0.5, 0, 10, 1)", 0.0).unwrap(), ExprValue::Number(0.5));
    assert_eq!(run("interpolate(0.25, 0, 10, 1)", 0.0).unwrap(), ExprValue::Number(0.15625));
    assert_eq!(run("lerp(0, 10, 0.25)", 0.0).unwrap(), ExprValue::Number(2.5));
    assert_eq!(run("pow(2, 10)", 0.0).unwrap(), ExprValue::Number(1024.0));
    assert_eq!(run("floor(1.7) + ceil(1.2)", 0.0).unwrap(), ExprValue::Number(3.0));
}

#[test]
fn progress_is_clamped_to_the_window() {
    assert_eq!(run("progress()", 4.0).unwrap(), ExprValue::Number(0.5));
    assert_eq!(run("progress()", 100.0).unwrap(), ExprValue::Number(1.0));
    assert_eq!(run("progress()", 0.0).unwrap(), ExprValue::Number(0.0));
}

#[test]
fn runtime_failures_are_reported() {
    assert!(run("nope + 1", 0.0).unwrap_err().message.contains("unknown name"));
    assert!(run("frob(1)", 0.0).unwrap_err().message.contains("unknown function"));
    assert!(run("min(1)", 0.0).unwrap_err().message.contains("min expects 2 args"));
    assert!(run("clamp(1, 2, 0)", 0.0).is_err());
    assert!(run("1 && true", 0.0).is_err());
}

#[test]
fn bools_read_as_numbers_when_needed() {
    assert_eq!(ExprValue::Bool(true).as_number(), 1.0);
    assert_eq!(ExprValue::Bool(false).as_number(), 0.0);
}
